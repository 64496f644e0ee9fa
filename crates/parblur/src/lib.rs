//! Parallel separable Gaussian blur.
//!
//! ```no_run
//! use parblur::{imgproc, io::functional as F};
//!
//! let image = F::read_image_rgb8("input.ppm").unwrap();
//! let blurred = imgproc::filter::blur(&image, 15, 4).unwrap();
//! F::write_image_rgb8("output.ppm", &blurred).unwrap();
//! ```

#[doc(inline)]
pub use parblur_image as image;

#[doc(inline)]
pub use parblur_imgproc as imgproc;

#[doc(inline)]
pub use parblur_io as io;
