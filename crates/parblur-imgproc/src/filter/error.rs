use parblur_image::ImageError;

use crate::parallel::ParallelError;

/// Errors that can occur while blurring an image.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum BlurError {
    /// The radius needs more weights than a kernel can hold.
    #[error("kernel radius {0} exceeds the maximum radius {1}")]
    KernelRadiusTooLarge(usize, usize),

    /// The workers could not be set up or the rows could not be partitioned.
    #[error(transparent)]
    Parallel(#[from] ParallelError),

    /// The source and destination images are not compatible.
    #[error(transparent)]
    Image(#[from] ImageError),
}
