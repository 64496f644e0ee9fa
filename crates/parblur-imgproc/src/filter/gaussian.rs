use log::debug;
use rayon::ThreadPool;

use parblur_image::{Image, ImageError};

use super::convolution::{convolve_rows, Axis, FloatConversion};
use super::kernels::WeightTable;
use super::BlurError;
use crate::parallel::{
    build_thread_pool, par_iter_row_ranges, partition_rows, ParallelError, RowRange,
};

/// A separable gaussian blur executed by a fixed number of workers.
///
/// The image rows are split into one contiguous range per worker. The blur runs in two
/// passes: a horizontal pass from the source into a scratch image, then a vertical pass
/// from the scratch image into the destination. The vertical pass starts only once every
/// worker finished the horizontal pass, since a worker reads scratch rows written by its
/// neighbors.
///
/// # Example
///
/// ```
/// use parblur_image::{Image, ImageSize};
/// use parblur_imgproc::filter::GaussianBlur;
///
/// let size = ImageSize { width: 4, height: 4 };
/// let src = Image::<f32, 3>::from_size_val(size, 0.5).unwrap();
/// let mut dst = Image::<f32, 3>::from_size_val(size, 0.0).unwrap();
///
/// let blur = GaussianBlur::new(2, 2).unwrap();
/// blur.apply(&src, &mut dst).unwrap();
///
/// assert!(dst.as_slice().iter().all(|&v| (v - 0.5).abs() < 1e-5));
/// ```
#[derive(Debug, Clone)]
pub struct GaussianBlur {
    weights: WeightTable,
    num_workers: usize,
}

impl GaussianBlur {
    /// Create a new blur with the given radius and number of workers.
    ///
    /// # Errors
    ///
    /// Returns an error if `num_workers` is zero or the radius exceeds the kernel capacity.
    pub fn new(radius: usize, num_workers: usize) -> Result<Self, BlurError> {
        if num_workers == 0 {
            return Err(ParallelError::InvalidThreadCount(num_workers).into());
        }

        Ok(Self {
            weights: WeightTable::new(radius)?,
            num_workers,
        })
    }

    /// The radius of the blur kernel.
    pub fn radius(&self) -> usize {
        self.weights.radius()
    }

    /// The number of workers used by each pass.
    pub fn num_workers(&self) -> usize {
        self.num_workers
    }

    /// The gaussian weights shared by all the workers.
    pub fn weights(&self) -> &WeightTable {
        &self.weights
    }

    /// Blur `src` into `dst`.
    ///
    /// Returns only after both passes completed on every row. Images with zero rows or zero
    /// columns are accepted and leave `dst` untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if `src` and `dst` differ in size or the worker threads cannot be
    /// spawned. Nothing is written to `dst` in either case.
    pub fn apply<T, const C: usize>(
        &self,
        src: &Image<T, C>,
        dst: &mut Image<T, C>,
    ) -> Result<(), BlurError>
    where
        T: FloatConversion + Send + Sync,
    {
        if src.size() != dst.size() {
            return Err(ImageError::InvalidImageSize(
                src.cols(),
                src.rows(),
                dst.cols(),
                dst.rows(),
            )
            .into());
        }

        let ranges = partition_rows(src.rows(), self.num_workers)?;

        if src.is_empty() {
            debug!("nothing to blur in an image of size {}", src.size());
            return Ok(());
        }

        debug!(
            "blurring {} with radius {} on {} workers: {:?}",
            src.size(),
            self.radius(),
            self.num_workers,
            ranges
        );

        let pool = build_thread_pool(self.num_workers)?;

        let scratch = self.horizontal_pass(&pool, src, &ranges)?;
        debug!("horizontal pass done");

        self.vertical_pass(&pool, &scratch, dst, &ranges)?;
        debug!("vertical pass done");

        Ok(())
    }

    /// Blur the rows of `src` into a new scratch image.
    ///
    /// The scratch image is handed back only after every worker finished writing its rows.
    fn horizontal_pass<T, const C: usize>(
        &self,
        pool: &ThreadPool,
        src: &Image<T, C>,
        ranges: &[RowRange],
    ) -> Result<Image<f32, C>, BlurError>
    where
        T: FloatConversion + Sync,
    {
        let size = src.size();
        let mut scratch = Image::<f32, C>::from_size_val(size, 0.0)?;

        par_iter_row_ranges(
            pool,
            scratch.as_slice_mut(),
            size.width * C,
            ranges,
            |range, rows| {
                convolve_rows::<T, f32, C>(
                    src.as_slice(),
                    size,
                    &self.weights,
                    Axis::Horizontal,
                    range,
                    rows,
                )
            },
        )?;

        Ok(scratch)
    }

    /// Blur the columns of the complete scratch image into `dst`.
    fn vertical_pass<T, const C: usize>(
        &self,
        pool: &ThreadPool,
        scratch: &Image<f32, C>,
        dst: &mut Image<T, C>,
        ranges: &[RowRange],
    ) -> Result<(), BlurError>
    where
        T: FloatConversion + Send,
    {
        let size = scratch.size();

        par_iter_row_ranges(
            pool,
            dst.as_slice_mut(),
            size.width * C,
            ranges,
            |range, rows| {
                convolve_rows::<f32, T, C>(
                    scratch.as_slice(),
                    size,
                    &self.weights,
                    Axis::Vertical,
                    range,
                    rows,
                )
            },
        )?;

        Ok(())
    }
}

/// Blur an image using a gaussian filter computed by `num_workers` parallel workers.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `dst` - The destination image with shape (H, W, C).
/// * `radius` - The radius of the kernel, at most [`super::kernels::MAX_KERNEL_SIZE`] - 1.
/// * `num_workers` - The number of workers, must be > 0.
///
/// PRECONDITION: `src` and `dst` must have the same shape.
pub fn gaussian_blur_par<T, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
    radius: usize,
    num_workers: usize,
) -> Result<(), BlurError>
where
    T: FloatConversion + Send + Sync,
{
    GaussianBlur::new(radius, num_workers)?.apply(src, dst)
}

/// Blur an image and return the result as a new image.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `radius` - The radius of the kernel.
/// * `num_workers` - The number of workers, must be > 0.
///
/// # Returns
///
/// The blurred image, with the same size as `src`.
///
/// # Example
///
/// ```
/// use parblur_image::{Image, ImageSize};
/// use parblur_imgproc::filter::blur;
///
/// let src = Image::<u8, 3>::from_size_val(ImageSize { width: 8, height: 6 }, 200).unwrap();
/// let dst = blur(&src, 3, 4).unwrap();
///
/// assert_eq!(dst, src);
/// ```
pub fn blur<T, const C: usize>(
    src: &Image<T, C>,
    radius: usize,
    num_workers: usize,
) -> Result<Image<T, C>, BlurError>
where
    T: FloatConversion + Clone + Send + Sync,
{
    let blur = GaussianBlur::new(radius, num_workers)?;
    let mut dst = src.clone();
    blur.apply(src, &mut dst)?;
    Ok(dst)
}
