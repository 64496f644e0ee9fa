use parblur_image::ImageSize;

use super::kernels::WeightTable;
use crate::parallel::RowRange;

/// Trait for floating point casting
pub trait FloatConversion {
    /// Convert the type to f32
    fn to_f32(&self) -> f32;
    /// Convert the type from f32
    fn from_f32(val: f32) -> Self;
}

impl FloatConversion for f32 {
    fn to_f32(&self) -> f32 {
        *self
    }

    fn from_f32(val: f32) -> Self {
        val
    }
}

impl FloatConversion for f64 {
    fn to_f32(&self) -> f32 {
        *self as f32
    }

    fn from_f32(val: f32) -> Self {
        val as f64
    }
}

/// Writes round to the nearest integer before clamping to `[0, 255]`.
impl FloatConversion for u8 {
    fn to_f32(&self) -> f32 {
        *self as f32
    }

    fn from_f32(val: f32) -> Self {
        val.round().clamp(0.0, 255.0) as u8
    }
}

/// The direction a 1D convolution steps in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Neighbors are taken from the same row.
    Horizontal,
    /// Neighbors are taken from the same column.
    Vertical,
}

/// Convolve a single pixel along `axis`, renormalizing by the weights actually used.
///
/// Neighbors that fall outside the image are skipped, neither clamped to the border nor
/// wrapped around, and the weighted sum is divided by the sum of the weights of the
/// neighbors that did contribute. This keeps the borders from darkening.
///
/// # Arguments
///
/// * `src` - The source image data, row-major with `C` interleaved channels.
/// * `size` - The size of the source image.
/// * `weights` - The one-sided gaussian weights.
/// * `x` - The column of the target pixel.
/// * `y` - The row of the target pixel.
/// * `axis` - The direction to convolve in.
///
/// # Returns
///
/// The filtered value of each channel.
///
/// PRECONDITION: `(x, y)` is inside the image and `src` has `size.width * size.height * C`
/// elements.
pub fn convolve_pixel<T: FloatConversion, const C: usize>(
    src: &[T],
    size: ImageSize,
    weights: &WeightTable,
    x: usize,
    y: usize,
    axis: Axis,
) -> [f32; C] {
    // position along the axis, axis length and the distance between two neighbors in `src`
    let (pos, len, step) = match axis {
        Axis::Horizontal => (x, size.width, C),
        Axis::Vertical => (y, size.height, size.width * C),
    };

    let center = (y * size.width + x) * C;
    let w0 = weights.center();

    let mut acc = [0.0f32; C];
    for (ch, acc_val) in acc.iter_mut().enumerate() {
        *acc_val = w0 * src[center + ch].to_f32();
    }
    let mut norm = w0;

    // both neighbors at distance `d` share the same weight
    for (d, w) in (1..).map_while(|d| weights.weight(d).map(|w| (d, w))) {
        if d <= pos {
            let idx = center - d * step;
            for (ch, acc_val) in acc.iter_mut().enumerate() {
                *acc_val += w * src[idx + ch].to_f32();
            }
            norm += w;
        }

        if pos + d < len {
            let idx = center + d * step;
            for (ch, acc_val) in acc.iter_mut().enumerate() {
                *acc_val += w * src[idx + ch].to_f32();
            }
            norm += w;
        }
    }

    acc.map(|v| v / norm)
}

/// Convolve every pixel of the rows in `range` along `axis`.
///
/// This is the work of a single worker in one pass: it reads anywhere in `src` but writes
/// only `dst_rows`, the rows of the destination it owns.
///
/// # Arguments
///
/// * `src` - The full source image data.
/// * `size` - The size of the source and destination images.
/// * `weights` - The one-sided gaussian weights.
/// * `axis` - The direction to convolve in.
/// * `range` - The rows to compute.
/// * `dst_rows` - The destination rows of `range`, `range.len() * size.width * C` elements.
pub fn convolve_rows<S, D, const C: usize>(
    src: &[S],
    size: ImageSize,
    weights: &WeightTable,
    axis: Axis,
    range: RowRange,
    dst_rows: &mut [D],
) where
    S: FloatConversion,
    D: FloatConversion,
{
    let row_stride = size.width * C;
    if row_stride == 0 {
        return;
    }

    for (y, dst_row) in range.rows().zip(dst_rows.chunks_exact_mut(row_stride)) {
        for (x, dst_pixel) in dst_row.chunks_exact_mut(C).enumerate() {
            let values = convolve_pixel::<S, C>(src, size, weights, x, y, axis);
            for (dst_val, &v) in dst_pixel.iter_mut().zip(values.iter()) {
                *dst_val = D::from_f32(v);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::BlurError;

    fn size(width: usize, height: usize) -> ImageSize {
        ImageSize { width, height }
    }

    #[test]
    fn test_convolve_pixel_radius_zero() -> Result<(), BlurError> {
        let weights = WeightTable::new(0)?;
        let src = [1.0f32, 2.0, 3.0, 4.0];
        for (i, &v) in src.iter().enumerate() {
            let h = convolve_pixel::<f32, 1>(&src, size(4, 1), &weights, i, 0, Axis::Horizontal);
            assert_eq!(h, [v]);
        }
        Ok(())
    }

    #[test]
    fn test_convolve_pixel_interior() -> Result<(), BlurError> {
        let weights = WeightTable::new(1)?;
        let w1 = weights.as_slice()[1];
        let src = [0.0f32, 10.0, 20.0];

        let v = convolve_pixel::<f32, 1>(&src, size(3, 1), &weights, 1, 0, Axis::Horizontal);
        let expected = (10.0 + w1 * 0.0 + w1 * 20.0) / (1.0 + 2.0 * w1);
        assert!((v[0] - expected).abs() < 1e-5);
        Ok(())
    }

    #[test]
    fn test_convolve_pixel_renormalizes_at_border() -> Result<(), BlurError> {
        let weights = WeightTable::new(2)?;
        let w = weights.as_slice();

        // a flat row stays flat at the borders
        let flat = [50.0f32; 5];
        for x in 0..5 {
            let v = convolve_pixel::<f32, 1>(&flat, size(5, 1), &weights, x, 0, Axis::Horizontal);
            assert!((v[0] - 50.0).abs() < 1e-4);
        }

        // only the right neighbors contribute at x = 0
        let src = [0.0f32, 10.0, 20.0, 30.0, 40.0];
        let v = convolve_pixel::<f32, 1>(&src, size(5, 1), &weights, 0, 0, Axis::Horizontal);
        let expected = (w[1] * 10.0 + w[2] * 20.0) / (w[0] + w[1] + w[2]);
        assert!((v[0] - expected).abs() < 1e-4);
        Ok(())
    }

    #[test]
    fn test_convolve_pixel_axis() -> Result<(), BlurError> {
        let weights = WeightTable::new(1)?;
        #[rustfmt::skip]
        let src = [
            0.0f32, 9.0, 0.0,
            0.0, 0.0, 0.0,
            0.0, 0.0, 0.0,
        ];

        // the bright pixel sits in the row above (1, 1), so only the vertical pass sees it
        let h = convolve_pixel::<f32, 1>(&src, size(3, 3), &weights, 1, 1, Axis::Horizontal);
        let v = convolve_pixel::<f32, 1>(&src, size(3, 3), &weights, 1, 1, Axis::Vertical);
        assert_eq!(h, [0.0]);
        assert!(v[0] > 0.0);

        // and the transposed layout gives the same value horizontally
        #[rustfmt::skip]
        let transposed = [
            0.0f32, 0.0, 0.0,
            9.0, 0.0, 0.0,
            0.0, 0.0, 0.0,
        ];
        let t = convolve_pixel::<f32, 1>(&transposed, size(3, 3), &weights, 1, 1, Axis::Horizontal);
        assert_eq!(t, v);
        Ok(())
    }

    #[test]
    fn test_convolve_pixel_channels_independent() -> Result<(), BlurError> {
        let weights = WeightTable::new(1)?;
        let src = [
            10.0f32, 0.0, 5.0, //
            10.0, 100.0, 5.0, //
        ];
        let v = convolve_pixel::<f32, 3>(&src, size(2, 1), &weights, 0, 0, Axis::Horizontal);
        assert!((v[0] - 10.0).abs() < 1e-5);
        assert!(v[1] > 0.0 && v[1] < 100.0);
        assert!((v[2] - 5.0).abs() < 1e-5);
        Ok(())
    }

    #[test]
    fn test_convolve_rows() -> Result<(), BlurError> {
        let weights = WeightTable::new(1)?;
        let src = [4u8; 3 * 4];
        let mut dst = [0.0f32; 3 * 2];
        let range = RowRange { start: 1, end: 3 };

        convolve_rows::<u8, f32, 1>(&src, size(3, 4), &weights, Axis::Vertical, range, &mut dst);
        assert!(dst.iter().all(|&v| (v - 4.0).abs() < 1e-5));
        Ok(())
    }

    #[test]
    fn test_weight_shared_by_both_neighbors() -> Result<(), BlurError> {
        let weights = WeightTable::new(3)?;
        for d in 1..=3 {
            let mut left = [0.0f32; 7];
            let mut right = [0.0f32; 7];
            left[3 - d] = 1.0;
            right[3 + d] = 1.0;

            let l = convolve_pixel::<f32, 1>(&left, size(7, 1), &weights, 3, 0, Axis::Horizontal);
            let r = convolve_pixel::<f32, 1>(&right, size(7, 1), &weights, 3, 0, Axis::Horizontal);
            assert_eq!(l, r);
        }
        Ok(())
    }

    #[test]
    fn test_u8_conversion() {
        assert_eq!(u8::from_f32(99.99999), 100);
        assert_eq!(u8::from_f32(99.6), 100);
        assert_eq!(u8::from_f32(99.4), 99);
        assert_eq!(u8::from_f32(254.5), 255);
        assert_eq!(u8::from_f32(0.49), 0);
        assert_eq!(u8::from_f32(-3.0), 0);
        assert_eq!(u8::from_f32(300.0), 255);
        assert_eq!(200u8.to_f32(), 200.0);
    }
}
