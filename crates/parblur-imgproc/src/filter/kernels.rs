use super::BlurError;

/// Maximum number of weights a [`WeightTable`] can hold.
///
/// The largest accepted radius is therefore `MAX_KERNEL_SIZE - 1`.
pub const MAX_KERNEL_SIZE: usize = 1000;

/// Value of the gaussian domain reached at the last weight of the table.
pub const GAUSS_MAX_X: f32 = 1.33;

/// Constant shaping the falloff of the gaussian curve.
///
/// This is the reference value the weight curve was tuned against, not `std::f32::consts::PI`.
#[allow(clippy::approx_constant)]
pub const GAUSS_PI: f32 = 3.14;

/// Create the one-sided gaussian weights for the given radius.
///
/// The weight at distance `i` is `exp(-(i * GAUSS_MAX_X / radius)^2 * GAUSS_PI)`, so the
/// curve always spans `[0, GAUSS_MAX_X]` regardless of the radius. A radius of zero yields
/// the single weight `1.0`.
///
/// # Arguments
///
/// * `radius` - The radius of the kernel.
///
/// # Returns
///
/// A vector of `radius + 1` weights, the center weight first.
pub fn gaussian_weights_1d(radius: usize) -> Vec<f32> {
    if radius == 0 {
        return vec![1.0];
    }

    let scale = GAUSS_MAX_X / radius as f32;
    (0..=radius)
        .map(|i| {
            let x = i as f32 * scale;
            (-x * x * GAUSS_PI).exp()
        })
        .collect()
}

/// The precomputed one-sided gaussian kernel of a blur invocation.
///
/// Index 0 holds the center weight and index `d` the weight shared by both neighbors at
/// distance `d`. The weights are not normalized; the convolution renormalizes by the
/// weights it actually used.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightTable {
    weights: Vec<f32>,
}

impl WeightTable {
    /// Build the weight table for `radius`.
    ///
    /// # Errors
    ///
    /// Returns [`BlurError::KernelRadiusTooLarge`] if `radius + 1` weights do not fit in
    /// [`MAX_KERNEL_SIZE`]. The check happens before anything is allocated.
    pub fn new(radius: usize) -> Result<Self, BlurError> {
        if radius >= MAX_KERNEL_SIZE {
            return Err(BlurError::KernelRadiusTooLarge(radius, MAX_KERNEL_SIZE - 1));
        }

        Ok(Self {
            weights: gaussian_weights_1d(radius),
        })
    }

    /// The radius of the kernel.
    pub fn radius(&self) -> usize {
        self.weights.len() - 1
    }

    /// The weight of the center pixel.
    pub fn center(&self) -> f32 {
        self.weights[0]
    }

    /// The weight of a neighbor at distance `d`, or `None` if `d` exceeds the radius.
    pub fn weight(&self, d: usize) -> Option<f32> {
        self.weights.get(d).copied()
    }

    /// The one-sided weights, the center weight first.
    pub fn as_slice(&self) -> &[f32] {
        &self.weights
    }
}
