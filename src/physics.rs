/// Hydrogen 2p_z orbital probability density
/// |ψ_210|² ∝ r² e^(−r/a₀) cos²θ

use std::f64::consts::PI;

/// Bohr radius; all distances default to units of a₀
pub const BOHR_RADIUS: f32 = 1.0;

/// Radial factor (r/a₀)² e^(−r/a₀) peaks at r = 2a₀ with value 4e⁻²
const RADIAL_PEAK: f64 = 2.0;

/// Physical constants of the density, fixed for the lifetime of a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DensityParameters {
    a0: f32,
    /// 1 / (32 π a₀⁵); kept in f64, a₀⁵ leaves the f32 range for
    /// moderate a₀
    normalization: f64,
}

impl Default for DensityParameters {
    fn default() -> Self {
        DensityParameters::new(BOHR_RADIUS)
    }
}

impl DensityParameters {
    pub fn new(a0: f32) -> Self {
        let normalization = 1.0 / (32.0 * PI * (a0 as f64).powi(5));
        DensityParameters { a0, normalization }
    }

    pub fn bohr_radius(&self) -> f32 {
        self.a0
    }

    pub fn normalization(&self) -> f64 {
        self.normalization
    }

    /// Probability density at (r, θ). Azimuth does not enter: the 2p_z
    /// density is symmetric about the z axis.
    pub fn density(&self, r: f32, theta: f32) -> f32 {
        let r = r as f64;
        let cos_theta = (theta as f64).cos();
        (self.normalization * r * r * (-r / self.a0 as f64).exp() * cos_theta * cos_theta) as f32
    }

    /// Rejection envelope: radial peak at r = 2a₀ times the angular peak
    /// cos²θ = 1. Each factor is maximised on its own, so the bound is safe
    /// but not tight.
    pub fn density_bound(&self) -> f32 {
        let r = RADIAL_PEAK * self.a0 as f64;
        (self.normalization * r * r * (-RADIAL_PEAK).exp()) as f32
    }

    /// density(r, θ) / density_bound(), evaluated in units of a₀ so the
    /// normalization cancels and the ratio stays finite for any a₀ > 0.
    pub fn relative_density(&self, r: f32, theta: f32) -> f32 {
        let x = r as f64 / self.a0 as f64;
        let cos_theta = (theta as f64).cos();
        let radial = x * x * (-x).exp() / (RADIAL_PEAK * RADIAL_PEAK * (-RADIAL_PEAK).exp());
        (radial * cos_theta * cos_theta) as f32
    }
}
