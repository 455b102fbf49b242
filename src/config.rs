/// Sampling configuration shared by the desktop and web front ends

use crate::physics::{DensityParameters, BOHR_RADIUS};
use pico_args::Arguments;

pub const DEFAULT_NUM_POINTS: usize = 100_000;
/// Upper limit on sampling workers; each one owns a partial cloud
pub const MAX_WORKERS: usize = 16;

#[derive(Debug, Clone, PartialEq)]
pub struct SamplerConfig {
    /// Candidate budget; the accepted cloud is smaller
    pub num_points: usize,
    pub bohr_radius: f32,
    /// Fixed seed for reproducible clouds, entropy when absent
    pub seed: Option<u64>,
    pub workers: usize,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            num_points: DEFAULT_NUM_POINTS,
            bohr_radius: BOHR_RADIUS,
            seed: None,
            workers: 1,
        }
    }
}

impl SamplerConfig {
    /// Read `--points`, `--a0`, `--seed` and `--workers`, falling back to
    /// defaults for anything not given.
    pub fn from_args(args: &mut Arguments) -> Result<Self, String> {
        let defaults = Self::default();
        let config = Self {
            num_points: args
                .opt_value_from_str("--points")
                .map_err(|e| format!("--points: {e}"))?
                .unwrap_or(defaults.num_points),
            bohr_radius: args
                .opt_value_from_str("--a0")
                .map_err(|e| format!("--a0: {e}"))?
                .unwrap_or(defaults.bohr_radius),
            seed: args
                .opt_value_from_str("--seed")
                .map_err(|e| format!("--seed: {e}"))?,
            workers: args
                .opt_value_from_str("--workers")
                .map_err(|e| format!("--workers: {e}"))?
                .unwrap_or(defaults.workers)
                .min(MAX_WORKERS),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn density_parameters(&self) -> DensityParameters {
        DensityParameters::new(self.bohr_radius)
    }

    /// The configured seed, or a fresh one drawn from the thread RNG.
    pub fn resolve_seed(&self) -> u64 {
        self.seed.unwrap_or_else(rand::random)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.num_points == 0 {
            return Err("num_points must be > 0".to_string());
        }
        if !self.bohr_radius.is_finite() || self.bohr_radius <= 0.0 {
            return Err(format!("a0 must be a positive number, got {}", self.bohr_radius));
        }
        let bound = self.density_parameters().density_bound();
        if !(bound > 0.0 && bound.is_finite()) {
            return Err(format!("a0 = {} is out of the representable range", self.bohr_radius));
        }
        if self.workers == 0 || self.workers > MAX_WORKERS {
            return Err(format!("workers must be in 1..={MAX_WORKERS}"));
        }
        Ok(())
    }
}
