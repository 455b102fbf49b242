/// Rejection sampler turning the 2p_z density into a point cloud

use crate::physics::DensityParameters;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use std::f32::consts::PI;

/// Anything that yields independent uniform floats in [0, 1).
pub trait UniformSource {
    fn next_uniform(&mut self) -> f32;
}

impl<R: rand::Rng + ?Sized> UniformSource for R {
    fn next_uniform(&mut self) -> f32 {
        self.gen::<f32>()
    }
}

/// A candidate in spherical coordinates (θ polar, φ azimuthal).
#[derive(Debug, Clone, Copy)]
pub struct SphericalSample {
    pub r: f32,
    pub theta: f32,
    pub phi: f32,
}

impl SphericalSample {
    /// Draw from the proposal: exponential radius, isotropic direction.
    /// Consumes exactly three uniforms, in r, θ, φ order.
    pub fn draw<U: UniformSource + ?Sized>(params: &DensityParameters, rng: &mut U) -> Self {
        // U1 == 0 gives r = inf; the density is then NaN and the candidate
        // fails the acceptance comparison.
        let r = -params.bohr_radius() * rng.next_uniform().ln();
        let theta = (1.0 - 2.0 * rng.next_uniform()).acos();
        let phi = rng.next_uniform() * 2.0 * PI;
        SphericalSample { r, theta, phi }
    }

    pub fn to_cartesian(&self) -> Point3D {
        let (sin_theta, cos_theta) = self.theta.sin_cos();
        let (sin_phi, cos_phi) = self.phi.sin_cos();
        Point3D {
            x: self.r * sin_theta * cos_phi,
            y: self.r * sin_theta * sin_phi,
            z: self.r * cos_theta,
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Point3D {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Point3D {
    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

/// Accepted points in acceptance order, together with the number of
/// candidates that were drawn to produce them.
#[derive(Debug, Clone, PartialEq)]
pub struct PointCloud {
    points: Vec<Point3D>,
    candidates: usize,
}

impl PointCloud {
    pub fn points(&self) -> &[Point3D] {
        &self.points
    }

    /// Flattened x, y, z triples.
    pub fn as_flat(&self) -> &[f32] {
        bytemuck::cast_slice(&self.points)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn candidates(&self) -> usize {
        self.candidates
    }

    pub fn acceptance_ratio(&self) -> f32 {
        if self.candidates == 0 {
            return 0.0;
        }
        self.points.len() as f32 / self.candidates as f32
    }

    fn concat(parts: Vec<PointCloud>) -> PointCloud {
        let total = parts.iter().map(|p| p.points.len()).sum();
        let mut points = Vec::with_capacity(total);
        let mut candidates = 0;
        for mut part in parts {
            points.append(&mut part.points);
            candidates += part.candidates;
        }
        PointCloud { points, candidates }
    }
}

/// Run exactly `num_points` candidate draws and keep the accepted ones.
/// Rejected candidates are not retried, so the cloud is usually much
/// smaller than the budget.
pub fn generate_points_2p_z<U: UniformSource + ?Sized>(
    params: &DensityParameters,
    num_points: usize,
    rng: &mut U,
) -> PointCloud {
    let mut points = Vec::new();

    for _ in 0..num_points {
        let sample = SphericalSample::draw(params, rng);
        // density / density_bound with the normalization cancelled
        let acceptance = params.relative_density(sample.r, sample.theta);

        if rng.next_uniform() <= acceptance {
            points.push(sample.to_cartesian());
        }
    }

    PointCloud {
        points,
        candidates: num_points,
    }
}

/// Split the candidate budget across `workers` rayon tasks. Worker `i`
/// draws from ChaCha8 stream `i` of `root_seed`; parts are joined in worker
/// order so the output depends only on (root_seed, workers).
pub fn generate_points_parallel(
    params: &DensityParameters,
    num_points: usize,
    root_seed: u64,
    workers: usize,
) -> PointCloud {
    let workers = workers.max(1);
    let base = num_points / workers;
    let extra = num_points % workers;

    let parts: Vec<PointCloud> = (0..workers)
        .into_par_iter()
        .map(|worker| {
            let budget = base + usize::from(worker < extra);
            let mut rng = ChaCha8Rng::seed_from_u64(root_seed);
            rng.set_stream(worker as u64);
            generate_points_2p_z(params, budget, &mut rng)
        })
        .collect();

    PointCloud::concat(parts)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Replays a fixed list of draws.
    struct Scripted {
        values: Vec<f32>,
        cursor: usize,
    }

    impl Scripted {
        fn new(values: &[f32]) -> Self {
            Scripted {
                values: values.to_vec(),
                cursor: 0,
            }
        }
    }

    impl UniformSource for Scripted {
        fn next_uniform(&mut self) -> f32 {
            let v = self.values[self.cursor];
            self.cursor += 1;
            v
        }
    }

    fn assert_close(a: Point3D, b: Point3D) {
        let d = ((a.x - b.x).powi(2) + (a.y - b.y).powi(2) + (a.z - b.z).powi(2)).sqrt();
        assert!(d < 1e-4, "{a:?} != {b:?}");
    }

    #[test]
    fn test_golden_scripted_draws() {
        let e2 = (-2.0_f32).exp();
        // (U1, U2, U_phi, U3) per candidate
        let mut source = Scripted::new(&[
            e2, 0.0, 0.25, 0.5, // r = 2, θ = 0: density == bound, accepted
            e2, 0.5, 0.0, 0.5, // θ = π/2: on the nodal plane, rejected
            e2, 1.0, 0.75, 0.99, // r = 2, θ = π: accepted
        ]);
        let cloud = generate_points_2p_z(&DensityParameters::default(), 3, &mut source);

        assert_eq!(source.cursor, 12);
        assert_eq!(cloud.candidates(), 3);
        assert_eq!(cloud.len(), 2);
        assert_close(cloud.points()[0], Point3D { x: 0.0, y: 0.0, z: 2.0 });
        assert_close(cloud.points()[1], Point3D { x: 0.0, y: 0.0, z: -2.0 });
    }

    #[test]
    fn test_zero_uniform_radius_is_rejected() {
        let mut source = Scripted::new(&[0.0, 0.0, 0.0, 0.0]);
        let cloud = generate_points_2p_z(&DensityParameters::default(), 1, &mut source);
        assert!(cloud.is_empty());
        assert_eq!(cloud.candidates(), 1);
    }

    #[test]
    fn test_seeded_runs_are_identical() {
        let params = DensityParameters::default();
        let mut a = ChaCha8Rng::seed_from_u64(10);
        let mut b = ChaCha8Rng::seed_from_u64(10);
        let first = generate_points_2p_z(&params, 10, &mut a);
        let second = generate_points_2p_z(&params, 10, &mut b);

        assert!(!first.is_empty());
        assert_eq!(first.as_flat().len(), first.len() * 3);
        let bits = |c: &PointCloud| c.as_flat().iter().map(|v| v.to_bits()).collect::<Vec<_>>();
        assert_eq!(bits(&first), bits(&second));
    }

    #[test]
    fn test_golden_seeded_cloud() {
        // a0 = 1, 10 candidates, ChaCha8 seed 10. Every accept/reject
        // decision clears its threshold by at least 0.002, far above libm
        // ulp differences.
        let expected = [
            Point3D { x: 0.218_052_3, y: 1.053_442_4, z: -0.129_747_66 },
            Point3D { x: 1.357_627_2, y: 1.361_195_1, z: -1.641_244_3 },
            Point3D { x: 0.997_498_3, y: -1.523_898_2, z: 2.437_186 },
            Point3D { x: 1.290_058_3, y: -0.031_640_705, z: 0.927_795_05 },
        ];
        let mut rng = ChaCha8Rng::seed_from_u64(10);
        let cloud = generate_points_2p_z(&DensityParameters::default(), 10, &mut rng);

        assert_eq!(cloud.candidates(), 10);
        assert_eq!(cloud.len(), expected.len());
        for (got, want) in cloud.points().iter().zip(expected) {
            assert_close(*got, want);
        }
    }

    #[test]
    fn test_extreme_bohr_radius_still_accepts() {
        for a0 in [1e-9, 3e7, 1e8] {
            let params = DensityParameters::new(a0);
            let mut rng = ChaCha8Rng::seed_from_u64(21);
            let cloud = generate_points_2p_z(&params, 20_000, &mut rng);
            let ratio = cloud.acceptance_ratio();
            assert!(ratio > 0.13 && ratio < 0.18, "a0 {a0}: acceptance {ratio}");
            assert!(cloud.points().iter().all(|p| p.length().is_finite()));
        }
    }

    #[test]
    fn test_size_bounded_by_budget() {
        let params = DensityParameters::default();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for budget in [0, 1, 17, 1000] {
            let cloud = generate_points_2p_z(&params, budget, &mut rng);
            assert_eq!(cloud.candidates(), budget);
            assert!(cloud.len() <= budget);
        }
    }

    #[test]
    fn test_acceptance_ratio_baseline() {
        // E[accept] = E[r² e^-r] E[cos²θ] / (4 e^-2) = (1/4)(1/3) e² / 4 = e² / 48
        let expected = (2.0_f32).exp() / 48.0;
        let params = DensityParameters::default();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let cloud = generate_points_2p_z(&params, 200_000, &mut rng);
        let ratio = cloud.acceptance_ratio();
        assert!((ratio - expected).abs() < 0.005, "acceptance {ratio}, expected ~{expected}");
    }

    #[test]
    fn test_acceptance_ratio_independent_of_a0() {
        let params = DensityParameters::new(3.0);
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let cloud = generate_points_2p_z(&params, 100_000, &mut rng);
        let ratio = cloud.acceptance_ratio();
        assert!(ratio > 0.14 && ratio < 0.17, "acceptance {ratio}");
    }

    #[test]
    fn test_points_concentrate_along_z() {
        let params = DensityParameters::default();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let cloud = generate_points_2p_z(&params, 100_000, &mut rng);
        let n = cloud.len() as f32;
        let mean_z2: f32 = cloud.points().iter().map(|p| p.z * p.z).sum::<f32>() / n;
        let mean_x2: f32 = cloud.points().iter().map(|p| p.x * p.x).sum::<f32>() / n;
        // <z²> = 18 a₀², <x²> = 6 a₀² for 2p_z
        assert!(mean_z2 > 2.0 * mean_x2, "<z²> {mean_z2}, <x²> {mean_x2}");
    }

    #[test]
    fn test_spherical_round_trip() {
        let params = DensityParameters::default();
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        for _ in 0..10_000 {
            let s = SphericalSample::draw(&params, &mut rng);
            if !s.r.is_finite() || s.r < 1e-3 {
                continue;
            }
            let p = s.to_cartesian();
            let r = p.length();
            assert!((r - s.r).abs() <= 1e-5 * s.r.max(1.0), "r {r} vs {}", s.r);
            let theta = (p.z / r).clamp(-1.0, 1.0).acos();
            assert!((theta - s.theta).abs() < 2e-3, "θ {theta} vs {}", s.theta);
        }
    }

    #[test]
    fn test_parallel_single_worker_matches_sequential() {
        let params = DensityParameters::default();
        let mut rng = ChaCha8Rng::seed_from_u64(1234);
        let sequential = generate_points_2p_z(&params, 5_000, &mut rng);
        let parallel = generate_points_parallel(&params, 5_000, 1234, 1);
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn test_parallel_is_deterministic_and_splits_budget() {
        let params = DensityParameters::default();
        let a = generate_points_parallel(&params, 10_003, 99, 4);
        let b = generate_points_parallel(&params, 10_003, 99, 4);
        assert_eq!(a, b);
        assert_eq!(a.candidates(), 10_003);
        assert!(a.len() <= 10_003);
    }
}
