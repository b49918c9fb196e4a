use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use hetero_primitives::{try_host_vec, ComputeError};

/// Deterministic input generator; one per benchmark, seeded from the CLI.
pub struct DataGenerator {
    rng: StdRng,
}

impl DataGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// `count` integers drawn uniformly from `[0, bound)`.
    pub fn uniform_i32(&mut self, count: usize, bound: i32) -> Result<Vec<i32>, ComputeError> {
        let mut v = try_host_vec(count, 0i32)?;
        for x in v.iter_mut() {
            *x = self.rng.gen_range(0..bound);
        }
        Ok(v)
    }

    /// Matrix entries in tenths: `(r % 100) / 10`, i.e. 0.0 ..= 9.9.
    #[cfg_attr(not(feature = "opencl"), allow(dead_code))]
    pub fn matrix_f32(&mut self, count: usize) -> Result<Vec<f32>, ComputeError> {
        let mut v = try_host_vec(count, 0.0f32)?;
        for x in v.iter_mut() {
            *x = self.rng.gen_range(0u32..100) as f32 / 10.0;
        }
        Ok(v)
    }
}

/// `a[i] = i * scale` as f32.
#[cfg_attr(not(feature = "opencl"), allow(dead_code))]
pub fn ramp_f32(count: usize, scale: f32) -> Result<Vec<f32>, ComputeError> {
    let mut v = try_host_vec(count, 0.0f32)?;
    for (i, x) in v.iter_mut().enumerate() {
        *x = i as f32 * scale;
    }
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic() {
        let a = DataGenerator::new(42).uniform_i32(100, 100_000).unwrap();
        let b = DataGenerator::new(42).uniform_i32(100, 100_000).unwrap();
        assert_eq!(a, b);
        let c = DataGenerator::new(7).uniform_i32(100, 100_000).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn test_uniform_i32_bounds() {
        let v = DataGenerator::new(1).uniform_i32(10_000, 10).unwrap();
        assert!(v.iter().all(|&x| (0..10).contains(&x)));
    }

    #[test]
    fn test_matrix_values_are_tenths() {
        let v = DataGenerator::new(42).matrix_f32(1000).unwrap();
        for &x in &v {
            assert!((0.0..=9.9).contains(&x));
            let tenths = (x * 10.0).round();
            assert!((x * 10.0 - tenths).abs() < 1e-4);
        }
    }

    #[test]
    fn test_ramp() {
        assert_eq!(ramp_f32(4, 2.0).unwrap(), vec![0.0, 2.0, 4.0, 6.0]);
    }
}
