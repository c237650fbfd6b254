//! Deterministic height sampling for terrain generation.

use ::noise::{NoiseFn, Perlin};

/// Seeded, deterministic height field.
pub trait NoiseProvider {
    /// Height at world column `(x, z)` in `[0.0, 1.0]`.
    ///
    /// `grid_size` is the horizontal feature scale in blocks. The result
    /// depends only on the arguments.
    fn sample_height(&self, seed: u64, x: f64, z: f64, grid_size: f64) -> f32;
}

/// Configuration for multi-octave noise generation.
#[derive(Debug, Clone)]
pub struct NoiseConfig {
    /// Number of octaves (layers of detail)
    pub octaves: u32,
    /// Frequency multiplier between octaves
    pub lacunarity: f64,
    /// Amplitude multiplier between octaves (persistence)
    pub persistence: f64,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            octaves: 4,
            lacunarity: 2.0,
            persistence: 0.5,
        }
    }
}

/// Multi-octave Perlin height field.
///
/// Keeps a prepared permutation table for one seed; other seeds are built
/// on demand.
#[derive(Debug, Clone)]
pub struct PerlinHeight {
    perlin: Perlin,
    seed: u32,
    config: NoiseConfig,
}

impl PerlinHeight {
    /// Height field prepared for `world_seed`.
    pub fn new(world_seed: u64, config: NoiseConfig) -> Self {
        let seed = fold_seed(world_seed);
        Self {
            perlin: Perlin::new(seed),
            seed,
            config,
        }
    }

    fn octaves(&self, perlin: &Perlin, x: f64, z: f64) -> f64 {
        let mut value = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = 1.0;
        let mut max_value = 0.0;

        for _ in 0..self.config.octaves {
            value += perlin.get([x * frequency, z * frequency]) * amplitude;
            max_value += amplitude;

            amplitude *= self.config.persistence;
            frequency *= self.config.lacunarity;
        }

        if max_value == 0.0 {
            0.0
        } else {
            value / max_value
        }
    }
}

impl NoiseProvider for PerlinHeight {
    fn sample_height(&self, seed: u64, x: f64, z: f64, grid_size: f64) -> f32 {
        let seed = fold_seed(seed);
        let other;
        let perlin = if seed == self.seed {
            &self.perlin
        } else {
            other = Perlin::new(seed);
            &other
        };

        let scale = grid_size.max(1.0);
        let value = self.octaves(perlin, x / scale, z / scale);
        (((value + 1.0) * 0.5) as f32).clamp(0.0, 1.0)
    }
}

/// Constant height everywhere. Useful for synthetic worlds.
#[derive(Debug, Clone, Copy)]
pub struct FlatNoise(pub f32);

impl NoiseProvider for FlatNoise {
    fn sample_height(&self, _seed: u64, _x: f64, _z: f64, _grid_size: f64) -> f32 {
        self.0.clamp(0.0, 1.0)
    }
}

fn fold_seed(seed: u64) -> u32 {
    (seed ^ (seed >> 32)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn samples_are_deterministic_and_normalized() {
        let noise = PerlinHeight::new(42, NoiseConfig::default());
        for i in 0..64 {
            let x = i as f64 * 3.7;
            let z = i as f64 * -1.3;
            let a = noise.sample_height(42, x, z, 64.0);
            let b = noise.sample_height(42, x, z, 64.0);
            assert_eq!(a, b);
            assert!((0.0..=1.0).contains(&a));
        }
    }

    #[test]
    fn foreign_seed_matches_dedicated_provider() {
        let prepared = PerlinHeight::new(7, NoiseConfig::default());
        let other = PerlinHeight::new(99, NoiseConfig::default());
        for i in 0..16 {
            let x = i as f64 * 5.5;
            assert_eq!(
                prepared.sample_height(7, x, 3.0, 48.0),
                other.sample_height(7, x, 3.0, 48.0)
            );
        }
    }

    #[test]
    fn different_seeds_diverge() {
        let noise = PerlinHeight::new(1, NoiseConfig::default());
        let differs = (0..32).any(|i| {
            let x = i as f64 * 7.3 + 0.5;
            noise.sample_height(1, x, x, 32.0) != noise.sample_height(2, x, x, 32.0)
        });
        assert!(differs);
    }
}
