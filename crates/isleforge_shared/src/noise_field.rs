use noise::{Fbm, MultiFractal, NoiseFn, Perlin};

/// Deterministic 2-D scalar noise: fractal Brownian motion over Perlin,
/// with a fixed octave count and input scale. Two fields built from the
/// same parameters produce identical samples.
pub struct NoiseField {
    fbm: Fbm<Perlin>,
    scale: f64,
}

impl NoiseField {
    pub fn new(seed: u32, octaves: usize, scale: f64) -> Self {
        Self {
            fbm: Fbm::<Perlin>::new(seed).set_octaves(octaves),
            scale,
        }
    }

    /// Sample at grid coordinates; the configured scale is applied here,
    /// so callers pass raw cell indices.
    pub fn sample(&self, x: f64, y: f64) -> f64 {
        self.fbm.get([x * self.scale, y * self.scale])
    }
}

#[cfg(test)]
mod tests {
    use super::NoiseField;

    #[test]
    fn same_seed_produces_identical_samples() {
        let a = NoiseField::new(42, 4, 0.1);
        let b = NoiseField::new(42, 4, 0.1);
        for x in 0..16 {
            for y in 0..16 {
                assert_eq!(a.sample(x as f64, y as f64), b.sample(x as f64, y as f64));
            }
        }
    }

    #[test]
    fn different_seeds_diverge_somewhere() {
        let a = NoiseField::new(42, 4, 0.1);
        let b = NoiseField::new(43, 4, 0.1);
        let diverged = (0..64).any(|i| {
            let x = f64::from(i % 8);
            let y = f64::from(i / 8);
            a.sample(x, y) != b.sample(x, y)
        });
        assert!(diverged);
    }

    #[test]
    fn samples_stay_in_expected_range() {
        let field = NoiseField::new(7, 3, 0.05);
        for x in 0..32 {
            for y in 0..32 {
                let value = field.sample(x as f64, y as f64);
                assert!((-1.5..=1.5).contains(&value), "sample out of range: {value}");
            }
        }
    }
}
