use glam::Vec2;

use crate::biome::{Biome, BiomeGrid, MAP_SIZE};
use crate::noise_field::NoiseField;

const TERRAIN_SCALE: f64 = 0.1;
const RIVER_SCALE: f64 = 0.05;
const TEMP_SCALE: f64 = 0.05;
const HUMIDITY_SCALE: f64 = 0.07;

const TERRAIN_OCTAVES: usize = 4;
const RIVER_OCTAVES: usize = 3;
const TEMP_OCTAVES: usize = 2;
const HUMIDITY_OCTAVES: usize = 2;

const RIVER_SEED_OFFSET: u64 = 100;
const TEMP_SEED_OFFSET: u64 = 200;
const HUMIDITY_SEED_OFFSET: u64 = 300;

/// Cells at or below this terrain value, or outside the island radius,
/// are ocean.
const LAND_THRESHOLD: f64 = -0.3;
/// Normalized radial distance past which the map falls off into ocean.
const LAND_RADIUS: f64 = 0.95;
const ICE_OCEAN_TEMP: f64 = -0.3;
const COLD_OCEAN_TEMP: f64 = 0.0;

const PLAINS_BAND_MAX: f64 = -0.2;
const FOREST_BAND_MAX: f64 = 0.2;

const SNOW_TEMP_MAX: f64 = -0.1;
const SNOW_TERRAIN_MIN: f64 = 0.1;
const DESERT_TEMP_MIN: f64 = 0.3;
const DESERT_HUMIDITY_MAX: f64 = 0.0;

const RIVER_THRESHOLD: f64 = -0.15;

/// One cell's worth of raw noise, fed to the pure labeling rules.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ClimateSample {
    pub terrain: f64,
    pub river: f64,
    pub temperature: f64,
    pub humidity: f64,
}

/// Builds the toroidal biome grid from four independently seeded noise
/// fields plus a radial island falloff. Classification is a pure
/// function of (cell mod MAP_SIZE, world seed).
pub struct BiomeClassifier {
    terrain: NoiseField,
    river: NoiseField,
    temperature: NoiseField,
    humidity: NoiseField,
    side: usize,
}

impl BiomeClassifier {
    pub fn new(seed: u64) -> Self {
        Self {
            terrain: NoiseField::new(seed as u32, TERRAIN_OCTAVES, TERRAIN_SCALE),
            river: NoiseField::new(
                seed.wrapping_add(RIVER_SEED_OFFSET) as u32,
                RIVER_OCTAVES,
                RIVER_SCALE,
            ),
            temperature: NoiseField::new(
                seed.wrapping_add(TEMP_SEED_OFFSET) as u32,
                TEMP_OCTAVES,
                TEMP_SCALE,
            ),
            humidity: NoiseField::new(
                seed.wrapping_add(HUMIDITY_SEED_OFFSET) as u32,
                HUMIDITY_OCTAVES,
                HUMIDITY_SCALE,
            ),
            side: MAP_SIZE,
        }
    }

    pub fn side(&self) -> usize {
        self.side
    }

    fn sample(&self, x: i32, y: i32) -> ClimateSample {
        let (fx, fy) = (f64::from(x), f64::from(y));
        ClimateSample {
            terrain: self.terrain.sample(fx, fy),
            river: self.river.sample(fx, fy),
            temperature: self.temperature.sample(fx, fy),
            humidity: self.humidity.sample(fx, fy),
        }
    }

    /// Euclidean distance from the grid center, normalized so 1.0 is
    /// half the side length. Keeps the landmass an island.
    fn radial_distance(&self, x: i32, y: i32) -> f64 {
        let half = self.side as f32 / 2.0;
        let center = Vec2::splat(half);
        let cell = Vec2::new(x as f32, y as f32);
        f64::from(cell.distance(center) / half)
    }

    /// The labeling rules, in strict override order: ocean/land split,
    /// elevation banding, climate overrides, river override last.
    pub fn label_from_samples(sample: ClimateSample, distance: f64) -> Biome {
        let mut biome = if sample.terrain <= LAND_THRESHOLD || distance >= LAND_RADIUS {
            if sample.temperature <= ICE_OCEAN_TEMP {
                Biome::IceOcean
            } else if sample.temperature <= COLD_OCEAN_TEMP {
                Biome::ColdOcean
            } else {
                Biome::Ocean
            }
        } else if sample.terrain < PLAINS_BAND_MAX {
            Biome::Plains
        } else if sample.terrain < FOREST_BAND_MAX {
            Biome::Forest
        } else {
            Biome::Mountains
        };

        if !matches!(biome, Biome::Ocean | Biome::ColdOcean | Biome::IceOcean) {
            if sample.temperature < SNOW_TEMP_MAX && sample.terrain > SNOW_TERRAIN_MIN {
                biome = Biome::Snow;
            } else if sample.temperature > DESERT_TEMP_MIN
                && sample.humidity < DESERT_HUMIDITY_MAX
            {
                biome = Biome::Desert;
            }
        }

        if sample.river < RIVER_THRESHOLD {
            biome = Biome::Water;
        }

        biome
    }

    /// Label for one cell; indices wrap modulo the grid side.
    pub fn classify(&self, x: i32, y: i32) -> Biome {
        let side = self.side as i32;
        let x = x.rem_euclid(side);
        let y = y.rem_euclid(side);
        Self::label_from_samples(self.sample(x, y), self.radial_distance(x, y))
    }

    /// The only full-grid allocation: every cell in [0, side)^2.
    pub fn build_grid(&self) -> BiomeGrid {
        let mut cells = Vec::with_capacity(self.side * self.side);
        for x in 0..self.side as i32 {
            for y in 0..self.side as i32 {
                cells.push(Self::label_from_samples(
                    self.sample(x, y),
                    self.radial_distance(x, y),
                ));
            }
        }
        BiomeGrid::from_cells(self.side, cells).expect("grid construction covers every cell")
    }
}
