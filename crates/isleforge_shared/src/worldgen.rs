use tracing::warn;

use crate::biome::BiomeGrid;
use crate::block::Block;
use crate::catalog::BiomeCatalog;
use crate::chunk::ChunkData;
use crate::coords::{ChunkCoord, CHUNK_HEIGHT, CHUNK_SIZE};

/// Rows 0..=2 are always bedrock.
const BEDROCK_TOP: usize = 2;
/// Top of the dense-stone band.
const SEA_BAND: usize = 60;
/// Air below this row becomes water after band fill.
const SEA_LEVEL: usize = 62;
const P_STONE: f64 = 0.8;
const P_DEEP: f64 = 0.02;

const SURFACE_SALT: u64 = 10_001;
const FILL_SALT: u64 = 10_002;

/// Materializes chunks from the biome grid and catalog. Pure: the same
/// (seed, grid, catalog, coordinate) always produces the same chunk, so
/// whole-world regeneration is bit-reproducible.
pub struct ChunkGenerator {
    seed: u64,
    grid: BiomeGrid,
    catalog: BiomeCatalog,
}

impl ChunkGenerator {
    pub fn new(seed: u64, grid: BiomeGrid, catalog: BiomeCatalog) -> Self {
        Self {
            seed,
            grid,
            catalog,
        }
    }

    pub fn grid(&self) -> &BiomeGrid {
        &self.grid
    }

    pub fn catalog(&self) -> &BiomeCatalog {
        &self.catalog
    }

    fn cell_hash(&self, coord: ChunkCoord, row: usize, col: usize, salt: u64) -> u64 {
        let mut hash = self
            .seed
            .wrapping_add(salt)
            .wrapping_mul(6364136223846793005)
            .wrapping_add((coord.cx as i64 as u64).wrapping_mul(1442695040888963407))
            .wrapping_add((coord.cy as i64 as u64).wrapping_mul(2654435761))
            .wrapping_add((row as u64).wrapping_mul(22695477))
            .wrapping_add((col as u64).wrapping_mul(1103515245));
        hash ^= hash >> 33;
        hash = hash.wrapping_mul(0xff51afd7ed558ccd);
        hash ^ (hash >> 33)
    }

    fn cell_roll(&self, coord: ChunkCoord, row: usize, col: usize, salt: u64) -> f64 {
        ((self.cell_hash(coord, row, col, salt) >> 11) & 0xffff) as f64 / 65535.0
    }

    pub fn generate(&self, coord: ChunkCoord) -> ChunkData {
        let label = self.grid.get(coord.cx, coord.cy);
        if !self.catalog.contains(label.name()) {
            warn!(
                "biome '{}' missing from catalog, using plains for chunk {}",
                label, coord
            );
        }
        let definition = self.catalog.get_or_fallback(label.name());
        let surface_top = definition.surface_height as usize;

        let mut chunk = ChunkData::new_empty();
        for col in 0..CHUNK_SIZE {
            for row in 0..CHUNK_HEIGHT {
                let mut block = if row <= BEDROCK_TOP {
                    Block::Bedrock
                } else if row < surface_top {
                    let hash = self.cell_hash(coord, row, col, SURFACE_SALT);
                    definition.palette[(hash >> 8) as usize % definition.palette.len()]
                } else if row < SEA_BAND {
                    if self.cell_roll(coord, row, col, FILL_SALT) < P_STONE {
                        Block::Stone
                    } else {
                        Block::Air
                    }
                } else if self.cell_roll(coord, row, col, FILL_SALT) < P_DEEP {
                    Block::Stone
                } else {
                    Block::Air
                };

                // Sea-level fill, applied unconditionally after band logic.
                if block == Block::Air && row < SEA_LEVEL {
                    block = Block::Water;
                }

                chunk.set(row, col, block);
            }
        }

        chunk
    }
}

#[cfg(test)]
mod tests {
    use super::{ChunkGenerator, SEA_BAND, SEA_LEVEL};
    use crate::biome::{Biome, BiomeGrid};
    use crate::block::Block;
    use crate::catalog::BiomeCatalog;
    use crate::coords::{ChunkCoord, CHUNK_HEIGHT, CHUNK_SIZE};

    const CATALOG: &str = r##"
[biomes.plains]
surface_height = 4
color = "#74c365"
palette = ["isle:grass", "isle:dirt"]

[biomes.mountains]
surface_height = 10
color = "#7f8386"
palette = ["isle:stone", "isle:dirt"]
"##;

    fn catalog() -> BiomeCatalog {
        BiomeCatalog::from_toml_str(CATALOG).expect("parse test catalog")
    }

    fn uniform_grid(biome: Biome) -> BiomeGrid {
        BiomeGrid::from_cells(4, vec![biome; 16]).expect("build test grid")
    }

    fn generator(biome: Biome) -> ChunkGenerator {
        ChunkGenerator::new(42, uniform_grid(biome), catalog())
    }

    #[test]
    fn bottom_three_rows_are_always_bedrock() {
        for biome in [Biome::Plains, Biome::Mountains, Biome::Ocean] {
            let chunk = generator(biome).generate(ChunkCoord::new(1, -3));
            for row in 0..=2 {
                for col in 0..CHUNK_SIZE {
                    assert_eq!(chunk.get(row, col), Block::Bedrock);
                }
            }
        }
    }

    #[test]
    fn plains_surface_band_draws_from_the_palette() {
        let chunk = generator(Biome::Plains).generate(ChunkCoord::new(5, 5));
        for col in 0..CHUNK_SIZE {
            let block = chunk.get(3, col);
            assert!(
                block == Block::Grass || block == Block::Dirt,
                "row 3 col {col} holds {block}"
            );
        }
    }

    #[test]
    fn stone_band_is_stone_or_flooded_air() {
        let chunk = generator(Biome::Plains).generate(ChunkCoord::new(0, 0));
        for col in 0..CHUNK_SIZE {
            for row in 4..SEA_BAND {
                let block = chunk.get(row, col);
                assert!(
                    block == Block::Stone || block == Block::Water,
                    "row {row} col {col} holds {block}"
                );
            }
        }
    }

    #[test]
    fn stone_density_is_near_eighty_percent() {
        let mut stone = 0usize;
        let mut total = 0usize;
        for cx in 0..4 {
            let chunk = generator(Biome::Plains).generate(ChunkCoord::new(cx, 0));
            for col in 0..CHUNK_SIZE {
                for row in 4..SEA_BAND {
                    total += 1;
                    if chunk.get(row, col) == Block::Stone {
                        stone += 1;
                    }
                }
            }
        }
        let density = stone as f64 / total as f64;
        assert!(
            (0.74..=0.86).contains(&density),
            "stone density {density} outside tolerance"
        );
    }

    #[test]
    fn air_below_sea_level_becomes_water() {
        let chunk = generator(Biome::Plains).generate(ChunkCoord::new(2, 7));
        for col in 0..CHUNK_SIZE {
            for row in 0..SEA_LEVEL {
                assert_ne!(chunk.get(row, col), Block::Air, "air at row {row} col {col}");
            }
            for row in SEA_LEVEL..CHUNK_HEIGHT {
                assert_ne!(
                    chunk.get(row, col),
                    Block::Water,
                    "water above sea level at row {row} col {col}"
                );
            }
        }
    }

    #[test]
    fn upper_rows_are_sparse_stone_in_air() {
        let chunk = generator(Biome::Plains).generate(ChunkCoord::new(0, 0));
        let mut stone = 0usize;
        let mut total = 0usize;
        for col in 0..CHUNK_SIZE {
            for row in SEA_LEVEL..CHUNK_HEIGHT {
                let block = chunk.get(row, col);
                assert!(
                    block == Block::Stone || block == Block::Air,
                    "row {row} col {col} holds {block}"
                );
                total += 1;
                if block == Block::Stone {
                    stone += 1;
                }
            }
        }
        let density = stone as f64 / total as f64;
        assert!(density < 0.06, "deep stone density {density} too high");
    }

    #[test]
    fn generation_is_reproducible_for_a_fixed_seed() {
        let coord = ChunkCoord::new(-8, 17);
        let first = generator(Biome::Mountains).generate(coord);
        let second = generator(Biome::Mountains).generate(coord);
        assert_eq!(first, second);

        let other_seed = ChunkGenerator::new(43, uniform_grid(Biome::Mountains), catalog());
        assert_ne!(first, other_seed.generate(coord));
    }

    #[test]
    fn unknown_biome_label_falls_back_to_plains() {
        // Ocean has no catalog entry here, so its chunks use the plains
        // definition.
        let from_ocean = generator(Biome::Ocean).generate(ChunkCoord::new(3, 3));
        let from_plains = generator(Biome::Plains).generate(ChunkCoord::new(3, 3));
        assert_eq!(from_ocean, from_plains);
    }

    #[test]
    fn biome_lookup_wraps_toroidally() {
        let gen = generator(Biome::Plains);
        let side = gen.grid().side() as i32;
        for (cx, cy) in [(0, 0), (3, 1), (-2, 9)] {
            assert_eq!(gen.grid().get(cx, cy), gen.grid().get(cx + side, cy));
            assert_eq!(gen.grid().get(cx, cy), gen.grid().get(cx, cy - side));
        }
    }
}
