use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use image::{Rgb, RgbImage};
use serde::Deserialize;
use tracing::debug;

use isleforge_shared::biome::{Biome, BiomeGrid};

use crate::error::PersistError;

/// Color used for grid labels the catalog gives no color for.
pub const FALLBACK_COLOR: [u8; 3] = [90, 90, 90];

/// Cell representation in the biome map file: lowercase names or the
/// stable integer codes. The loader accepts both.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum BiomeMapFormat {
    #[default]
    Names,
    Codes,
}

impl FromStr for BiomeMapFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "names" => Ok(Self::Names),
            "codes" => Ok(Self::Codes),
            other => Err(format!("unknown biome map format '{other}'; expected 'names' or 'codes'")),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BiomeCell {
    Code(u8),
    Name(String),
}

pub fn encode_biome_map(grid: &BiomeGrid, format: BiomeMapFormat) -> Result<String, PersistError> {
    let text = match format {
        BiomeMapFormat::Names => {
            let rows: Vec<Vec<&str>> = grid
                .rows()
                .map(|row| row.iter().map(|biome| biome.name()).collect())
                .collect();
            serde_json::to_string(&rows)
        }
        BiomeMapFormat::Codes => {
            let rows: Vec<Vec<u8>> = grid
                .rows()
                .map(|row| row.iter().map(|biome| biome.code()).collect())
                .collect();
            serde_json::to_string(&rows)
        }
    };
    text.map_err(|err| PersistError::encode("biome map", err))
}

pub fn decode_biome_map(text: &str) -> Result<BiomeGrid, PersistError> {
    let rows: Vec<Vec<BiomeCell>> =
        serde_json::from_str(text).map_err(|err| PersistError::decode("biome map", err))?;

    let side = rows.len();
    let mut cells = Vec::with_capacity(side * side);
    for (index, row) in rows.iter().enumerate() {
        if row.len() != side {
            return Err(PersistError::decode(
                "biome map",
                format!("row {index} has {} cells; expected {side}", row.len()),
            ));
        }
        for cell in row {
            let biome = match cell {
                BiomeCell::Code(code) => Biome::from_code(*code).ok_or_else(|| {
                    PersistError::decode("biome map", format!("unknown biome code {code}"))
                })?,
                BiomeCell::Name(name) => Biome::from_name(name).ok_or_else(|| {
                    PersistError::decode("biome map", format!("unknown biome name '{name}'"))
                })?,
            };
            cells.push(biome);
        }
    }

    BiomeGrid::from_cells(side, cells).map_err(|err| PersistError::decode("biome map", err))
}

pub fn save_biome_map(
    path: &Path,
    grid: &BiomeGrid,
    format: BiomeMapFormat,
) -> Result<(), PersistError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|err| PersistError::io(parent, err))?;
    }
    let text = encode_biome_map(grid, format)?;
    fs::write(path, text).map_err(|err| PersistError::io(path, err))?;
    debug!("Saved {0}x{0} biome map to {1}", grid.side(), path.display());
    Ok(())
}

/// Loads a persisted biome map. Absence is `NotFound` so callers can
/// fall back to regeneration; corruption is `Decode`.
pub fn load_biome_map(path: &Path) -> Result<BiomeGrid, PersistError> {
    let text = fs::read_to_string(path).map_err(|err| PersistError::from_read(path, err))?;
    decode_biome_map(&text)
}

/// One pixel per grid cell; labels without a catalog color render as the
/// fallback gray. Rendering only, never read back.
pub fn render_biome_map(grid: &BiomeGrid, colors: &BTreeMap<String, [u8; 3]>) -> RgbImage {
    let side = grid.side() as u32;
    let mut img = RgbImage::new(side, side);
    for (row_index, row) in grid.rows().enumerate() {
        for (col_index, biome) in row.iter().enumerate() {
            let rgb = colors.get(biome.name()).copied().unwrap_or(FALLBACK_COLOR);
            img.put_pixel(col_index as u32, row_index as u32, Rgb(rgb));
        }
    }
    img
}

pub fn save_biome_map_png(
    path: &Path,
    grid: &BiomeGrid,
    colors: &BTreeMap<String, [u8; 3]>,
) -> Result<(), PersistError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|err| PersistError::io(parent, err))?;
    }
    let img = render_biome_map(grid, colors);
    img.save(path).map_err(|source| PersistError::Image {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Rendered biome map to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{
        decode_biome_map, encode_biome_map, load_biome_map, render_biome_map, BiomeMapFormat,
        FALLBACK_COLOR,
    };
    use crate::error::PersistError;
    use isleforge_shared::biome::{Biome, BiomeGrid};
    use std::collections::BTreeMap;
    use std::path::Path;

    fn sample_grid() -> BiomeGrid {
        let side = 4;
        let cells = (0..side * side)
            .map(|i| Biome::from_code((i % 9) as u8).unwrap())
            .collect();
        BiomeGrid::from_cells(side, cells).unwrap()
    }

    #[test]
    fn biome_map_round_trips_in_both_formats() {
        let grid = sample_grid();
        for format in [BiomeMapFormat::Names, BiomeMapFormat::Codes] {
            let text = encode_biome_map(&grid, format).expect("encode grid");
            let restored = decode_biome_map(&text).expect("decode grid");
            assert_eq!(restored, grid, "format {format:?}");
        }
    }

    #[test]
    fn names_format_is_human_readable() {
        let grid = sample_grid();
        let text = encode_biome_map(&grid, BiomeMapFormat::Names).expect("encode grid");
        assert!(text.contains("\"plains\""));
        assert!(text.contains("\"ice_ocean\""));
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let text = r#"[["plains", "forest"], ["plains"]]"#;
        assert!(matches!(
            decode_biome_map(text),
            Err(PersistError::Decode { .. })
        ));
    }

    #[test]
    fn unknown_labels_and_codes_are_rejected() {
        assert!(decode_biome_map(r#"[["volcano"]]"#).is_err());
        assert!(decode_biome_map(r#"[[42]]"#).is_err());
        assert!(decode_biome_map("not json").is_err());
    }

    #[test]
    fn absent_biome_map_is_not_found() {
        match load_biome_map(Path::new("nope/biome_map.json")) {
            Err(err) => assert!(err.is_not_found()),
            Ok(_) => panic!("expected NotFound for an absent biome map"),
        }
    }

    #[test]
    fn render_uses_catalog_colors_with_gray_fallback() {
        let grid = BiomeGrid::from_cells(
            2,
            vec![Biome::Plains, Biome::Plains, Biome::Water, Biome::Ocean],
        )
        .unwrap();
        let mut colors = BTreeMap::new();
        colors.insert("plains".to_string(), [10u8, 200, 30]);
        colors.insert("water".to_string(), [0u8, 0, 250]);

        let img = render_biome_map(&grid, &colors);
        assert_eq!(img.dimensions(), (2, 2));
        assert_eq!(img.get_pixel(0, 0).0, [10, 200, 30]);
        assert_eq!(img.get_pixel(0, 1).0, [0, 0, 250]);
        // Ocean has no color entry, so it falls back.
        assert_eq!(img.get_pixel(1, 1).0, FALLBACK_COLOR);
    }

    #[test]
    fn mixed_name_and_code_cells_decode() {
        let text = r#"[["plains", 1], [4, "desert"]]"#;
        let grid = decode_biome_map(text).expect("decode mixed grid");
        assert_eq!(grid.get(0, 0), Biome::Plains);
        assert_eq!(grid.get(0, 1), Biome::Forest);
        assert_eq!(grid.get(1, 0), Biome::Water);
        assert_eq!(grid.get(1, 1), Biome::Desert);
    }
}
