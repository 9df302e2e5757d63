use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::block::Block;

/// The biome name substituted when a label has no catalog entry.
pub const FALLBACK_BIOME: &str = "plains";

/// Surface band description for one biome: how tall the palette band is
/// and which blocks it draws from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BiomeDefinition {
    pub surface_height: u32,
    pub palette: Vec<Block>,
    pub color: [u8; 3],
}

/// Read-only mapping from biome name to definition, loaded once from the
/// biome catalog document. Sub-biome entries contribute display colors
/// only.
#[derive(Clone, Debug)]
pub struct BiomeCatalog {
    definitions: BTreeMap<String, BiomeDefinition>,
    colors: BTreeMap<String, [u8; 3]>,
    fallback: BiomeDefinition,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("biome catalog not found at {path}")]
    Missing { path: PathBuf },
    #[error("failed to read biome catalog at {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse biome catalog: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("biome '{biome}' has unknown palette block '{block}'")]
    UnknownBlock { biome: String, block: String },
    #[error("biome '{biome}' has an empty palette")]
    EmptyPalette { biome: String },
    #[error("invalid color '{value}' for '{name}': expected #rrggbb")]
    Color { name: String, value: String },
    #[error("biome catalog is missing the '{FALLBACK_BIOME}' fallback entry")]
    MissingFallback,
}

#[derive(Deserialize)]
struct CatalogDoc {
    biomes: BTreeMap<String, BiomeEntry>,
}

#[derive(Deserialize)]
struct BiomeEntry {
    surface_height: u32,
    palette: Vec<String>,
    color: String,
    #[serde(default)]
    sub_biomes: BTreeMap<String, SubBiomeEntry>,
}

#[derive(Deserialize)]
struct SubBiomeEntry {
    color: String,
}

fn parse_color(name: &str, value: &str) -> Result<[u8; 3], ConfigError> {
    let invalid = || ConfigError::Color {
        name: name.to_string(),
        value: value.to_string(),
    };

    let hex = match value.strip_prefix('#') {
        Some(hex) if hex.len() == 6 => hex,
        _ => return Err(invalid()),
    };
    let mut rgb = [0u8; 3];
    for (i, channel) in rgb.iter_mut().enumerate() {
        *channel = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16).map_err(|_| invalid())?;
    }
    Ok(rgb)
}

impl BiomeCatalog {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let doc: CatalogDoc = toml::from_str(text)?;

        let mut definitions = BTreeMap::new();
        let mut colors = BTreeMap::new();
        for (name, entry) in doc.biomes {
            if entry.palette.is_empty() {
                return Err(ConfigError::EmptyPalette { biome: name });
            }
            let palette = entry
                .palette
                .iter()
                .map(|raw| {
                    raw.parse::<Block>().map_err(|_| ConfigError::UnknownBlock {
                        biome: name.clone(),
                        block: raw.clone(),
                    })
                })
                .collect::<Result<Vec<Block>, ConfigError>>()?;

            let color = parse_color(&name, &entry.color)?;
            for (sub_name, sub) in &entry.sub_biomes {
                colors.insert(sub_name.clone(), parse_color(sub_name, &sub.color)?);
            }

            colors.insert(name.clone(), color);
            definitions.insert(
                name,
                BiomeDefinition {
                    surface_height: entry.surface_height,
                    palette,
                    color,
                },
            );
        }

        let fallback = definitions
            .get(FALLBACK_BIOME)
            .cloned()
            .ok_or(ConfigError::MissingFallback)?;

        Ok(Self {
            definitions,
            colors,
            fallback,
        })
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                ConfigError::Missing {
                    path: path.to_path_buf(),
                }
            } else {
                ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;
        Self::from_toml_str(&text)
    }

    pub fn get(&self, name: &str) -> Option<&BiomeDefinition> {
        self.definitions.get(name)
    }

    /// Definition for `name`, or the plains fallback when the label is
    /// unknown. The catalog is validated to contain plains at load time.
    pub fn get_or_fallback(&self, name: &str) -> &BiomeDefinition {
        self.definitions.get(name).unwrap_or(&self.fallback)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    /// Display colors for map rendering: every biome plus its sub-biomes.
    pub fn color_table(&self) -> &BTreeMap<String, [u8; 3]> {
        &self.colors
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{BiomeCatalog, ConfigError};
    use crate::block::Block;

    const SAMPLE: &str = r##"
[biomes.plains]
surface_height = 4
color = "#74c365"
palette = ["isle:grass", "isle:dirt"]

[biomes.forest]
surface_height = 6
color = "#38761d"
palette = ["isle:grass", "isle:dirt", "isle:oak_log"]

[biomes.forest.sub_biomes.birch_forest]
color = "#9ccb75"
"##;

    #[test]
    fn parses_definitions_and_palettes() {
        let catalog = BiomeCatalog::from_toml_str(SAMPLE).expect("parse catalog");
        assert_eq!(catalog.len(), 2);

        let plains = catalog.get("plains").expect("plains entry");
        assert_eq!(plains.surface_height, 4);
        assert_eq!(plains.palette, vec![Block::Grass, Block::Dirt]);
        assert_eq!(plains.color, [0x74, 0xc3, 0x65]);
    }

    #[test]
    fn sub_biomes_contribute_colors_only() {
        let catalog = BiomeCatalog::from_toml_str(SAMPLE).expect("parse catalog");
        assert!(catalog.get("birch_forest").is_none());
        assert_eq!(
            catalog.color_table().get("birch_forest"),
            Some(&[0x9c, 0xcb, 0x75])
        );
        assert_eq!(
            catalog.color_table().get("forest"),
            Some(&[0x38, 0x76, 0x1d])
        );
    }

    #[test]
    fn unknown_label_falls_back_to_plains() {
        let catalog = BiomeCatalog::from_toml_str(SAMPLE).expect("parse catalog");
        let fallback = catalog.get_or_fallback("volcano");
        assert_eq!(fallback.surface_height, 4);
        assert_eq!(fallback.palette, vec![Block::Grass, Block::Dirt]);
    }

    #[test]
    fn missing_plains_is_rejected() {
        let doc = r##"
[biomes.forest]
surface_height = 6
color = "#38761d"
palette = ["isle:grass"]
"##;
        assert!(matches!(
            BiomeCatalog::from_toml_str(doc),
            Err(ConfigError::MissingFallback)
        ));
    }

    #[test]
    fn unknown_palette_block_is_rejected() {
        let doc = r##"
[biomes.plains]
surface_height = 4
color = "#74c365"
palette = ["isle:grass", "isle:cheese"]
"##;
        assert!(matches!(
            BiomeCatalog::from_toml_str(doc),
            Err(ConfigError::UnknownBlock { .. })
        ));
    }

    #[test]
    fn bad_colors_are_rejected() {
        for color in ["74c365", "#74c36", "#74c36g", "#74c365aa"] {
            let doc = format!(
                "[biomes.plains]\nsurface_height = 4\ncolor = \"{color}\"\npalette = [\"isle:grass\"]\n"
            );
            assert!(matches!(
                BiomeCatalog::from_toml_str(&doc),
                Err(ConfigError::Color { .. })
            ));
        }
    }

    #[test]
    fn empty_palette_is_rejected() {
        let doc = r##"
[biomes.plains]
surface_height = 4
color = "#74c365"
palette = []
"##;
        assert!(matches!(
            BiomeCatalog::from_toml_str(doc),
            Err(ConfigError::EmptyPalette { .. })
        ));
    }
}
