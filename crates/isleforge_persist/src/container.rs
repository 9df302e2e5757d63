use std::fs;
use std::path::Path;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use isleforge_shared::chunk::ChunkData;
use isleforge_shared::coords::ChunkCoord;

use crate::compression::{compress_zstd, decompress_zstd};
use crate::error::PersistError;

/// The authoritative in-memory world: every generated chunk, keyed by
/// coordinate.
pub type WorldMap = FxHashMap<ChunkCoord, ChunkData>;

pub const MAGIC: [u8; 4] = *b"ISLW";
const WIRE_VERSION_ZSTD: u8 = 1;
pub const CURRENT_WORLD_FORMAT_VERSION: u32 = 1;
const ZSTD_LEVEL: i32 = 3;

/// On-disk payload. Chunks are keyed by the `"cx,cy"` string form and
/// sorted so identical worlds encode to identical bytes.
#[derive(Serialize, Deserialize)]
struct WorldDisk {
    format_version: u32,
    chunks: Vec<(String, ChunkData)>,
}

pub fn encode_world(world: &WorldMap) -> Result<Vec<u8>, PersistError> {
    let mut coords: Vec<ChunkCoord> = world.keys().copied().collect();
    coords.sort();

    let disk = WorldDisk {
        format_version: CURRENT_WORLD_FORMAT_VERSION,
        chunks: coords
            .into_iter()
            .map(|coord| (coord.to_string(), world[&coord].clone()))
            .collect(),
    };

    let encoded =
        bincode::serialize(&disk).map_err(|err| PersistError::encode("world payload", err))?;
    let compressed = compress_zstd(&encoded, ZSTD_LEVEL)
        .map_err(|err| PersistError::encode("world payload", err))?;

    let mut bytes = Vec::with_capacity(MAGIC.len() + 1 + compressed.len());
    bytes.extend_from_slice(&MAGIC);
    bytes.push(WIRE_VERSION_ZSTD);
    bytes.extend_from_slice(&compressed);
    Ok(bytes)
}

pub fn decode_world(bytes: &[u8]) -> Result<WorldMap, PersistError> {
    if bytes.is_empty() {
        return Ok(WorldMap::default());
    }

    if bytes.len() < MAGIC.len() || bytes[..MAGIC.len()] != MAGIC[..] {
        return Err(PersistError::decode(
            "world container",
            "invalid magic; expected ISLW",
        ));
    }

    let payload = &bytes[MAGIC.len()..];
    let (wire_version, wire_payload) = payload.split_first().ok_or_else(|| {
        PersistError::decode("world container", "missing wire format version")
    })?;

    let decompressed = match *wire_version {
        WIRE_VERSION_ZSTD => decompress_zstd(wire_payload)
            .map_err(|err| PersistError::decode("world payload", err))?,
        other => {
            return Err(PersistError::decode(
                "world container",
                format!("unsupported wire format version {other}; expected 1"),
            ))
        }
    };

    let disk: WorldDisk = bincode::deserialize(&decompressed)
        .map_err(|err| PersistError::decode("world payload", err))?;

    if disk.format_version != CURRENT_WORLD_FORMAT_VERSION {
        return Err(PersistError::decode(
            "world payload",
            format!(
                "unsupported world format version {}; current version is {}",
                disk.format_version, CURRENT_WORLD_FORMAT_VERSION
            ),
        ));
    }

    let mut world = WorldMap::default();
    for (key, chunk) in disk.chunks {
        let coord: ChunkCoord = key
            .parse()
            .map_err(|err| PersistError::decode("chunk coordinate key", err))?;
        world.insert(coord, chunk);
    }
    Ok(world)
}

pub fn save_world(path: &Path, world: &WorldMap) -> Result<(), PersistError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|err| PersistError::io(parent, err))?;
    }

    let bytes = encode_world(world)?;
    fs::write(path, bytes).map_err(|err| PersistError::io(path, err))?;
    debug!("Saved {} chunks to {}", world.len(), path.display());
    Ok(())
}

/// Loads a previously saved world. Absence is `NotFound`, never an empty
/// success; corruption is `Decode`.
pub fn load_world(path: &Path) -> Result<WorldMap, PersistError> {
    let bytes = fs::read(path).map_err(|err| PersistError::from_read(path, err))?;
    let world = decode_world(&bytes)?;
    debug!("Loaded {} chunks from {}", world.len(), path.display());
    Ok(world)
}
