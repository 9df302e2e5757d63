use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// On-disk layout of one world: `saves/<name>/{chunks,nbts,biome_map}`.
/// The `nbts` directory is reserved for entity storage and stays empty
/// here.
#[derive(Clone, Debug)]
pub struct WorldLayout {
    world_dir: PathBuf,
}

impl WorldLayout {
    pub fn create(saves_root: &Path, world_name: &str) -> io::Result<Self> {
        let layout = Self {
            world_dir: saves_root.join(world_name),
        };
        fs::create_dir_all(layout.chunks_dir())?;
        fs::create_dir_all(layout.nbts_dir())?;
        fs::create_dir_all(layout.biome_map_dir())?;
        Ok(layout)
    }

    pub fn world_dir(&self) -> &Path {
        &self.world_dir
    }

    pub fn chunks_dir(&self) -> PathBuf {
        self.world_dir.join("chunks")
    }

    pub fn nbts_dir(&self) -> PathBuf {
        self.world_dir.join("nbts")
    }

    pub fn biome_map_dir(&self) -> PathBuf {
        self.world_dir.join("biome_map")
    }

    pub fn container_path(&self) -> PathBuf {
        self.chunks_dir().join("chunk_data.islw")
    }

    pub fn biome_map_path(&self) -> PathBuf {
        self.biome_map_dir().join("biome_map.json")
    }

    pub fn biome_map_png_path(&self) -> PathBuf {
        self.biome_map_dir().join("biome_map.png")
    }
}
