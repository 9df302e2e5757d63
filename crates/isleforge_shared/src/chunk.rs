use serde::de;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::block::Block;
use crate::coords::{cell_to_index, CHUNK_AREA};

/// One chunk's block column grid: CHUNK_HEIGHT rows of CHUNK_SIZE
/// columns, row 0 at the bottom. The shape is fixed; deserialization
/// rejects anything else.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChunkData {
    pub blocks: Box<[Block; CHUNK_AREA]>,
}

impl ChunkData {
    pub fn new_empty() -> Self {
        Self {
            blocks: Box::new([Block::Air; CHUNK_AREA]),
        }
    }

    pub fn new_filled(block: Block) -> Self {
        Self {
            blocks: Box::new([block; CHUNK_AREA]),
        }
    }

    pub fn get(&self, row: usize, col: usize) -> Block {
        self.blocks[cell_to_index(row, col)]
    }

    pub fn set(&mut self, row: usize, col: usize, block: Block) {
        let index = cell_to_index(row, col);
        self.blocks[index] = block;
    }

    pub fn get_index(&self, index: usize) -> Block {
        self.blocks[index]
    }

    pub fn set_index(&mut self, index: usize, block: Block) {
        self.blocks[index] = block;
    }
}

impl Default for ChunkData {
    fn default() -> Self {
        Self::new_empty()
    }
}

impl Serialize for ChunkData {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.blocks.as_slice().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ChunkData {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let blocks = Vec::<Block>::deserialize(deserializer)?;
        if blocks.len() != CHUNK_AREA {
            return Err(de::Error::custom(format!(
                "expected {CHUNK_AREA} blocks, got {}",
                blocks.len()
            )));
        }

        let blocks: Box<[Block; CHUNK_AREA]> = blocks
            .into_boxed_slice()
            .try_into()
            .map_err(|_| de::Error::custom("failed to deserialize chunk block array"))?;

        Ok(Self { blocks })
    }
}
