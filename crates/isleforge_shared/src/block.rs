use std::fmt;
use std::str::FromStr;

use serde::de;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// The closed set of block identifiers the generator can emit. The wire
/// form everywhere (catalog config, world container) is the namespaced
/// string `isle:<name>`; strings outside the set are a decode error.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Block {
    #[default]
    Air,
    Stone,
    Grass,
    Dirt,
    OakLog,
    Leaves,
    Bedrock,
    Water,
    Sand,
    Gravel,
    Snow,
    Ice,
}

impl Block {
    pub const ALL: [Block; 12] = [
        Block::Air,
        Block::Stone,
        Block::Grass,
        Block::Dirt,
        Block::OakLog,
        Block::Leaves,
        Block::Bedrock,
        Block::Water,
        Block::Sand,
        Block::Gravel,
        Block::Snow,
        Block::Ice,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Block::Air => "isle:air",
            Block::Stone => "isle:stone",
            Block::Grass => "isle:grass",
            Block::Dirt => "isle:dirt",
            Block::OakLog => "isle:oak_log",
            Block::Leaves => "isle:leaves",
            Block::Bedrock => "isle:bedrock",
            Block::Water => "isle:water",
            Block::Sand => "isle:sand",
            Block::Gravel => "isle:gravel",
            Block::Snow => "isle:snow",
            Block::Ice => "isle:ice",
        }
    }

    pub fn is_solid(self) -> bool {
        !matches!(self, Block::Air | Block::Water)
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownBlock(pub String);

impl fmt::Display for UnknownBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown block id '{}'", self.0)
    }
}

impl std::error::Error for UnknownBlock {}

impl FromStr for Block {
    type Err = UnknownBlock;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Block::ALL
            .into_iter()
            .find(|block| block.as_str() == s)
            .ok_or_else(|| UnknownBlock(s.to_string()))
    }
}

impl Serialize for Block {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Block {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::Block;

    #[test]
    fn block_strings_round_trip() {
        for block in Block::ALL {
            let text = block.as_str();
            assert!(text.starts_with("isle:"));
            assert_eq!(text.parse::<Block>().unwrap(), block);
        }
    }

    #[test]
    fn unknown_block_strings_are_rejected() {
        assert!("isle:mystery".parse::<Block>().is_err());
        assert!("stone".parse::<Block>().is_err());
        assert!("".parse::<Block>().is_err());
    }

    #[test]
    fn serde_uses_the_namespaced_string_form() {
        let encoded = bincode::serialize(&Block::Bedrock).expect("serialize block");
        let decoded: Block = bincode::deserialize(&encoded).expect("deserialize block");
        assert_eq!(decoded, Block::Bedrock);

        let bad = bincode::serialize(&"isle:nonsense".to_string()).expect("serialize string");
        assert!(bincode::deserialize::<Block>(&bad).is_err());
    }

    #[test]
    fn solidity_covers_fluids_and_air() {
        assert!(!Block::Air.is_solid());
        assert!(!Block::Water.is_solid());
        assert!(Block::Stone.is_solid());
        assert!(Block::Bedrock.is_solid());
    }
}
