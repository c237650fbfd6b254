//! Block kinds.
//!
//! The set of kinds is closed and known at compile time. Each kind carries a
//! stable one-byte id used by the edit log on disk, so ids must never be
//! reordered.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when a byte does not name a known block kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unknown block id {0}")]
pub struct BlockIdError(pub u8);

/// Sort bucket for see-through geometry.
///
/// Declaration order is the order in which categories are batched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransparencyCategory {
    /// Animated liquid surfaces.
    Water,
    /// Full cubes with alpha (glass, leaves).
    TransparentSolid,
    /// Alpha-tested decorations (flowers).
    TransparentSprite,
}

/// Kind of a single voxel.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum BlockKind {
    /// Empty space; never rendered.
    #[default]
    Air = 0,
    /// Deep terrain fill.
    Stone = 1,
    /// Sub-surface layer.
    Dirt = 2,
    /// Surface block above the water line.
    Grass = 3,
    /// Tree trunk.
    Log = 4,
    /// Surface block at or below the water line.
    Sand = 5,
    /// Liquid.
    Water = 6,
    /// Player-placed transparent cube.
    Glass = 7,
    /// Tree canopy.
    Leaves = 8,
    /// Red flower.
    Rose = 9,
    /// Yellow flower.
    Dandelion = 10,
}

impl BlockKind {
    /// Every kind, in id order.
    pub const ALL: [BlockKind; 11] = [
        BlockKind::Air,
        BlockKind::Stone,
        BlockKind::Dirt,
        BlockKind::Grass,
        BlockKind::Log,
        BlockKind::Sand,
        BlockKind::Water,
        BlockKind::Glass,
        BlockKind::Leaves,
        BlockKind::Rose,
        BlockKind::Dandelion,
    ];

    /// Number of kinds.
    pub const COUNT: usize = Self::ALL.len();

    /// Convert to the stable numeric representation.
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Try to convert from the stable numeric representation.
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Air),
            1 => Some(Self::Stone),
            2 => Some(Self::Dirt),
            3 => Some(Self::Grass),
            4 => Some(Self::Log),
            5 => Some(Self::Sand),
            6 => Some(Self::Water),
            7 => Some(Self::Glass),
            8 => Some(Self::Leaves),
            9 => Some(Self::Rose),
            10 => Some(Self::Dandelion),
            _ => None,
        }
    }

    /// Lowercase name, matching the serde representation.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Air => "air",
            Self::Stone => "stone",
            Self::Dirt => "dirt",
            Self::Grass => "grass",
            Self::Log => "log",
            Self::Sand => "sand",
            Self::Water => "water",
            Self::Glass => "glass",
            Self::Leaves => "leaves",
            Self::Rose => "rose",
            Self::Dandelion => "dandelion",
        }
    }

    /// Resolve a kind from its lowercase name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// True for empty space.
    #[inline]
    pub const fn is_air(self) -> bool {
        matches!(self, Self::Air)
    }

    /// Transparency bucket, or `None` for air and opaque kinds.
    #[inline]
    pub const fn transparency(self) -> Option<TransparencyCategory> {
        match self {
            Self::Water => Some(TransparencyCategory::Water),
            Self::Glass | Self::Leaves => Some(TransparencyCategory::TransparentSolid),
            Self::Rose | Self::Dandelion => Some(TransparencyCategory::TransparentSprite),
            _ => None,
        }
    }

    /// True for kinds drawn in the blended pass.
    #[inline]
    pub const fn is_transparent(self) -> bool {
        self.transparency().is_some()
    }

    /// Non-air and not transparent.
    #[inline]
    pub const fn is_opaque(self) -> bool {
        !self.is_air() && !self.is_transparent()
    }
}

impl TryFrom<u8> for BlockKind {
    type Error = BlockIdError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_u8(value).ok_or(BlockIdError(value))
    }
}
