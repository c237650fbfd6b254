use serde::{Deserialize, Serialize};

/// One of the six axis-aligned face directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum Direction {
    /// +X (east).
    PosX = 0,
    /// -X (west).
    NegX = 1,
    /// +Y (up).
    PosY = 2,
    /// -Y (down).
    NegY = 3,
    /// +Z (south).
    PosZ = 4,
    /// -Z (north).
    NegZ = 5,
}

impl Direction {
    /// All directions, in bit order.
    pub const ALL: [Direction; 6] = [
        Direction::PosX,
        Direction::NegX,
        Direction::PosY,
        Direction::NegY,
        Direction::PosZ,
        Direction::NegZ,
    ];

    /// The four horizontal directions that can cross a chunk border.
    pub const CARDINAL: [Direction; 4] = [
        Direction::PosX,
        Direction::NegX,
        Direction::PosZ,
        Direction::NegZ,
    ];

    /// Single-bit mask for face bitsets.
    #[inline]
    pub const fn bit(self) -> u8 {
        1 << self as u8
    }

    /// Unit offset `(dx, dy, dz)`.
    pub const fn offset(self) -> (i32, i32, i32) {
        match self {
            Self::PosX => (1, 0, 0),
            Self::NegX => (-1, 0, 0),
            Self::PosY => (0, 1, 0),
            Self::NegY => (0, -1, 0),
            Self::PosZ => (0, 0, 1),
            Self::NegZ => (0, 0, -1),
        }
    }

    /// Face normal as floats.
    pub const fn normal(self) -> [f32; 3] {
        match self {
            Self::PosX => [1.0, 0.0, 0.0],
            Self::NegX => [-1.0, 0.0, 0.0],
            Self::PosY => [0.0, 1.0, 0.0],
            Self::NegY => [0.0, -1.0, 0.0],
            Self::PosZ => [0.0, 0.0, 1.0],
            Self::NegZ => [0.0, 0.0, -1.0],
        }
    }

    /// Direction pointing the other way.
    pub const fn opposite(self) -> Self {
        match self {
            Self::PosX => Self::NegX,
            Self::NegX => Self::PosX,
            Self::PosY => Self::NegY,
            Self::NegY => Self::PosY,
            Self::PosZ => Self::NegZ,
            Self::NegZ => Self::PosZ,
        }
    }

    /// True for the four horizontal directions.
    pub const fn is_cardinal(self) -> bool {
        !matches!(self, Self::PosY | Self::NegY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_is_involution() {
        for dir in Direction::ALL {
            assert_eq!(dir.opposite().opposite(), dir);
            let (x, y, z) = dir.offset();
            let (ox, oy, oz) = dir.opposite().offset();
            assert_eq!((x + ox, y + oy, z + oz), (0, 0, 0));
        }
    }

    #[test]
    fn bits_are_unique() {
        let mask = Direction::ALL.iter().fold(0u8, |acc, d| {
            assert_eq!(acc & d.bit(), 0);
            acc | d.bit()
        });
        assert_eq!(mask, 0b0011_1111);
    }

    #[test]
    fn cardinal_excludes_vertical() {
        assert!(Direction::CARDINAL.iter().all(|d| d.is_cardinal()));
        assert!(!Direction::PosY.is_cardinal());
    }
}
