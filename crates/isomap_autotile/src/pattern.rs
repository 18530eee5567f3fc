//! The 16 Auto-LAT transition patterns

use std::fmt;

/// Pattern bits: a set bit means that side borders a different ground
pub mod sides {
    pub const NE: u8 = 0b0001; // North neighbor
    pub const SE: u8 = 0b0010; // East neighbor
    pub const SW: u8 = 0b0100; // South neighbor
    pub const NW: u8 = 0b1000; // West neighbor
}

const NAMES: [&str; 16] = [
    "NONE", "NE", "SE", "NE_SE", "SW", "NE_SW", "SE_SW", "NE_SE_SW", "NW", "NE_NW", "SE_NW",
    "NE_SE_NW", "SW_NW", "NE_SW_NW", "SE_SW_NW", "ALL",
];

/// One of the 16 transition patterns, 0 (surrounded) to 15 (isolated)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LatPattern(u8);

impl LatPattern {
    pub const NONE: Self = Self(0);
    pub const ALL: Self = Self(15);
    pub const COUNT: usize = 16;

    pub const fn new(index: u8) -> Option<Self> {
        if index < Self::COUNT as u8 {
            Some(Self(index))
        } else {
            None
        }
    }

    pub const fn index(self) -> u8 {
        self.0
    }

    pub fn name(self) -> &'static str {
        NAMES[self.0 as usize]
    }

    /// Check whether this pattern has a transition on the given side
    pub const fn has_side(self, side: u8) -> bool {
        self.0 & side != 0
    }

    /// All patterns in priority order
    pub fn all() -> impl Iterator<Item = LatPattern> {
        (0..Self::COUNT as u8).map(LatPattern)
    }
}

impl fmt::Display for LatPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
