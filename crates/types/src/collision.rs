use std::fmt;

use serde::{Deserialize, Serialize};

/// Classification of a single tile describing its physical, light and sound
/// blocking behavior.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum CollisionType {
    #[default]
    Air = 0,
    /// Solid rock, blocks everything.
    Solid = 1,
    /// Solid but transparent (light passes, sound does not).
    Glass = 2,
    /// Solid only while crossed from above; light and sound pass.
    Platform = 3,
    /// Non-solid, light passes, blocks sound.
    Water = 4,
    /// Non-solid but opaque, for example dense foliage.
    Foliage = 5,
    Ladder = 6,
}

impl CollisionType {
    pub const ALL: [Self; 7] = [
        Self::Air,
        Self::Solid,
        Self::Glass,
        Self::Platform,
        Self::Water,
        Self::Foliage,
        Self::Ladder,
    ];

    pub fn is_solid(self) -> bool {
        matches!(self, Self::Solid | Self::Glass | Self::Platform)
    }

    pub fn is_light_blocking(self) -> bool {
        matches!(self, Self::Solid | Self::Foliage)
    }

    pub fn is_sound_blocking(self) -> bool {
        matches!(self, Self::Solid | Self::Glass | Self::Water)
    }

    /// Priority used when more solid overlays cover a single tile. Higher
    /// wins, non-solid types have no priority.
    pub fn solid_priority(self) -> Option<u8> {
        match self {
            Self::Solid => Some(3),
            Self::Glass => Some(2),
            Self::Platform => Some(1),
            Self::Air | Self::Water | Self::Foliage | Self::Ladder => None,
        }
    }

    pub fn to_u8(self) -> u8 {
        self as u8
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        Self::ALL.get(value as usize).copied()
    }

    /// Parses a single character of an ASCII level map.
    pub fn from_map_char(c: char) -> Option<Self> {
        match c {
            '.' | ' ' => Some(Self::Air),
            '#' => Some(Self::Solid),
            'g' => Some(Self::Glass),
            '=' => Some(Self::Platform),
            '~' => Some(Self::Water),
            '*' => Some(Self::Foliage),
            'H' => Some(Self::Ladder),
            _ => None,
        }
    }
}

impl fmt::Display for CollisionType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Air => write!(f, "Air"),
            Self::Solid => write!(f, "Solid"),
            Self::Glass => write!(f, "Glass"),
            Self::Platform => write!(f, "Platform"),
            Self::Water => write!(f, "Water"),
            Self::Foliage => write!(f, "Foliage"),
            Self::Ladder => write!(f, "Ladder"),
        }
    }
}
