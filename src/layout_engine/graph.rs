use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Horizontal,
    Vertical,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    pub fn orientation(self) -> Orientation {
        match self {
            Direction::Left | Direction::Right => Orientation::Horizontal,
            Direction::Up | Direction::Down => Orientation::Vertical,
        }
    }
}

/// Orientation of a rotatable layout. North is the unrotated state, each
/// step clockwise turns it by a quarter.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    IntoPrimitive,
    TryFromPrimitive,
    strum_macros::Display
)]
#[repr(u8)]
#[serde(rename_all = "snake_case")]
pub enum WindRose {
    #[default]
    North = 0,
    East = 1,
    South = 2,
    West = 3,
}

impl WindRose {
    /// Parses `"0"`..`"3"`. Anything else means north.
    pub fn parse(value: &str) -> Self {
        value
            .trim()
            .parse::<u8>()
            .ok()
            .and_then(|v| WindRose::try_from(v).ok())
            .unwrap_or_default()
    }

    pub fn cw(self) -> Self {
        let v: u8 = self.into();
        WindRose::try_from((v + 1) % 4).unwrap_or_default()
    }

    pub fn ccw(self) -> Self {
        let v: u8 = self.into();
        WindRose::try_from((v + 3) % 4).unwrap_or_default()
    }

    /// Rotation angle in degrees that realises this orientation.
    pub fn angle(self) -> u16 {
        match self {
            WindRose::North => 0,
            WindRose::East => 90,
            WindRose::South => 180,
            WindRose::West => 270,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn wind_rose_parses_and_rotates() {
        assert_eq!(WindRose::parse("2"), WindRose::South);
        assert_eq!(WindRose::parse("7"), WindRose::North);
        assert_eq!(WindRose::parse("x"), WindRose::North);
        assert_eq!(WindRose::West.cw(), WindRose::North);
        assert_eq!(WindRose::North.ccw(), WindRose::West);
        assert_eq!(WindRose::East.angle(), 90);
    }
}
