use serde::{Deserialize, Serialize};

use crate::sys::geometry::Rect;

/// How far each edge of a rectangle moved during an interactive resize.
/// Positive values mean the edge moved outwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RectDelta {
    pub east: i32,
    pub west: i32,
    pub south: i32,
    pub north: i32,
}

impl RectDelta {
    pub const fn new(east: i32, west: i32, south: i32, north: i32) -> Self {
        Self { east, west, south, north }
    }

    /// Edge movement that turns `basis` into `target`.
    pub fn from_rects(basis: Rect, target: Rect) -> Self {
        let diff = target.subtract(&basis);
        Self::new(diff.width + diff.x, -diff.x, diff.height + diff.y, -diff.y)
    }

    pub fn is_zero(&self) -> bool { *self == Self::default() }

    pub fn has_horizontal(&self) -> bool { self.east != 0 || self.west != 0 }

    pub fn has_vertical(&self) -> bool { self.south != 0 || self.north != 0 }

    /// The same delta seen in a frame whose axes are swapped.
    pub fn transpose(self) -> Self { Self::new(self.south, self.north, self.east, self.west) }

    /// The same delta seen in a horizontally mirrored frame.
    pub fn mirror_x(self) -> Self { Self::new(self.west, self.east, self.south, self.north) }

    /// The same delta seen in a mirrored, then transposed frame.
    pub fn mirror_transpose(self) -> Self {
        Self::new(self.north, self.south, self.east, self.west)
    }

    /// Undoes [`RectDelta::mirror_transpose`].
    pub fn unmirror_transpose(self) -> Self {
        Self::new(self.south, self.north, self.west, self.east)
    }
}

/// Border of a window moved by the grow/shrink shortcuts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "snake_case")]
pub enum ResizeEdge {
    East,
    West,
    South,
    North,
}

impl ResizeEdge {
    /// Delta moving this edge outwards by `amount`.
    pub fn delta(self, amount: i32) -> RectDelta {
        match self {
            ResizeEdge::East => RectDelta::new(amount, 0, 0, 0),
            ResizeEdge::West => RectDelta::new(0, amount, 0, 0),
            ResizeEdge::South => RectDelta::new(0, 0, amount, 0),
            ResizeEdge::North => RectDelta::new(0, 0, 0, amount),
        }
    }
}
