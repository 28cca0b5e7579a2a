use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self { Self { x, y } }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub const fn new(width: i32, height: i32) -> Self { Self { width, height } }
}

/// Which band of a rectangle a point test is restricted to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RectPart {
    #[default]
    Whole,
    Top,
    Bottom,
    Left,
    Right,
}

/// Axis-aligned rectangle in surface-local pixels. `x`/`y` is the top-left
/// corner; every operation returns a new value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    pub fn max_x(&self) -> i32 { self.x + self.width }

    pub fn max_y(&self) -> i32 { self.y + self.height }

    pub fn center(&self) -> Point {
        Point::new(
            self.x + self.width.div_euclid(2),
            self.y + self.height.div_euclid(2),
        )
    }

    pub fn size(&self) -> Size { Size::new(self.width, self.height) }

    /// Shrinks the rectangle by the given margins.
    pub fn gap(&self, left: i32, right: i32, top: i32, bottom: i32) -> Rect {
        Rect::new(
            self.x + left,
            self.y + top,
            self.width - (left + right),
            self.height - (top + bottom),
        )
    }

    pub fn inset(&self, amount: i32) -> Rect { self.gap(amount, amount, amount, amount) }

    pub fn includes(&self, other: &Rect) -> bool {
        self.x <= other.x
            && self.y <= other.y
            && other.max_x() <= self.max_x()
            && other.max_y() <= self.max_y()
    }

    pub fn includes_point(&self, point: Point, part: RectPart) -> bool {
        let in_x = self.x <= point.x && point.x <= self.max_x();
        let in_y = self.y <= point.y && point.y <= self.max_y();
        let center = self.center();
        match part {
            RectPart::Whole => in_x && in_y,
            RectPart::Top => in_x && self.y <= point.y && point.y <= center.y,
            RectPart::Bottom => in_x && center.y < point.y && point.y <= self.max_y(),
            RectPart::Left => in_y && self.x <= point.x && point.x <= center.x,
            RectPart::Right => in_y && center.x < point.x && point.x <= self.max_x(),
        }
    }

    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.max_x()
            && other.x < self.max_x()
            && self.y < other.max_y()
            && other.y < self.max_y()
    }

    /// Component-wise difference, used to measure how far a window moved.
    pub fn subtract(&self, other: &Rect) -> Rect {
        Rect::new(
            self.x - other.x,
            self.y - other.y,
            self.width - other.width,
            self.height - other.height,
        )
    }

    /// Swaps the axes. Applying it twice yields the original rectangle.
    pub fn transpose(&self) -> Rect { Rect::new(self.y, self.x, self.height, self.width) }

    /// Mirrors `self` horizontally inside `frame`.
    pub fn mirror_x(&self, frame: &Rect) -> Rect {
        let offset = self.x - frame.x;
        Rect::new(
            frame.x + frame.width - (offset + self.width),
            self.y,
            self.width,
            self.height,
        )
    }

    pub fn is_left_zone(&self, point: Point, percent: i32) -> bool {
        point.x <= self.x + self.width * percent / 100
    }

    pub fn is_right_zone(&self, point: Point, percent: i32) -> bool {
        point.x >= self.max_x() - self.width * percent / 100
    }

    pub fn is_top_zone(&self, point: Point, percent: i32) -> bool {
        point.y <= self.y + self.height * percent / 100
    }

    pub fn is_bottom_zone(&self, point: Point, percent: i32) -> bool {
        point.y >= self.max_y() - self.height * percent / 100
    }
}

impl std::fmt::Display for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}+{}+{}", self.width, self.height, self.x, self.y)
    }
}
