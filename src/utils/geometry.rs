use std::fmt;

/// A point in the logical coordinate space, in pixels
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Point {
    /// horizontal position
    pub x: i32,
    /// vertical position
    pub y: i32,
}

impl Point {
    /// Create a point from its coordinates
    pub const fn new(x: i32, y: i32) -> Point {
        Point { x, y }
    }
}

impl From<(i32, i32)> for Point {
    #[inline]
    fn from((x, y): (i32, i32)) -> Point {
        Point { x, y }
    }
}

/// A two-dimensional extent in the logical coordinate space, in pixels
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Size {
    /// width of the extent
    pub w: i32,
    /// height of the extent
    pub h: i32,
}

impl Size {
    /// Create a size from its dimensions
    pub const fn new(w: i32, h: i32) -> Size {
        Size { w, h }
    }

    /// Whether either dimension is zero or negative
    pub fn is_empty(&self) -> bool {
        self.w <= 0 || self.h <= 0
    }
}

impl From<(i32, i32)> for Size {
    #[inline]
    fn from((w, h): (i32, i32)) -> Size {
        Size { w, h }
    }
}

/// A rectangle defined by its top-left corner and dimensions, in the logical
/// coordinate space
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rectangle {
    /// horizontal position of the top-left corner of the rectangle
    pub x: i32,
    /// vertical position of the top-left corner of the rectangle
    pub y: i32,
    /// width of the rectangle
    pub width: i32,
    /// height of the rectangle
    pub height: i32,
}

impl Rectangle {
    /// Create a rectangle from its position and dimensions
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Rectangle {
        Rectangle {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rectangle from a location and a size
    pub fn from_loc_and_size(loc: impl Into<Point>, size: impl Into<Size>) -> Rectangle {
        let (loc, size) = (loc.into(), size.into());
        Rectangle {
            x: loc.x,
            y: loc.y,
            width: size.w,
            height: size.h,
        }
    }

    /// The location of the top-left corner
    pub fn loc(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// The dimensions of this rectangle
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// The first x coordinate to the right of this rectangle
    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    /// The first y coordinate below this rectangle
    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// The center of this rectangle
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2, self.y + self.height / 2)
    }

    /// Checks whether a given point is inside this rectangle
    pub fn contains(&self, point: impl Into<Point>) -> bool {
        let point = point.into();
        (point.x >= self.x)
            && (point.x < self.x + self.width)
            && (point.y >= self.y)
            && (point.y < self.y + self.height)
    }

    /// Checks whether the interiors of the two rectangles overlap
    pub fn overlaps(&self, other: &Rectangle) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// The intersection of both rectangles, if any
    pub fn intersection(&self, other: &Rectangle) -> Option<Rectangle> {
        if !self.overlaps(other) {
            return None;
        }
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        Some(Rectangle {
            x,
            y,
            width: self.right().min(other.right()) - x,
            height: self.bottom().min(other.bottom()) - y,
        })
    }

    /// This rectangle shrunk by the given insets on each side.
    ///
    /// Dimensions are clamped at zero.
    pub fn shrink(&self, insets: &ReservedArea) -> Rectangle {
        Rectangle {
            x: self.x + insets.left,
            y: self.y + insets.top,
            width: (self.width - insets.left - insets.right).max(0),
            height: (self.height - insets.top - insets.bottom).max(0),
        }
    }

    /// This rectangle shrunk by the same amount on all four sides
    pub fn inset(&self, amount: i32) -> Rectangle {
        self.shrink(&ReservedArea {
            top: amount,
            bottom: amount,
            left: amount,
            right: amount,
        })
    }
}

/// Insets reserved at the edges of an output, e.g. for panels and bars
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ReservedArea {
    /// Inset from the top edge
    pub top: i32,
    /// Inset from the bottom edge
    pub bottom: i32,
    /// Inset from the left edge
    pub left: i32,
    /// Inset from the right edge
    pub right: i32,
}

/// An axis of the logical coordinate plane.
///
/// Containers split along an axis: a horizontal split places its children
/// side by side, a vertical split stacks them.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Left/right
    Horizontal,
    /// Top/bottom
    Vertical,
}

impl Axis {
    /// The other axis
    pub fn orthogonal(self) -> Axis {
        match self {
            Axis::Horizontal => Axis::Vertical,
            Axis::Vertical => Axis::Horizontal,
        }
    }
}

/// A cardinal movement direction
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Towards the top edge
    Up,
    /// Towards the right edge
    Right,
    /// Towards the bottom edge
    Down,
    /// Towards the left edge
    Left,
}

impl Direction {
    /// The axis this direction moves along
    pub fn axis(self) -> Axis {
        match self {
            Direction::Left | Direction::Right => Axis::Horizontal,
            Direction::Up | Direction::Down => Axis::Vertical,
        }
    }

    /// Whether this direction moves towards greater coordinates
    pub fn is_forward(self) -> bool {
        matches!(self, Direction::Right | Direction::Down)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::Up => "up",
            Direction::Right => "right",
            Direction::Down => "down",
            Direction::Left => "left",
        })
    }
}

bitflags::bitflags! {
    /// Defines the corners of a rectangle a resize may be anchored at
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ResizeCorner: u32 {
        /// The top-left corner
        const TOP_LEFT = 1;
        /// The top-right corner
        const TOP_RIGHT = 2;
        /// The bottom-right corner
        const BOTTOM_RIGHT = 4;
        /// The bottom-left corner
        const BOTTOM_LEFT = 8;
    }
}
