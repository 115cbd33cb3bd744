//! Level coordinate space
//!
//! Documents place the origin at the top-left corner with Y growing downward.
//! Decoded geometry uses a bottom-left origin with Y growing upward. Every
//! pixel-valued field is flipped exactly once, at decode time, through the
//! owning level's [`LevelSpace`]. Grid cell coordinates are never flipped.

/// A 2D position in pixels
pub type Point = (f64, f64);

/// Geometry of one level: its pixel size and its offset in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelSpace {
    pub width: f64,
    pub height: f64,
    pub world_x: f64,
    pub world_y: f64,
}

impl LevelSpace {
    pub fn new(width: f64, height: f64, world_x: f64, world_y: f64) -> Self {
        Self {
            width,
            height,
            world_x,
            world_y,
        }
    }

    /// Flip the vertical axis: `(x, height - y)`.
    ///
    /// Applying it twice returns the original point.
    pub fn convert(&self, x: f64, y: f64) -> Point {
        (x, self.height - y)
    }

    /// Level-local document coordinates to world coordinates
    pub fn to_world(&self, x: f64, y: f64) -> Point {
        let (x, y) = self.convert(x, y);
        (self.world_x + x, self.world_y + y)
    }

    /// Inverse of [`LevelSpace::to_world`]
    pub fn from_world(&self, x: f64, y: f64) -> Point {
        self.convert(x - self.world_x, y - self.world_y)
    }

    /// True if the level-local point lies in `[0, width) x [0, height)`
    pub fn contains(&self, x: f64, y: f64) -> bool {
        (0.0..self.width).contains(&x) && (0.0..self.height).contains(&y)
    }

    pub fn contains_world(&self, x: f64, y: f64) -> bool {
        let (x, y) = self.from_world(x, y);
        self.contains(x, y)
    }

    /// Grid cell `(cx, cy)` of a `cell_size` grid to a converted pixel position
    /// (the cell's top-left corner in the flipped frame)
    pub fn convert_cell(&self, cx: f64, cy: f64, cell_size: f64) -> Point {
        self.convert(cx * cell_size, cy * cell_size)
    }
}
