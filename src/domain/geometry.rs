// Axis-aligned boxes and the building grid.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Square of edge `size` centered on `(cx, cy)`.
    pub fn centered(cx: f32, cy: f32, size: f32) -> Self {
        let half = size / 2.0;
        Self::new(cx - half, cy - half, size, size)
    }

    /// Open-interval overlap test; boxes that only share an edge do not intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        !(self.x + self.w <= other.x
            || self.x >= other.x + other.w
            || self.y + self.h <= other.y
            || self.y >= other.y + other.h)
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }
}

/// A square of the building lattice, addressed by column and row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridCell {
    pub col: i32,
    pub row: i32,
}

impl GridCell {
    /// Cell containing a world coordinate, or `None` for non-finite input.
    pub fn containing(x: f32, y: f32, size: f32) -> Option<Self> {
        if !x.is_finite() || !y.is_finite() || size <= 0.0 {
            return None;
        }
        let col = (x / size).floor();
        let row = (y / size).floor();
        if col.abs() > i32::MAX as f32 || row.abs() > i32::MAX as f32 {
            return None;
        }
        Some(Self {
            col: col as i32,
            row: row as i32,
        })
    }

    pub fn rect(&self, size: f32) -> Rect {
        Rect::new(self.col as f32 * size, self.row as f32 * size, size, size)
    }

    /// True when the whole cell lies inside a `width` x `height` map.
    pub fn fits_within(&self, size: f32, width: f32, height: f32) -> bool {
        let r = self.rect(size);
        r.x >= 0.0 && r.y >= 0.0 && r.right() <= width && r.bottom() <= height
    }
}
