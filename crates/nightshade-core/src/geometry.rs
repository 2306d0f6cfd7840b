use serde::{Deserialize, Serialize};

/// A 2D point in canvas coordinates (pixels, origin top-left).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Requested canvas dimensions, as reported by the layout bounds of the
/// target view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: f64,
    pub height: f64,
}

impl CanvasSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Both dimensions finite and strictly positive.
    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    /// Pixel dimensions after rounding; `None` if either collapses to zero
    /// or does not fit in a `u32`.
    pub fn pixel_dimensions(&self) -> Option<(u32, u32)> {
        if !self.is_valid() {
            return None;
        }
        let w = self.width.round();
        let h = self.height.round();
        if w < 1.0 || h < 1.0 || w > u32::MAX as f64 || h > u32::MAX as f64 {
            return None;
        }
        Some((w as u32, h as u32))
    }
}

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub min: Point,
    pub max: Point,
}

impl BBox {
    pub fn new(min: Point, max: Point) -> Self {
        Self { min, max }
    }

    /// Square box with its top-left corner at `origin`.
    pub fn square(origin: Point, side: f64) -> Self {
        Self::new(origin, Point::new(origin.x + side, origin.y + side))
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.min.x + self.max.x) / 2.0,
            (self.min.y + self.max.y) / 2.0,
        )
    }

    /// Whether `p` lies inside the ellipse inscribed in this box.
    pub fn inscribed_ellipse_contains(&self, p: &Point) -> bool {
        let rx = self.width() / 2.0;
        let ry = self.height() / 2.0;
        if rx <= 0.0 || ry <= 0.0 {
            return false;
        }
        let c = self.center();
        let dx = (p.x - c.x) / rx;
        let dy = (p.y - c.y) / ry;
        dx * dx + dy * dy <= 1.0
    }
}
