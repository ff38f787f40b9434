//! Site model consumed by the optimizer.
//!
//! These are the minimal views of the design the optimizer reads and writes:
//! a foundation footprint, the panels mounted on it, candidate positions for
//! layout searches, and rectangular keep-out regions.

use serde::{Deserialize, Serialize};

/// Rectangular foundation footprint.
///
/// `lx` and `ly` are full side lengths, not half-extents: the footprint spans
/// `cx ± lx / 2` and `cy ± ly / 2`. Callers holding half-extents must double
/// them, or layout genes will cover a quarter of the intended area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Foundation {
    /// Center x (m)
    pub cx: f64,
    /// Center y (m)
    pub cy: f64,
    /// Side length along x (m)
    pub lx: f64,
    /// Side length along y (m)
    pub ly: f64,
}

impl Foundation {
    pub fn new(cx: f64, cy: f64, lx: f64, ly: f64) -> Self {
        Self { cx, cy, lx, ly }
    }

    /// Range of x covered by the footprint.
    pub fn x_range(&self) -> (f64, f64) {
        (self.cx - 0.5 * self.lx, self.cx + 0.5 * self.lx)
    }

    /// Range of y covered by the footprint.
    pub fn y_range(&self) -> (f64, f64) {
        (self.cy - 0.5 * self.ly, self.cy + 0.5 * self.ly)
    }
}

/// Solar panel as seen by the tilt-angle search.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolarPanel {
    /// Tilt angle (degrees), -90 to 90.
    pub tilt_angle: f64,
}

impl SolarPanel {
    pub fn new(tilt_angle: f64) -> Self {
        Self { tilt_angle }
    }
}

/// A point on the site, used by layout chromosomes.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SitePoint {
    pub x: f64,
    pub y: f64,
}

impl SitePoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned keep-out rectangle anchored at its lower-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RectangularBound {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl RectangularBound {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Build from a center point and full extents.
    pub fn centered(cx: f64, cy: f64, width: f64, height: f64) -> Self {
        Self::new(cx - 0.5 * width, cy - 0.5 * height, width, height)
    }

    /// True if the point lies strictly inside the rectangle. Edges are allowed.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x > self.x && x < self.x + self.width && y > self.y && y < self.y + self.height
    }
}
