//! Danger zone geometry.
//!
//! The danger zone is a band of the frame, expressed as fractions of frame
//! height (and optionally width), that is treated as the face/head region.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::validation::ValidationError;

/// A normalized band of the frame (0.0 = top/left, 1.0 = bottom/right).
///
/// Horizontal extent defaults to the full frame width.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DangerZone {
    /// Upper edge as a fraction of frame height
    pub top_pct: f64,
    /// Lower edge as a fraction of frame height
    pub bottom_pct: f64,
    /// Left edge as a fraction of frame width (default: 0.0)
    #[serde(default = "default_left")]
    pub left_pct: f64,
    /// Right edge as a fraction of frame width (default: 1.0)
    #[serde(default = "default_right")]
    pub right_pct: f64,
}

fn default_left() -> f64 {
    0.0
}

fn default_right() -> f64 {
    1.0
}

impl Default for DangerZone {
    fn default() -> Self {
        Self {
            top_pct: 0.5,
            bottom_pct: 0.75,
            left_pct: 0.0,
            right_pct: 1.0,
        }
    }
}

impl DangerZone {
    /// Create a full-width zone, rejecting bounds that violate `0 <= top < bottom <= 1`.
    pub fn new(top_pct: f64, bottom_pct: f64) -> Result<Self, ValidationError> {
        let zone = Self {
            top_pct,
            bottom_pct,
            left_pct: 0.0,
            right_pct: 1.0,
        };
        zone.validate()?;
        Ok(zone)
    }

    /// Narrow the zone horizontally.
    pub fn with_horizontal(mut self, left_pct: f64, right_pct: f64) -> Result<Self, ValidationError> {
        self.left_pct = left_pct;
        self.right_pct = right_pct;
        self.validate()?;
        Ok(self)
    }

    /// Check every invariant of the zone.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (field, value) in [
            ("top_pct", self.top_pct),
            ("bottom_pct", self.bottom_pct),
            ("left_pct", self.left_pct),
            ("right_pct", self.right_pct),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ValidationError::OutOfRange { field, value });
            }
        }

        if self.top_pct >= self.bottom_pct {
            return Err(ValidationError::InvertedBounds {
                low_name: "top_pct",
                low: self.top_pct,
                high_name: "bottom_pct",
                high: self.bottom_pct,
            });
        }

        if self.left_pct >= self.right_pct {
            return Err(ValidationError::InvertedBounds {
                low_name: "left_pct",
                low: self.left_pct,
                high_name: "right_pct",
                high: self.right_pct,
            });
        }

        Ok(())
    }

    /// Whether the zone covers less than the full frame width.
    pub fn is_narrowed(&self) -> bool {
        self.left_pct > 0.0 || self.right_pct < 1.0
    }

    /// Whether a normalized y coordinate lies inside the vertical band (inclusive).
    pub fn contains_y(&self, y: f64) -> bool {
        y >= self.top_pct && y <= self.bottom_pct
    }

    /// Whether a normalized x coordinate lies inside the horizontal band (inclusive).
    pub fn contains_x(&self, x: f64) -> bool {
        x >= self.left_pct && x <= self.right_pct
    }

    /// Whether a normalized point lies inside the zone.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        self.contains_y(y) && self.contains_x(x)
    }

    /// Vertical distance from `y` to the band: 0 inside, otherwise the gap
    /// to the nearest boundary.
    pub fn vertical_distance(&self, y: f64) -> f64 {
        if y < self.top_pct {
            self.top_pct - y
        } else if y > self.bottom_pct {
            y - self.bottom_pct
        } else {
            0.0
        }
    }

    /// Zone height as a fraction of the frame.
    pub fn height(&self) -> f64 {
        self.bottom_pct - self.top_pct
    }

    /// Pixel rows covered by the zone for a frame of `frame_height` rows.
    pub fn pixel_rows(&self, frame_height: u32) -> (u32, u32) {
        let h = frame_height as f64;
        ((self.top_pct * h).round() as u32, (self.bottom_pct * h).round() as u32)
    }
}
