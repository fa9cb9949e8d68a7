//! Geometric primitives for node sizing.
//!
//! Astrolabe never places nodes itself; coordinates are the layout engine's
//! job. What it does need is a notion of node extent (for text measurement
//! and size constraints) and of padding around content.
//!
//! # Overview
//!
//! - [`Size`] - Width and height dimensions, in pixels
//! - [`Insets`] - Padding values for four sides
//!
//! Graphviz measures node sizes in inches; [`PIXELS_PER_INCH`] is the
//! conversion factor used wherever pixel values cross into DOT attributes.

use serde::{Deserialize, Serialize};

/// Pixels per inch assumed when converting to Graphviz units.
pub const PIXELS_PER_INCH: f32 = 72.0;

/// Converts a pixel measure into inches.
pub fn px_to_inches(px: f32) -> f32 {
    px / PIXELS_PER_INCH
}

/// Represents the dimensions of an element with width and height
///
/// # Examples
///
/// ```
/// # use astrolabe_core::geometry::Size;
/// let content = Size::new(120.0, 40.0);
/// let bounded = content.clamp(Size::new(200.0, 100.0), Size::new(500.0, 300.0));
/// assert_eq!(bounded, Size::new(200.0, 100.0));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    width: f32,
    height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Returns the width dimension of this size
    pub fn width(self) -> f32 {
        self.width
    }

    /// Returns the height dimension of this size
    pub fn height(self) -> f32 {
        self.height
    }

    /// Returns a new Size with the maximum width and height between this size and another
    pub fn max(self, other: Size) -> Self {
        Self {
            width: self.width.max(other.width),
            height: self.height.max(other.height),
        }
    }

    /// Returns a new Size with the minimum width and height between this size and another
    pub fn min(self, other: Size) -> Self {
        Self {
            width: self.width.min(other.width),
            height: self.height.min(other.height),
        }
    }

    /// Returns a new Size with padding added to both width and height
    ///
    /// The padding is applied according to the specified Insets values
    pub fn add_padding(self, insets: Insets) -> Self {
        Self {
            width: self.width + insets.horizontal_sum(),
            height: self.height + insets.vertical_sum(),
        }
    }

    /// Multiplies both dimension by the given factor
    pub fn scale(self, factor: f32) -> Self {
        Self {
            width: self.width * factor,
            height: self.height * factor,
        }
    }

    /// Multiplies width and height by independent factors
    pub fn scale_xy(self, width_factor: f32, height_factor: f32) -> Self {
        Self {
            width: self.width * width_factor,
            height: self.height * height_factor,
        }
    }

    /// Clamps each dimension into `[min, max]`.
    ///
    /// `min` wins when the bounds cross, so the result is never below `min`.
    pub fn clamp(self, min: Size, max: Size) -> Self {
        Self {
            width: self.width.min(max.width).max(min.width),
            height: self.height.min(max.height).max(min.height),
        }
    }

    /// Returns true if both width and height are zero
    pub fn is_zero(self) -> bool {
        self.width == 0.0 && self.height == 0.0
    }

    /// Merges two sizes vertically by adding their heights and taking the maximum width
    pub fn merge_vertical(self, other: Size) -> Self {
        Self {
            width: self.width.max(other.width),
            height: self.height + other.height,
        }
    }
}

/// Represents spacing around an element (padding, margin, etc.)
/// with potentially different values for each side
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Insets {
    top: f32,
    right: f32,
    bottom: f32,
    left: f32,
}

impl Insets {
    /// Creates new insets with specified values for each side
    pub const fn new(top: f32, right: f32, bottom: f32, left: f32) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// Creates insets with one value for top/bottom and one for left/right
    pub const fn symmetric(vertical: f32, horizontal: f32) -> Self {
        Self::new(vertical, horizontal, vertical, horizontal)
    }

    /// Returns the sum of left and right insets
    pub fn horizontal_sum(self) -> f32 {
        self.left + self.right
    }

    /// Returns the sum of top and bottom insets
    pub fn vertical_sum(self) -> f32 {
        self.top + self.bottom
    }
}
