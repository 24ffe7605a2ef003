//! Basic geometric types in PDF user space
//!
//! All coordinates are PDF points (1/72 inch) with the origin at the
//! bottom-left corner of the page.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Points per inch
pub const POINTS_PER_INCH: f64 = 72.0;

/// A4 width in points, used when page geometry cannot be read
pub const A4_WIDTH: f64 = 595.0;

/// A4 height in points, used when page geometry cannot be read
pub const A4_HEIGHT: f64 = 842.0;

/// Round to two decimal places, halves away from zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// A point in 2D space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
}

impl Point {
    /// Create a new point
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance_to(&self, other: &Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Axis-aligned rectangle in PDF points
///
/// `y` is the bottom edge. Width and height are never negative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    /// Create a box from its bottom-left corner and size.
    ///
    /// Negative sizes are clamped to zero.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    /// The fixed box emitted for malformed geometry
    pub fn fallback() -> Self {
        Self::new(0.0, 0.0, 50.0, 20.0)
    }

    /// Right edge
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Top edge
    pub fn top(&self) -> f64 {
        self.y + self.height
    }

    /// Center point
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Whether the box encloses no area
    pub fn is_degenerate(&self) -> bool {
        self.width == 0.0 || self.height == 0.0
    }

    /// Copy of this box with every component rounded to two decimals
    pub fn rounded(&self) -> Self {
        Self {
            x: round2(self.x),
            y: round2(self.y),
            width: round2(self.width),
            height: round2(self.height),
        }
    }
}

/// Page rotation, clockwise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "i32", try_from = "i32")]
pub enum Rotation {
    #[default]
    None,
    Clockwise90,
    Rotate180,
    Clockwise270,
}

impl Rotation {
    /// Normalize any multiple of 90 degrees, including negative values.
    pub fn from_degrees(degrees: i64) -> Option<Self> {
        match degrees.rem_euclid(360) {
            0 => Some(Rotation::None),
            90 => Some(Rotation::Clockwise90),
            180 => Some(Rotation::Rotate180),
            270 => Some(Rotation::Clockwise270),
            _ => None,
        }
    }

    pub fn to_degrees(self) -> i32 {
        match self {
            Rotation::None => 0,
            Rotation::Clockwise90 => 90,
            Rotation::Rotate180 => 180,
            Rotation::Clockwise270 => 270,
        }
    }

    /// Whether the page's visual axes are swapped relative to its MediaBox
    pub fn swaps_axes(self) -> bool {
        matches!(self, Rotation::Clockwise90 | Rotation::Clockwise270)
    }
}

impl From<Rotation> for i32 {
    fn from(rotation: Rotation) -> Self {
        rotation.to_degrees()
    }
}

impl TryFrom<i32> for Rotation {
    type Error = String;

    fn try_from(degrees: i32) -> Result<Self, Self::Error> {
        Rotation::from_degrees(degrees as i64)
            .ok_or_else(|| format!("rotation must be a multiple of 90, got {degrees}"))
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°", self.to_degrees())
    }
}

/// Effective, visually upright geometry of one page
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// 1-based page number
    pub page_number: u32,
    /// Effective width (already swapped for 90/270 rotations)
    pub width: f64,
    /// Effective height (already swapped for 90/270 rotations)
    pub height: f64,
    pub rotation: Rotation,
}

impl PageInfo {
    /// Create page info from effective dimensions.
    pub fn new(page_number: u32, width: f64, height: f64, rotation: Rotation) -> Self {
        Self {
            page_number,
            width,
            height,
            rotation,
        }
    }

    /// Create page info from the intrinsic (unrotated) page box.
    ///
    /// For 90° or 270° rotations, the width and height are swapped.
    pub fn from_intrinsic(page_number: u32, width: f64, height: f64, rotation: Rotation) -> Self {
        if rotation.swaps_axes() {
            Self::new(page_number, height, width, rotation)
        } else {
            Self::new(page_number, width, height, rotation)
        }
    }

    /// Upright A4 page, the default whenever geometry is unknown
    pub fn a4(page_number: u32) -> Self {
        Self::new(page_number, A4_WIDTH, A4_HEIGHT, Rotation::None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round2_half_away_from_zero() {
        assert_eq!(round2(1.005_000_1), 1.01);
        assert_eq!(round2(2.344), 2.34);
        assert_eq!(round2(-2.345_000_1), -2.35);
        assert_eq!(round2(72.0), 72.0);
    }

    #[test]
    fn test_bounding_box_clamps_negative_size() {
        let b = BoundingBox::new(10.0, 20.0, -5.0, -1.0);
        assert_eq!(b.width, 0.0);
        assert_eq!(b.height, 0.0);
        assert!(b.is_degenerate());
    }

    #[test]
    fn test_bounding_box_edges_and_center() {
        let b = BoundingBox::new(10.0, 20.0, 100.0, 40.0);
        assert_eq!(b.right(), 110.0);
        assert_eq!(b.top(), 60.0);
        assert_eq!(b.center(), Point::new(60.0, 40.0));
    }

    #[test]
    fn test_fallback_box() {
        assert_eq!(BoundingBox::fallback(), BoundingBox::new(0.0, 0.0, 50.0, 20.0));
    }

    #[test]
    fn test_point_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(30.0, 40.0);
        assert_eq!(a.distance_to(&b), 50.0);
    }

    #[test]
    fn test_rotation_normalization() {
        assert_eq!(Rotation::from_degrees(0), Some(Rotation::None));
        assert_eq!(Rotation::from_degrees(450), Some(Rotation::Clockwise90));
        assert_eq!(Rotation::from_degrees(-90), Some(Rotation::Clockwise270));
        assert_eq!(Rotation::from_degrees(-180), Some(Rotation::Rotate180));
        assert_eq!(Rotation::from_degrees(45), None);
    }

    #[test]
    fn test_page_info_swaps_for_quarter_turns() {
        let page = PageInfo::from_intrinsic(1, 842.0, 595.0, Rotation::Clockwise90);
        assert_eq!(page.width, 595.0);
        assert_eq!(page.height, 842.0);

        let page = PageInfo::from_intrinsic(2, 612.0, 792.0, Rotation::Rotate180);
        assert_eq!(page.width, 612.0);
        assert_eq!(page.height, 792.0);
    }

    #[test]
    fn test_page_info_serializes_rotation_as_degrees() {
        let page = PageInfo::new(3, 595.0, 842.0, Rotation::Clockwise270);
        let json = serde_json::to_value(page).unwrap();
        assert_eq!(json["pageNumber"], 3);
        assert_eq!(json["rotation"], 270);

        let back: PageInfo = serde_json::from_value(json).unwrap();
        assert_eq!(back, page);
    }
}
