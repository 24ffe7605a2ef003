//! Bounding box conversion from the model's coordinate spaces into PDF points
//!
//! Two source encodings share one output contract, a [`BoundingBox`] in PDF
//! points with a bottom-left origin, rounded to two decimals:
//!
//! - inch polygons (top-left origin), converted through [`polygon_to_box`]
//! - native `box_2d` boxes on a 0–1000 per-page scale, converted through
//!   [`native_box_to_box`]
//!
//! Conversion never fails. Malformed geometry yields
//! [`BoundingBox::fallback`].
//!
//! # Example
//!
//! ```rust
//! use formgeo::conversion::polygon_to_box;
//! use formgeo::geometry::{BoundingBox, PageInfo};
//!
//! let page = PageInfo::a4(1);
//! let polygon = [1.0, 1.0, 2.0, 1.0, 2.0, 2.0, 1.0, 2.0];
//!
//! assert_eq!(
//!     polygon_to_box(Some(&polygon), &page),
//!     BoundingBox::new(72.0, 698.0, 72.0, 72.0)
//! );
//! ```

use crate::detection::GeometryPayload;
use crate::geometry::{round2, BoundingBox, PageInfo, POINTS_PER_INCH};

/// Scale of the native `box_2d` encoding
pub const NATIVE_SCALE: f64 = 1000.0;

/// Convert an inch polygon (TL, TR, BR, BL, top-left origin) to PDF points.
///
/// The bounds are the min and max over all four corners, so skewed or
/// inconsistently ordered quadrilaterals still produce a valid box. Missing
/// input, fewer than 8 numbers or non-finite values yield the fallback box.
/// Values past the eighth are ignored.
pub fn polygon_to_box(polygon: Option<&[f64]>, page: &PageInfo) -> BoundingBox {
    let coords = match polygon {
        Some(coords) if coords.len() >= 8 => &coords[..8],
        Some(coords) => {
            tracing::warn!(
                "Polygon has {} coordinates, expected 8; using fallback box",
                coords.len()
            );
            return BoundingBox::fallback();
        }
        None => return BoundingBox::fallback(),
    };

    if coords.iter().any(|v| !v.is_finite()) {
        tracing::warn!("Polygon has non-finite coordinates; using fallback box");
        return BoundingBox::fallback();
    }

    let xs = coords.iter().step_by(2);
    let ys = coords.iter().skip(1).step_by(2);
    let (x_min, x_max) = min_max(xs);
    let (y_min, y_max) = min_max(ys);

    BoundingBox::new(
        round2(x_min * POINTS_PER_INCH),
        round2(page.height - y_max * POINTS_PER_INCH),
        round2((x_max - x_min) * POINTS_PER_INCH),
        round2((y_max - y_min) * POINTS_PER_INCH),
    )
}

/// Convert a native `[yMin, xMin, yMax, xMax]` box on the 0–1000 scale.
///
/// Swapped minimum and maximum coordinates are tolerated.
pub fn native_box_to_box(native: &[f64; 4], page: &PageInfo) -> BoundingBox {
    if native.iter().any(|v| !v.is_finite()) {
        tracing::warn!("box_2d has non-finite coordinates; using fallback box");
        return BoundingBox::fallback();
    }

    let [y0, x0, y1, x1] = *native;
    let scale_x = |v: f64| v / NATIVE_SCALE * page.width;
    let scale_y = |v: f64| v / NATIVE_SCALE * page.height;

    let x_start = scale_x(x0.min(x1));
    let x_end = scale_x(x0.max(x1));
    let y_top_start = scale_y(y0.min(y1));
    let y_top_end = scale_y(y0.max(y1));

    BoundingBox::new(
        round2(x_start),
        round2(page.height - y_top_end),
        round2(x_end - x_start),
        round2(y_top_end - y_top_start),
    )
}

fn min_max<'a>(values: impl Iterator<Item = &'a f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
        (lo.min(v), hi.max(v))
    })
}

impl GeometryPayload {
    /// Convert to a PDF-space box on the given page
    pub fn to_box(&self, page: &PageInfo) -> BoundingBox {
        match self {
            GeometryPayload::Polygon(coords) => polygon_to_box(Some(coords), page),
            GeometryPayload::NativeBox(native) => native_box_to_box(native, page),
            GeometryPayload::Missing => {
                tracing::warn!(
                    page = page.page_number,
                    "Detection has no usable geometry; using fallback box"
                );
                BoundingBox::fallback()
            }
        }
    }
}

/// Convert a geometry payload, looking up its page among the resolved pages.
///
/// An unknown page number converts against an A4 page.
pub fn convert(payload: &GeometryPayload, page_number: u32, pages: &[PageInfo]) -> BoundingBox {
    let page = crate::page_geometry::page_for(pages, page_number);
    payload.to_box(&page)
}
