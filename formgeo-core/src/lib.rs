//! # formgeo
//!
//! Field geometry and layout inference for PDF forms whose fields were
//! detected by a vision model.
//!
//! The model reports each field as an inch polygon or a normalized `box_2d`
//! box with a top-left origin. This crate turns those detections into exact,
//! render-ready rectangles in PDF points and cleans up the layout:
//!
//! - **Page geometry**: effective page size and rotation read from the PDF,
//!   with an A4 fallback when the document cannot be read
//! - **Box conversion**: both source encodings into bottom-left PDF space,
//!   rounded to two decimals
//! - **Confidence scoring**: weighted multi-factor score and quality tier
//! - **RTL calibration**: shifts right-to-left text fields from the label to
//!   the blank input
//! - **Radio grouping**: merges tagged radio options and turns checkbox
//!   clusters into radio groups
//!
//! ## Quick Start
//!
//! ```rust
//! use formgeo::{FieldGeometryPipeline, Result};
//!
//! # fn main() -> Result<()> {
//! let response = r#"{
//!     "fields": [
//!         { "type": "checkbox", "label": "כן", "box_2d": [500, 700, 515, 720] },
//!         { "type": "checkbox", "label": "לא", "box_2d": [500, 650, 515, 670] }
//!     ]
//! }"#;
//!
//! // Unreadable PDF bytes fall back to a single A4 page
//! let result = FieldGeometryPipeline::new().run(b"", response)?;
//!
//! assert_eq!(result.fields.len(), 1);
//! assert_eq!(result.fields[0].kind.options(), ["כן".to_string(), "לא".to_string()]);
//! # Ok(())
//! # }
//! ```
//!
//! Every stage is also usable on its own; see the module documentation.

pub mod confidence;
pub mod config;
pub mod conversion;
pub mod detection;
pub mod error;
pub mod field;
pub mod geometry;
pub mod page_geometry;
pub mod pipeline;
pub mod radio;
pub mod rtl;

pub use confidence::{ConfidenceFactors, ConfidenceResult, ConfidenceScorer, Quality};
pub use config::LayoutConfig;
pub use conversion::{native_box_to_box, polygon_to_box};
pub use detection::{AiResponse, Direction, FieldKind, GeometryPayload, RawFieldDetection};
pub use error::{FormGeoError, Result};
pub use field::CalibratedField;
pub use geometry::{BoundingBox, PageInfo, Rotation};
pub use page_geometry::{resolve_pages, PageGeometryResolver, PageSource};
pub use pipeline::{ExtractionResult, ExtractionStats, FieldGeometryPipeline};
pub use radio::RadioGroupDetector;
pub use rtl::{classify_form_direction, RtlCalibrationService};

/// Current version of formgeo
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
