//! Page geometry resolution
//!
//! Reads every page's size and rotation from a PDF and turns them into
//! [`PageInfo`] values with *effective* (visually upright) dimensions. All
//! downstream coordinate conversion assumes the 90°/270° axis swap has
//! already happened here.
//!
//! Resolution never fails: an unreadable document resolves to a single A4
//! page, and a page with unusable dimensions resolves to A4 in its slot.
//!
//! # Example
//!
//! ```rust
//! use formgeo::page_geometry::PageGeometryResolver;
//!
//! let resolver = PageGeometryResolver::new();
//! let pages = resolver.resolve(b"definitely not a pdf");
//!
//! assert_eq!(pages.len(), 1);
//! assert_eq!(pages[0].width, 595.0);
//! assert_eq!(pages[0].height, 842.0);
//! ```

use crate::error::{FormGeoError, Result};
use crate::geometry::{PageInfo, Rotation};
use lopdf::{Document, Object, ObjectId};

/// Intrinsic page data as stored in the PDF, before rotation handling
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawPage {
    pub width: f64,
    pub height: f64,
    pub rotation_angle: i64,
}

/// A reader able to list the pages of a PDF
pub trait PageSource {
    /// Read the intrinsic geometry of every page, in document order
    fn pages(&self, pdf_bytes: &[u8]) -> Result<Vec<RawPage>>;
}

/// [`PageSource`] backed by lopdf
#[derive(Debug, Default, Clone, Copy)]
pub struct LopdfPageSource;

impl PageSource for LopdfPageSource {
    fn pages(&self, pdf_bytes: &[u8]) -> Result<Vec<RawPage>> {
        let doc = Document::load_mem(pdf_bytes)?;

        let mut pages = Vec::new();
        for (_, page_id) in doc.get_pages() {
            let page_box = page_box(&doc, page_id)?;
            let rotation_angle = match resolve_inherited(&doc, page_id, b"Rotate")? {
                Some(obj) => object_to_f64(obj)?.round() as i64,
                None => 0,
            };
            pages.push(RawPage {
                width: (page_box[2] - page_box[0]).abs(),
                height: (page_box[3] - page_box[1]).abs(),
                rotation_angle,
            });
        }

        Ok(pages)
    }
}

/// Visible page box: the inherited CropBox if present, else the inherited MediaBox
fn page_box(doc: &Document, page_id: ObjectId) -> Result<[f64; 4]> {
    if let Some(crop_box) = resolve_inherited(doc, page_id, b"CropBox")? {
        return box_from_object(doc, crop_box);
    }

    let media_box = resolve_inherited(doc, page_id, b"MediaBox")?.ok_or_else(|| {
        FormGeoError::PdfStructure("MediaBox not found on page or ancestors".to_string())
    })?;
    box_from_object(doc, media_box)
}

fn box_from_object(doc: &Document, obj: &Object) -> Result<[f64; 4]> {
    let array = deref(doc, obj)?
        .as_array()
        .map_err(|e| FormGeoError::PdfStructure(format!("page box is not an array: {e}")))?;
    if array.len() != 4 {
        return Err(FormGeoError::PdfStructure(format!(
            "expected 4-element page box, got {}",
            array.len()
        )));
    }

    let mut values = [0.0; 4];
    for (slot, item) in values.iter_mut().zip(array) {
        *slot = object_to_f64(deref(doc, item)?)?;
    }
    Ok(values)
}

fn deref<'a>(doc: &'a Document, obj: &'a Object) -> Result<&'a Object> {
    match obj {
        Object::Reference(id) => Ok(doc.get_object(*id)?),
        other => Ok(other),
    }
}

fn object_to_f64(obj: &Object) -> Result<f64> {
    match obj {
        Object::Integer(i) => Ok(*i as f64),
        Object::Real(f) => Ok(*f as f64),
        _ => Err(FormGeoError::PdfStructure(format!(
            "expected number, got {obj:?}"
        ))),
    }
}

/// Look up a key on the page, walking /Parent links up the page tree.
fn resolve_inherited<'a>(
    doc: &'a Document,
    page_id: ObjectId,
    key: &[u8],
) -> Result<Option<&'a Object>> {
    let mut current_id = page_id;
    // Page trees deeper than this are treated as cyclic.
    for _ in 0..64 {
        let dict = doc.get_object(current_id).and_then(|o| o.as_dict())?;

        if let Ok(value) = dict.get(key) {
            return Ok(Some(deref(doc, value)?));
        }

        match dict.get(b"Parent") {
            Ok(parent) => {
                current_id = parent.as_reference().map_err(|e| {
                    FormGeoError::PdfStructure(format!("invalid /Parent reference: {e}"))
                })?;
            }
            Err(_) => return Ok(None),
        }
    }

    Err(FormGeoError::PdfStructure(
        "page tree is too deep or cyclic".to_string(),
    ))
}

/// Resolves effective page geometry for a document
#[derive(Debug, Default, Clone)]
pub struct PageGeometryResolver<S: PageSource = LopdfPageSource> {
    source: S,
}

impl PageGeometryResolver<LopdfPageSource> {
    pub fn new() -> Self {
        Self {
            source: LopdfPageSource,
        }
    }
}

impl<S: PageSource> PageGeometryResolver<S> {
    /// Create a resolver over a custom page reader
    pub fn with_source(source: S) -> Self {
        Self { source }
    }

    /// Resolve effective geometry for every page.
    ///
    /// Never fails; see the module documentation for the fallback rules.
    pub fn resolve(&self, pdf_bytes: &[u8]) -> Vec<PageInfo> {
        let raw_pages = match self.source.pages(pdf_bytes) {
            Ok(pages) if !pages.is_empty() => pages,
            Ok(_) => {
                tracing::warn!("PDF has no readable pages, assuming a single A4 page");
                return vec![PageInfo::a4(1)];
            }
            Err(err) => {
                tracing::warn!("Failed to read page structure ({err}), assuming a single A4 page");
                return vec![PageInfo::a4(1)];
            }
        };

        raw_pages
            .iter()
            .enumerate()
            .map(|(idx, raw)| to_page_info(idx as u32 + 1, raw))
            .collect()
    }
}

fn to_page_info(page_number: u32, raw: &RawPage) -> PageInfo {
    let usable = |v: f64| v.is_finite() && v > 0.0;
    if !usable(raw.width) || !usable(raw.height) {
        tracing::warn!(
            page = page_number,
            "Page has unusable dimensions {}x{}, using A4",
            raw.width,
            raw.height
        );
        return PageInfo::a4(page_number);
    }

    let rotation = Rotation::from_degrees(raw.rotation_angle).unwrap_or_else(|| {
        tracing::warn!(
            page = page_number,
            "Ignoring non right-angle rotation of {} degrees",
            raw.rotation_angle
        );
        Rotation::None
    });

    PageInfo::from_intrinsic(page_number, raw.width, raw.height, rotation)
}

/// Resolve page geometry with the default lopdf reader
pub fn resolve_pages(pdf_bytes: &[u8]) -> Vec<PageInfo> {
    PageGeometryResolver::new().resolve(pdf_bytes)
}

/// Page info for a 1-based page number, A4 when the page is unknown.
pub fn page_for(pages: &[PageInfo], page_number: u32) -> PageInfo {
    match pages.iter().find(|p| p.page_number == page_number) {
        Some(page) => *page,
        None => {
            tracing::warn!(
                page = page_number,
                "Detection references an unknown page, using A4 geometry"
            );
            PageInfo::a4(page_number)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;

    struct FixedSource(Vec<RawPage>);

    impl PageSource for FixedSource {
        fn pages(&self, _pdf_bytes: &[u8]) -> Result<Vec<RawPage>> {
            Ok(self.0.clone())
        }
    }

    struct FailingSource;

    impl PageSource for FailingSource {
        fn pages(&self, _pdf_bytes: &[u8]) -> Result<Vec<RawPage>> {
            Err(FormGeoError::PdfStructure("encrypted".to_string()))
        }
    }

    fn raw(width: f64, height: f64, rotation_angle: i64) -> RawPage {
        RawPage {
            width,
            height,
            rotation_angle,
        }
    }

    fn build_pdf(pages: &[(i64, i64, i64)]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let mut kids: Vec<Object> = Vec::new();
        for &(width, height, rotate) in pages {
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), width.into(), height.into()],
                "Rotate" => rotate,
            });
            kids.push(page_id.into());
        }
        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn test_rotation_swaps_effective_dimensions() {
        let resolver = PageGeometryResolver::with_source(FixedSource(vec![raw(842.0, 595.0, 90)]));
        let pages = resolver.resolve(&[]);
        assert_eq!(pages, vec![PageInfo::new(1, 595.0, 842.0, Rotation::Clockwise90)]);
    }

    #[test]
    fn test_pages_numbered_from_one() {
        let resolver = PageGeometryResolver::with_source(FixedSource(vec![
            raw(612.0, 792.0, 0),
            raw(612.0, 792.0, 180),
            raw(612.0, 792.0, -90),
        ]));
        let pages = resolver.resolve(&[]);
        assert_eq!(pages.len(), 3);
        assert_eq!(pages[0].page_number, 1);
        assert_eq!(pages[1].rotation, Rotation::Rotate180);
        assert_eq!(pages[2].rotation, Rotation::Clockwise270);
        assert_eq!(pages[2].width, 792.0);
    }

    #[test]
    fn test_failure_falls_back_to_single_a4_page() {
        let resolver = PageGeometryResolver::with_source(FailingSource);
        assert_eq!(resolver.resolve(b"%PDF-1.7"), vec![PageInfo::a4(1)]);
    }

    #[test]
    fn test_empty_document_falls_back_to_a4() {
        let resolver = PageGeometryResolver::with_source(FixedSource(vec![]));
        assert_eq!(resolver.resolve(&[]), vec![PageInfo::a4(1)]);
    }

    #[test]
    fn test_unusable_page_size_uses_a4_in_place() {
        let resolver = PageGeometryResolver::with_source(FixedSource(vec![
            raw(612.0, 792.0, 0),
            raw(0.0, 792.0, 0),
        ]));
        let pages = resolver.resolve(&[]);
        assert_eq!(pages[1], PageInfo::a4(2));
    }

    #[test]
    fn test_odd_rotation_treated_as_upright() {
        let resolver = PageGeometryResolver::with_source(FixedSource(vec![raw(600.0, 800.0, 45)]));
        let pages = resolver.resolve(&[]);
        assert_eq!(pages[0].rotation, Rotation::None);
        assert_eq!(pages[0].width, 600.0);
    }

    #[test]
    fn test_corrupt_bytes_fall_back_to_a4() {
        let resolver = PageGeometryResolver::new();
        assert_eq!(resolver.resolve(b"garbage bytes"), vec![PageInfo::a4(1)]);
    }

    #[test]
    fn test_lopdf_source_reads_media_box_and_rotation() {
        let bytes = build_pdf(&[(595, 842, 0), (842, 595, 90)]);
        let pages = PageGeometryResolver::new().resolve(&bytes);

        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0], PageInfo::new(1, 595.0, 842.0, Rotation::None));
        assert_eq!(pages[1], PageInfo::new(2, 595.0, 842.0, Rotation::Clockwise90));
    }

    #[test]
    fn test_crop_box_inherited_from_page_tree() {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
                "CropBox" => vec![0.into(), 0.into(), 500.into(), 700.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();

        let pages = PageGeometryResolver::new().resolve(&bytes);
        assert_eq!(pages, vec![PageInfo::new(1, 500.0, 700.0, Rotation::None)]);
    }

    #[test]
    fn test_page_for_unknown_page_is_a4() {
        let pages = vec![PageInfo::new(1, 612.0, 792.0, Rotation::None)];
        assert_eq!(page_for(&pages, 1).width, 612.0);
        assert_eq!(page_for(&pages, 7), PageInfo::a4(7));
    }
}
