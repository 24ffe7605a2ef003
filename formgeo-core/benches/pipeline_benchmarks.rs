//! Field geometry pipeline benchmarks
//!
//! - checkbox clustering at increasing field counts
//! - full pipeline over a synthetic multi-page response
//!
//! Run with: `cargo bench --bench pipeline_benchmarks`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use formgeo::detection::FieldKind;
use formgeo::field::CalibratedField;
use formgeo::geometry::{BoundingBox, PageInfo};
use formgeo::{AiResponse, FieldGeometryPipeline, RadioGroupDetector};
use serde_json::json;

/// Rows of three checkboxes, spaced so every row is one radio group
fn checkbox_rows(count: usize) -> Vec<CalibratedField> {
    (0..count)
        .map(|i| {
            let row = (i / 3) as f64;
            let col = (i % 3) as f64;
            CalibratedField::new(
                format!("cb_{i}"),
                FieldKind::Checkbox,
                1 + (i / 150) as u32,
                BoundingBox::new(500.0 - col * 30.0, 800.0 - (row % 50.0) * 15.0, 12.0, 12.0),
            )
            .with_label(format!("אפשרות {}", col as usize + 1))
        })
        .collect()
}

fn synthetic_response(fields: usize, pages: u32) -> AiResponse {
    let entries: Vec<_> = (0..fields)
        .map(|i| {
            let top = (i % 40) as f64 * 24.0;
            if i % 4 == 0 {
                json!({
                    "type": "checkbox",
                    "direction": "rtl",
                    "pageNumber": (i as u32 % pages) + 1,
                    "box_2d": [top, 900, top + 15.0, 920]
                })
            } else {
                json!({
                    "type": "text",
                    "name": format!("field_{i}"),
                    "direction": "rtl",
                    "pageNumber": (i as u32 % pages) + 1,
                    "polygon": [1.0, top / 100.0, 4.0, top / 100.0, 4.0, top / 100.0 + 0.3, 1.0, top / 100.0 + 0.3],
                    "confidenceFactors": { "labelMatch": 0.9, "positionCertainty": 0.8, "typeCertainty": 0.95 }
                })
            }
        })
        .collect();

    AiResponse::from_value(json!({ "fields": entries })).unwrap()
}

fn benchmark_radio_detection(c: &mut Criterion) {
    let detector = RadioGroupDetector::new();
    let mut group = c.benchmark_group("radio_detection");

    for size in [30usize, 150, 600] {
        let fields = checkbox_rows(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &fields, |b, fields| {
            b.iter(|| detector.detect(black_box(fields)))
        });
    }

    group.finish();
}

fn benchmark_full_pipeline(c: &mut Criterion) {
    let pipeline = FieldGeometryPipeline::new();
    let pages: Vec<PageInfo> = (1..=5).map(PageInfo::a4).collect();
    let mut group = c.benchmark_group("full_pipeline");

    for size in [50usize, 250] {
        let response = synthetic_response(size, 5);
        group.bench_with_input(BenchmarkId::from_parameter(size), &response, |b, response| {
            b.iter(|| pipeline.run_with_pages(pages.clone(), black_box(response.clone())))
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_radio_detection, benchmark_full_pipeline);
criterion_main!(benches);
