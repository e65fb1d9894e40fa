use std::hint::black_box;
use std::path::Path;
use std::str::FromStr;

use criterion::{criterion_group, criterion_main, Criterion};
use receiptgen::rendering::font::FontResource;
use receiptgen::rendering::layout::{layout_receipt, LayoutMetrics};
use receiptgen::{amount_to_chinese, normalize, render, CanvasTarget, ReceiptRequest, RenderConfig};
use rust_decimal::Decimal;

fn bench_numerals(c: &mut Criterion) {
    let amounts: Vec<Decimal> = ["0.05", "100.5", "1500.00", "10005", "100010.99", "123456789.12"]
        .iter()
        .map(|s| Decimal::from_str(s).unwrap())
        .collect();
    c.bench_function("amount_to_chinese", |b| {
        b.iter(|| {
            for a in &amounts {
                black_box(amount_to_chinese(*a));
            }
        })
    });
}

fn bench_layout(c: &mut Criterion) {
    let req = ReceiptRequest::from_json(
        r#"{"rent": 1500, "room_number": "101", "recipient": "张三", "payer": "李四", "month": "2025年9月"}"#,
    )
    .unwrap();
    let doc = normalize(&req);
    let metrics = LayoutMetrics::raster(Default::default(), 300.0);
    c.bench_function("layout_receipt", |b| b.iter(|| black_box(layout_receipt(&doc, &metrics))));

    let font_path = std::env::var("RECEIPT_TEST_FONT")
        .unwrap_or_else(|_| "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf".to_string());
    let Ok(font) = FontResource::load(Path::new(&font_path)) else {
        println!("no font at {}; skipping render benches", font_path);
        return;
    };
    let config = RenderConfig::default();
    c.bench_function("render_pdf", |b| {
        b.iter(|| black_box(render(&doc, CanvasTarget::vector(&config), Some(&font)).unwrap()))
    });
    if cfg!(feature = "raster") {
        c.bench_function("render_png_direct", |b| {
            b.iter(|| black_box(render(&doc, CanvasTarget::raster(&config), Some(&font)).unwrap()))
        });
    }
}

criterion_group!(benches, bench_numerals, bench_layout);
criterion_main!(benches);
