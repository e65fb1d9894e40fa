mod common;

use std::sync::Arc;
use std::time::Duration;

use base64::Engine as _;
use chrono::{Local, TimeZone};
use receiptgen::{
    CleanupQueue, Delivery, FixedClock, ImageMode, ReceiptRequest, ReceiptService, RenderConfig,
};

fn request() -> ReceiptRequest {
    ReceiptRequest::from_json(
        r#"{"rent": 100.5, "room_number": "101", "recipient": "张三", "payer": "李四", "month": "2025年9月"}"#,
    )
    .unwrap()
}

fn config(dir: &std::path::Path) -> Option<RenderConfig> {
    Some(RenderConfig {
        font_path: Some(common::font_path()?),
        output_dir: dir.join("out"),
        backup_dir: Some(dir.join("backup")),
        file_cleanup_delay: Duration::from_millis(50),
        base64_cleanup_delay: Duration::from_millis(10),
        ..Default::default()
    })
}

fn clock() -> Arc<FixedClock> {
    Arc::new(FixedClock(Local.with_ymd_and_hms(2025, 9, 21, 21, 42, 2).single().unwrap()))
}

#[test]
fn pdf_file_delivery() {
    let dir = tempfile::tempdir().unwrap();
    let Some(config) = config(dir.path()) else {
        println!("no TrueType font found; skipping");
        return;
    };
    let service = ReceiptService::new(config).with_clock(clock());
    let receipt = service.generate_pdf(&request(), Delivery::File).unwrap();

    assert_eq!(receipt.id, "NO101202509");
    assert_eq!(receipt.file_name, "receipt_101_20250921_214202.pdf");
    assert_eq!(receipt.content_type, "application/pdf");
    assert_eq!(receipt.sha256.len(), 64);
    let path = receipt.path.clone().unwrap();
    assert_eq!(std::fs::metadata(&path).unwrap().len() as usize, receipt.size);
    assert!(receipt.base64.is_none());

    let backups = service.store().list_backups().unwrap();
    assert_eq!(backups.len(), 1);
    assert_eq!(backups[0].file_name, "receipt_NO101202509_20250921_214202.pdf");

    let json = serde_json::to_value(&receipt).unwrap();
    assert_eq!(json["id"], "NO101202509");
    assert!(json.get("base64").is_none());
}

#[cfg(feature = "raster")]
#[test]
fn image_from_pdf_as_base64() {
    let dir = tempfile::tempdir().unwrap();
    let Some(config) = config(dir.path()) else {
        println!("no TrueType font found; skipping");
        return;
    };
    let service = ReceiptService::new(config).with_clock(clock());
    let receipt = service
        .generate_image(&request(), ImageMode::FromPdf, Delivery::Base64)
        .unwrap();
    let png = base64::engine::general_purpose::STANDARD
        .decode(receipt.base64.as_deref().unwrap())
        .unwrap();
    assert!(png.starts_with(b"\x89PNG"));
    assert_eq!(png.len(), receipt.size);
    assert_eq!(receipt.file_name, "receipt_101_20250921_214202.png");
}

#[tokio::test]
async fn output_is_removed_after_delay_but_backup_stays() {
    let dir = tempfile::tempdir().unwrap();
    let Some(config) = config(dir.path()) else {
        println!("no TrueType font found; skipping");
        return;
    };
    let service = ReceiptService::new(config)
        .with_clock(clock())
        .with_cleanup(Some(CleanupQueue::current().unwrap()));
    let receipt = service.generate_pdf(&request(), Delivery::File).unwrap();
    let path = receipt.path.unwrap();
    assert!(path.exists());

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(!path.exists());
    assert_eq!(service.store().list_backups().unwrap().len(), 1);
}
