#![allow(dead_code)]

use std::path::PathBuf;

use chrono::{Local, TimeZone};
use receiptgen::rendering::font::FontResource;
use receiptgen::ReceiptDocument;

/// Path of a TrueType font usable in tests, if this machine has one.
pub fn font_path() -> Option<PathBuf> {
    std::env::var("RECEIPT_TEST_FONT")
        .ok()
        .map(PathBuf::from)
        .into_iter()
        .chain(
            [
                "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
                "/usr/share/fonts/TTF/DejaVuSans.ttf",
                "/usr/share/fonts/dejavu/DejaVuSans.ttf",
            ]
            .into_iter()
            .map(PathBuf::from),
        )
        .find(|p| p.exists())
}

pub fn font() -> Option<FontResource> {
    font_path().and_then(|p| FontResource::load(&p).ok())
}

pub fn document() -> ReceiptDocument {
    ReceiptDocument {
        id: "NO101202509".into(),
        rent: "1500.00".into(),
        rent_zh: "壹仟伍佰元整".into(),
        room_number: "101".into(),
        recipient: "张三".into(),
        payer: "李四".into(),
        date: "2025-09-21".into(),
        month: "2025年9月".into(),
        purpose: "房租".into(),
        created_at: Local.with_ymd_and_hms(2025, 9, 21, 21, 42, 2).single().unwrap(),
    }
}
