//! Turn a raw `ReceiptRequest` into canonical `ReceiptDocument` data.
//!
//! Normalization never fails: blank optional fields are resolved to the
//! current date, the current month or the configured default purpose, and
//! the identifier falls back to the current month when the label does not
//! parse. Time is read through [`Clock`] so the result is reproducible under
//! a [`FixedClock`].

use std::sync::Arc;

use chrono::{DateTime, Local};
use rust_decimal::RoundingStrategy;

use crate::identifier::receipt_id_with_clock;
use crate::model::{ReceiptDocument, ReceiptRequest};
use crate::numeral::amount_to_chinese;

/// Fallback purpose when the request leaves it blank
pub const DEFAULT_PURPOSE: &str = "房租";

/// Source of the current local time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;
}

/// Wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// A clock frozen at a single instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Local>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Local> {
        self.0
    }
}

#[derive(Clone)]
pub struct Normalizer {
    clock: Arc<dyn Clock>,
    default_purpose: String,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock), DEFAULT_PURPOSE)
    }
}

impl Normalizer {
    pub fn new(clock: Arc<dyn Clock>, default_purpose: impl Into<String>) -> Self {
        Self {
            clock,
            default_purpose: default_purpose.into(),
        }
    }

    pub fn normalize(&self, req: &ReceiptRequest) -> ReceiptDocument {
        let now = self.clock.now();
        let rent = req
            .rent
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);

        let date = resolve(&req.date).unwrap_or_else(|| now.format("%Y-%m-%d").to_string());
        let month = resolve(&req.month).unwrap_or_else(|| now.format("%Y年%m月").to_string());
        let purpose = resolve(&req.purpose).unwrap_or_else(|| self.default_purpose.clone());
        let id = receipt_id_with_clock(&req.room_number, &month, self.clock.as_ref());

        ReceiptDocument {
            id,
            rent: format!("{:.2}", rent),
            rent_zh: amount_to_chinese(req.rent),
            room_number: req.room_number.clone(),
            recipient: req.recipient.clone(),
            payer: req.payer.clone(),
            date,
            month,
            purpose,
            created_at: now,
        }
    }
}

/// Normalize with the system clock and the default purpose.
pub fn normalize(req: &ReceiptRequest) -> ReceiptDocument {
    Normalizer::default().normalize(req)
}

fn resolve(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
