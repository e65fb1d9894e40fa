//! Receipt request, canonical receipt data and rendered artifacts

use chrono::{DateTime, Local};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Inbound receipt payload.
///
/// `rent`, `room_number`, `recipient` and `payer` are mandatory; the rest
/// are resolved to defaults during normalization when absent or blank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptRequest {
    /// Amount received; accepts a JSON number or a numeric string
    pub rent: Decimal,
    pub room_number: String,
    pub recipient: String,
    pub payer: String,
    /// Receipt date, expected as `YYYY-MM-DD`
    #[serde(default)]
    pub date: Option<String>,
    /// Month the payment covers, expected as `2025年9月`
    #[serde(default)]
    pub month: Option<String>,
    #[serde(default)]
    pub purpose: Option<String>,
}

impl ReceiptRequest {
    /// Parse and validate a JSON payload.
    pub fn from_json(input: &str) -> Result<Self> {
        let req: ReceiptRequest = serde_json::from_str(input)?;
        req.validate()?;
        Ok(req)
    }

    /// Reject blank mandatory text fields.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("room_number", &self.room_number),
            ("recipient", &self.recipient),
            ("payer", &self.payer),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(Error::InvalidRequest(format!("field `{}` is required", field)));
            }
        }
        Ok(())
    }
}

/// Canonical, fully defaulted receipt data ready for layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptDocument {
    /// `NO` + room + `YYYYMM`
    pub id: String,
    /// Amount with exactly two fraction digits
    pub rent: String,
    /// Formal numeral rendering of the amount
    pub rent_zh: String,
    pub room_number: String,
    pub recipient: String,
    pub payer: String,
    pub date: String,
    pub month: String,
    pub purpose: String,
    pub created_at: DateTime<Local>,
}

/// Output format of a render
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Pdf,
    Png,
}

impl ArtifactKind {
    pub fn extension(&self) -> &'static str {
        match self {
            ArtifactKind::Pdf => "pdf",
            ArtifactKind::Png => "png",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ArtifactKind::Pdf => "application/pdf",
            ArtifactKind::Png => "image/png",
        }
    }
}

/// Encoded bytes produced by one render call
#[derive(Debug, Clone)]
pub struct RenderedArtifact {
    pub kind: ArtifactKind,
    pub data: Vec<u8>,
}

impl RenderedArtifact {
    pub fn new(kind: ArtifactKind, data: Vec<u8>) -> Self {
        Self { kind, data }
    }

    /// Lowercase hex sha-256 of the encoded bytes
    pub fn sha256_hex(&self) -> String {
        use sha2::{Digest, Sha256};
        hex::encode(Sha256::digest(&self.data))
    }
}

/// File name for an artifact: `receipt_<key>_<YYYYMMDD_HHMMSS>.<ext>`.
///
/// `key` is the room number for output files and the receipt id for backups.
/// Characters that are unsafe in a file name are replaced with `_`.
pub fn artifact_file_name(key: &str, kind: ArtifactKind, at: &DateTime<Local>) -> String {
    let key: String = key
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    format!("receipt_{}_{}.{}", key, at.format("%Y%m%d_%H%M%S"), kind.extension())
}
