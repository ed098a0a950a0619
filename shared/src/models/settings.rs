//! App Settings Model (singleton row, id = 1)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fixed primary key of the settings row
pub const SETTINGS_ID: i32 = 1;

/// Fallback unit price when nothing else is configured
pub const DEFAULT_PASTEL_PRICE_CENTS: i64 = 500;

/// Application settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct AppSettings {
    pub id: i32,
    /// Current unit price, frozen into each order at submission
    pub pastel_price_cents: i64,
    /// Blob store path of the PIX QR code image
    pub pix_qr_image_path: Option<String>,
    /// PIX key shown next to the QR code
    pub pix_key_text: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Update settings payload
///
/// For the optional text fields, `null` or `""` clears the value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsUpdate {
    pub pastel_price_cents: Option<i64>,
    #[serde(default, deserialize_with = "crate::util::double_option")]
    pub pix_qr_image_path: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::util::double_option")]
    pub pix_key_text: Option<Option<String>>,
}

/// Response of the QR upload endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedAsset {
    pub path: String,
    pub url: String,
}
