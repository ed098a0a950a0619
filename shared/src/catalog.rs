//! Catalog snapshot: active flavors plus the current unit price

use crate::models::{AppSettings, Flavor};
use crate::util::cmp_names;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Read-only view of what a vendor can sell right now
///
/// Built fresh from storage on every read; nothing here is cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    /// Active flavors, ordered by name
    pub flavors: Vec<Flavor>,
    /// `AppSettings.pastel_price_cents` at read time
    pub unit_price_cents: i64,
    /// PIX key to display at checkout
    pub pix_key_text: Option<String>,
    /// Public URL of the PIX QR code image
    pub pix_qr_url: Option<String>,
}

impl CatalogSnapshot {
    /// Build a snapshot, keeping only active flavors sorted by name.
    pub fn new(mut flavors: Vec<Flavor>, settings: &AppSettings) -> Self {
        flavors.retain(|f| f.active);
        flavors.sort_by(|a, b| cmp_names(&a.name, &b.name));
        Self {
            flavors,
            unit_price_cents: settings.pastel_price_cents,
            pix_key_text: settings.pix_key_text.clone(),
            pix_qr_url: None,
        }
    }

    pub fn with_pix_qr_url(mut self, url: Option<String>) -> Self {
        self.pix_qr_url = url;
        self
    }

    pub fn list_active_flavors(&self) -> &[Flavor] {
        &self.flavors
    }

    pub fn current_unit_price(&self) -> i64 {
        self.unit_price_cents
    }

    pub fn flavor(&self, id: Uuid) -> Option<&Flavor> {
        self.flavors.iter().find(|f| f.id == id)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::models::SETTINGS_ID;
    use chrono::Utc;

    pub fn flavor(name: &str, price_cents: i64, active: bool) -> Flavor {
        let now = Utc::now();
        Flavor {
            id: Uuid::new_v4(),
            name: name.to_string(),
            price_cents,
            active,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn settings(price_cents: i64) -> AppSettings {
        AppSettings {
            id: SETTINGS_ID,
            pastel_price_cents: price_cents,
            pix_qr_image_path: None,
            pix_key_text: Some("chave@pix".to_string()),
            updated_at: Utc::now(),
        }
    }
}
