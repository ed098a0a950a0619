//! Application state

use chrono_tz::Tz;
use shared::order::TransitionPolicy;
use std::sync::Arc;

use crate::auth::SessionRegistry;
use crate::blob::{BlobStore, LocalBlobStore};
use crate::config::Config;
use crate::db::{MemoryStore, PgStore, Store};
use crate::live::ChangeHub;
use crate::retry::RetryPolicy;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Relational store (PostgreSQL or in-memory)
    pub store: Arc<dyn Store>,
    /// Public asset storage (PIX QR images)
    pub blobs: Arc<dyn BlobStore>,
    /// Catalog change notifications
    pub hub: ChangeHub,
    /// Vendor sessions
    pub sessions: SessionRegistry,
    pub retry: RetryPolicy,
    pub transition_policy: TransitionPolicy,
    pub business_tz: Tz,
    /// HS256 secret for admin tokens
    pub admin_jwt_secret: String,
}

impl AppState {
    /// Connect to the configured store and seed the settings row
    pub async fn new(config: &Config) -> Result<Self, BoxError> {
        let store: Arc<dyn Store> = match &config.database_url {
            Some(url) => {
                let store = PgStore::connect(url, config.request_timeout).await?;
                tracing::info!("Connected to PostgreSQL, migrations applied");
                Arc::new(store)
            }
            None => {
                tracing::warn!("DATABASE_URL not set, using the in-memory store");
                Arc::new(MemoryStore::new())
            }
        };
        Self::with_store(config, store).await
    }

    pub async fn with_store(config: &Config, store: Arc<dyn Store>) -> Result<Self, BoxError> {
        let blobs: Arc<dyn BlobStore> = Arc::new(LocalBlobStore::new(
            config.storage_dir.clone(),
            config.public_assets_url.clone(),
        ));
        Self::from_parts(config, store, blobs).await
    }

    pub async fn from_parts(
        config: &Config,
        store: Arc<dyn Store>,
        blobs: Arc<dyn BlobStore>,
    ) -> Result<Self, BoxError> {
        let settings = store
            .ensure_settings(config.default_pastel_price_cents)
            .await?;
        tracing::info!(
            pastel_price_cents = settings.pastel_price_cents,
            "Settings row ready"
        );

        let transition_policy = TransitionPolicy::from_strict_flag(config.strict_status_transitions);
        if transition_policy == TransitionPolicy::Strict {
            tracing::info!("Strict order status transitions enabled");
        }

        Ok(Self {
            store,
            blobs,
            hub: ChangeHub::new(),
            sessions: SessionRegistry::new(config.vendor_session_ttl),
            retry: RetryPolicy::from_config(config),
            transition_policy,
            business_tz: config.business_timezone,
            admin_jwt_secret: config.admin_jwt_secret.clone(),
        })
    }
}
