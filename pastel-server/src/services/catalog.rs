//! Catalog snapshot: active flavors + current price, always read live

use shared::catalog::CatalogSnapshot;
use shared::error::{AppError, ErrorCode};

use crate::error::{ServiceResult, step};
use crate::state::AppState;

pub async fn snapshot(state: &AppState) -> ServiceResult<CatalogSnapshot> {
    let store = state.store.as_ref();

    let flavors = state
        .retry
        .read(move || store.list_flavors(true))
        .await
        .map_err(step(ErrorCode::FetchError))?;
    let settings = state
        .retry
        .read(move || store.get_settings())
        .await
        .map_err(step(ErrorCode::SettingsError))?
        .ok_or_else(|| AppError::new(ErrorCode::SettingsError))?;

    let qr_url = settings
        .pix_qr_image_path
        .as_deref()
        .map(|path| state.blobs.public_url(path));
    Ok(CatalogSnapshot::new(flavors, &settings).with_pix_qr_url(qr_url))
}
