//! Vendor administration. Vendors are deactivated, never deleted.

use shared::error::{AppError, ErrorCode};
use shared::models::{Vendor, VendorCreate, VendorUpdate};
use shared::validation::{normalize_phone, require_name};

use super::parse_id;
use crate::error::{ServiceResult, step};
use crate::state::AppState;

fn duplicate() -> AppError {
    AppError::duplicate_name("Já existe um vendedor ativo com este nome")
}

pub async fn list(state: &AppState, include_inactive: bool) -> ServiceResult<Vec<Vendor>> {
    let store = state.store.as_ref();
    state
        .retry
        .read(move || store.list_vendors(include_inactive))
        .await
        .map_err(step(ErrorCode::FetchError))
}

pub async fn get(state: &AppState, raw_id: &str) -> ServiceResult<Vendor> {
    let store = state.store.as_ref();
    let id = parse_id(raw_id, "Vendedor")?;
    state
        .retry
        .read(move || store.get_vendor(id))
        .await
        .map_err(step(ErrorCode::FetchError))?
        .ok_or_else(|| AppError::not_found("Vendedor").into())
}

pub async fn create(state: &AppState, data: &VendorCreate) -> ServiceResult<Vendor> {
    let store = state.store.as_ref();
    let name = require_name(data.name.as_deref().unwrap_or(""), "name")?;
    let phone = normalize_phone(data.phone.as_deref(), "phone")?;

    let exists = {
        let name = name.as_str();
        state
            .retry
            .read(move || store.active_vendor_name_exists(name, None))
            .await
            .map_err(step(ErrorCode::CheckError))?
    };
    if exists {
        return Err(duplicate().into());
    }

    let vendor = state
        .retry
        .write(store.insert_vendor(&name, phone.as_deref()))
        .await
        .map_err(step(ErrorCode::InsertError))?;

    tracing::info!(vendor_id = %vendor.id, name = %vendor.name, "Vendor created");
    Ok(vendor)
}

pub async fn update(state: &AppState, raw_id: &str, data: &VendorUpdate) -> ServiceResult<Vendor> {
    let store = state.store.as_ref();
    let id = parse_id(raw_id, "Vendedor")?;

    let name = data
        .name
        .as_deref()
        .map(|n| require_name(n, "name"))
        .transpose()?;
    // null and "" both clear the phone
    let phone = match &data.phone {
        Some(raw) => Some(normalize_phone(raw.as_deref(), "phone")?),
        None => None,
    };

    let current = state
        .retry
        .read(move || store.get_vendor(id))
        .await
        .map_err(step(ErrorCode::FetchError))?
        .ok_or_else(|| AppError::not_found("Vendedor"))?;

    let final_name = name.as_deref().unwrap_or(&current.name);
    let will_be_active = data.active.unwrap_or(current.active);
    let renamed = final_name.to_lowercase() != current.name.to_lowercase();
    if will_be_active && (renamed || !current.active) {
        let exists = state
            .retry
            .read(move || store.active_vendor_name_exists(final_name, Some(id)))
            .await
            .map_err(step(ErrorCode::CheckError))?;
        if exists {
            return Err(duplicate().into());
        }
    }

    let patch = VendorUpdate {
        name,
        phone,
        active: data.active,
    };
    let vendor = state
        .retry
        .write(store.update_vendor(id, &patch))
        .await
        .map_err(step(ErrorCode::UpdateError))?
        .ok_or_else(|| AppError::not_found("Vendedor"))?;

    tracing::info!(vendor_id = %id, active = vendor.active, "Vendor updated");
    Ok(vendor)
}
