//! Flavor administration

use shared::error::{AppError, ErrorCode};
use shared::models::{DEFAULT_PASTEL_PRICE_CENTS, Flavor, FlavorCreate, FlavorRemoval, FlavorUpdate};
use shared::validation::require_name;

use super::parse_id;
use crate::error::{ServiceResult, step};
use crate::live::CatalogEvent;
use crate::state::AppState;

fn duplicate() -> AppError {
    AppError::duplicate_name("Já existe um sabor ativo com este nome")
}

fn check_price(price_cents: Option<i64>) -> Result<(), AppError> {
    match price_cents {
        Some(p) if p < 0 => Err(AppError::validation("Preço não pode ser negativo")
            .with_detail("field", "price_cents")),
        _ => Ok(()),
    }
}

/// Flavors ordered by name
pub async fn list(state: &AppState, active_only: bool) -> ServiceResult<Vec<Flavor>> {
    let store = state.store.as_ref();
    state
        .retry
        .read(move || store.list_flavors(active_only))
        .await
        .map_err(step(ErrorCode::FetchError))
}

pub async fn create(state: &AppState, data: &FlavorCreate) -> ServiceResult<Flavor> {
    let store = state.store.as_ref();
    let name = require_name(data.name.as_deref().unwrap_or(""), "name")?;
    check_price(data.price_cents)?;

    let exists = {
        let name = name.as_str();
        state
            .retry
            .read(move || store.active_flavor_name_exists(name, None))
            .await
            .map_err(step(ErrorCode::CheckError))?
    };
    if exists {
        return Err(duplicate().into());
    }

    let price_cents = match data.price_cents {
        Some(price) => price,
        None => match state.retry.read(move || store.get_settings()).await {
            Ok(Some(settings)) => settings.pastel_price_cents,
            Ok(None) => DEFAULT_PASTEL_PRICE_CENTS,
            Err(e) => {
                tracing::warn!(error = %e, "Settings unavailable, using the default flavor price");
                DEFAULT_PASTEL_PRICE_CENTS
            }
        },
    };

    let flavor = state
        .retry
        .write(store.insert_flavor(&name, price_cents))
        .await
        .map_err(step(ErrorCode::InsertError))?;

    tracing::info!(flavor_id = %flavor.id, name = %flavor.name, price_cents, "Flavor created");
    state.hub.publish(CatalogEvent::FlavorsChanged);
    Ok(flavor)
}

pub async fn update(state: &AppState, raw_id: &str, data: &FlavorUpdate) -> ServiceResult<Flavor> {
    let store = state.store.as_ref();
    let id = parse_id(raw_id, "Sabor")?;

    let name = data
        .name
        .as_deref()
        .map(|n| require_name(n, "name"))
        .transpose()?;
    check_price(data.price_cents)?;

    let current = state
        .retry
        .read(move || store.get_flavor(id))
        .await
        .map_err(step(ErrorCode::FetchError))?
        .ok_or_else(|| AppError::not_found("Sabor"))?;

    // Renaming an active flavor or reactivating one must not collide with another active flavor
    let final_name = name.as_deref().unwrap_or(&current.name);
    let will_be_active = data.active.unwrap_or(current.active);
    let renamed = final_name.to_lowercase() != current.name.to_lowercase();
    let reactivated = will_be_active && !current.active;
    if will_be_active && (renamed || reactivated) {
        let exists = state
            .retry
            .read(move || store.active_flavor_name_exists(final_name, Some(id)))
            .await
            .map_err(step(ErrorCode::CheckError))?;
        if exists {
            return Err(duplicate().into());
        }
    }

    let patch = FlavorUpdate {
        name,
        price_cents: data.price_cents,
        active: data.active,
    };
    let flavor = state
        .retry
        .write(store.update_flavor(id, &patch))
        .await
        .map_err(step(ErrorCode::UpdateError))?
        .ok_or_else(|| AppError::not_found("Sabor"))?;

    tracing::info!(flavor_id = %id, active = flavor.active, "Flavor updated");
    state.hub.publish(CatalogEvent::FlavorsChanged);
    Ok(flavor)
}

/// Delete a flavor, or deactivate it when order lines reference it
pub async fn remove(state: &AppState, raw_id: &str) -> ServiceResult<FlavorRemoval> {
    let store = state.store.as_ref();
    let id = parse_id(raw_id, "Sabor")?;

    state
        .retry
        .read(move || store.get_flavor(id))
        .await
        .map_err(step(ErrorCode::FetchError))?
        .ok_or_else(|| AppError::not_found("Sabor"))?;

    let in_use = state
        .retry
        .read(move || store.flavor_has_order_items(id))
        .await
        .map_err(step(ErrorCode::CheckError))?;

    let removal = if in_use {
        let patch = FlavorUpdate {
            active: Some(false),
            ..Default::default()
        };
        let flavor = state
            .retry
            .write(store.update_flavor(id, &patch))
            .await
            .map_err(step(ErrorCode::DeactivateError))?
            .ok_or_else(|| AppError::not_found("Sabor"))?;
        tracing::info!(flavor_id = %id, "Flavor has order history, deactivated instead of deleted");
        FlavorRemoval::Deactivated { flavor }
    } else {
        let deleted = state
            .retry
            .write(store.delete_flavor(id))
            .await
            .map_err(step(ErrorCode::DeleteError))?;
        if !deleted {
            return Err(AppError::not_found("Sabor").into());
        }
        tracing::info!(flavor_id = %id, "Flavor deleted");
        FlavorRemoval::Deleted { id }
    };

    state.hub.publish(CatalogEvent::FlavorsChanged);
    Ok(removal)
}

