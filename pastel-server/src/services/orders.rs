//! Order submission and status updates
//!
//! Submission validates in a fixed order and fails fast:
//!
//! ```text
//! required fields ─► vendor active ─► flavors active ─► quantities ─► unit price
//!   VALIDATION_ERROR   INVALID_VENDOR   INVALID_FLAVORS  INVALID_QUANTITY  SETTINGS_ERROR
//! ```
//!
//! It then writes customer → order → items. Items failing after the order row
//! exists trigger a compensating delete of that order. Writes are run once
//! under the deadline and never retried.

use std::collections::BTreeSet;

use shared::error::{AppError, ErrorCode};
use shared::order::{
    CreateOrderRequest, CreateOrderResponse, LineRequest, OrderItemInput, PaymentMethod,
    SaleRecord, UpdateStatusRequest, UpdateStatusResponse, initial_status, parse_status,
    price_lines, validate_quantity,
};
use shared::session::VendorSession;
use shared::validation::{MAX_NAME_LEN, normalize_phone, validate_required_text};
use uuid::Uuid;

use super::parse_id;
use super::session::scoped_vendor_id;
use crate::db::NewOrder;
use crate::error::{ServiceError, ServiceResult, step};
use crate::state::AppState;

/// Request fields after the presence checks
#[derive(Debug)]
struct Submission<'a> {
    vendor_id: &'a str,
    customer_name: String,
    customer_phone: Option<String>,
    items: &'a [OrderItemInput],
    payment_method: PaymentMethod,
}

fn require_fields<'a>(
    request: &'a CreateOrderRequest,
    vendor_id: Option<&'a str>,
) -> Result<Submission<'a>, AppError> {
    let vendor_id = vendor_id.map(str::trim).unwrap_or("");
    let customer_name = request
        .customer
        .as_ref()
        .and_then(|c| c.name.as_deref())
        .map(str::trim)
        .unwrap_or("");
    let items = request.items.as_deref().unwrap_or(&[]);

    let mut missing = Vec::new();
    if vendor_id.is_empty() {
        missing.push(("vendor_id", "Vendedor é obrigatório"));
    }
    if customer_name.is_empty() {
        missing.push(("customer_name", "Nome do cliente é obrigatório"));
    }
    if items.is_empty() {
        missing.push(("items", "Adicione pelo menos um item"));
    }
    if request.payment_method.is_none() {
        missing.push(("payment_method", "Forma de pagamento é obrigatória"));
    }

    let Some(payment_method) = request.payment_method.filter(|_| missing.is_empty()) else {
        let err = missing.into_iter().fold(
            AppError::validation("Campos obrigatórios ausentes"),
            |err, (field, msg)| err.with_detail(field, msg),
        );
        return Err(err);
    };

    validate_required_text(customer_name, "customer_name", MAX_NAME_LEN)?;
    let phone = request.customer.as_ref().and_then(|c| c.normalized_phone());

    Ok(Submission {
        vendor_id,
        customer_name: customer_name.to_string(),
        customer_phone: normalize_phone(phone, "customer_phone")?,
        items,
        payment_method,
    })
}

/// Parse every requested flavor id; the result keeps request order.
fn parse_flavor_ids(items: &[OrderItemInput]) -> Result<Vec<Uuid>, AppError> {
    items
        .iter()
        .map(|item| {
            item.flavor_id
                .as_deref()
                .and_then(|raw| Uuid::parse_str(raw.trim()).ok())
                .ok_or_else(|| AppError::new(ErrorCode::InvalidFlavors))
        })
        .collect()
}

/// Submit an order. Returns the re-read order with its frozen prices.
///
/// With a vendor session the order is placed for the session's vendor.
pub async fn submit_order(
    state: &AppState,
    session: Option<&VendorSession>,
    request: &CreateOrderRequest,
) -> ServiceResult<CreateOrderResponse> {
    let store = state.store.as_ref();
    let scoped = scoped_vendor_id(session, request.vendor_id.as_deref())?;
    let submission = require_fields(request, scoped.as_deref())?;

    // Vendor
    let vendor_id = Uuid::parse_str(submission.vendor_id)
        .map_err(|_| AppError::new(ErrorCode::InvalidVendor))?;
    let vendor = state
        .retry
        .read(move || store.get_vendor(vendor_id))
        .await
        .map_err(step(ErrorCode::FetchError))?;
    if !vendor.is_some_and(|v| v.active) {
        return Err(AppError::new(ErrorCode::InvalidVendor).into());
    }

    // Flavors: every distinct requested id must be an active flavor
    let flavor_ids = parse_flavor_ids(submission.items)?;
    let distinct: Vec<Uuid> = flavor_ids.iter().copied().collect::<BTreeSet<_>>().into_iter().collect();
    let found = {
        let ids = distinct.as_slice();
        state
            .retry
            .read(move || store.find_active_flavors(ids))
            .await
            .map_err(step(ErrorCode::FetchError))?
    };
    if found.len() != distinct.len() {
        let missing: Vec<String> = distinct
            .iter()
            .filter(|id| !found.iter().any(|f| f.id == **id))
            .map(Uuid::to_string)
            .collect();
        return Err(AppError::new(ErrorCode::InvalidFlavors)
            .with_detail("flavor_ids", missing.join(","))
            .into());
    }

    // Quantities
    let lines = flavor_ids
        .iter()
        .zip(submission.items)
        .map(|(&flavor_id, item)| {
            validate_quantity(item.quantity).map(|quantity| LineRequest { flavor_id, quantity })
        })
        .collect::<Result<Vec<_>, _>>()?;

    // Unit price, frozen for every line of this order
    let settings = state
        .retry
        .read(move || store.get_settings())
        .await
        .map_err(step(ErrorCode::SettingsError))?
        .ok_or_else(|| AppError::new(ErrorCode::SettingsError))?;
    let priced = price_lines(&lines, settings.pastel_price_cents)?;

    // Customer: first match by phone, else a new row
    let existing = match submission.customer_phone.as_deref() {
        Some(phone) => state
            .retry
            .read(move || store.find_customer_by_phone(phone))
            .await
            .map_err(step(ErrorCode::CustomerError))?,
        None => None,
    };
    let customer = match existing {
        Some(customer) => customer,
        None => state
            .retry
            .write(store.insert_customer(
                &submission.customer_name,
                submission.customer_phone.as_deref(),
            ))
            .await
            .map_err(step(ErrorCode::CustomerError))?,
    };

    let order = state
        .retry
        .write(store.insert_order(&NewOrder {
            vendor_id,
            customer_id: Some(customer.id),
            status: initial_status(request.mark_as_paid),
            payment_method: submission.payment_method,
            total_cents: priced.total_cents,
        }))
        .await
        .map_err(step(ErrorCode::OrderError))?;

    let items = priced.to_items(order.id);
    if let Err(e) = state.retry.write(store.insert_order_items(&items)).await {
        tracing::error!(order_id = %order.id, error = %e, "Order items insert failed, rolling back order");
        compensate(state, order.id).await;
        return Err(ServiceError::Store {
            code: ErrorCode::OrderItemsError,
            source: e,
        });
    }

    let order_id = order.id;
    let sale = state
        .retry
        .read(move || store.get_sale(order_id))
        .await
        .map_err(step(ErrorCode::FetchError))?
        .ok_or_else(|| AppError::new(ErrorCode::FetchError))?;

    tracing::info!(
        order_id = %sale.id,
        vendor_id = %vendor_id,
        total_cents = sale.total_cents,
        unit_price_cents = priced.unit_price_cents,
        lines = sale.items.len(),
        status = %sale.status,
        "Order created"
    );
    Ok(CreateOrderResponse::from(&sale))
}

/// Undo the order row of a failed submission
async fn compensate(state: &AppState, order_id: Uuid) {
    let store = state.store.as_ref();
    // delete is idempotent, so it takes the retrying path
    match state.retry.read(move || store.delete_order(order_id)).await {
        Ok(true) => tracing::info!(order_id = %order_id, "Rolled back order"),
        Ok(false) => tracing::warn!(order_id = %order_id, "Order to roll back was already gone"),
        Err(e) => {
            tracing::error!(order_id = %order_id, error = %e, "Rollback failed, order row left behind")
        }
    }
}

/// Full order with lines
pub async fn get_order(state: &AppState, raw_id: &str) -> ServiceResult<SaleRecord> {
    let store = state.store.as_ref();
    let id = parse_id(raw_id, "Pedido")?;
    state
        .retry
        .read(move || store.get_sale(id))
        .await
        .map_err(step(ErrorCode::FetchError))?
        .ok_or_else(|| AppError::not_found("Pedido").into())
}

/// Change an order's status under the configured transition policy
pub async fn update_status(
    state: &AppState,
    raw_id: &str,
    request: &UpdateStatusRequest,
) -> ServiceResult<UpdateStatusResponse> {
    let store = state.store.as_ref();
    let status = parse_status(request.status.as_deref())?;
    let id = parse_id(raw_id, "Pedido")?;

    let current = state
        .retry
        .read(move || store.get_order(id))
        .await
        .map_err(step(ErrorCode::FetchError))?
        .ok_or_else(|| AppError::not_found("Pedido"))?;

    let policy = state.transition_policy;
    policy.check(current.status, status)?;

    let guard = policy.guard(current.status);
    let Some(updated) = state
        .retry
        .write(store.update_order_status(id, guard, status))
        .await
        .map_err(step(ErrorCode::UpdateError))?
    else {
        if guard.is_some() {
            // Status changed between the read and the write
            tracing::warn!(order_id = %id, from = %current.status, to = %status, "Order status changed concurrently");
            return Err(AppError::new(ErrorCode::InvalidTransition)
                .with_detail("from", current.status.as_str())
                .with_detail("to", status.as_str())
                .into());
        }
        return Err(AppError::not_found("Pedido").into());
    };

    tracing::info!(
        order_id = %id,
        from = %current.status,
        to = %updated.status,
        "Order status updated"
    );
    Ok(UpdateStatusResponse {
        order_id: updated.id,
        status: updated.status,
        previous_status: current.status,
    })
}
