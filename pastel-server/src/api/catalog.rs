//! Catalog snapshot and live change stream

use std::convert::Infallible;

use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::IntoResponse;
use axum::{Json, Router, extract::State, routing::get};
use futures::{Stream, StreamExt, stream};
use shared::error::AppError;

use super::NO_STORE;
use crate::live::CatalogEvent;
use crate::services;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/catalog", get(get_catalog))
        .route("/api/catalog/events", get(catalog_events))
}

/// GET /api/catalog
pub async fn get_catalog(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let snapshot = services::catalog::snapshot(&state).await?;
    Ok((NO_STORE, Json(snapshot)))
}

fn to_sse(event: CatalogEvent) -> Event {
    let data = serde_json::json!({ "type": event.name() }).to_string();
    Event::default().event(event.name()).data(data)
}

/// GET /api/catalog/events: one SSE message per catalog change
///
/// The subscription lives inside the stream and is cancelled when the client
/// disconnects.
pub async fn catalog_events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (tx, rx) = futures::channel::mpsc::unbounded::<CatalogEvent>();
    let subscription = state.hub.subscribe(move |event| {
        let _ = tx.unbounded_send(event);
    });
    tracing::debug!(subscribers = state.hub.subscriber_count(), "Catalog stream opened");

    let ready = stream::once(async { Ok::<_, Infallible>(Event::default().event("ready").data("{}")) });
    let changes = rx.map(move |event| {
        let _held = &subscription;
        Ok(to_sse(event))
    });

    Sse::new(ready.chain(changes)).keep_alive(KeepAlive::default())
}
