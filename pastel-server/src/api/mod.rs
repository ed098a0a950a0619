//! HTTP API
//!
//! Public routes serve vendors and the catalog; admin routes sit behind the
//! admin JWT middleware.

pub mod assets;
pub mod catalog;
pub mod flavors;
pub mod health;
pub mod orders;
pub mod reports;
pub mod session;
pub mod settings;
pub mod vendors;

use axum::extract::{DefaultBodyLimit, FromRequest};
use axum::{Router, middleware};
use http::{HeaderName, HeaderValue, header};
use shared::error::AppError;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::auth::admin_auth_middleware;
use crate::services::settings::MAX_QR_IMAGE_BYTES;
use crate::state::AppState;

/// JSON body whose rejections use the API error shape
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Headers for responses that must always reflect live data
pub(crate) const NO_STORE: [(HeaderName, &str); 1] = [(header::CACHE_CONTROL, "no-store")];

const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// All routes, without state or outer middleware
pub fn build_router(state: &AppState) -> Router<AppState> {
    let public = Router::new()
        .merge(health::router())
        .merge(catalog::router())
        .merge(orders::router())
        .merge(flavors::router())
        .merge(vendors::router())
        .merge(settings::router())
        .merge(reports::router())
        .merge(session::router())
        .merge(assets::router());

    let admin = Router::new()
        .merge(orders::admin_router())
        .merge(flavors::admin_router())
        .merge(vendors::admin_router())
        .merge(settings::admin_router())
        .merge(reports::admin_router())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            admin_auth_middleware,
        ));

    public.merge(admin)
}

/// Fully configured application
pub fn build_app(state: AppState) -> Router {
    build_router(&state)
        // multipart overhead on top of the largest accepted image
        .layer(DefaultBodyLimit::max(MAX_QR_IMAGE_BYTES + 64 * 1024))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(REQUEST_ID_HEADER)))
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static(REQUEST_ID_HEADER),
            XRequestId,
        ))
        .with_state(state)
}
