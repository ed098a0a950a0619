//! Sales reports
//!
//! Two read paths share one filter:
//! - listing: one page plus `total_count` under the same filter
//! - summary: a full scan of the filtered set fed to the pure aggregation

use chrono::Utc;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use shared::error::{AppError, ErrorCode};
use shared::order::SaleRecord;
use shared::report::{SalesSummary, local_day_bounds, parse_end_bound, parse_start_bound, summarize};
use shared::session::VendorSession;
use uuid::Uuid;

use super::session::scoped_vendor_id;
use crate::db::{OrderFilter, Page};
use crate::error::{ServiceResult, step};
use crate::state::AppState;

pub const DEFAULT_PAGE_LIMIT: i64 = 50;
pub const MAX_PAGE_LIMIT: i64 = 200;

/// Raw query string of the report endpoints
///
/// Values stay strings so malformed input maps to `VALIDATION_ERROR`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportQuery {
    pub vendor_id: Option<String>,
    pub flavor_id: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub search: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesPage {
    pub sales: Vec<SaleRecord>,
    pub total_count: i64,
    pub limit: i64,
    pub offset: i64,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn invalid(field: &str) -> AppError {
    AppError::validation(format!("Parâmetro inválido: {field}")).with_detail("field", field)
}

fn parse_uuid(value: &Option<String>, field: &str) -> Result<Option<Uuid>, AppError> {
    non_blank(value)
        .map(|raw| Uuid::parse_str(raw).map_err(|_| invalid(field)))
        .transpose()
}

impl ReportQuery {
    /// Build the store filter; dates are read in the business timezone
    pub fn filter(&self, tz: Tz) -> Result<OrderFilter, AppError> {
        let created_from = non_blank(&self.start_date)
            .map(|raw| parse_start_bound(raw, tz).ok_or_else(|| invalid("start_date")))
            .transpose()?;
        let created_before = non_blank(&self.end_date)
            .map(|raw| parse_end_bound(raw, tz).ok_or_else(|| invalid("end_date")))
            .transpose()?;

        Ok(OrderFilter {
            vendor_id: parse_uuid(&self.vendor_id, "vendor_id")?,
            flavor_id: parse_uuid(&self.flavor_id, "flavor_id")?,
            created_from,
            created_before,
            search: non_blank(&self.search).map(str::to_lowercase),
        })
    }

    /// Limit clamped to `1..=MAX_PAGE_LIMIT`, offset ≥ 0
    pub fn page(&self) -> Result<Page, AppError> {
        let limit = match non_blank(&self.limit) {
            Some(raw) => raw.parse::<i64>().map_err(|_| invalid("limit"))?,
            None => DEFAULT_PAGE_LIMIT,
        };
        let offset = match non_blank(&self.offset) {
            Some(raw) => raw.parse::<i64>().map_err(|_| invalid("offset"))?,
            None => 0,
        };
        Ok(Page {
            limit: limit.clamp(1, MAX_PAGE_LIMIT),
            offset: offset.max(0),
        })
    }
}

async fn list(state: &AppState, filter: &OrderFilter, page: Page) -> ServiceResult<SalesPage> {
    let store = state.store.as_ref();

    let total_count = state
        .retry
        .read(move || store.count_sales(filter))
        .await
        .map_err(step(ErrorCode::CountError))?;
    let sales = state
        .retry
        .read(move || store.list_sales(filter, page))
        .await
        .map_err(step(ErrorCode::FetchError))?;

    Ok(SalesPage {
        sales,
        total_count,
        limit: page.limit,
        offset: page.offset,
    })
}

async fn summary(state: &AppState, filter: &OrderFilter) -> ServiceResult<SalesSummary> {
    let store = state.store.as_ref();
    let records = state
        .retry
        .read(move || store.scan_sales(filter))
        .await
        .map_err(step(ErrorCode::FetchError))?;

    let today = local_day_bounds(Utc::now(), state.business_tz);
    tracing::debug!(orders = records.len(), "Summarizing sales");
    Ok(summarize(&records, today))
}

/// Vendor-scoped filter: the session's vendor, else a required `vendor_id`
/// naming an existing vendor
async fn vendor_filter(
    state: &AppState,
    session: Option<&VendorSession>,
    query: &ReportQuery,
) -> ServiceResult<OrderFilter> {
    let scoped = scoped_vendor_id(session, query.vendor_id.as_deref())?;
    let Some(raw) = scoped.as_deref() else {
        return Err(AppError::validation("vendor_id é obrigatório")
            .with_detail("field", "vendor_id")
            .into());
    };
    let vendor_id = Uuid::parse_str(raw).map_err(|_| AppError::new(ErrorCode::InvalidVendor))?;

    let store = state.store.as_ref();
    let vendor = state
        .retry
        .read(move || store.get_vendor(vendor_id))
        .await
        .map_err(step(ErrorCode::FetchError))?;
    if vendor.is_none() {
        return Err(AppError::new(ErrorCode::InvalidVendor).into());
    }

    let mut filter = query.filter(state.business_tz)?;
    filter.vendor_id = Some(vendor_id);
    Ok(filter)
}

pub async fn admin_sales(state: &AppState, query: &ReportQuery) -> ServiceResult<SalesPage> {
    let filter = query.filter(state.business_tz)?;
    let page = query.page()?;
    list(state, &filter, page).await
}

pub async fn admin_summary(state: &AppState, query: &ReportQuery) -> ServiceResult<SalesSummary> {
    let filter = query.filter(state.business_tz)?;
    summary(state, &filter).await
}

pub async fn vendor_sales(
    state: &AppState,
    session: Option<&VendorSession>,
    query: &ReportQuery,
) -> ServiceResult<SalesPage> {
    let filter = vendor_filter(state, session, query).await?;
    let page = query.page()?;
    list(state, &filter, page).await
}

pub async fn vendor_summary(
    state: &AppState,
    session: Option<&VendorSession>,
    query: &ReportQuery,
) -> ServiceResult<SalesSummary> {
    let filter = vendor_filter(state, session, query).await?;
    summary(state, &filter).await
}
