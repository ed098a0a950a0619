//! Sales aggregation
//!
//! Pure functions over a set of [`SaleRecord`]s. Cancelled orders never count
//! toward any figure. Callers that want figures for a whole data set must pass
//! the whole filtered set, not a page of it.

use crate::order::SaleRecord;
use chrono::{DateTime, Days, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Per-flavor totals
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlavorRanking {
    pub flavor_name: String,
    pub quantity: i64,
    pub total_cents: i64,
}

/// KPIs over a set of orders
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesSummary {
    pub total_sales_cents: i64,
    pub total_units: i64,
    /// Non-cancelled orders
    pub order_count: usize,
    pub cancelled_count: usize,
    pub today_sales_cents: i64,
    pub today_order_count: usize,
    pub ranking: Vec<FlavorRanking>,
}

fn counted(records: &[SaleRecord]) -> impl Iterator<Item = &SaleRecord> {
    records.iter().filter(|r| r.status.counts_as_sale())
}

pub fn total_sales(records: &[SaleRecord]) -> i64 {
    counted(records).map(|r| r.total_cents).sum()
}

pub fn total_units(records: &[SaleRecord]) -> i64 {
    counted(records)
        .flat_map(|r| &r.items)
        .map(|i| i64::from(i.quantity))
        .sum()
}

/// Group lines by flavor name, sorted by quantity descending.
///
/// Ties keep the order in which flavors were first encountered.
pub fn flavor_ranking(records: &[SaleRecord]) -> Vec<FlavorRanking> {
    let mut ranking: Vec<FlavorRanking> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for line in counted(records).flat_map(|r| &r.items) {
        let slot = *index.entry(line.flavor_name.as_str()).or_insert_with(|| {
            ranking.push(FlavorRanking {
                flavor_name: line.flavor_name.clone(),
                quantity: 0,
                total_cents: 0,
            });
            ranking.len() - 1
        });
        ranking[slot].quantity += i64::from(line.quantity);
        ranking[slot].total_cents += line.line_total_cents;
    }

    ranking.sort_by(|a, b| b.quantity.cmp(&a.quantity));
    ranking
}

/// Non-cancelled orders created within `[start, end)`.
pub fn sales_between(
    records: &[SaleRecord],
    (start, end): (DateTime<Utc>, DateTime<Utc>),
) -> Vec<&SaleRecord> {
    counted(records)
        .filter(|r| r.created_at >= start && r.created_at < end)
        .collect()
}

/// Compute every KPI in one pass set. `today` is the local-day window.
pub fn summarize(records: &[SaleRecord], today: (DateTime<Utc>, DateTime<Utc>)) -> SalesSummary {
    let today_sales = sales_between(records, today);
    SalesSummary {
        total_sales_cents: total_sales(records),
        total_units: total_units(records),
        order_count: counted(records).count(),
        cancelled_count: records.len() - counted(records).count(),
        today_sales_cents: today_sales.iter().map(|r| r.total_cents).sum(),
        today_order_count: today_sales.len(),
        ranking: flavor_ranking(records),
    }
}

// ============================================================================
// Calendar helpers
// ============================================================================

/// UTC instant of local midnight starting `date` in `tz`.
pub fn start_of_local_day(date: NaiveDate, tz: Tz) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    // Midnight skipped by a DST gap: the day starts at the first valid local minute
    (0..=MINUTES_PER_DAY)
        .map(|minute| midnight + chrono::Duration::minutes(minute))
        .find_map(|local| tz.from_local_datetime(&local).earliest())
        .map(|local| local.with_timezone(&Utc))
        .unwrap_or_else(|| midnight.and_utc())
}

const MINUTES_PER_DAY: i64 = 24 * 60;

/// `[local 00:00, next local 00:00)` of the day containing `now` in `tz`.
pub fn local_day_bounds(now: DateTime<Utc>, tz: Tz) -> (DateTime<Utc>, DateTime<Utc>) {
    let today = now.with_timezone(&tz).date_naive();
    let tomorrow = today.checked_add_days(Days::new(1)).unwrap_or(NaiveDate::MAX);
    (start_of_local_day(today, tz), start_of_local_day(tomorrow, tz))
}

/// Parse a lower date bound: RFC 3339 instant or `YYYY-MM-DD` (local midnight).
pub fn parse_start_bound(raw: &str, tz: Tz) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Some(instant.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(|date| start_of_local_day(date, tz))
}

/// Parse an inclusive upper date bound into an exclusive instant.
///
/// `YYYY-MM-DD` covers the whole local day; an RFC 3339 instant includes
/// that exact microsecond.
pub fn parse_end_bound(raw: &str, tz: Tz) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return instant
            .with_timezone(&Utc)
            .checked_add_signed(chrono::Duration::microseconds(1));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.checked_add_days(Days::new(1)))
        .map(|next| start_of_local_day(next, tz))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::{OrderLine, OrderStatus, PaymentMethod};
    use chrono::TimeZone;
    use uuid::Uuid;

    const SAO_PAULO: Tz = chrono_tz::America::Sao_Paulo;

    fn line(name: &str, quantity: i32) -> OrderLine {
        OrderLine {
            flavor_id: Uuid::nil(),
            flavor_name: name.to_string(),
            quantity,
            unit_price_cents: 500,
            line_total_cents: i64::from(quantity) * 500,
        }
    }

    fn record(status: OrderStatus, created_at: DateTime<Utc>, items: Vec<OrderLine>) -> SaleRecord {
        SaleRecord {
            id: Uuid::new_v4(),
            vendor_id: Uuid::nil(),
            created_at,
            total_cents: items.iter().map(|i| i.line_total_cents).sum(),
            payment_method: PaymentMethod::Pix,
            status,
            vendor_name: "Maria".to_string(),
            customer_name: Some("Ana".to_string()),
            customer_phone: None,
            items,
        }
    }

    fn fixture() -> Vec<SaleRecord> {
        let t = Utc.with_ymd_and_hms(2024, 5, 10, 15, 0, 0).unwrap();
        vec![
            record(OrderStatus::Paid, t, vec![line("Carne", 2), line("Queijo", 1)]),
            record(OrderStatus::Completed, t, vec![line("Queijo", 2)]),
            record(OrderStatus::Created, t, vec![line("Pizza", 3)]),
            record(OrderStatus::Cancelled, t, vec![line("Carne", 10)]),
        ]
    }

    #[test]
    fn test_totals_exclude_cancelled() {
        let records = fixture();
        assert_eq!(total_sales(&records), 4000);
        assert_eq!(total_units(&records), 8);
    }

    #[test]
    fn test_cancel_flip_changes_and_reverts() {
        let mut records = fixture();
        let before = (total_sales(&records), total_units(&records));

        records[0].status = OrderStatus::Cancelled;
        assert_eq!(total_sales(&records), before.0 - 1500);
        assert_eq!(total_units(&records), before.1 - 3);

        records[0].status = OrderStatus::Paid;
        assert_eq!((total_sales(&records), total_units(&records)), before);
    }

    #[test]
    fn test_ranking_sorted_with_stable_ties() {
        let ranking = flavor_ranking(&fixture());
        let names: Vec<_> = ranking.iter().map(|r| r.flavor_name.as_str()).collect();
        // Queijo and Pizza tie at 3; Queijo was seen first
        assert_eq!(names, ["Queijo", "Pizza", "Carne"]);
        assert_eq!(ranking[0].total_cents, 1500);
        assert_eq!(ranking[2].quantity, 2);
    }

    #[test]
    fn test_local_day_bounds_sao_paulo() {
        // 01:30 UTC on the 11th is still the 10th in São Paulo (UTC-3)
        let now = Utc.with_ymd_and_hms(2024, 5, 11, 1, 30, 0).unwrap();
        let (start, end) = local_day_bounds(now, SAO_PAULO);
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 5, 10, 3, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2024, 5, 11, 3, 0, 0).unwrap());
    }

    #[test]
    fn test_summarize_today_window() {
        let mut records = fixture();
        let yesterday = Utc.with_ymd_and_hms(2024, 5, 9, 15, 0, 0).unwrap();
        records[1].created_at = yesterday;

        let now = Utc.with_ymd_and_hms(2024, 5, 10, 20, 0, 0).unwrap();
        let summary = summarize(&records, local_day_bounds(now, SAO_PAULO));

        assert_eq!(summary.total_sales_cents, 4000);
        assert_eq!(summary.order_count, 3);
        assert_eq!(summary.cancelled_count, 1);
        assert_eq!(summary.today_order_count, 2);
        assert_eq!(summary.today_sales_cents, 3000);
    }

    #[test]
    fn test_date_bounds_parsing() {
        let start = parse_start_bound("2024-05-10", SAO_PAULO).unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 5, 10, 3, 0, 0).unwrap());

        let end = parse_end_bound("2024-05-10", SAO_PAULO).unwrap();
        assert_eq!(end, Utc.with_ymd_and_hms(2024, 5, 11, 3, 0, 0).unwrap());

        let instant = parse_end_bound("2024-05-10T12:00:00Z", SAO_PAULO).unwrap();
        assert_eq!(
            instant,
            Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap() + chrono::Duration::microseconds(1)
        );

        assert!(parse_start_bound("10/05/2024", SAO_PAULO).is_none());
    }

    #[test]
    fn test_day_starting_in_dst_gap() {
        // 2018-11-04 local clocks jumped from 00:00 -03 to 01:00 -02
        let date = NaiveDate::from_ymd_opt(2018, 11, 4).unwrap();
        let start = start_of_local_day(date, SAO_PAULO);
        assert_eq!(start, Utc.with_ymd_and_hms(2018, 11, 4, 3, 0, 0).unwrap());

        let end = parse_end_bound("2018-11-03", SAO_PAULO).unwrap();
        assert_eq!(end, start);
        let late_evening = Utc.with_ymd_and_hms(2018, 11, 4, 1, 0, 0).unwrap();
        assert!(late_evening < end);

        let now = Utc.with_ymd_and_hms(2018, 11, 4, 12, 0, 0).unwrap();
        let (today_start, today_end) = local_day_bounds(now, SAO_PAULO);
        assert_eq!(today_start, start);
        assert_eq!(today_end, Utc.with_ymd_and_hms(2018, 11, 5, 2, 0, 0).unwrap());
    }
}
