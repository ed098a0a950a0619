//! PostgreSQL store (sqlx)

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::models::{
    AppSettings, Customer, Flavor, FlavorUpdate, SETTINGS_ID, SettingsUpdate, Vendor, VendorUpdate,
};
use shared::order::{Order, OrderItem, OrderLine, OrderStatus, SaleRecord};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::collections::HashMap;
use std::time::Duration;
use uuid::Uuid;

use super::{NewOrder, OrderFilter, Page, Store, StoreError, StoreResult};

const ORDER_COLUMNS: &str =
    "id, vendor_id, customer_id, status, payment_method, total_cents, created_at";

const SALE_SELECT: &str = r#"
    SELECT o.id, o.vendor_id, o.customer_id, o.status, o.payment_method, o.total_cents,
           o.created_at, v.name AS vendor_name, c.name AS customer_name, c.phone AS customer_phone
    FROM orders o
    JOIN vendors v ON v.id = o.vendor_id
    LEFT JOIN customers c ON c.id = o.customer_id
"#;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connect and run pending migrations
    pub async fn connect(database_url: &str, acquire_timeout: Duration) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .acquire_timeout(acquire_timeout)
            .connect(database_url)
            .await?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Attach lines (with flavor names) to order headers, keeping header order.
    async fn attach_lines(&self, rows: Vec<SaleRow>) -> StoreResult<Vec<SaleRecord>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let lines: Vec<LineRow> = sqlx::query_as(
            r#"
            SELECT oi.order_id, oi.flavor_id, f.name AS flavor_name, oi.quantity,
                   oi.unit_price_cents, oi.line_total_cents
            FROM order_items oi
            JOIN flavors f ON f.id = oi.flavor_id
            WHERE oi.order_id = ANY($1)
            ORDER BY oi.order_id, oi.line_no
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_order: HashMap<Uuid, Vec<OrderLine>> = HashMap::new();
        for line in lines {
            by_order.entry(line.order_id).or_default().push(OrderLine {
                flavor_id: line.flavor_id,
                flavor_name: line.flavor_name,
                quantity: line.quantity,
                unit_price_cents: line.unit_price_cents,
                line_total_cents: line.line_total_cents,
            });
        }

        rows.into_iter()
            .map(|row| {
                let items = by_order.remove(&row.id).unwrap_or_default();
                row.into_record(items)
            })
            .collect()
    }
}

// ── Row types ──

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    vendor_id: Uuid,
    customer_id: Option<Uuid>,
    status: String,
    payment_method: String,
    total_cents: i64,
    created_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = StoreError;

    fn try_from(row: OrderRow) -> StoreResult<Self> {
        Ok(Order {
            id: row.id,
            vendor_id: row.vendor_id,
            customer_id: row.customer_id,
            status: parse_column(&row.status)?,
            payment_method: parse_column(&row.payment_method)?,
            total_cents: row.total_cents,
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct SaleRow {
    id: Uuid,
    vendor_id: Uuid,
    status: String,
    payment_method: String,
    total_cents: i64,
    created_at: DateTime<Utc>,
    vendor_name: String,
    customer_name: Option<String>,
    customer_phone: Option<String>,
}

impl SaleRow {
    fn into_record(self, items: Vec<OrderLine>) -> StoreResult<SaleRecord> {
        Ok(SaleRecord {
            id: self.id,
            vendor_id: self.vendor_id,
            created_at: self.created_at,
            total_cents: self.total_cents,
            payment_method: parse_column(&self.payment_method)?,
            status: parse_column(&self.status)?,
            vendor_name: self.vendor_name,
            customer_name: self.customer_name,
            customer_phone: self.customer_phone,
            items,
        })
    }
}

#[derive(sqlx::FromRow)]
struct LineRow {
    order_id: Uuid,
    flavor_id: Uuid,
    flavor_name: String,
    quantity: i32,
    unit_price_cents: i64,
    line_total_cents: i64,
}

fn parse_column<T: std::str::FromStr>(raw: &str) -> StoreResult<T>
where
    T::Err: std::fmt::Display,
{
    raw.parse()
        .map_err(|e: T::Err| StoreError::Database(format!("unexpected column value: {e}")))
}

/// Escape LIKE wildcards in user input
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &OrderFilter) {
    qb.push(" WHERE TRUE");
    if let Some(vendor_id) = filter.vendor_id {
        qb.push(" AND o.vendor_id = ").push_bind(vendor_id);
    }
    if let Some(flavor_id) = filter.flavor_id {
        qb.push(" AND EXISTS (SELECT 1 FROM order_items fi WHERE fi.order_id = o.id AND fi.flavor_id = ")
            .push_bind(flavor_id)
            .push(")");
    }
    if let Some(from) = filter.created_from {
        qb.push(" AND o.created_at >= ").push_bind(from);
    }
    if let Some(before) = filter.created_before {
        qb.push(" AND o.created_at < ").push_bind(before);
    }
    if let Some(term) = filter.search.as_deref() {
        let pattern = like_pattern(term);
        qb.push(" AND (v.name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR c.name ILIKE ")
            .push_bind(pattern.clone())
            .push(
                " OR EXISTS (SELECT 1 FROM order_items si JOIN flavors sf ON sf.id = si.flavor_id \
                 WHERE si.order_id = o.id AND sf.name ILIKE ",
            )
            .push_bind(pattern)
            .push("))");
    }
}

#[async_trait]
impl Store for PgStore {
    // ── Vendors ──

    async fn list_vendors(&self, include_inactive: bool) -> StoreResult<Vec<Vendor>> {
        let rows = sqlx::query_as(
            "SELECT * FROM vendors WHERE ($1 OR active) ORDER BY lower(name), name, id",
        )
        .bind(include_inactive)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get_vendor(&self, id: Uuid) -> StoreResult<Option<Vendor>> {
        let row = sqlx::query_as("SELECT * FROM vendors WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn active_vendor_name_exists(&self, name: &str, exclude: Option<Uuid>) -> StoreResult<bool> {
        let exists = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM vendors
                WHERE active AND lower(name) = lower($1) AND ($2::uuid IS NULL OR id <> $2)
            )
            "#,
        )
        .bind(name)
        .bind(exclude)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn insert_vendor(&self, name: &str, phone: Option<&str>) -> StoreResult<Vendor> {
        let row = sqlx::query_as(
            "INSERT INTO vendors (id, name, phone, active) VALUES ($1, $2, $3, TRUE) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(phone)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update_vendor(&self, id: Uuid, patch: &VendorUpdate) -> StoreResult<Option<Vendor>> {
        let row = sqlx::query_as(
            r#"
            UPDATE vendors SET
                name = COALESCE($2, name),
                phone = CASE WHEN $3 THEN $4 ELSE phone END,
                active = COALESCE($5, active),
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(patch.name.as_deref())
        .bind(patch.phone.is_some())
        .bind(patch.phone.clone().flatten())
        .bind(patch.active)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    // ── Flavors ──

    async fn list_flavors(&self, active_only: bool) -> StoreResult<Vec<Flavor>> {
        let rows = sqlx::query_as(
            "SELECT * FROM flavors WHERE (NOT $1 OR active) ORDER BY lower(name), name, id",
        )
        .bind(active_only)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get_flavor(&self, id: Uuid) -> StoreResult<Option<Flavor>> {
        let row = sqlx::query_as("SELECT * FROM flavors WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_active_flavors(&self, ids: &[Uuid]) -> StoreResult<Vec<Flavor>> {
        let rows = sqlx::query_as("SELECT * FROM flavors WHERE active AND id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn active_flavor_name_exists(&self, name: &str, exclude: Option<Uuid>) -> StoreResult<bool> {
        let exists = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM flavors
                WHERE active AND lower(name) = lower($1) AND ($2::uuid IS NULL OR id <> $2)
            )
            "#,
        )
        .bind(name)
        .bind(exclude)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn insert_flavor(&self, name: &str, price_cents: i64) -> StoreResult<Flavor> {
        let row = sqlx::query_as(
            "INSERT INTO flavors (id, name, price_cents, active) VALUES ($1, $2, $3, TRUE) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(price_cents)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update_flavor(&self, id: Uuid, patch: &FlavorUpdate) -> StoreResult<Option<Flavor>> {
        let row = sqlx::query_as(
            r#"
            UPDATE flavors SET
                name = COALESCE($2, name),
                price_cents = COALESCE($3, price_cents),
                active = COALESCE($4, active),
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(patch.name.as_deref())
        .bind(patch.price_cents)
        .bind(patch.active)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn flavor_has_order_items(&self, id: Uuid) -> StoreResult<bool> {
        let used = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM order_items WHERE flavor_id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(used)
    }

    async fn delete_flavor(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM flavors WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ── Settings ──

    async fn get_settings(&self) -> StoreResult<Option<AppSettings>> {
        let row = sqlx::query_as("SELECT * FROM app_settings WHERE id = $1")
            .bind(SETTINGS_ID)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn ensure_settings(&self, default_price_cents: i64) -> StoreResult<AppSettings> {
        sqlx::query(
            "INSERT INTO app_settings (id, pastel_price_cents) VALUES ($1, $2) ON CONFLICT (id) DO NOTHING",
        )
        .bind(SETTINGS_ID)
        .bind(default_price_cents)
        .execute(&self.pool)
        .await?;
        let row = sqlx::query_as("SELECT * FROM app_settings WHERE id = $1")
            .bind(SETTINGS_ID)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn update_settings(&self, patch: &SettingsUpdate) -> StoreResult<Option<AppSettings>> {
        let row = sqlx::query_as(
            r#"
            UPDATE app_settings SET
                pastel_price_cents = COALESCE($2, pastel_price_cents),
                pix_qr_image_path = CASE WHEN $3 THEN $4 ELSE pix_qr_image_path END,
                pix_key_text = CASE WHEN $5 THEN $6 ELSE pix_key_text END,
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(SETTINGS_ID)
        .bind(patch.pastel_price_cents)
        .bind(patch.pix_qr_image_path.is_some())
        .bind(patch.pix_qr_image_path.clone().flatten())
        .bind(patch.pix_key_text.is_some())
        .bind(patch.pix_key_text.clone().flatten())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    // ── Customers ──

    async fn find_customer_by_phone(&self, phone: &str) -> StoreResult<Option<Customer>> {
        let row = sqlx::query_as(
            "SELECT * FROM customers WHERE phone = $1 ORDER BY created_at, id LIMIT 1",
        )
        .bind(phone)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn insert_customer(&self, name: &str, phone: Option<&str>) -> StoreResult<Customer> {
        let row = sqlx::query_as(
            "INSERT INTO customers (id, name, phone) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(phone)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    // ── Orders ──

    async fn insert_order(&self, order: &NewOrder) -> StoreResult<Order> {
        let row: OrderRow = sqlx::query_as(&format!(
            "INSERT INTO orders (id, vendor_id, customer_id, status, payment_method, total_cents) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {ORDER_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(order.vendor_id)
        .bind(order.customer_id)
        .bind(order.status.as_str())
        .bind(order.payment_method.as_str())
        .bind(order.total_cents)
        .fetch_one(&self.pool)
        .await?;
        row.try_into()
    }

    async fn insert_order_items(&self, items: &[OrderItem]) -> StoreResult<()> {
        if items.is_empty() {
            return Ok(());
        }
        let mut qb: QueryBuilder<'_, Postgres> = QueryBuilder::new(
            "INSERT INTO order_items \
             (id, order_id, flavor_id, quantity, unit_price_cents, line_total_cents, line_no) ",
        );
        qb.push_values(items.iter().enumerate(), |mut b, (line_no, item)| {
            b.push_bind(item.id)
                .push_bind(item.order_id)
                .push_bind(item.flavor_id)
                .push_bind(item.quantity)
                .push_bind(item.unit_price_cents)
                .push_bind(item.line_total_cents)
                .push_bind(line_no as i32);
        });
        qb.build().execute(&self.pool).await?;
        Ok(())
    }

    async fn delete_order(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn get_order(&self, id: Uuid) -> StoreResult<Option<Order>> {
        let row: Option<OrderRow> =
            sqlx::query_as(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        row.map(Order::try_from).transpose()
    }

    async fn get_order_items(&self, order_id: Uuid) -> StoreResult<Vec<OrderItem>> {
        let rows = sqlx::query_as(
            r#"
            SELECT id, order_id, flavor_id, quantity, unit_price_cents, line_total_cents
            FROM order_items WHERE order_id = $1 ORDER BY line_no
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get_sale(&self, id: Uuid) -> StoreResult<Option<SaleRecord>> {
        let row: Option<SaleRow> = sqlx::query_as(&format!("{SALE_SELECT} WHERE o.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some(row) => Ok(self.attach_lines(vec![row]).await?.into_iter().next()),
            None => Ok(None),
        }
    }

    async fn update_order_status(
        &self,
        id: Uuid,
        expected: Option<OrderStatus>,
        status: OrderStatus,
    ) -> StoreResult<Option<Order>> {
        let row: Option<OrderRow> = sqlx::query_as(&format!(
            "UPDATE orders SET status = $2 \
             WHERE id = $1 AND ($3::text IS NULL OR status = $3) \
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(id)
        .bind(status.as_str())
        .bind(expected.map(|s| s.as_str()))
        .fetch_optional(&self.pool)
        .await?;
        row.map(Order::try_from).transpose()
    }

    // ── Reports ──

    async fn list_sales(&self, filter: &OrderFilter, page: Page) -> StoreResult<Vec<SaleRecord>> {
        let mut qb = QueryBuilder::new(SALE_SELECT);
        push_filter(&mut qb, filter);
        qb.push(" ORDER BY o.created_at DESC, o.id DESC LIMIT ")
            .push_bind(page.limit)
            .push(" OFFSET ")
            .push_bind(page.offset);
        let rows: Vec<SaleRow> = qb.build_query_as().fetch_all(&self.pool).await?;
        self.attach_lines(rows).await
    }

    async fn count_sales(&self, filter: &OrderFilter) -> StoreResult<i64> {
        let mut qb = QueryBuilder::new(
            "SELECT COUNT(*) FROM orders o JOIN vendors v ON v.id = o.vendor_id \
             LEFT JOIN customers c ON c.id = o.customer_id",
        );
        push_filter(&mut qb, filter);
        let count: i64 = qb.build_query_scalar().fetch_one(&self.pool).await?;
        Ok(count)
    }

    async fn scan_sales(&self, filter: &OrderFilter) -> StoreResult<Vec<SaleRecord>> {
        let mut qb = QueryBuilder::new(SALE_SELECT);
        push_filter(&mut qb, filter);
        qb.push(" ORDER BY o.created_at DESC, o.id DESC");
        let rows: Vec<SaleRow> = qb.build_query_as().fetch_all(&self.pool).await?;
        self.attach_lines(rows).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("carne"), "%carne%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }

    #[test]
    fn test_filter_sql() {
        let filter = OrderFilter {
            vendor_id: Some(Uuid::nil()),
            flavor_id: Some(Uuid::nil()),
            search: Some("ana".into()),
            ..Default::default()
        };
        let mut qb = QueryBuilder::new("SELECT 1 FROM orders o");
        push_filter(&mut qb, &filter);
        let sql = qb.sql();
        assert!(sql.contains("o.vendor_id = $1"));
        assert!(sql.contains("fi.flavor_id = $2"));
        assert!(sql.contains("v.name ILIKE $3"));
        assert!(sql.contains("sf.name ILIKE $5"));
    }
}
