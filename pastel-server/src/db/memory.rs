//! In-memory store
//!
//! Same observable semantics as the PostgreSQL schema: case-insensitive
//! active-name uniqueness, foreign keys, cascade of order lines. Failures can
//! be injected per operation with [`FailPoint`].

use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use parking_lot::{Mutex, RwLock};
use shared::models::{
    AppSettings, Customer, Flavor, FlavorUpdate, SETTINGS_ID, SettingsUpdate, Vendor, VendorUpdate,
};
use shared::order::{Order, OrderItem, OrderLine, OrderStatus, SaleRecord};
use shared::util::cmp_names;
use std::collections::HashMap;
use uuid::Uuid;

use super::{NewOrder, OrderFilter, Page, Store, StoreError, StoreResult};

/// Operations that can be made to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailPoint {
    GetSettings,
    InsertCustomer,
    InsertOrder,
    InsertOrderItems,
    DeleteOrder,
    UpdateOrderStatus,
    GetSale,
    ListSales,
    CountSales,
    ListFlavors,
}

#[derive(Default)]
struct Tables {
    vendors: Vec<Vendor>,
    flavors: Vec<Flavor>,
    customers: Vec<Customer>,
    /// Insertion order
    orders: Vec<Order>,
    items: Vec<OrderItem>,
    settings: Option<AppSettings>,
}

impl Tables {
    fn sale(&self, order: &Order) -> SaleRecord {
        let vendor_name = self
            .vendors
            .iter()
            .find(|v| v.id == order.vendor_id)
            .map(|v| v.name.clone())
            .unwrap_or_default();
        let customer = order
            .customer_id
            .and_then(|id| self.customers.iter().find(|c| c.id == id));
        let items = self
            .items
            .iter()
            .filter(|i| i.order_id == order.id)
            .map(|i| OrderLine {
                flavor_id: i.flavor_id,
                flavor_name: self
                    .flavors
                    .iter()
                    .find(|f| f.id == i.flavor_id)
                    .map(|f| f.name.clone())
                    .unwrap_or_default(),
                quantity: i.quantity,
                unit_price_cents: i.unit_price_cents,
                line_total_cents: i.line_total_cents,
            })
            .collect();

        SaleRecord {
            id: order.id,
            vendor_id: order.vendor_id,
            created_at: order.created_at,
            total_cents: order.total_cents,
            payment_method: order.payment_method,
            status: order.status,
            vendor_name,
            customer_name: customer.map(|c| c.name.clone()),
            customer_phone: customer.and_then(|c| c.phone.clone()),
            items,
        }
    }

    fn matches(&self, sale: &SaleRecord, filter: &OrderFilter) -> bool {
        if filter.vendor_id.is_some_and(|v| v != sale.vendor_id) {
            return false;
        }
        if let Some(flavor_id) = filter.flavor_id
            && !sale.items.iter().any(|i| i.flavor_id == flavor_id)
        {
            return false;
        }
        if filter.created_from.is_some_and(|from| sale.created_at < from) {
            return false;
        }
        if filter.created_before.is_some_and(|before| sale.created_at >= before) {
            return false;
        }
        if let Some(term) = filter.search.as_deref() {
            let term = term.to_lowercase();
            let hit = sale.vendor_name.to_lowercase().contains(&term)
                || sale
                    .customer_name
                    .as_deref()
                    .is_some_and(|n| n.to_lowercase().contains(&term))
                || sale
                    .items
                    .iter()
                    .any(|i| i.flavor_name.to_lowercase().contains(&term));
            if !hit {
                return false;
            }
        }
        true
    }

    /// Filtered sales, newest first; ties keep the latest insertion first
    fn sales(&self, filter: &OrderFilter) -> Vec<SaleRecord> {
        let mut sales: Vec<SaleRecord> = self
            .orders
            .iter()
            .rev()
            .map(|o| self.sale(o))
            .filter(|s| self.matches(s, filter))
            .collect();
        sales.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        sales
    }
}

fn same_name(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// Timestamps at database (microsecond) precision
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    /// Remaining failures per point; `None` fails until cleared
    fail_points: Mutex<HashMap<FailPoint, Option<u32>>>,
    /// Status applied right after the next read of that order
    status_after_read: Mutex<Option<(Uuid, OrderStatus)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `point` fail until [`MemoryStore::clear_failures`]
    pub fn fail(&self, point: FailPoint) {
        self.fail_points.lock().insert(point, None);
    }

    /// Make `point` fail for the next `times` calls
    pub fn fail_times(&self, point: FailPoint, times: u32) {
        self.fail_points.lock().insert(point, Some(times));
    }

    pub fn clear_failures(&self) {
        self.fail_points.lock().clear();
    }

    fn check(&self, point: FailPoint) -> StoreResult<()> {
        let mut points = self.fail_points.lock();
        let Some(remaining) = points.get_mut(&point) else {
            return Ok(());
        };
        match remaining {
            None => {}
            Some(0) => {
                points.remove(&point);
                return Ok(());
            }
            Some(n) => *n -= 1,
        }
        Err(StoreError::Unavailable(format!("injected failure at {point:?}")))
    }

    /// Backdate an order (tests of date windows)
    pub fn set_order_created_at(&self, id: Uuid, created_at: DateTime<Utc>) -> bool {
        let mut tables = self.tables.write();
        match tables.orders.iter_mut().find(|o| o.id == id) {
            Some(order) => {
                order.created_at = created_at;
                true
            }
            None => false,
        }
    }

    /// Change an order's status behind the caller's back, right after its
    /// next `get_order` returns (a concurrent writer between read and write)
    pub fn change_status_after_read(&self, id: Uuid, status: OrderStatus) {
        *self.status_after_read.lock() = Some((id, status));
    }

    pub fn order_count(&self) -> usize {
        self.tables.read().orders.len()
    }

    pub fn order_item_count(&self) -> usize {
        self.tables.read().items.len()
    }
}

#[async_trait]
impl Store for MemoryStore {
    // ── Vendors ──

    async fn list_vendors(&self, include_inactive: bool) -> StoreResult<Vec<Vendor>> {
        let mut vendors: Vec<Vendor> = self
            .tables
            .read()
            .vendors
            .iter()
            .filter(|v| include_inactive || v.active)
            .cloned()
            .collect();
        vendors.sort_by(|a, b| cmp_names(&a.name, &b.name).then(a.id.cmp(&b.id)));
        Ok(vendors)
    }

    async fn get_vendor(&self, id: Uuid) -> StoreResult<Option<Vendor>> {
        Ok(self.tables.read().vendors.iter().find(|v| v.id == id).cloned())
    }

    async fn active_vendor_name_exists(&self, name: &str, exclude: Option<Uuid>) -> StoreResult<bool> {
        Ok(self
            .tables
            .read()
            .vendors
            .iter()
            .any(|v| v.active && Some(v.id) != exclude && same_name(&v.name, name)))
    }

    async fn insert_vendor(&self, name: &str, phone: Option<&str>) -> StoreResult<Vendor> {
        let mut tables = self.tables.write();
        if tables.vendors.iter().any(|v| v.active && same_name(&v.name, name)) {
            return Err(StoreError::Duplicate("vendors_active_name_key".into()));
        }
        let now = now();
        let vendor = Vendor {
            id: Uuid::new_v4(),
            name: name.to_string(),
            phone: phone.map(str::to_string),
            active: true,
            created_at: now,
            updated_at: now,
        };
        tables.vendors.push(vendor.clone());
        Ok(vendor)
    }

    async fn update_vendor(&self, id: Uuid, patch: &VendorUpdate) -> StoreResult<Option<Vendor>> {
        let mut tables = self.tables.write();
        let Some(current) = tables.vendors.iter().find(|v| v.id == id).cloned() else {
            return Ok(None);
        };
        let mut next = current;
        if let Some(name) = &patch.name {
            next.name = name.clone();
        }
        if let Some(phone) = &patch.phone {
            next.phone = phone.clone();
        }
        if let Some(active) = patch.active {
            next.active = active;
        }
        if next.active
            && tables
                .vendors
                .iter()
                .any(|v| v.id != id && v.active && same_name(&v.name, &next.name))
        {
            return Err(StoreError::Duplicate("vendors_active_name_key".into()));
        }
        next.updated_at = now();
        if let Some(slot) = tables.vendors.iter_mut().find(|v| v.id == id) {
            *slot = next.clone();
        }
        Ok(Some(next))
    }

    // ── Flavors ──

    async fn list_flavors(&self, active_only: bool) -> StoreResult<Vec<Flavor>> {
        self.check(FailPoint::ListFlavors)?;
        let mut flavors: Vec<Flavor> = self
            .tables
            .read()
            .flavors
            .iter()
            .filter(|f| !active_only || f.active)
            .cloned()
            .collect();
        flavors.sort_by(|a, b| cmp_names(&a.name, &b.name).then(a.id.cmp(&b.id)));
        Ok(flavors)
    }

    async fn get_flavor(&self, id: Uuid) -> StoreResult<Option<Flavor>> {
        Ok(self.tables.read().flavors.iter().find(|f| f.id == id).cloned())
    }

    async fn find_active_flavors(&self, ids: &[Uuid]) -> StoreResult<Vec<Flavor>> {
        Ok(self
            .tables
            .read()
            .flavors
            .iter()
            .filter(|f| f.active && ids.contains(&f.id))
            .cloned()
            .collect())
    }

    async fn active_flavor_name_exists(&self, name: &str, exclude: Option<Uuid>) -> StoreResult<bool> {
        Ok(self
            .tables
            .read()
            .flavors
            .iter()
            .any(|f| f.active && Some(f.id) != exclude && same_name(&f.name, name)))
    }

    async fn insert_flavor(&self, name: &str, price_cents: i64) -> StoreResult<Flavor> {
        let mut tables = self.tables.write();
        if tables.flavors.iter().any(|f| f.active && same_name(&f.name, name)) {
            return Err(StoreError::Duplicate("flavors_active_name_key".into()));
        }
        let now = now();
        let flavor = Flavor {
            id: Uuid::new_v4(),
            name: name.to_string(),
            price_cents,
            active: true,
            created_at: now,
            updated_at: now,
        };
        tables.flavors.push(flavor.clone());
        Ok(flavor)
    }

    async fn update_flavor(&self, id: Uuid, patch: &FlavorUpdate) -> StoreResult<Option<Flavor>> {
        let mut tables = self.tables.write();
        let Some(current) = tables.flavors.iter().find(|f| f.id == id).cloned() else {
            return Ok(None);
        };
        let mut next = current;
        if let Some(name) = &patch.name {
            next.name = name.clone();
        }
        if let Some(price_cents) = patch.price_cents {
            next.price_cents = price_cents;
        }
        if let Some(active) = patch.active {
            next.active = active;
        }
        if next.active
            && tables
                .flavors
                .iter()
                .any(|f| f.id != id && f.active && same_name(&f.name, &next.name))
        {
            return Err(StoreError::Duplicate("flavors_active_name_key".into()));
        }
        next.updated_at = now();
        if let Some(slot) = tables.flavors.iter_mut().find(|f| f.id == id) {
            *slot = next.clone();
        }
        Ok(Some(next))
    }

    async fn flavor_has_order_items(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.tables.read().items.iter().any(|i| i.flavor_id == id))
    }

    async fn delete_flavor(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write();
        if tables.items.iter().any(|i| i.flavor_id == id) {
            return Err(StoreError::Constraint(
                "order_items_flavor_id_fkey: flavor still referenced".into(),
            ));
        }
        let before = tables.flavors.len();
        tables.flavors.retain(|f| f.id != id);
        Ok(tables.flavors.len() < before)
    }

    // ── Settings ──

    async fn get_settings(&self) -> StoreResult<Option<AppSettings>> {
        self.check(FailPoint::GetSettings)?;
        Ok(self.tables.read().settings.clone())
    }

    async fn ensure_settings(&self, default_price_cents: i64) -> StoreResult<AppSettings> {
        let mut tables = self.tables.write();
        let settings = tables.settings.get_or_insert_with(|| AppSettings {
            id: SETTINGS_ID,
            pastel_price_cents: default_price_cents,
            pix_qr_image_path: None,
            pix_key_text: None,
            updated_at: now(),
        });
        Ok(settings.clone())
    }

    async fn update_settings(&self, patch: &SettingsUpdate) -> StoreResult<Option<AppSettings>> {
        let mut tables = self.tables.write();
        let Some(settings) = tables.settings.as_mut() else {
            return Ok(None);
        };
        if let Some(price) = patch.pastel_price_cents {
            settings.pastel_price_cents = price;
        }
        if let Some(path) = &patch.pix_qr_image_path {
            settings.pix_qr_image_path = path.clone();
        }
        if let Some(key) = &patch.pix_key_text {
            settings.pix_key_text = key.clone();
        }
        settings.updated_at = now();
        Ok(Some(settings.clone()))
    }

    // ── Customers ──

    async fn find_customer_by_phone(&self, phone: &str) -> StoreResult<Option<Customer>> {
        Ok(self
            .tables
            .read()
            .customers
            .iter()
            .find(|c| c.phone.as_deref() == Some(phone))
            .cloned())
    }

    async fn insert_customer(&self, name: &str, phone: Option<&str>) -> StoreResult<Customer> {
        self.check(FailPoint::InsertCustomer)?;
        let customer = Customer {
            id: Uuid::new_v4(),
            name: name.to_string(),
            phone: phone.map(str::to_string),
            created_at: now(),
        };
        self.tables.write().customers.push(customer.clone());
        Ok(customer)
    }

    // ── Orders ──

    async fn insert_order(&self, order: &NewOrder) -> StoreResult<Order> {
        self.check(FailPoint::InsertOrder)?;
        let mut tables = self.tables.write();
        if !tables.vendors.iter().any(|v| v.id == order.vendor_id) {
            return Err(StoreError::Constraint("orders_vendor_id_fkey".into()));
        }
        let row = Order {
            id: Uuid::new_v4(),
            vendor_id: order.vendor_id,
            customer_id: order.customer_id,
            status: order.status,
            payment_method: order.payment_method,
            total_cents: order.total_cents,
            created_at: now(),
        };
        tables.orders.push(row.clone());
        Ok(row)
    }

    async fn insert_order_items(&self, items: &[OrderItem]) -> StoreResult<()> {
        self.check(FailPoint::InsertOrderItems)?;
        let mut tables = self.tables.write();
        for item in items {
            if !tables.orders.iter().any(|o| o.id == item.order_id) {
                return Err(StoreError::Constraint("order_items_order_id_fkey".into()));
            }
            if !tables.flavors.iter().any(|f| f.id == item.flavor_id) {
                return Err(StoreError::Constraint("order_items_flavor_id_fkey".into()));
            }
        }
        tables.items.extend_from_slice(items);
        Ok(())
    }

    async fn delete_order(&self, id: Uuid) -> StoreResult<bool> {
        self.check(FailPoint::DeleteOrder)?;
        let mut tables = self.tables.write();
        let before = tables.orders.len();
        tables.orders.retain(|o| o.id != id);
        tables.items.retain(|i| i.order_id != id);
        Ok(tables.orders.len() < before)
    }

    async fn get_order(&self, id: Uuid) -> StoreResult<Option<Order>> {
        let mut tables = self.tables.write();
        let found = tables.orders.iter().find(|o| o.id == id).cloned();

        let mut pending = self.status_after_read.lock();
        if let Some((target, status)) = *pending {
            if target == id {
                *pending = None;
                if let Some(order) = tables.orders.iter_mut().find(|o| o.id == id) {
                    order.status = status;
                }
            }
        }
        Ok(found)
    }

    async fn get_order_items(&self, order_id: Uuid) -> StoreResult<Vec<OrderItem>> {
        Ok(self
            .tables
            .read()
            .items
            .iter()
            .filter(|i| i.order_id == order_id)
            .cloned()
            .collect())
    }

    async fn get_sale(&self, id: Uuid) -> StoreResult<Option<SaleRecord>> {
        self.check(FailPoint::GetSale)?;
        let tables = self.tables.read();
        Ok(tables.orders.iter().find(|o| o.id == id).map(|o| tables.sale(o)))
    }

    async fn update_order_status(
        &self,
        id: Uuid,
        expected: Option<OrderStatus>,
        status: OrderStatus,
    ) -> StoreResult<Option<Order>> {
        self.check(FailPoint::UpdateOrderStatus)?;
        let mut tables = self.tables.write();
        Ok(tables
            .orders
            .iter_mut()
            .find(|o| o.id == id && expected.is_none_or(|e| o.status == e))
            .map(|order| {
                order.status = status;
                order.clone()
            }))
    }

    // ── Reports ──

    async fn list_sales(&self, filter: &OrderFilter, page: Page) -> StoreResult<Vec<SaleRecord>> {
        self.check(FailPoint::ListSales)?;
        let offset = usize::try_from(page.offset).unwrap_or(0);
        let limit = usize::try_from(page.limit).unwrap_or(0);
        Ok(self
            .tables
            .read()
            .sales(filter)
            .into_iter()
            .skip(offset)
            .take(limit)
            .collect())
    }

    async fn count_sales(&self, filter: &OrderFilter) -> StoreResult<i64> {
        self.check(FailPoint::CountSales)?;
        Ok(self.tables.read().sales(filter).len() as i64)
    }

    async fn scan_sales(&self, filter: &OrderFilter) -> StoreResult<Vec<SaleRecord>> {
        self.check(FailPoint::ListSales)?;
        Ok(self.tables.read().sales(filter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::order::PaymentMethod;

    #[tokio::test]
    async fn test_active_name_uniqueness() {
        let store = MemoryStore::new();
        let carne = store.insert_flavor("Carne", 500).await.unwrap();
        assert!(matches!(
            store.insert_flavor("CARNE", 500).await,
            Err(StoreError::Duplicate(_))
        ));

        let patch = FlavorUpdate {
            active: Some(false),
            ..Default::default()
        };
        store.update_flavor(carne.id, &patch).await.unwrap();
        assert!(store.insert_flavor("carne", 500).await.is_ok());

        // Reactivating the old one now collides
        let patch = FlavorUpdate {
            active: Some(true),
            ..Default::default()
        };
        assert!(matches!(
            store.update_flavor(carne.id, &patch).await,
            Err(StoreError::Duplicate(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_order_cascades_items() {
        let store = MemoryStore::new();
        let vendor = store.insert_vendor("Maria", None).await.unwrap();
        let flavor = store.insert_flavor("Queijo", 500).await.unwrap();
        let order = store
            .insert_order(&NewOrder {
                vendor_id: vendor.id,
                customer_id: None,
                status: OrderStatus::Created,
                payment_method: PaymentMethod::Local,
                total_cents: 500,
            })
            .await
            .unwrap();
        let item = OrderItem {
            id: Uuid::new_v4(),
            order_id: order.id,
            flavor_id: flavor.id,
            quantity: 1,
            unit_price_cents: 500,
            line_total_cents: 500,
        };
        store.insert_order_items(&[item]).await.unwrap();
        assert!(matches!(
            store.delete_flavor(flavor.id).await,
            Err(StoreError::Constraint(_))
        ));

        assert!(store.delete_order(order.id).await.unwrap());
        assert_eq!(store.order_item_count(), 0);
        assert!(store.delete_flavor(flavor.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_fail_times_recovers() {
        let store = MemoryStore::new();
        store.ensure_settings(500).await.unwrap();
        store.fail_times(FailPoint::GetSettings, 2);
        assert!(store.get_settings().await.is_err());
        assert!(store.get_settings().await.is_err());
        assert!(store.get_settings().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_first_customer_by_phone() {
        let store = MemoryStore::new();
        let first = store.insert_customer("Ana", Some("119")).await.unwrap();
        store.insert_customer("Ana B", Some("119")).await.unwrap();
        let found = store.find_customer_by_phone("119").await.unwrap().unwrap();
        assert_eq!(found.id, first.id);
        assert!(store.find_customer_by_phone("000").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_status_update_with_stale_expectation() {
        let store = MemoryStore::new();
        let vendor = store.insert_vendor("Maria", None).await.unwrap();
        let order = store
            .insert_order(&NewOrder {
                vendor_id: vendor.id,
                customer_id: None,
                status: OrderStatus::Paid,
                payment_method: PaymentMethod::Pix,
                total_cents: 500,
            })
            .await
            .unwrap();

        let cancelled = store
            .update_order_status(order.id, Some(OrderStatus::Paid), OrderStatus::Cancelled)
            .await
            .unwrap();
        assert_eq!(cancelled.unwrap().status, OrderStatus::Cancelled);

        // Second writer still believes the order is paid
        let lost = store
            .update_order_status(order.id, Some(OrderStatus::Paid), OrderStatus::Completed)
            .await
            .unwrap();
        assert!(lost.is_none());
        let current = store.get_order(order.id).await.unwrap().unwrap();
        assert_eq!(current.status, OrderStatus::Cancelled);

        let forced = store
            .update_order_status(order.id, None, OrderStatus::Created)
            .await
            .unwrap();
        assert_eq!(forced.unwrap().status, OrderStatus::Created);
    }
}
