//! Pure aggregations over order lists.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use time::Date;

use super::Order;
use crate::resources::models::iso_date;
use crate::resources::{EntityId, MenuItem};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub total_users: usize,
    pub total_tables: usize,
    pub total_menu_items: usize,
    pub today_revenue: f64,
    pub completed_orders: usize,
    pub pending_orders: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_menu_items: usize,
    pub pending_orders: usize,
    pub completed_orders: usize,
    pub today_revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopSellingItem {
    pub menu_item_id: EntityId,
    /// `None` if the id is not on the current menu.
    pub menu_item: Option<MenuItem>,
    pub quantity_sold: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesPoint {
    #[serde(serialize_with = "iso_date")]
    pub date: Date,
    pub revenue: f64,
}

fn revenue_on(orders: &[Order], day: Date) -> f64 {
    orders.iter().filter(|o| o.created_on() == Some(day)).map(|o| o.total_amount).sum()
}

#[must_use]
pub fn summarize(
    orders: &[Order],
    total_tables: usize,
    total_menu_items: usize,
    total_users: usize,
    today: Date,
) -> ReportSummary {
    ReportSummary {
        total_users,
        total_tables,
        total_menu_items,
        today_revenue: revenue_on(orders, today),
        completed_orders: orders.iter().filter(|o| o.is_completed()).count(),
        pending_orders: orders.iter().filter(|o| o.is_pending()).count(),
    }
}

#[must_use]
pub fn dashboard_stats(orders: &[Order], total_menu_items: usize, today: Date) -> DashboardStats {
    DashboardStats {
        total_menu_items,
        pending_orders: orders.iter().filter(|o| o.is_pending()).count(),
        completed_orders: orders.iter().filter(|o| o.is_completed()).count(),
        today_revenue: revenue_on(orders, today),
    }
}

/// The first `limit` orders, in backend order.
#[must_use]
pub fn recent_orders(orders: &[Order], limit: usize) -> &[Order] {
    &orders[..limit.min(orders.len())]
}

/// Quantities summed per menu item, highest first. Ties break on id so the
/// ranking is stable.
#[must_use]
pub fn top_selling(orders: &[Order], menu: &[MenuItem], limit: usize) -> Vec<TopSellingItem> {
    let mut sold: HashMap<&EntityId, u64> = HashMap::new();
    for line in orders.iter().flat_map(|o| &o.items) {
        if let Some(id) = &line.menu_item_id {
            *sold.entry(id).or_default() += u64::from(line.quantity);
        }
    }

    let mut ranked: Vec<TopSellingItem> = sold
        .into_iter()
        .map(|(id, quantity_sold)| TopSellingItem {
            menu_item_id: id.clone(),
            menu_item: menu.iter().find(|m| &m.id == id).cloned(),
            quantity_sold,
        })
        .collect();
    ranked.sort_by(|a, b| b.quantity_sold.cmp(&a.quantity_sold).then_with(|| a.menu_item_id.cmp(&b.menu_item_id)));
    ranked.truncate(limit);
    ranked
}

/// Revenue per calendar day, oldest first. Orders without a readable
/// timestamp are left out.
#[must_use]
pub fn sales_series(orders: &[Order]) -> Vec<SalesPoint> {
    let mut by_day: BTreeMap<Date, f64> = BTreeMap::new();
    for order in orders {
        if let Some(day) = order.created_on() {
            *by_day.entry(day).or_default() += order.total_amount;
        }
    }
    by_day.into_iter().map(|(date, revenue)| SalesPoint { date, revenue }).collect()
}

#[cfg(test)]
#[path = "aggregate_test.rs"]
mod tests;
