//! Order reporting: the admin summary, the spreadsheet export, and the
//! dashboard widgets.
//!
//! The backend has no aggregate endpoints beyond the export, so figures are
//! computed client-side from the order list. All aggregation lives in
//! `aggregate` as pure functions; `api` only fetches.

pub mod aggregate;
pub mod api;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::Date;
use time::macros::format_description;

use crate::resources::EntityId;
use crate::resources::models::amount;

pub use aggregate::{
    DashboardStats, ReportSummary, SalesPoint, TopSellingItem, dashboard_stats, recent_orders, sales_series,
    summarize, top_selling,
};
pub use api::{Dashboard, DashboardApi, ReportApi};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: EntityId,
    #[serde(default)]
    pub status: String,
    #[serde(default, deserialize_with = "amount")]
    pub total_amount: f64,
    /// ISO-8601 timestamp; only the date part is used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default)]
    pub items: Vec<OrderLine>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub menu_item_id: Option<EntityId>,
    #[serde(default)]
    pub quantity: u32,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Order {
    /// Calendar date the order was placed, if the timestamp is readable.
    #[must_use]
    pub fn created_on(&self) -> Option<Date> {
        let stamp = self.created_at.as_deref()?;
        let day = stamp.get(..10)?;
        Date::parse(day, format_description!("[year]-[month]-[day]")).ok()
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.status.eq_ignore_ascii_case("DONE") || self.status.eq_ignore_ascii_case("COMPLETED")
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status.eq_ignore_ascii_case("PENDING")
    }
}
