//! Fetching side of reports and the dashboard.

use serde::Serialize;
use serde::de::IgnoredAny;
use time::Date;

use super::aggregate::{
    DashboardStats, ReportSummary, SalesPoint, TopSellingItem, dashboard_stats, recent_orders, sales_series,
    summarize, top_selling,
};
use super::Order;
use crate::error::ApiError;
use crate::net::{ApiClient, ApiRequest};
use crate::resources::{MenuItem, TABLES_PATH};
use crate::resources::menu::MENU_ITEMS_PATH;
use crate::resources::models::today_utc;
use crate::resources::users::USERS_PATH;

pub const ORDERS_PATH: &str = "/orders";
pub const PUBLIC_MENU_PATH: &str = "/menu/menu-items";
pub const EXPORT_PATH: &str = "/report/export";
pub const DEFAULT_EXPORT_TOP: u32 = 5;
pub const DEFAULT_WIDGET_LIMIT: usize = 5;

async fn fetch_orders(client: &ApiClient) -> Result<Vec<Order>, ApiError> {
    client.json(&ApiRequest::get(ORDERS_PATH)).await
}

async fn fetch_menu(client: &ApiClient) -> Result<Vec<MenuItem>, ApiError> {
    client.json(&ApiRequest::get(PUBLIC_MENU_PATH)).await
}

async fn count(client: &ApiClient, path: &str) -> Result<usize, ApiError> {
    let items: Vec<IgnoredAny> = client.json(&ApiRequest::get(path)).await?;
    Ok(items.len())
}

#[derive(Clone)]
pub struct ReportApi {
    client: ApiClient,
}

impl ReportApi {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Admin summary as of `today`. Orders, tables, menu items and users are
    /// fetched concurrently; the first failure wins.
    ///
    /// # Errors
    ///
    /// Propagates the first request or decode error.
    pub async fn summary_as_of(&self, today: Date) -> Result<ReportSummary, ApiError> {
        let (orders, tables, menu_items, users) = tokio::try_join!(
            fetch_orders(&self.client),
            count(&self.client, TABLES_PATH),
            count(&self.client, MENU_ITEMS_PATH),
            count(&self.client, USERS_PATH),
        )?;
        Ok(summarize(&orders, tables, menu_items, users, today))
    }

    /// # Errors
    ///
    /// As [`ReportApi::summary_as_of`].
    pub async fn summary(&self) -> Result<ReportSummary, ApiError> {
        self.summary_as_of(today_utc()).await
    }

    /// Download the spreadsheet export for `[start, end]` with the `top` best
    /// sellers. Returns the raw file bytes.
    ///
    /// # Errors
    ///
    /// `ApiError::Validation` without a request for a reversed range or a
    /// zero `top`; otherwise request errors.
    pub async fn export(&self, start: Date, end: Date, top: u32) -> Result<Vec<u8>, ApiError> {
        if end < start {
            return Err(ApiError::validation("endDate", "must not be before start date"));
        }
        if top == 0 {
            return Err(ApiError::validation("top", "must be at least 1"));
        }
        let request = ApiRequest::get(EXPORT_PATH)
            .with_query("startDate", start)
            .with_query("endDate", end)
            .with_query("top", top);
        let bytes = self.client.bytes(&request).await?;
        tracing::info!(%start, %end, top, size = bytes.len(), "report exported");
        Ok(bytes)
    }
}

/// Everything the dashboard shows, from one fetch of orders and menu.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub stats: DashboardStats,
    pub recent_orders: Vec<Order>,
    pub top_selling: Vec<TopSellingItem>,
    pub sales: Vec<SalesPoint>,
}

#[derive(Clone)]
pub struct DashboardApi {
    client: ApiClient,
}

impl DashboardApi {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    async fn fetch(&self) -> Result<(Vec<Order>, Vec<MenuItem>), ApiError> {
        tokio::try_join!(fetch_orders(&self.client), fetch_menu(&self.client))
    }

    /// # Errors
    ///
    /// Propagates request and decode errors.
    pub async fn load_as_of(&self, today: Date, limit: usize) -> Result<Dashboard, ApiError> {
        let (orders, menu) = self.fetch().await?;
        Ok(Dashboard {
            stats: dashboard_stats(&orders, menu.len(), today),
            recent_orders: recent_orders(&orders, limit).to_vec(),
            top_selling: top_selling(&orders, &menu, limit),
            sales: sales_series(&orders),
        })
    }

    /// # Errors
    ///
    /// Propagates request and decode errors.
    pub async fn load(&self) -> Result<Dashboard, ApiError> {
        self.load_as_of(today_utc(), DEFAULT_WIDGET_LIMIT).await
    }

    /// # Errors
    ///
    /// Propagates request and decode errors.
    pub async fn stats(&self) -> Result<DashboardStats, ApiError> {
        let (orders, menu) = self.fetch().await?;
        Ok(dashboard_stats(&orders, menu.len(), today_utc()))
    }

    /// # Errors
    ///
    /// Propagates request and decode errors.
    pub async fn recent_orders(&self, limit: usize) -> Result<Vec<Order>, ApiError> {
        let orders = fetch_orders(&self.client).await?;
        Ok(recent_orders(&orders, limit).to_vec())
    }

    /// # Errors
    ///
    /// Propagates request and decode errors.
    pub async fn top_selling(&self, limit: usize) -> Result<Vec<TopSellingItem>, ApiError> {
        let (orders, menu) = self.fetch().await?;
        Ok(top_selling(&orders, &menu, limit))
    }

    /// # Errors
    ///
    /// Propagates request and decode errors.
    pub async fn sales_series(&self) -> Result<Vec<SalesPoint>, ApiError> {
        let orders = fetch_orders(&self.client).await?;
        Ok(sales_series(&orders))
    }
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
