//! Menu items and their categories.

use super::models::{Category, CategoryForm, MenuItem};
use super::{EntityId, ResourceClient};
use crate::error::ApiError;
use crate::net::{ApiClient, ApiRequest};

pub const MENU_ITEMS_PATH: &str = "/admin/menu-items";
pub const CATEGORIES_PATH: &str = "/admin/categories";

#[derive(Clone)]
pub struct MenuApi {
    client: ApiClient,
    items: ResourceClient<MenuItem>,
    categories: ResourceClient<Category>,
}

impl MenuApi {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self {
            items: ResourceClient::new(client.clone(), MENU_ITEMS_PATH),
            categories: ResourceClient::new(client.clone(), CATEGORIES_PATH),
            client,
        }
    }

    /// Full CRUD on menu items.
    #[must_use]
    pub fn items(&self) -> &ResourceClient<MenuItem> {
        &self.items
    }

    /// Show or hide an item on the customer menu.
    ///
    /// # Errors
    ///
    /// Propagates request and decode errors.
    pub async fn toggle_status(&self, id: &EntityId, active: bool) -> Result<MenuItem, ApiError> {
        let request = ApiRequest::patch(format!("{}/status", self.items.item_path(id))).with_query("isActive", active);
        self.client.json(&request).await
    }

    /// # Errors
    ///
    /// Propagates request and decode errors.
    pub async fn categories(&self) -> Result<Vec<Category>, ApiError> {
        self.categories.list().await
    }

    /// # Errors
    ///
    /// `ApiError::Validation` for a blank name, otherwise request errors.
    pub async fn create_category(&self, form: &CategoryForm) -> Result<Category, ApiError> {
        self.categories.create(form).await
    }
}
