use async_trait::async_trait;
use crate::models::restaurant::LocalRestaurant;

/// Read access to the locally curated restaurants.
#[async_trait]
pub trait RestaurantCatalog: Send + Sync {
    /// Case-insensitive text search over the catalog. An empty query matches
    /// every restaurant, up to the store's own cap.
    async fn search_by_text(&self, query: &str) -> anyhow::Result<Vec<LocalRestaurant>>;
}
