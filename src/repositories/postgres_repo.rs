use anyhow::anyhow;
use async_trait::async_trait;
use bb8_postgres::bb8::{Pool, PooledConnection};
use bb8_postgres::PostgresConnectionManager;
use bb8_postgres::tokio_postgres::{NoTls, Row};
use tracing::warn;
use crate::models::restaurant::LocalRestaurant;
use crate::repositories::catalog::RestaurantCatalog;

pub const RETRY_LIMIT: usize = 5;

/// Rows returned by a single text search.
pub const SEARCH_RESULT_CAP: i64 = 200;

const RESTAURANT_COLUMNS: &str =
    "id, name, address, city, state, country, latitude, longitude, created_at";

pub struct PostgresConnectionRepo {
    postgres_connection: Pool<PostgresConnectionManager<NoTls>>,
}

impl PostgresConnectionRepo {
    pub fn new(
        postgres_connection: Pool<PostgresConnectionManager<NoTls>>,
    ) -> Self {
        Self {
            postgres_connection
        }
    }

    async fn get_postgres_connection(
        &self,
    ) -> anyhow::Result<PooledConnection<PostgresConnectionManager<NoTls>>> {
        for _ in 0..RETRY_LIMIT {
            match self.postgres_connection.get().await {
                Ok(conn) => return Ok(conn),
                Err(e) => {
                    warn!("Failed to retrieve postgres connection due to: {}, retrying in 3s", e);
                    tokio::time::sleep(tokio::time::Duration::from_secs(3)).await;
                    continue;
                }
            }
        }

        Err(anyhow!("Failed to retrieve a valid connection from postgres pool, BAILING"))
    }

    pub async fn find_by_id(
        &self,
        restaurant_id: &str,
    ) -> anyhow::Result<Option<LocalRestaurant>> {
        let conn = self.get_postgres_connection().await?;
        let stmt = format!(
            "SELECT {} FROM restaurants WHERE id = $1 LIMIT 1;",
            RESTAURANT_COLUMNS
        );

        let row = conn
            .query_opt(&stmt, &[&restaurant_id])
            .await?;

        Ok(row.map(parse_row_into_restaurant))
    }

    pub async fn search_restaurants(
        &self,
        query: &str,
    ) -> anyhow::Result<Vec<LocalRestaurant>> {
        let conn = self.get_postgres_connection().await?;
        let stmt = format!(
            "SELECT {} FROM restaurants \
            WHERE $1::text = '' \
                OR name ILIKE '%' || $1::text || '%' \
                OR city ILIKE '%' || $1::text || '%' \
                OR address ILIKE '%' || $1::text || '%' \
                OR country ILIKE '%' || $1::text || '%' \
                OR COALESCE(state, '') ILIKE '%' || $1::text || '%' \
            ORDER BY created_at DESC \
            LIMIT $2;",
            RESTAURANT_COLUMNS
        );

        let rows = conn
            .query(&stmt, &[&query, &SEARCH_RESULT_CAP])
            .await?;

        Ok(rows.into_iter().map(parse_row_into_restaurant).collect())
    }
}

#[async_trait]
impl RestaurantCatalog for PostgresConnectionRepo {
    async fn search_by_text(&self, query: &str) -> anyhow::Result<Vec<LocalRestaurant>> {
        self.search_restaurants(query).await
    }
}

fn parse_row_into_restaurant(
    row: Row
) -> LocalRestaurant {
    LocalRestaurant {
        id: row.get("id"),
        name: row.get("name"),
        address: row.get("address"),
        city: row.get("city"),
        state: row.get("state"),
        country: row.get("country"),
        latitude: row.get::<&str, Option<f64>>("latitude"),
        longitude: row.get::<&str, Option<f64>>("longitude"),
        created_at: row.get("created_at"),
    }
}
