use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::Location;

/// Read-only lookup of the locations shifts can be scheduled at.
#[async_trait]
pub trait LocationDirectory: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Location>>;

    /// All locations ordered by name.
    async fn list_all(&self) -> Result<Vec<Location>>;
}

#[derive(Clone)]
pub struct PgLocationRepository {
    pool: PgPool,
}

impl PgLocationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LocationDirectory for PgLocationRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Location>> {
        let location = sqlx::query_as::<_, Location>(
            "SELECT id, name, address, post_code, created_at FROM locations WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(location)
    }

    async fn list_all(&self) -> Result<Vec<Location>> {
        let locations = sqlx::query_as::<_, Location>(
            "SELECT id, name, address, post_code, created_at FROM locations ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(locations)
    }
}
