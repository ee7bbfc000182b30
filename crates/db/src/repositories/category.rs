use async_trait::async_trait;
use sqlx::Row;

use petsit_core::{CategoryDirectory, CategorySlug, ServiceCategory, StoreError};

use super::RepositoryError;
use crate::DbPool;

/// SQLite-backed category directory with the admin default-price override.
pub struct SqlCategoryDirectory {
    pool: DbPool,
}

impl SqlCategoryDirectory {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn load_category(
        &self,
        slug: &CategorySlug,
    ) -> Result<Option<ServiceCategory>, RepositoryError> {
        let row = sqlx::query(
            "SELECT slug, label, default_hourly_price FROM service_category WHERE slug = ?",
        )
        .bind(slug.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| {
            Ok(ServiceCategory {
                slug: CategorySlug::new(row.try_get::<String, _>("slug")?.as_str()),
                label: row.try_get("label")?,
                default_hourly_price: row.try_get("default_hourly_price")?,
            })
        })
        .transpose()
    }

    /// Admin operation: create or update a category, replacing its default
    /// price. A `None` default clears the override.
    pub async fn upsert(&self, category: &ServiceCategory) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO service_category (slug, label, default_hourly_price)
            VALUES (?, ?, ?)
            ON CONFLICT(slug) DO UPDATE SET
                label = excluded.label,
                default_hourly_price = excluded.default_hourly_price
            "#,
        )
        .bind(category.slug.as_str())
        .bind(&category.label)
        .bind(category.default_hourly_price)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl CategoryDirectory for SqlCategoryDirectory {
    async fn find_category(
        &self,
        slug: &CategorySlug,
    ) -> Result<Option<ServiceCategory>, StoreError> {
        self.load_category(slug).await.map_err(StoreError::from)
    }
}
