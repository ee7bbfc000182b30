use async_trait::async_trait;
use sqlx::Row;

use petsit_core::{ComparableQuery, ComparableScope, ComparableSource, StoreError};

use super::RepositoryError;
use crate::DbPool;

/// SQLite-backed comparable price scan.
///
/// One query covers the whole contract: active services in the category,
/// active variants with `price > 0`, services priced in the requested unit,
/// the requesting seller's own listings excluded, optionally narrowed to the
/// seller's city, department, or region through the owner join.
pub struct SqlListingRepository {
    pool: DbPool,
}

const COMPARABLE_SCAN: &str = r#"
    SELECT v.price
    FROM service_variant v
    JOIN service s ON s.id = v.service_id
    JOIN user_account u ON u.id = s.owner_id
    WHERE s.category_slug = ?
      AND s.is_active = 1
      AND v.is_active = 1
      AND v.price > 0
      AND s.price_unit = ?
      AND s.owner_id <> ?
"#;

impl SqlListingRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn scan(&self, query: &ComparableQuery) -> Result<Vec<i64>, RepositoryError> {
        let (sql, scope_value) = match &query.scope {
            ComparableScope::City(city) => {
                (format!("{COMPARABLE_SCAN} AND u.city = ?"), Some(city.as_str()))
            }
            ComparableScope::Department(department) => {
                (format!("{COMPARABLE_SCAN} AND u.department = ?"), Some(department.as_str()))
            }
            ComparableScope::Region(region) => {
                (format!("{COMPARABLE_SCAN} AND u.region = ?"), Some(region.as_str()))
            }
            ComparableScope::National => (COMPARABLE_SCAN.to_string(), None),
        };

        let mut db_query = sqlx::query(&sql)
            .bind(query.category.as_str())
            .bind(query.unit.as_str())
            .bind(&query.exclude_owner.0);
        if let Some(value) = scope_value {
            db_query = db_query.bind(value);
        }

        let rows = db_query.fetch_all(&self.pool).await?;
        rows.into_iter()
            .map(|row| row.try_get::<i64, _>("price").map_err(RepositoryError::from))
            .collect()
    }
}

#[async_trait]
impl ComparableSource for SqlListingRepository {
    async fn comparable_prices(&self, query: &ComparableQuery) -> Result<Vec<i64>, StoreError> {
        self.scan(query).await.map_err(StoreError::from)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use petsit_core::{
        CategorySlug, ComparableQuery, ComparableScope, ComparableSource, PriceUnit, UserId,
    };

    use super::SqlListingRepository;
    use crate::{connect_with_settings, migrations, DbPool};

    async fn setup_pool() -> DbPool {
        let pool = connect_with_settings("sqlite::memory:?cache=shared", 1, 30)
            .await
            .expect("connect test pool");
        migrations::run_pending(&pool).await.expect("run migrations");
        pool
    }

    async fn insert_user(pool: &DbPool, id: &str, city: Option<&str>, department: Option<&str>) {
        sqlx::query(
            "INSERT INTO user_account (id, display_name, account_type, city, department, created_at)
             VALUES (?, ?, 'particulier', ?, ?, ?)",
        )
        .bind(id)
        .bind(id)
        .bind(city)
        .bind(department)
        .bind(Utc::now().to_rfc3339())
        .execute(pool)
        .await
        .expect("insert user");
    }

    async fn insert_service(
        pool: &DbPool,
        id: &str,
        owner: &str,
        category: &str,
        unit: &str,
        active: bool,
    ) {
        sqlx::query(
            "INSERT INTO service (id, owner_id, category_slug, price_unit, is_active, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(owner)
        .bind(category)
        .bind(unit)
        .bind(active)
        .bind(Utc::now().to_rfc3339())
        .execute(pool)
        .await
        .expect("insert service");
    }

    async fn insert_variant(pool: &DbPool, id: &str, service: &str, price: i64, active: bool) {
        sqlx::query(
            "INSERT INTO service_variant (id, service_id, label, price, is_active)
             VALUES (?, ?, 'standard', ?, ?)",
        )
        .bind(id)
        .bind(service)
        .bind(price)
        .bind(active)
        .execute(pool)
        .await
        .expect("insert variant");
    }

    fn query(exclude: &str, scope: ComparableScope) -> ComparableQuery {
        ComparableQuery {
            category: CategorySlug::new("garde"),
            unit: PriceUnit::Hour,
            exclude_owner: UserId(exclude.to_string()),
            scope,
        }
    }

    #[tokio::test]
    async fn scan_collects_active_variant_prices_in_the_category() {
        let pool = setup_pool().await;
        insert_user(&pool, "U-1", None, None).await;
        insert_user(&pool, "U-2", None, None).await;
        insert_service(&pool, "S-1", "U-1", "garde", "hour", true).await;
        insert_service(&pool, "S-2", "U-2", "garde", "hour", true).await;
        insert_variant(&pool, "V-1", "S-1", 1000, true).await;
        insert_variant(&pool, "V-2", "S-1", 1500, true).await;
        insert_variant(&pool, "V-3", "S-2", 1200, true).await;

        let repo = SqlListingRepository::new(pool.clone());
        let mut prices = repo
            .comparable_prices(&query("U-99", ComparableScope::National))
            .await
            .expect("scan");
        prices.sort_unstable();
        assert_eq!(prices, vec![1000, 1200, 1500]);

        pool.close().await;
    }

    #[tokio::test]
    async fn scan_excludes_owner_inactive_rows_and_zero_prices() {
        let pool = setup_pool().await;
        insert_user(&pool, "U-1", None, None).await;
        insert_user(&pool, "U-2", None, None).await;
        insert_service(&pool, "S-own", "U-1", "garde", "hour", true).await;
        insert_service(&pool, "S-active", "U-2", "garde", "hour", true).await;
        insert_service(&pool, "S-paused", "U-2", "garde", "hour", false).await;
        insert_variant(&pool, "V-own", "S-own", 9900, true).await;
        insert_variant(&pool, "V-ok", "S-active", 1100, true).await;
        insert_variant(&pool, "V-off", "S-active", 1200, false).await;
        insert_variant(&pool, "V-zero", "S-active", 0, true).await;
        insert_variant(&pool, "V-paused", "S-paused", 1300, true).await;

        let repo = SqlListingRepository::new(pool.clone());
        let prices = repo
            .comparable_prices(&query("U-1", ComparableScope::National))
            .await
            .expect("scan");
        assert_eq!(prices, vec![1100]);

        pool.close().await;
    }

    #[tokio::test]
    async fn scan_is_restricted_to_the_requested_unit() {
        let pool = setup_pool().await;
        insert_user(&pool, "U-2", None, None).await;
        insert_service(&pool, "S-hour", "U-2", "garde", "hour", true).await;
        insert_service(&pool, "S-week", "U-2", "garde", "week", true).await;
        insert_variant(&pool, "V-hour", "S-hour", 1000, true).await;
        insert_variant(&pool, "V-week", "S-week", 20000, true).await;

        let repo = SqlListingRepository::new(pool.clone());
        let prices = repo
            .comparable_prices(&query("U-99", ComparableScope::National))
            .await
            .expect("scan");
        assert_eq!(prices, vec![1000]);

        pool.close().await;
    }

    #[tokio::test]
    async fn city_and_department_scopes_filter_through_the_owner_join() {
        let pool = setup_pool().await;
        insert_user(&pool, "U-lyon", Some("lyon"), Some("rhone")).await;
        insert_user(&pool, "U-givors", Some("givors"), Some("rhone")).await;
        insert_user(&pool, "U-paris", Some("paris"), Some("paris")).await;
        for (service, owner, variant, price) in [
            ("S-lyon", "U-lyon", "V-lyon", 1000),
            ("S-givors", "U-givors", "V-givors", 1200),
            ("S-paris", "U-paris", "V-paris", 1400),
        ] {
            insert_service(&pool, service, owner, "garde", "hour", true).await;
            insert_variant(&pool, variant, service, price, true).await;
        }

        let repo = SqlListingRepository::new(pool.clone());

        let city = repo
            .comparable_prices(&query("U-99", ComparableScope::City("lyon".to_string())))
            .await
            .expect("city scan");
        assert_eq!(city, vec![1000]);

        let mut department = repo
            .comparable_prices(&query("U-99", ComparableScope::Department("rhone".to_string())))
            .await
            .expect("department scan");
        department.sort_unstable();
        assert_eq!(department, vec![1000, 1200]);

        let national = repo
            .comparable_prices(&query("U-99", ComparableScope::National))
            .await
            .expect("national scan");
        assert_eq!(national.len(), 3);

        pool.close().await;
    }
}
