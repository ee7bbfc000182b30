use sqlx::Executor;

use crate::connection::DbPool;
use crate::repositories::RepositoryError;

/// Canonical demo seeds and verification contract for the recommendation
/// fallback chain.
const SEED_SCENARIOS: &[SeedScenario] = &[
    SeedScenario {
        name: "city_data_driven",
        category_slug: "garde",
        price_unit: "hour",
        expected_comparables: 4,
        admin_default_price: None,
        description: "Three active garde/hour sellers in Lyon - data-driven city scope",
    },
    SeedScenario {
        name: "platform_default",
        category_slug: "promenade",
        price_unit: "hour",
        expected_comparables: 1,
        admin_default_price: Some(1300),
        description: "One promenade seller - falls back to the admin default price",
    },
    SeedScenario {
        name: "reference_table",
        category_slug: "dressage",
        price_unit: "hour",
        expected_comparables: 0,
        admin_default_price: None,
        description: "No dressage listings and no admin default - static reference table",
    },
];

const SEED_USER_IDS: &[&str] = &[
    "demo-seller-lyon-1",
    "demo-seller-lyon-2",
    "demo-seller-lyon-3",
    "demo-seller-paris-1",
    "demo-requester",
];

const SEED_SESSION_TOKENS: &[&str] = &["demo-session-active", "demo-session-expired"];

const SEED_SERVICE_IDS: &[&str] = &[
    "demo-service-garde-1",
    "demo-service-garde-2",
    "demo-service-garde-3",
    "demo-service-garde-paused",
    "demo-service-promenade-1",
    "demo-service-pension-1",
];

const SEED_CATEGORY_SLUGS: &[&str] = &["garde", "promenade", "dressage"];

/// Demo seed dataset for the recommendation fallback chain.
///
/// Provides deterministic fixtures for:
/// 1. A data-driven recommendation at city scope
/// 2. The admin default-price fallback
/// 3. The static reference-table fallback
pub struct DemoSeedDataset;

impl DemoSeedDataset {
    /// SQL fixture content for the demo dataset.
    pub const SQL: &str = include_str!("../../../config/fixtures/demo_seed_data.sql");

    /// Load the demo dataset into the database. Statements use
    /// `INSERT OR REPLACE`, so reloading is idempotent.
    pub async fn load(pool: &DbPool) -> Result<SeedResult, RepositoryError> {
        let mut tx = pool.begin().await?;

        tx.execute(sqlx::query(Self::SQL)).await?;
        tx.commit().await?;

        let scenarios_seeded = SEED_SCENARIOS
            .iter()
            .map(|scenario| ScenarioSeedInfo {
                name: scenario.name,
                category_slug: scenario.category_slug,
                description: scenario.description,
            })
            .collect::<Vec<_>>();

        Ok(SeedResult { scenarios_seeded })
    }

    /// Verify that seed data exists and matches the contract.
    pub async fn verify(pool: &DbPool) -> Result<VerificationResult, RepositoryError> {
        let mut checks = Vec::new();

        let quoted_users = sql_array_from_ids(SEED_USER_IDS);
        let user_count: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(1) FROM user_account WHERE id IN {quoted_users}"
        ))
        .fetch_one(pool)
        .await?;
        checks.push(("user-accounts", user_count == SEED_USER_IDS.len() as i64));

        let quoted_tokens = sql_array_from_ids(SEED_SESSION_TOKENS);
        let session_count: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(1) FROM session WHERE token IN {quoted_tokens}"
        ))
        .fetch_one(pool)
        .await?;
        checks.push(("sessions", session_count == SEED_SESSION_TOKENS.len() as i64));

        let active_session_ok: i64 = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM session WHERE token = 'demo-session-active' AND expires_at > '2026-01-01')",
        )
        .fetch_one(pool)
        .await?;
        checks.push(("active-session-deadline", active_session_ok == 1));

        for scenario in SEED_SCENARIOS {
            let category_exists: i64 = sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM service_category WHERE slug = ?1)",
            )
            .bind(scenario.category_slug)
            .fetch_one(pool)
            .await?;
            checks.push((scenario.category_label(), category_exists == 1));

            let default_price: Option<i64> = sqlx::query_scalar(
                "SELECT default_hourly_price FROM service_category WHERE slug = ?1",
            )
            .bind(scenario.category_slug)
            .fetch_one(pool)
            .await?;
            checks.push((scenario.default_price_label(), default_price == scenario.admin_default_price));

            let comparable_count: i64 = sqlx::query_scalar(
                "SELECT COUNT(1) FROM service_variant v \
                 JOIN service s ON s.id = v.service_id \
                 WHERE s.category_slug = ?1 AND s.price_unit = ?2 \
                   AND s.is_active = 1 AND v.is_active = 1 AND v.price > 0 \
                   AND s.owner_id <> 'demo-requester'",
            )
            .bind(scenario.category_slug)
            .bind(scenario.price_unit)
            .fetch_one(pool)
            .await?;
            checks.push((
                scenario.comparable_count_label(),
                comparable_count == scenario.expected_comparables,
            ));
        }

        let all_present = checks.iter().all(|(_, exists)| *exists);
        Ok(VerificationResult { all_present, checks })
    }

    /// Clean up seeded fixtures from a test database.
    pub async fn clean(pool: &DbPool) -> Result<(), RepositoryError> {
        let mut tx = pool.begin().await?;

        let quoted_services = sql_array_from_ids(SEED_SERVICE_IDS);
        let quoted_tokens = sql_array_from_ids(SEED_SESSION_TOKENS);
        let quoted_users = sql_array_from_ids(SEED_USER_IDS);
        let quoted_categories = sql_array_from_ids(SEED_CATEGORY_SLUGS);

        sqlx::query(&format!(
            "DELETE FROM service_variant WHERE service_id IN {quoted_services}"
        ))
        .execute(&mut *tx)
        .await?;
        sqlx::query(&format!("DELETE FROM service WHERE id IN {quoted_services}"))
            .execute(&mut *tx)
            .await?;
        sqlx::query(&format!("DELETE FROM session WHERE token IN {quoted_tokens}"))
            .execute(&mut *tx)
            .await?;
        sqlx::query(&format!("DELETE FROM user_account WHERE id IN {quoted_users}"))
            .execute(&mut *tx)
            .await?;
        sqlx::query(&format!("DELETE FROM service_category WHERE slug IN {quoted_categories}"))
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
struct SeedScenario {
    name: &'static str,
    category_slug: &'static str,
    price_unit: &'static str,
    expected_comparables: i64,
    admin_default_price: Option<i64>,
    description: &'static str,
}

impl SeedScenario {
    fn category_label(&self) -> &'static str {
        match self.name {
            "city_data_driven" => "category-garde",
            "platform_default" => "category-promenade",
            _ => "category-dressage",
        }
    }

    fn default_price_label(&self) -> &'static str {
        match self.name {
            "city_data_driven" => "default-price-garde",
            "platform_default" => "default-price-promenade",
            _ => "default-price-dressage",
        }
    }

    fn comparable_count_label(&self) -> &'static str {
        match self.name {
            "city_data_driven" => "comparables-garde",
            "platform_default" => "comparables-promenade",
            _ => "comparables-dressage",
        }
    }
}

fn sql_array_from_ids(ids: &[&str]) -> String {
    let quoted = ids.iter().map(|id| format!("'{}'", id)).collect::<Vec<_>>().join(",");
    format!("({quoted})")
}

#[derive(Debug)]
pub struct SeedResult {
    pub scenarios_seeded: Vec<ScenarioSeedInfo>,
}

#[derive(Debug)]
pub struct ScenarioSeedInfo {
    pub name: &'static str,
    pub category_slug: &'static str,
    pub description: &'static str,
}

#[derive(Debug)]
pub struct VerificationResult {
    pub all_present: bool,
    pub checks: Vec<(&'static str, bool)>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{connect_with_settings, migrations};

    #[test]
    fn sql_fixture_is_valid() {
        assert!(!DemoSeedDataset::SQL.is_empty());
    }

    #[tokio::test]
    async fn verify_seed_contract_and_idempotency() {
        let pool = connect_with_settings("sqlite::memory:?cache=shared", 1, 30)
            .await
            .expect("connect to test database");

        migrations::run_pending(&pool).await.expect("run migrations");

        let first = DemoSeedDataset::load(&pool).await.expect("load seed fixtures");
        let first_verification =
            DemoSeedDataset::verify(&pool).await.expect("verify seed fixtures");
        assert!(first_verification.all_present, "checks: {:?}", first_verification.checks);
        assert_eq!(first.scenarios_seeded.len(), 3);

        let second = DemoSeedDataset::load(&pool).await.expect("reload seed fixtures");
        let second_verification =
            DemoSeedDataset::verify(&pool).await.expect("re-verify seed fixtures");
        assert!(second_verification.all_present);
        assert_eq!(second.scenarios_seeded.len(), 3);
        assert_eq!(first_verification.checks, second_verification.checks);

        pool.close().await;
    }

    #[tokio::test]
    async fn clean_removes_every_seeded_row() {
        let pool = connect_with_settings("sqlite::memory:?cache=shared", 1, 30)
            .await
            .expect("connect to test database");

        migrations::run_pending(&pool).await.expect("run migrations");
        DemoSeedDataset::load(&pool).await.expect("load seed fixtures");
        DemoSeedDataset::clean(&pool).await.expect("clean seed fixtures");

        for table in ["user_account", "session", "service", "service_variant", "service_category"] {
            let remaining: i64 = sqlx::query_scalar(&format!("SELECT COUNT(1) FROM {table}"))
                .fetch_one(&pool)
                .await
                .expect("count remaining rows");
            assert_eq!(remaining, 0, "{table} should be empty after clean");
        }

        pool.close().await;
    }

    #[tokio::test]
    async fn seeded_garde_market_produces_three_lyon_comparables() {
        let pool = connect_with_settings("sqlite::memory:?cache=shared", 1, 30)
            .await
            .expect("connect to test database");

        migrations::run_pending(&pool).await.expect("run migrations");
        DemoSeedDataset::load(&pool).await.expect("load seed fixtures");

        let mut prices: Vec<i64> = sqlx::query_scalar(
            "SELECT v.price FROM service_variant v \
             JOIN service s ON s.id = v.service_id \
             JOIN user_account u ON u.id = s.owner_id \
             WHERE s.category_slug = 'garde' AND s.price_unit = 'hour' \
               AND s.is_active = 1 AND v.is_active = 1 AND v.price > 0 \
               AND s.owner_id <> 'demo-requester' AND u.city = 'lyon'",
        )
        .fetch_all(&pool)
        .await
        .expect("scan lyon garde prices");
        prices.sort_unstable();
        assert_eq!(prices, vec![1000, 1200, 1400, 1500]);

        pool.close().await;
    }
}
