use std::str::FromStr;
use std::sync::Arc;

use crate::commands::CommandResult;
use petsit_core::config::{AppConfig, LoadOptions};
use petsit_core::{
    CategorySlug, PriceUnit, RecommendationEngine, RecommendationRequest, StoreError,
};
use petsit_db::repositories::{SqlCategoryDirectory, SqlListingRepository, SqlSessionStore};
use petsit_db::{connect_with_settings, migrations};

/// Query a recommendation against the configured database. On success the
/// output is the recommendation wire payload itself, pretty-printed.
pub fn run(category: &str, unit: &str, token: Option<&str>) -> CommandResult {
    let slug = CategorySlug::new(category);
    if slug.as_str().is_empty() {
        return CommandResult::failure("recommend", "invalid_argument", "category is required", 2);
    }

    let unit = match PriceUnit::from_str(unit) {
        Ok(unit) => unit,
        Err(error) => {
            return CommandResult::failure("recommend", "invalid_argument", error.to_string(), 2);
        }
    };

    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "recommend",
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                "recommend",
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                3,
            );
        }
    };

    let result = runtime.block_on(async {
        let pool = connect_with_settings(
            &config.database.url,
            config.database.max_connections,
            config.database.timeout_secs,
        )
        .await
        .map_err(|error| ("db_connectivity", error.to_string(), 4u8))?;

        migrations::run_pending(&pool)
            .await
            .map_err(|error| ("migration", error.to_string(), 5u8))?;

        let engine = RecommendationEngine::new(
            Arc::new(SqlSessionStore::new(pool.clone())),
            Arc::new(SqlCategoryDirectory::new(pool.clone())),
            Arc::new(SqlListingRepository::new(pool.clone())),
            config.pricing.clone(),
        );

        let request = RecommendationRequest {
            token: token.map(String::from),
            category: slug.clone(),
            unit,
        };
        let recommendation = engine.recommend(&request).await.map_err(|error| match error {
            StoreError::Unavailable(detail) => ("store_unavailable", detail, 4u8),
        })?;

        pool.close().await;
        Ok::<_, (&'static str, String, u8)>(recommendation)
    });

    match result {
        Ok(recommendation) => {
            let output = serde_json::to_string_pretty(&recommendation)
                .unwrap_or_else(|error| format!("{{\"error\":\"{error}\"}}"));
            CommandResult { exit_code: 0, output }
        }
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("recommend", error_class, message, exit_code)
        }
    }
}
