//! Seller-facing pricing API.
//!
//! JSON Endpoints:
//! - `GET /api/v1/pricing/recommendation` — recommended price for a category
//!   and billing unit (`category`, `unit`, optional `token` query parameters)

use std::str::FromStr;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use petsit_core::config::PricingConfig;
use petsit_core::{
    CategorySlug, PriceRecommendation, PriceUnit, RecommendationEngine, RecommendationRequest,
    StoreError,
};
use petsit_db::repositories::{SqlCategoryDirectory, SqlListingRepository, SqlSessionStore};
use petsit_db::DbPool;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Clone)]
pub struct ApiState {
    engine: Arc<RecommendationEngine>,
}

#[derive(Debug, Deserialize)]
pub struct RecommendationParams {
    pub category: String,
    pub unit: String,
    pub token: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
}

pub fn router(db_pool: DbPool, pricing: PricingConfig) -> Router {
    let engine = Arc::new(RecommendationEngine::new(
        Arc::new(SqlSessionStore::new(db_pool.clone())),
        Arc::new(SqlCategoryDirectory::new(db_pool.clone())),
        Arc::new(SqlListingRepository::new(db_pool)),
        pricing,
    ));

    Router::new()
        .route("/api/v1/pricing/recommendation", get(recommend_price))
        .with_state(ApiState { engine })
}

pub async fn recommend_price(
    State(state): State<ApiState>,
    Query(params): Query<RecommendationParams>,
) -> Result<Json<PriceRecommendation>, (StatusCode, Json<ApiError>)> {
    let category = CategorySlug::new(&params.category);
    if category.as_str().is_empty() {
        return Err(bad_request("category is required".to_string()));
    }

    let unit = PriceUnit::from_str(&params.unit)
        .map_err(|error| bad_request(error.to_string()))?;

    let request = RecommendationRequest {
        token: params.token.clone(),
        category: category.clone(),
        unit,
    };

    match state.engine.recommend(&request).await {
        Ok(recommendation) => {
            info!(
                event_name = "pricing.recommendation.served",
                category = %category,
                unit = %unit,
                scope = recommendation.scope_used.as_str(),
                sample_size = recommendation.sample_size,
                "recommendation served"
            );
            Ok(Json(recommendation))
        }
        Err(StoreError::Unavailable(detail)) => {
            warn!(
                event_name = "pricing.recommendation.store_unavailable",
                category = %category,
                unit = %unit,
                error = %detail,
                "recommendation store unavailable"
            );
            Err((
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiError { error: "pricing data temporarily unavailable".to_string() }),
            ))
        }
    }
}

fn bad_request(message: String) -> (StatusCode, Json<ApiError>) {
    (StatusCode::BAD_REQUEST, Json(ApiError { error: message }))
}
