//! Price recommendation engine.
//!
//! Orchestrates session resolution, comparable aggregation, and the fallback
//! chain. Session problems are never errors: an unknown, expired, or missing
//! token degrades to the reference-table path with the `particulier` account
//! assumption. Only store failures propagate.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use thiserror::Error;

use crate::config::PricingConfig;
use crate::domain::recommendation::{PriceRecommendation, PricingScope, RecommendedRange};
use crate::domain::service::{CategorySlug, PriceUnit, ServiceCategory};
use crate::domain::user::{AccountType, SellerLocation, Session, UserId, UserProfile};
use crate::pricing::reference;
use crate::pricing::stats::SampleStats;

pub const MSG_PLATFORM_DEFAULT: &str = "Prix conseillé par la plateforme";
pub const MSG_MARKET_REFERENCE: &str = "Prix indicatifs (référence marché)";
pub const MSG_INSUFFICIENT_DATA: &str = "Prix indicatifs (données insuffisantes)";

/// Failure surfaced by a store backing the engine.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn find_session(&self, token: &str) -> Result<Option<Session>, StoreError>;
    async fn find_user(&self, id: &UserId) -> Result<Option<UserProfile>, StoreError>;
}

#[async_trait]
pub trait CategoryDirectory: Send + Sync {
    async fn find_category(
        &self,
        slug: &CategorySlug,
    ) -> Result<Option<ServiceCategory>, StoreError>;
}

/// Market breadth a comparable scan is restricted to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ComparableScope {
    City(String),
    Department(String),
    Region(String),
    National,
}

impl ComparableScope {
    pub fn pricing_scope(&self) -> PricingScope {
        match self {
            Self::City(_) => PricingScope::City,
            Self::Department(_) => PricingScope::Department,
            Self::Region(_) => PricingScope::Region,
            Self::National => PricingScope::National,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ComparableQuery {
    pub category: CategorySlug,
    pub unit: PriceUnit,
    pub exclude_owner: UserId,
    pub scope: ComparableScope,
}

/// Source of comparable prices: active variants (`price > 0`) of active
/// services in the category, excluding the requesting seller's own listings,
/// restricted to services priced in the requested unit.
#[async_trait]
pub trait ComparableSource: Send + Sync {
    async fn comparable_prices(&self, query: &ComparableQuery) -> Result<Vec<i64>, StoreError>;
}

#[derive(Clone, Debug)]
pub struct RecommendationRequest {
    pub token: Option<String>,
    pub category: CategorySlug,
    pub unit: PriceUnit,
}

pub struct RecommendationEngine {
    sessions: Arc<dyn SessionStore>,
    categories: Arc<dyn CategoryDirectory>,
    comparables: Arc<dyn ComparableSource>,
    config: PricingConfig,
}

impl RecommendationEngine {
    pub fn new(
        sessions: Arc<dyn SessionStore>,
        categories: Arc<dyn CategoryDirectory>,
        comparables: Arc<dyn ComparableSource>,
        config: PricingConfig,
    ) -> Self {
        Self { sessions, categories, comparables, config }
    }

    pub async fn recommend(
        &self,
        request: &RecommendationRequest,
    ) -> Result<PriceRecommendation, StoreError> {
        let caller = self.resolve_caller(request.token.as_deref()).await?;

        let Some(caller) = caller else {
            return self
                .fallback(&request.category, request.unit, AccountType::Particulier, 0)
                .await;
        };

        let mut observed = 0usize;
        for scope in scope_ladder(&caller.location) {
            let query = ComparableQuery {
                category: request.category.clone(),
                unit: request.unit,
                exclude_owner: caller.id.clone(),
                scope: scope.clone(),
            };
            let prices = self.comparables.comparable_prices(&query).await?;
            observed = observed.max(prices.len());

            if prices.len() >= self.config.min_sample_size {
                // Non-empty by the threshold check above.
                let stats = SampleStats::compute(&prices)
                    .ok_or_else(|| StoreError::Unavailable("empty comparable sample".into()))?;
                return Ok(data_driven(&stats, scope.pricing_scope()));
            }
        }

        self.fallback(&request.category, request.unit, caller.account_type, observed).await
    }

    async fn resolve_caller(&self, token: Option<&str>) -> Result<Option<UserProfile>, StoreError> {
        let Some(token) = token else { return Ok(None) };

        let Some(session) = self.sessions.find_session(token).await? else {
            return Ok(None);
        };
        if session.is_expired(Utc::now()) {
            return Ok(None);
        }

        self.sessions.find_user(&session.user_id).await
    }

    /// Reference-table path: admin category default first, then the static
    /// table, then the generic hard fallback. Always labeled `default` and
    /// `is_default_pricing`.
    async fn fallback(
        &self,
        category: &CategorySlug,
        unit: PriceUnit,
        account: AccountType,
        sample_size: usize,
    ) -> Result<PriceRecommendation, StoreError> {
        let admin_default = self
            .categories
            .find_category(category)
            .await?
            .and_then(|record| record.default_hourly_price)
            .filter(|price| *price > 0);

        if let Some(price) = admin_default {
            let band = self.config.default_band_pct;
            let low = apply_pct(price, 100 - band);
            let high = apply_pct(price, 100 + band);
            return Ok(PriceRecommendation {
                has_data: false,
                sample_size,
                min_price: low,
                max_price: high,
                avg_price: price,
                recommended_range: RecommendedRange { low, high },
                scope_used: PricingScope::Default,
                message: Some(MSG_PLATFORM_DEFAULT.to_string()),
                is_default_pricing: true,
            });
        }

        if let Some(range) = reference::lookup(category, account, unit) {
            return Ok(PriceRecommendation {
                has_data: false,
                sample_size,
                min_price: range.min,
                max_price: range.max,
                avg_price: range.avg,
                recommended_range: RecommendedRange { low: range.min, high: range.max },
                scope_used: PricingScope::Default,
                message: Some(MSG_MARKET_REFERENCE.to_string()),
                is_default_pricing: true,
            });
        }

        Ok(PriceRecommendation {
            has_data: false,
            sample_size,
            min_price: self.config.fallback_min,
            max_price: self.config.fallback_max,
            avg_price: self.config.fallback_avg,
            recommended_range: RecommendedRange {
                low: self.config.fallback_min,
                high: self.config.fallback_recommended_high,
            },
            scope_used: PricingScope::Default,
            message: Some(MSG_INSUFFICIENT_DATA.to_string()),
            is_default_pricing: true,
        })
    }
}

fn data_driven(stats: &SampleStats, scope: PricingScope) -> PriceRecommendation {
    PriceRecommendation {
        has_data: true,
        sample_size: stats.sample_size,
        min_price: stats.min,
        max_price: stats.max,
        avg_price: stats.avg,
        recommended_range: RecommendedRange { low: stats.p25, high: stats.p75 },
        scope_used: scope,
        message: None,
        is_default_pricing: false,
    }
}

/// Narrowest-first scope sequence for a seller: city, department, region as
/// present in the profile, always ending with national.
fn scope_ladder(location: &SellerLocation) -> Vec<ComparableScope> {
    let mut scopes = Vec::with_capacity(4);
    if let Some(city) = &location.city {
        scopes.push(ComparableScope::City(city.clone()));
    }
    if let Some(department) = &location.department {
        scopes.push(ComparableScope::Department(department.clone()));
    }
    if let Some(region) = &location.region {
        scopes.push(ComparableScope::Region(region.clone()));
    }
    scopes.push(ComparableScope::National);
    scopes
}

/// Integer percentage of a cent amount, rounded to the nearest cent.
fn apply_pct(amount: i64, pct: i64) -> i64 {
    (amount * pct + 50) / 100
}
