use serde::{Deserialize, Serialize};

/// Market breadth of the comparable set behind a recommendation.
/// `Default` marks results produced from the reference table or the admin
/// category default rather than from live listings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PricingScope {
    City,
    Department,
    Region,
    National,
    Default,
}

impl PricingScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::City => "city",
            Self::Department => "department",
            Self::Region => "region",
            Self::National => "national",
            Self::Default => "default",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendedRange {
    pub low: i64,
    pub high: i64,
}

/// Output of the recommendation query. Prices are integer cents; the field
/// names serialize to the camelCase wire contract consumed by seller
/// dashboards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRecommendation {
    pub has_data: bool,
    pub sample_size: usize,
    pub min_price: i64,
    pub max_price: i64,
    pub avg_price: i64,
    pub recommended_range: RecommendedRange,
    pub scope_used: PricingScope,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub is_default_pricing: bool,
}
