use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::user::UserId;
use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServiceId(pub String);

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VariantId(pub String);

/// Billing unit a seller prices a service in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceUnit {
    Hour,
    HalfDay,
    Day,
    Week,
    Month,
    Flat,
}

impl PriceUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hour => "hour",
            Self::HalfDay => "half_day",
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Flat => "flat",
        }
    }
}

impl std::str::FromStr for PriceUnit {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "hour" => Ok(Self::Hour),
            "half_day" => Ok(Self::HalfDay),
            "day" => Ok(Self::Day),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "flat" => Ok(Self::Flat),
            other => Err(DomainError::UnknownPriceUnit { value: other.to_string() }),
        }
    }
}

impl std::fmt::Display for PriceUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized category identifier: ASCII lowercase, letters only.
///
/// Raw category input comes from listing forms and admin screens with
/// inconsistent casing and punctuation, so the slug is canonicalized at the
/// boundary and every lookup keys on the normalized form.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CategorySlug(String);

impl CategorySlug {
    pub fn new(raw: &str) -> Self {
        let normalized =
            raw.chars().filter(|c| c.is_alphabetic()).flat_map(|c| c.to_lowercase()).collect();
        Self(normalized)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CategorySlug {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Admin-maintained category record. `default_hourly_price` is the
/// platform-recommended base rate consulted before the static reference
/// table when comparable data is insufficient.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceCategory {
    pub slug: CategorySlug,
    pub label: String,
    pub default_hourly_price: Option<i64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub id: ServiceId,
    pub owner_id: UserId,
    pub category: CategorySlug,
    pub price_unit: PriceUnit,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// A priced option under a service. `price_cents` is the per-unit base rate
/// for the parent service's `price_unit`, always integer cents.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceVariant {
    pub id: VariantId,
    pub service_id: ServiceId,
    pub label: String,
    pub price_cents: i64,
    pub is_active: bool,
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::{CategorySlug, PriceUnit};

    #[test]
    fn slug_normalization_strips_non_letters_and_lowercases() {
        assert_eq!(CategorySlug::new("Garde de nuit").as_str(), "gardedenuit");
        assert_eq!(CategorySlug::new("chat-sitting 2024!").as_str(), "chatsitting");
        assert_eq!(CategorySlug::new("GARDE").as_str(), "garde");
    }

    #[test]
    fn price_unit_round_trips_through_str() {
        for unit in
            [PriceUnit::Hour, PriceUnit::HalfDay, PriceUnit::Day, PriceUnit::Week, PriceUnit::Month, PriceUnit::Flat]
        {
            assert_eq!(PriceUnit::from_str(unit.as_str()).expect("round trip"), unit);
        }
    }

    #[test]
    fn unsupported_price_unit_is_rejected() {
        assert!(PriceUnit::from_str("fortnight").is_err());
    }
}
