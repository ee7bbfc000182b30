use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

/// Account tier. Selects which half of the static reference table applies;
/// professional sellers carry higher market rates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    Particulier,
    Pro,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Particulier => "particulier",
            Self::Pro => "pro",
        }
    }
}

impl std::str::FromStr for AccountType {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "particulier" => Ok(Self::Particulier),
            "pro" => Ok(Self::Pro),
            other => Err(DomainError::UnknownAccountType { value: other.to_string() }),
        }
    }
}

/// Where the seller operates. All levels are optional; comparable
/// aggregation narrows to the tightest level that is present.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SellerLocation {
    pub city: Option<String>,
    pub department: Option<String>,
    pub region: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub display_name: String,
    pub account_type: AccountType,
    pub location: SellerLocation,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user_id: UserId,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::{Session, UserId};

    #[test]
    fn session_expiry_is_inclusive_of_the_deadline() {
        let now = Utc::now();
        let session = Session {
            token: "tok-1".to_string(),
            user_id: UserId("U-1".to_string()),
            expires_at: now,
        };

        assert!(session.is_expired(now));
        assert!(!session.is_expired(now - Duration::seconds(1)));
        assert!(session.is_expired(now + Duration::seconds(1)));
    }
}
