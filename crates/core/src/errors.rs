use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("unknown price unit `{value}` (expected hour|half_day|day|week|month|flat)")]
    UnknownPriceUnit { value: String },
    #[error("unknown account type `{value}` (expected particulier|pro)")]
    UnknownAccountType { value: String },
    #[error("domain invariant violation: {0}")]
    InvariantViolation(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("persistence failure: {0}")]
    Persistence(String),
    #[error("configuration failure: {0}")]
    Configuration(String),
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use crate::domain::service::PriceUnit;
    use crate::errors::{ApplicationError, DomainError};

    #[test]
    fn domain_error_wraps_into_application_error() {
        let error = PriceUnit::from_str("per_walk").expect_err("unsupported unit");
        let application = ApplicationError::from(error);
        assert!(matches!(
            application,
            ApplicationError::Domain(DomainError::UnknownPriceUnit { ref value }) if value == "per_walk"
        ));
    }

    #[test]
    fn persistence_error_preserves_detail() {
        let error = ApplicationError::Persistence("database lock timeout".to_string());
        assert_eq!(error.to_string(), "persistence failure: database lock timeout");
    }
}
