pub mod config;
pub mod domain;
pub mod errors;
pub mod pricing;

pub use domain::recommendation::{PriceRecommendation, PricingScope, RecommendedRange};
pub use domain::service::{
    CategorySlug, PriceUnit, Service, ServiceCategory, ServiceId, ServiceVariant, VariantId,
};
pub use domain::user::{AccountType, SellerLocation, Session, UserId, UserProfile};
pub use errors::{ApplicationError, DomainError};
pub use pricing::recommend::{
    CategoryDirectory, ComparableQuery, ComparableScope, ComparableSource, RecommendationEngine,
    RecommendationRequest, SessionStore, StoreError,
};
pub use pricing::reference::ReferenceRange;
pub use pricing::stats::SampleStats;
