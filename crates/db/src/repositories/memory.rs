//! In-memory store implementations.
//!
//! Drop-in substitutes for the `Sql*` repositories where a SQLite pool is
//! overkill, backed by mutex-guarded maps.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use petsit_core::{
    CategoryDirectory, CategorySlug, ComparableQuery, ComparableScope, ComparableSource, Service,
    ServiceCategory, ServiceVariant, Session, SessionStore, StoreError, UserId, UserProfile,
};

#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: Mutex<HashMap<String, Session>>,
    users: Mutex<HashMap<UserId, UserProfile>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_user(&self, user: UserProfile) {
        self.users.lock().unwrap().insert(user.id.clone(), user);
    }

    pub fn put_session(&self, session: Session) {
        self.sessions.lock().unwrap().insert(session.token.clone(), session);
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn find_session(&self, token: &str) -> Result<Option<Session>, StoreError> {
        Ok(self.sessions.lock().unwrap().get(token).cloned())
    }

    async fn find_user(&self, id: &UserId) -> Result<Option<UserProfile>, StoreError> {
        Ok(self.users.lock().unwrap().get(id).cloned())
    }
}

#[derive(Default)]
pub struct InMemoryCategoryDirectory {
    categories: Mutex<HashMap<String, ServiceCategory>>,
}

impl InMemoryCategoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&self, category: ServiceCategory) {
        self.categories
            .lock()
            .unwrap()
            .insert(category.slug.as_str().to_string(), category);
    }
}

#[async_trait]
impl CategoryDirectory for InMemoryCategoryDirectory {
    async fn find_category(
        &self,
        slug: &CategorySlug,
    ) -> Result<Option<ServiceCategory>, StoreError> {
        Ok(self.categories.lock().unwrap().get(slug.as_str()).cloned())
    }
}

/// A service with its variants and the owner's location, flattened for
/// comparable filtering.
#[derive(Clone)]
struct ListingRecord {
    service: Service,
    variants: Vec<ServiceVariant>,
    owner: UserProfile,
}

#[derive(Default)]
pub struct InMemoryListings {
    records: Mutex<Vec<ListingRecord>>,
}

impl InMemoryListings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&self, service: Service, variants: Vec<ServiceVariant>, owner: UserProfile) {
        self.records.lock().unwrap().push(ListingRecord { service, variants, owner });
    }

    fn scope_matches(owner: &UserProfile, scope: &ComparableScope) -> bool {
        match scope {
            ComparableScope::City(city) => owner.location.city.as_deref() == Some(city),
            ComparableScope::Department(department) => {
                owner.location.department.as_deref() == Some(department)
            }
            ComparableScope::Region(region) => owner.location.region.as_deref() == Some(region),
            ComparableScope::National => true,
        }
    }
}

#[async_trait]
impl ComparableSource for InMemoryListings {
    async fn comparable_prices(&self, query: &ComparableQuery) -> Result<Vec<i64>, StoreError> {
        let records = self.records.lock().unwrap();
        Ok(records
            .iter()
            .filter(|record| record.service.is_active)
            .filter(|record| record.service.category.as_str() == query.category.as_str())
            .filter(|record| record.service.price_unit == query.unit)
            .filter(|record| record.service.owner_id != query.exclude_owner)
            .filter(|record| Self::scope_matches(&record.owner, &query.scope))
            .flat_map(|record| {
                record
                    .variants
                    .iter()
                    .filter(|variant| variant.is_active && variant.price_cents > 0)
                    .map(|variant| variant.price_cents)
            })
            .collect())
    }
}
