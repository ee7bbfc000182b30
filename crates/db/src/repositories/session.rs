use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;

use petsit_core::{
    AccountType, SellerLocation, Session, SessionStore, StoreError, UserId, UserProfile,
};

use super::RepositoryError;
use crate::DbPool;

/// SQLite-backed session and seller lookup.
pub struct SqlSessionStore {
    pool: DbPool,
}

impl SqlSessionStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn load_session(&self, token: &str) -> Result<Option<Session>, RepositoryError> {
        let row = sqlx::query("SELECT token, user_id, expires_at FROM session WHERE token = ?")
            .bind(token)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| {
            let expires_at_raw: String = row.try_get("expires_at")?;
            let expires_at = parse_timestamp("session.expires_at", &expires_at_raw)?;
            Ok(Session {
                token: row.try_get("token")?,
                user_id: UserId(row.try_get("user_id")?),
                expires_at,
            })
        })
        .transpose()
    }

    async fn load_user(&self, id: &UserId) -> Result<Option<UserProfile>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, display_name, account_type, city, department, region
             FROM user_account WHERE id = ?",
        )
        .bind(&id.0)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| {
            let account_type_raw: String = row.try_get("account_type")?;
            let account_type = AccountType::from_str(&account_type_raw)
                .map_err(|error| RepositoryError::Decode(error.to_string()))?;
            Ok(UserProfile {
                id: UserId(row.try_get("id")?),
                display_name: row.try_get("display_name")?,
                account_type,
                location: SellerLocation {
                    city: row.try_get("city")?,
                    department: row.try_get("department")?,
                    region: row.try_get("region")?,
                },
            })
        })
        .transpose()
    }
}

fn parse_timestamp(field: &str, value: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(value)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|error| RepositoryError::Decode(format!("invalid timestamp for {field}: {error}")))
}

#[async_trait]
impl SessionStore for SqlSessionStore {
    async fn find_session(&self, token: &str) -> Result<Option<Session>, StoreError> {
        self.load_session(token).await.map_err(StoreError::from)
    }

    async fn find_user(&self, id: &UserId) -> Result<Option<UserProfile>, StoreError> {
        self.load_user(id).await.map_err(StoreError::from)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use petsit_core::{AccountType, SessionStore, UserId};

    use super::SqlSessionStore;
    use crate::{connect_with_settings, migrations, DbPool};

    async fn setup_pool() -> DbPool {
        let pool = connect_with_settings("sqlite::memory:?cache=shared", 1, 30)
            .await
            .expect("connect test pool");
        migrations::run_pending(&pool).await.expect("run migrations");
        pool
    }

    async fn insert_user(pool: &DbPool, id: &str, account_type: &str, city: Option<&str>) {
        sqlx::query(
            "INSERT INTO user_account (id, display_name, account_type, city, created_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(id)
        .bind(account_type)
        .bind(city)
        .bind(Utc::now().to_rfc3339())
        .execute(pool)
        .await
        .expect("insert user");
    }

    async fn insert_session(pool: &DbPool, token: &str, user_id: &str, expires_in_mins: i64) {
        let now = Utc::now();
        sqlx::query(
            "INSERT INTO session (token, user_id, expires_at, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(token)
        .bind(user_id)
        .bind((now + Duration::minutes(expires_in_mins)).to_rfc3339())
        .bind(now.to_rfc3339())
        .execute(pool)
        .await
        .expect("insert session");
    }

    #[tokio::test]
    async fn finds_stored_session_and_user() {
        let pool = setup_pool().await;
        insert_user(&pool, "U-1", "pro", Some("lyon")).await;
        insert_session(&pool, "tok-1", "U-1", 60).await;

        let store = SqlSessionStore::new(pool.clone());
        let session =
            store.find_session("tok-1").await.expect("query").expect("session present");
        assert_eq!(session.user_id, UserId("U-1".to_string()));
        assert!(!session.is_expired(Utc::now()));

        let user = store.find_user(&session.user_id).await.expect("query").expect("user present");
        assert_eq!(user.account_type, AccountType::Pro);
        assert_eq!(user.location.city.as_deref(), Some("lyon"));
        assert_eq!(user.location.department, None);

        pool.close().await;
    }

    #[tokio::test]
    async fn unknown_token_and_user_yield_none() {
        let pool = setup_pool().await;
        let store = SqlSessionStore::new(pool.clone());

        assert!(store.find_session("tok-missing").await.expect("query").is_none());
        assert!(store
            .find_user(&UserId("U-missing".to_string()))
            .await
            .expect("query")
            .is_none());

        pool.close().await;
    }

    #[tokio::test]
    async fn expired_session_round_trips_with_its_deadline() {
        let pool = setup_pool().await;
        insert_user(&pool, "U-1", "particulier", None).await;
        insert_session(&pool, "tok-old", "U-1", -5).await;

        let store = SqlSessionStore::new(pool.clone());
        let session =
            store.find_session("tok-old").await.expect("query").expect("session present");
        assert!(session.is_expired(Utc::now()));

        pool.close().await;
    }
}
