use sqlx::migrate::{MigrateError, Migrator};

use crate::DbPool;

pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

pub async fn run_pending(pool: &DbPool) -> Result<(), MigrateError> {
    MIGRATOR.run(pool).await
}

#[cfg(test)]
mod tests {
    use sqlx::Row;

    use super::{run_pending, MIGRATOR};
    use crate::connect_with_settings;

    const BASELINE_TABLES: &[&str] =
        &["user_account", "session", "service_category", "service", "service_variant"];

    const BASELINE_INDEXES: &[&str] = &[
        "idx_session_user_id",
        "idx_service_category_active",
        "idx_service_owner_id",
        "idx_service_variant_service_active",
    ];

    async fn count_objects(pool: &sqlx::SqlitePool, kind: &str, names: &[&str]) -> i64 {
        let placeholders = names.iter().map(|_| "?").collect::<Vec<_>>().join(", ");
        let sql = format!(
            "SELECT COUNT(*) AS count FROM sqlite_master WHERE type = ? AND name IN ({placeholders})"
        );
        let mut query = sqlx::query(&sql).bind(kind);
        for name in names {
            query = query.bind(*name);
        }
        query.fetch_one(pool).await.expect("count schema objects").get::<i64, _>("count")
    }

    #[tokio::test]
    async fn migrations_create_baseline_schema() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        run_pending(&pool).await.expect("run migrations");

        let tables = count_objects(&pool, "table", BASELINE_TABLES).await;
        assert_eq!(tables, BASELINE_TABLES.len() as i64);

        let indexes = count_objects(&pool, "index", BASELINE_INDEXES).await;
        assert_eq!(indexes, BASELINE_INDEXES.len() as i64);
    }

    #[tokio::test]
    async fn migrations_are_reversible() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        run_pending(&pool).await.expect("run migrations");

        MIGRATOR.undo(&pool, 0).await.expect("undo migrations");

        let tables = count_objects(&pool, "table", BASELINE_TABLES).await;
        assert_eq!(tables, 0);

        run_pending(&pool).await.expect("re-run migrations");
        let tables = count_objects(&pool, "table", BASELINE_TABLES).await;
        assert_eq!(tables, BASELINE_TABLES.len() as i64);
    }
}
