//! Best-effort audit logging of inbound chat messages.
//!
//! The contract is deliberately one-way: a store failure is reported to the
//! log and swallowed, so the user-facing reply never depends on the audit
//! write succeeding.
use crate::db::{self, Pool};
use tracing::{instrument, warn};

#[instrument(skip_all)]
pub async fn record(
    pool: &Pool,
    telegram_user_id: i64,
    username: Option<&str>,
    full_name: &str,
    message_text: &str,
    access_granted: bool,
) {
    if let Err(err) = db::insert_log(
        pool,
        telegram_user_id,
        username,
        full_name,
        message_text,
        access_granted,
    )
    .await
    {
        warn!(?err, telegram_user_id, "failed to write audit log entry");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::SqlitePool;

    #[tokio::test]
    async fn record_persists_one_row() {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        db::init_schema(&pool).await.unwrap();

        record(&pool, 42, Some("alice"), "Alice A", "/start", true).await;

        let logs = db::recent_logs(&pool, 10).await.unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].telegram_user_id, 42);
        assert_eq!(logs[0].username.as_deref(), Some("alice"));
        assert_eq!(logs[0].message_text, "/start");
        assert!(logs[0].access_granted);
    }

    #[tokio::test]
    async fn record_swallows_store_failure() {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        db::init_schema(&pool).await.unwrap();
        pool.close().await;

        // Must not panic or propagate the error.
        record(&pool, 42, None, "Alice A", "hello", false).await;
    }
}
