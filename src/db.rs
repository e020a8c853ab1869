use crate::model::{City, LogEntry, Setting};
use anyhow::Result;
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::{info, instrument};

pub type Pool = SqlitePool;

/// Names seeded into `citys` on first startup.
pub const SEED_CITIES: [&str; 4] = ["Vienna", "Berlin", "Prague", "Budapest"];

pub async fn init_pool(database_url: &str) -> Result<Pool> {
    let normalized = prepare_sqlite_url(database_url);
    let pool = SqlitePool::connect(&normalized).await?;
    sqlx::query("PRAGMA journal_mode=WAL;").execute(&pool).await?;
    sqlx::query("PRAGMA synchronous=FULL;").execute(&pool).await?;
    Ok(pool)
}

/// For file-backed SQLite URLs, make sure the parent directory exists so a
/// fresh deployment can create the database file. In-memory URLs and other
/// schemes pass through untouched.
fn prepare_sqlite_url(url: &str) -> String {
    if !url.starts_with("sqlite:") || url.starts_with("sqlite::memory") {
        return url.to_string();
    }
    let rest = url["sqlite:".len()..].trim_start_matches("//");
    let path = rest.split('?').next().unwrap_or(rest);
    if let Some(parent) = std::path::Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            let _ = std::fs::create_dir_all(parent);
        }
    }
    url.to_string()
}

/// Create the three tables if absent and insert the seed cities that are not
/// already present. Safe to run on every startup.
#[instrument(skip_all)]
pub async fn init_schema(pool: &Pool) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS citys (
            name TEXT PRIMARY KEY,
            subscriber_count INTEGER NOT NULL DEFAULT 0,
            post_count INTEGER NOT NULL DEFAULT 0,
            channel_link TEXT NOT NULL DEFAULT '',
            income_text TEXT NOT NULL DEFAULT '$0.00',
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS settings (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            city TEXT NOT NULL,
            name TEXT NOT NULL,
            enabled BOOLEAN NOT NULL DEFAULT 0,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS bot_logs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            telegram_user_id BIGINT NOT NULL,
            username TEXT,
            full_name TEXT NOT NULL,
            message_text TEXT NOT NULL,
            access_granted BOOLEAN NOT NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
    )
    .execute(pool)
    .await?;

    for name in SEED_CITIES {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM citys WHERE name = ?)")
            .bind(name)
            .fetch_one(pool)
            .await?;
        if !exists {
            sqlx::query("INSERT INTO citys (name) VALUES (?)")
                .bind(name)
                .execute(pool)
                .await?;
            info!(name, "seeded city");
        }
    }

    Ok(())
}

fn city_from_row(row: &SqliteRow) -> City {
    City {
        name: row.get("name"),
        subscriber_count: row.get("subscriber_count"),
        post_count: row.get("post_count"),
        channel_link: row.get("channel_link"),
        income_text: row.get("income_text"),
        created_at: row.get("created_at"),
    }
}

fn setting_from_row(row: &SqliteRow) -> Setting {
    Setting {
        id: row.get("id"),
        city: row.get("city"),
        name: row.get("name"),
        enabled: row.get("enabled"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[instrument(skip_all)]
pub async fn get_city(pool: &Pool, name: &str) -> Result<Option<City>> {
    let row = sqlx::query(
        "SELECT name, subscriber_count, post_count, channel_link, income_text, created_at
         FROM citys WHERE name = ?",
    )
    .bind(name)
    .fetch_optional(pool)
    .await?;
    Ok(row.as_ref().map(city_from_row))
}

#[instrument(skip_all)]
pub async fn list_settings(pool: &Pool, city: &str) -> Result<Vec<Setting>> {
    let rows = sqlx::query(
        "SELECT id, city, name, enabled, created_at, updated_at
         FROM settings WHERE city = ? ORDER BY id ASC",
    )
    .bind(city)
    .fetch_all(pool)
    .await?;
    Ok(rows.iter().map(setting_from_row).collect())
}

/// Overwrite `name` and `enabled` of the setting with the given id and
/// refresh `updated_at`. Returns the full updated row, or `None` when no
/// such id exists.
#[instrument(skip_all)]
pub async fn update_setting(
    pool: &Pool,
    id: i64,
    name: &str,
    enabled: bool,
) -> Result<Option<Setting>> {
    let row = sqlx::query(
        "UPDATE settings SET name = ?, enabled = ?, updated_at = ? WHERE id = ?
         RETURNING id, city, name, enabled, created_at, updated_at",
    )
    .bind(name)
    .bind(enabled)
    .bind(Utc::now())
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row.as_ref().map(setting_from_row))
}

/// There is no HTTP insert endpoint for settings; rows are created out of
/// band by operators (and by tests).
#[instrument(skip_all)]
pub async fn insert_setting(pool: &Pool, city: &str, name: &str, enabled: bool) -> Result<i64> {
    let rec = sqlx::query("INSERT INTO settings (city, name, enabled) VALUES (?, ?, ?) RETURNING id")
        .bind(city)
        .bind(name)
        .bind(enabled)
        .fetch_one(pool)
        .await?;
    Ok(rec.get::<i64, _>("id"))
}

#[instrument(skip_all)]
pub async fn insert_log(
    pool: &Pool,
    telegram_user_id: i64,
    username: Option<&str>,
    full_name: &str,
    message_text: &str,
    access_granted: bool,
) -> Result<i64> {
    let rec = sqlx::query(
        "INSERT INTO bot_logs (telegram_user_id, username, full_name, message_text, access_granted)
         VALUES (?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(telegram_user_id)
    .bind(username)
    .bind(full_name)
    .bind(message_text)
    .bind(access_granted)
    .fetch_one(pool)
    .await?;
    Ok(rec.get::<i64, _>("id"))
}

/// Newest-first slice of the audit log, for operator inspection.
#[instrument(skip_all)]
pub async fn recent_logs(pool: &Pool, limit: i64) -> Result<Vec<LogEntry>> {
    let rows = sqlx::query(
        "SELECT id, telegram_user_id, username, full_name, message_text, access_granted, created_at
         FROM bot_logs ORDER BY id DESC LIMIT ?",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows
        .iter()
        .map(|row| LogEntry {
            id: row.get("id"),
            telegram_user_id: row.get("telegram_user_id"),
            username: row.get("username"),
            full_name: row.get("full_name"),
            message_text: row.get("message_text"),
            access_granted: row.get("access_granted"),
            created_at: row.get("created_at"),
        })
        .collect())
}
