use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One row of the `citys` table. `name` is the business key; there is no
/// surrogate id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct City {
    pub name: String,
    pub subscriber_count: i64,
    pub post_count: i64,
    pub channel_link: String,
    pub income_text: String,
    pub created_at: DateTime<Utc>,
}

/// A named boolean feature toggle scoped to a city. `city` references
/// `City.name` by convention only; the schema does not enforce it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Setting {
    pub id: i64,
    pub city: String,
    pub name: String,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Append-only audit record of one inbound chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: i64,
    pub telegram_user_id: i64,
    pub username: Option<String>,
    pub full_name: String,
    pub message_text: String,
    pub access_granted: bool,
    pub created_at: DateTime<Utc>,
}
