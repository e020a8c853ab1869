use std::collections::HashSet;

/// Decides whether a Telegram user may use the bot.
///
/// Built once at startup from configuration and never mutated afterwards:
/// either everyone is allowed, or only the fixed admin-id set is.
#[derive(Debug, Clone)]
pub struct AccessGate {
    allow_all: bool,
    admin_ids: HashSet<i64>,
}

impl AccessGate {
    pub fn new(allow_all: bool, admin_ids: impl IntoIterator<Item = i64>) -> Self {
        Self {
            allow_all,
            admin_ids: admin_ids.into_iter().collect(),
        }
    }

    pub fn is_allowed(&self, user_id: i64) -> bool {
        self.allow_all || self.admin_ids.contains(&user_id)
    }
}
