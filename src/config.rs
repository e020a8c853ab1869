//! Environment-sourced configuration, loaded once at startup.
use std::env;
use thiserror::Error;
use url::Url;

const DEFAULT_DATABASE_URL: &str = "sqlite://data/citybot.db";
const DEFAULT_WEB_PORT: u16 = 8000;
const DEFAULT_STATIC_DIR: &str = "static";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bot_token: String,
    pub database_url: String,
    pub admin_ids: Vec<i64>,
    pub allow_all_users: bool,
    pub webapp_url: Url,
    pub web_port: u16,
    pub static_dir: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let bot_token =
            env::var("TELEGRAM_BOT_TOKEN").map_err(|_| ConfigError::Missing("TELEGRAM_BOT_TOKEN"))?;
        if bot_token.trim().is_empty() {
            return Err(ConfigError::Missing("TELEGRAM_BOT_TOKEN"));
        }

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());

        let admin_ids = match env::var("ADMIN_IDS") {
            Ok(raw) => parse_admin_ids(&raw)?,
            Err(_) => Vec::new(),
        };

        let allow_all_users = env::var("ALLOW_ALL_USERS")
            .map(|raw| parse_flag(&raw))
            .unwrap_or(false);

        let raw_url = env::var("WEBAPP_URL").map_err(|_| ConfigError::Missing("WEBAPP_URL"))?;
        let webapp_url =
            Url::parse(&raw_url).map_err(|err| ConfigError::Invalid("WEBAPP_URL", err.to_string()))?;

        let web_port = match env::var("WEB_PORT") {
            Ok(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::Invalid("WEB_PORT", raw))?,
            Err(_) => DEFAULT_WEB_PORT,
        };

        let static_dir = env::var("STATIC_DIR").unwrap_or_else(|_| DEFAULT_STATIC_DIR.to_string());

        Ok(Self {
            bot_token,
            database_url,
            admin_ids,
            allow_all_users,
            webapp_url,
            web_port,
            static_dir,
        })
    }
}

/// Parse a comma-separated admin id list, tolerating whitespace and empty
/// segments (`"1, 2,,3"` parses to `[1, 2, 3]`).
fn parse_admin_ids(raw: &str) -> Result<Vec<i64>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<i64>()
                .map_err(|_| ConfigError::Invalid("ADMIN_IDS", part.to_string()))
        })
        .collect()
}

fn parse_flag(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;
    use temp_env::with_vars;

    #[test]
    fn parse_admin_ids_ok() {
        assert_eq!(parse_admin_ids("123").unwrap(), vec![123]);
        assert_eq!(parse_admin_ids(" 1, 2 ,,3 ").unwrap(), vec![1, 2, 3]);
        assert_eq!(parse_admin_ids("").unwrap(), Vec::<i64>::new());
    }

    #[test]
    fn parse_admin_ids_rejects_garbage() {
        assert!(matches!(
            parse_admin_ids("1,abc"),
            Err(ConfigError::Invalid("ADMIN_IDS", _))
        ));
    }

    #[test]
    fn parse_flag_variants() {
        assert!(parse_flag("1"));
        assert!(parse_flag("true"));
        assert!(parse_flag(" YES "));
        assert!(!parse_flag("0"));
        assert!(!parse_flag("no"));
        assert!(!parse_flag(""));
    }

    #[test]
    fn from_env_full() {
        with_vars(
            [
                ("TELEGRAM_BOT_TOKEN", Some("test-token")),
                ("DATABASE_URL", Some("sqlite::memory:")),
                ("ADMIN_IDS", Some("10,20")),
                ("ALLOW_ALL_USERS", Some("true")),
                ("WEBAPP_URL", Some("https://example.com/app")),
                ("WEB_PORT", Some("9000")),
                ("STATIC_DIR", Some("public")),
            ],
            || {
                let cfg = Config::from_env().unwrap();
                assert_eq!(cfg.bot_token, "test-token");
                assert_eq!(cfg.database_url, "sqlite::memory:");
                assert_eq!(cfg.admin_ids, vec![10, 20]);
                assert!(cfg.allow_all_users);
                assert_eq!(cfg.webapp_url.as_str(), "https://example.com/app");
                assert_eq!(cfg.web_port, 9000);
                assert_eq!(cfg.static_dir, "public");
            },
        );
    }

    #[test]
    fn from_env_defaults() {
        with_vars(
            [
                ("TELEGRAM_BOT_TOKEN", Some("test-token")),
                ("WEBAPP_URL", Some("https://example.com/")),
                ("DATABASE_URL", None::<&str>),
                ("ADMIN_IDS", None),
                ("ALLOW_ALL_USERS", None),
                ("WEB_PORT", None),
                ("STATIC_DIR", None),
            ],
            || {
                let cfg = Config::from_env().unwrap();
                assert_eq!(cfg.database_url, DEFAULT_DATABASE_URL);
                assert!(cfg.admin_ids.is_empty());
                assert!(!cfg.allow_all_users);
                assert_eq!(cfg.web_port, DEFAULT_WEB_PORT);
                assert_eq!(cfg.static_dir, DEFAULT_STATIC_DIR);
            },
        );
    }

    #[test]
    fn from_env_missing_token() {
        with_vars(
            [
                ("TELEGRAM_BOT_TOKEN", None::<&str>),
                ("WEBAPP_URL", Some("https://example.com/")),
            ],
            || {
                assert!(matches!(
                    Config::from_env(),
                    Err(ConfigError::Missing("TELEGRAM_BOT_TOKEN"))
                ));
            },
        );
    }

    #[test]
    fn from_env_bad_webapp_url() {
        with_vars(
            [
                ("TELEGRAM_BOT_TOKEN", Some("t")),
                ("WEBAPP_URL", Some("not a url")),
            ],
            || {
                assert!(matches!(
                    Config::from_env(),
                    Err(ConfigError::Invalid("WEBAPP_URL", _))
                ));
            },
        );
    }
}
