use std::env;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Default search query sent to the listing provider
pub const DEFAULT_SEARCH_QUERY: &str =
    "remote internship software engineer full stack backend frontend generative ai";

/// Default keyword profile. Entries are lowercased by the matcher.
pub const DEFAULT_KEYWORDS: &[&str] = &[
    "remote", "work from home", "wfh",
    "intern", "internship", "summer",
    "full stack", "full-stack", "backend", "frontend",
    "react", "node", "mern",
    "generative ai", "gen ai", "ai", "openai", "gpt",
    "machine learning", "ml engineer",
];

/// Default check schedule: every five minutes
pub const DEFAULT_CHECK_SCHEDULE: &str = "*/5 * * * *";

/// Which credentials a command needs
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Credentials {
    /// Provider key plus the Telegram bot token and chat
    All,
    /// Provider key only; Telegram settings are left empty
    SearchOnly,
}

/// Errors raised while reading configuration at startup
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing env var: {0}. Please set it in .env and restart.")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Telegram bot token used for the sendMessage endpoint
    /// Empty when loaded with `Credentials::SearchOnly`
    pub bot_token: String,

    /// Telegram chat receiving every notification
    /// Empty when loaded with `Credentials::SearchOnly`
    pub chat_id: String,

    /// RapidAPI key for the JSearch provider
    pub rapidapi_key: String,

    pub host: String,
    pub port: u16,

    /// JSON file holding the already-notified job ids
    pub seen_file: PathBuf,

    /// Directory for the rolling log files
    pub log_dir: String,

    /// Cron expression with a leading seconds field, as the scheduler expects
    pub check_schedule: String,
    pub search_query: String,
    pub keywords: Vec<String>,

    /// Pause between two outbound notifications
    /// Default: 300ms
    pub notify_delay: Duration,

    /// Run one cycle as soon as the service starts
    pub run_on_startup: bool,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Required environment variables:
    /// - RAPIDAPI_KEY
    /// - BOT_TOKEN, CHAT_ID (unless `Credentials::SearchOnly`)
    ///
    /// Optional environment variables:
    /// - HOST (default: 0.0.0.0), PORT (default: 3000)
    /// - SEEN_FILE (default: seen.json), LOG_DIR (default: logs)
    /// - CHECK_SCHEDULE (default: */5 * * * *)
    /// - SEARCH_QUERY, KEYWORDS (comma separated)
    /// - NOTIFY_DELAY_MS (default: 300), RUN_ON_STARTUP (default: true)
    pub fn from_env(credentials: Credentials) -> Result<Self, ConfigError> {
        // Load .env file if it exists
        dotenv::dotenv().ok();

        Self::from_lookup(credentials, |name| env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(credentials: Credentials, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let required = |name: &'static str| var(name).ok_or(ConfigError::Missing(name));

        let (bot_token, chat_id) = match credentials {
            Credentials::All => (required("BOT_TOKEN")?, required("CHAT_ID")?),
            Credentials::SearchOnly => (
                var("BOT_TOKEN").unwrap_or_default(),
                var("CHAT_ID").unwrap_or_default(),
            ),
        };
        let rapidapi_key = required("RAPIDAPI_KEY")?;

        let port = match var("PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                reason: format!("'{}' is not a valid port number", raw),
            })?,
            None => 3000,
        };

        let check_schedule = with_seconds_field(
            &var("CHECK_SCHEDULE").unwrap_or_else(|| DEFAULT_CHECK_SCHEDULE.to_string()),
        );

        let notify_delay_ms: u64 = match var("NOTIFY_DELAY_MS") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
                name: "NOTIFY_DELAY_MS",
                reason: format!("'{}' is not a number of milliseconds", raw),
            })?,
            None => 300,
        };

        let run_on_startup = match var("RUN_ON_STARTUP") {
            Some(raw) => parse_bool(&raw).ok_or_else(|| ConfigError::Invalid {
                name: "RUN_ON_STARTUP",
                reason: format!("'{}' is not a boolean", raw),
            })?,
            None => true,
        };

        let keywords = match var("KEYWORDS") {
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(String::from)
                .collect(),
            None => DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect(),
        };

        Ok(Config {
            bot_token,
            chat_id,
            rapidapi_key,
            host: var("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            seen_file: PathBuf::from(var("SEEN_FILE").unwrap_or_else(|| "seen.json".to_string())),
            log_dir: var("LOG_DIR").unwrap_or_else(|| "logs".to_string()),
            check_schedule,
            search_query: var("SEARCH_QUERY").unwrap_or_else(|| DEFAULT_SEARCH_QUERY.to_string()),
            keywords,
            notify_delay: Duration::from_millis(notify_delay_ms),
            run_on_startup,
        })
    }
}

/// Classic five-field crontab lines get a `0` seconds field prepended
///
/// Six- and seven-field expressions pass through unchanged; validity is
/// checked when the scheduler job is built.
fn with_seconds_field(expr: &str) -> String {
    let fields: Vec<&str> = expr.split_whitespace().collect();
    if fields.len() == 5 {
        format!("0 {}", fields.join(" "))
    } else {
        fields.join(" ")
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
