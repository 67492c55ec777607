//! Runtime configuration, read once from the environment at startup.
//!
//! [`BotConfig`] is built in `main` and passed down explicitly; nothing
//! below the binary reads environment variables. Tests construct configs
//! through [`BotConfig::from_lookup`] with a map instead of the process
//! environment.

use chrono::{FixedOffset, NaiveTime, Offset, Utc};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_TELEGRAM_API_BASE: &str = "https://api.telegram.org";
const DEFAULT_JSONBIN_BASE_URL: &str = "https://api.jsonbin.io/v3";
const DEFAULT_TASKS_FILE: &str = "tasks.json";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_DIGEST_HOUR: u32 = 10;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// Configuration loading error. Always fatal at startup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A required variable is unset or empty.
    #[error("missing required setting {0}")]
    Missing(&'static str),

    /// A variable is set but cannot be parsed.
    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Top-level bot configuration.
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub telegram: TelegramConfig,
    pub storage: StorageConfig,
    pub gateway: GatewayConfig,
    pub digest: DigestConfig,
    /// What the user is told when a mutating command's save fails.
    pub save_failure_policy: SaveFailurePolicy,
    /// Timeout applied to every outbound HTTP request.
    pub http_timeout: Duration,
}

/// Telegram Bot API settings.
#[derive(Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
    /// The single authorized sender and the digest recipient.
    pub chat_id: i64,
    pub api_base: String,
}

impl fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("bot_token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .field("api_base", &self.api_base)
            .finish()
    }
}

/// Which persistence backend holds the task document.
#[derive(Debug, Clone)]
pub enum StorageConfig {
    JsonBin(JsonBinConfig),
    File { path: PathBuf },
}

/// JSONBin.io bin coordinates and secret.
#[derive(Clone)]
pub struct JsonBinConfig {
    pub base_url: String,
    pub bin_id: String,
    pub master_key: String,
}

impl fmt::Debug for JsonBinConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonBinConfig")
            .field("base_url", &self.base_url)
            .field("bin_id", &self.bin_id)
            .field("master_key", &"<redacted>")
            .finish()
    }
}

/// HTTP gateway settings.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
    /// Expected `X-Telegram-Bot-Api-Secret-Token` header, if any.
    pub webhook_secret: Option<String>,
    /// Bearer token required by `/trigger`, if any.
    pub trigger_token: Option<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_owned(),
            port: DEFAULT_PORT,
            webhook_secret: None,
            trigger_token: None,
        }
    }
}

/// Daily digest timing.
#[derive(Debug, Clone, Copy)]
pub struct DigestConfig {
    /// Fixed timezone used to decide what "today" is.
    pub utc_offset: FixedOffset,
    /// Local time of day the scheduled digest fires.
    pub time: NaiveTime,
    /// Whether the in-process scheduler runs at all.
    pub scheduled: bool,
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            utc_offset: Utc.fix(),
            time: NaiveTime::from_hms_opt(DEFAULT_DIGEST_HOUR, 0, 0).unwrap_or_default(),
            scheduled: true,
        }
    }
}

/// How a failed save is reported back to the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SaveFailurePolicy {
    /// Log the failure and confirm the change anyway.
    #[default]
    ReportSuccess,
    /// Tell the user the change was not saved.
    ReportFailure,
}

impl BotConfig {
    /// Read configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// Values are trimmed; an empty value counts as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_owned())
                .filter(|v| !v.is_empty())
        };
        let require = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let telegram = TelegramConfig {
            bot_token: require("TELEGRAM_BOT_TOKEN")?,
            chat_id: parse_var("TELEGRAM_CHAT_ID", &require("TELEGRAM_CHAT_ID")?)?,
            api_base: get("TELEGRAM_API_BASE")
                .unwrap_or_else(|| DEFAULT_TELEGRAM_API_BASE.to_owned()),
        };

        let backend = get("STORAGE_BACKEND").unwrap_or_else(|| "jsonbin".to_owned());
        let storage = match backend.to_ascii_lowercase().as_str() {
            "jsonbin" => StorageConfig::JsonBin(JsonBinConfig {
                base_url: get("JSONBIN_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_JSONBIN_BASE_URL.to_owned()),
                bin_id: require("JSONBIN_BIN_ID")?,
                master_key: require("JSONBIN_MASTER_KEY")?,
            }),
            "file" => StorageConfig::File {
                path: PathBuf::from(
                    get("TASKS_FILE").unwrap_or_else(|| DEFAULT_TASKS_FILE.to_owned()),
                ),
            },
            other => {
                return Err(ConfigError::Invalid {
                    var: "STORAGE_BACKEND",
                    reason: format!("unknown backend `{other}` (expected jsonbin or file)"),
                });
            }
        };

        let gateway = GatewayConfig {
            host: get("HOST").unwrap_or_else(|| DEFAULT_HOST.to_owned()),
            port: match get("PORT") {
                Some(raw) => parse_var("PORT", &raw)?,
                None => DEFAULT_PORT,
            },
            webhook_secret: get("WEBHOOK_SECRET"),
            trigger_token: get("TRIGGER_TOKEN"),
        };

        let mut digest = DigestConfig::default();
        if let Some(raw) = get("DIGEST_UTC_OFFSET") {
            digest.utc_offset = parse_utc_offset(&raw).ok_or_else(|| ConfigError::Invalid {
                var: "DIGEST_UTC_OFFSET",
                reason: format!("`{raw}` is not of the form +HH:MM"),
            })?;
        }
        if let Some(raw) = get("DIGEST_TIME") {
            digest.time =
                NaiveTime::parse_from_str(&raw, "%H:%M").map_err(|e| ConfigError::Invalid {
                    var: "DIGEST_TIME",
                    reason: format!("`{raw}`: {e}"),
                })?;
        }
        if let Some(raw) = get("DIGEST_SCHEDULE") {
            digest.scheduled = parse_switch("DIGEST_SCHEDULE", &raw)?;
        }

        let save_failure_policy = match get("SAVE_FAILURE_POLICY")
            .map(|v| v.to_ascii_lowercase())
            .as_deref()
        {
            None | Some("report-success") => SaveFailurePolicy::ReportSuccess,
            Some("report-failure") => SaveFailurePolicy::ReportFailure,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    var: "SAVE_FAILURE_POLICY",
                    reason: format!(
                        "unknown policy `{other}` (expected report-success or report-failure)"
                    ),
                });
            }
        };

        let http_timeout = match get("HTTP_TIMEOUT_SECS") {
            Some(raw) => match parse_var::<u64>("HTTP_TIMEOUT_SECS", &raw)? {
                0 => {
                    return Err(ConfigError::Invalid {
                        var: "HTTP_TIMEOUT_SECS",
                        reason: "must be at least 1 second".to_owned(),
                    });
                }
                secs => Duration::from_secs(secs),
            },
            None => Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        };

        Ok(Self {
            telegram,
            storage,
            gateway,
            digest,
            save_failure_policy,
            http_timeout,
        })
    }
}

fn parse_var<T>(var: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
        var,
        reason: format!("`{raw}`: {e}"),
    })
}

fn parse_switch(var: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.to_ascii_lowercase().as_str() {
        "on" | "true" | "1" | "yes" => Ok(true),
        "off" | "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::Invalid {
            var,
            reason: format!("`{raw}` is not on/off"),
        }),
    }
}

/// Parse `+HH:MM`, `-HH:MM`, `+HH`, `Z` or `UTC` into a fixed offset.
pub fn parse_utc_offset(raw: &str) -> Option<FixedOffset> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("z") || raw.eq_ignore_ascii_case("utc") {
        return Some(Utc.fix());
    }

    let (sign, rest) = match raw.as_bytes().first()? {
        b'+' => (1, &raw[1..]),
        b'-' => (-1, &raw[1..]),
        _ => return None,
    };
    let (hours, minutes) = match rest.split_once(':') {
        Some((h, m)) => (h, m),
        None => (rest, "0"),
    };
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if !(0..=14).contains(&hours) || !(0..60).contains(&minutes) {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    const MINIMAL: &[(&str, &str)] = &[
        ("TELEGRAM_BOT_TOKEN", "123:abc"),
        ("TELEGRAM_CHAT_ID", "42"),
        ("JSONBIN_BIN_ID", "bin"),
        ("JSONBIN_MASTER_KEY", "key"),
    ];

    #[test]
    fn minimal_config_uses_defaults() {
        let config = BotConfig::from_lookup(lookup(MINIMAL)).unwrap();
        assert_eq!(config.telegram.chat_id, 42);
        assert_eq!(config.telegram.api_base, DEFAULT_TELEGRAM_API_BASE);
        assert_eq!(config.gateway.port, 3000);
        assert_eq!(config.digest.time, NaiveTime::from_hms_opt(10, 0, 0).unwrap());
        assert_eq!(config.digest.utc_offset.local_minus_utc(), 0);
        assert!(config.digest.scheduled);
        assert_eq!(config.save_failure_policy, SaveFailurePolicy::ReportSuccess);
        assert_eq!(config.http_timeout, Duration::from_secs(10));
        match config.storage {
            StorageConfig::JsonBin(bin) => {
                assert_eq!(bin.bin_id, "bin");
                assert_eq!(bin.base_url, DEFAULT_JSONBIN_BASE_URL);
            }
            StorageConfig::File { .. } => panic!("expected jsonbin backend"),
        }
    }

    #[test]
    fn missing_token_is_reported_by_name() {
        let err = BotConfig::from_lookup(lookup(&[("TELEGRAM_CHAT_ID", "42")])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("TELEGRAM_BOT_TOKEN"));
    }

    #[test]
    fn blank_value_counts_as_missing() {
        let err = BotConfig::from_lookup(lookup(&[
            ("TELEGRAM_BOT_TOKEN", "123:abc"),
            ("TELEGRAM_CHAT_ID", "42"),
            ("JSONBIN_BIN_ID", "   "),
            ("JSONBIN_MASTER_KEY", "key"),
        ]))
        .unwrap_err();
        assert_eq!(err, ConfigError::Missing("JSONBIN_BIN_ID"));
    }

    #[test]
    fn file_backend_does_not_need_jsonbin_secrets() {
        let config = BotConfig::from_lookup(lookup(&[
            ("TELEGRAM_BOT_TOKEN", "123:abc"),
            ("TELEGRAM_CHAT_ID", "42"),
            ("STORAGE_BACKEND", "file"),
            ("TASKS_FILE", "/tmp/dayplan.json"),
        ]))
        .unwrap();
        match config.storage {
            StorageConfig::File { path } => assert_eq!(path, PathBuf::from("/tmp/dayplan.json")),
            StorageConfig::JsonBin(_) => panic!("expected file backend"),
        }
    }

    #[test]
    fn non_numeric_chat_id_is_invalid() {
        let err = BotConfig::from_lookup(lookup(&[
            ("TELEGRAM_BOT_TOKEN", "123:abc"),
            ("TELEGRAM_CHAT_ID", "me"),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                var: "TELEGRAM_CHAT_ID",
                ..
            }
        ));
    }

    #[test]
    fn digest_settings_are_parsed() {
        let mut pairs = MINIMAL.to_vec();
        pairs.extend([
            ("DIGEST_UTC_OFFSET", "+05:30"),
            ("DIGEST_TIME", "07:45"),
            ("DIGEST_SCHEDULE", "off"),
            ("SAVE_FAILURE_POLICY", "report-failure"),
        ]);
        let config = BotConfig::from_lookup(lookup(&pairs)).unwrap();
        assert_eq!(config.digest.utc_offset.local_minus_utc(), 5 * 3600 + 30 * 60);
        assert_eq!(config.digest.time, NaiveTime::from_hms_opt(7, 45, 0).unwrap());
        assert!(!config.digest.scheduled);
        assert_eq!(config.save_failure_policy, SaveFailurePolicy::ReportFailure);
    }

    #[test]
    fn save_failure_policy_ignores_case() {
        let mut pairs = MINIMAL.to_vec();
        pairs.push(("SAVE_FAILURE_POLICY", "Report-Failure"));
        let config = BotConfig::from_lookup(lookup(&pairs)).unwrap();
        assert_eq!(config.save_failure_policy, SaveFailurePolicy::ReportFailure);
    }

    #[test]
    fn zero_http_timeout_is_rejected() {
        let mut pairs = MINIMAL.to_vec();
        pairs.push(("HTTP_TIMEOUT_SECS", "0"));
        let err = BotConfig::from_lookup(lookup(&pairs)).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                var: "HTTP_TIMEOUT_SECS",
                ..
            }
        ));

        let mut pairs = MINIMAL.to_vec();
        pairs.push(("HTTP_TIMEOUT_SECS", "3"));
        let config = BotConfig::from_lookup(lookup(&pairs)).unwrap();
        assert_eq!(config.http_timeout, Duration::from_secs(3));
    }

    #[test]
    fn unknown_backend_is_rejected() {
        let mut pairs = MINIMAL.to_vec();
        pairs.push(("STORAGE_BACKEND", "redis"));
        let err = BotConfig::from_lookup(lookup(&pairs)).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                var: "STORAGE_BACKEND",
                ..
            }
        ));
    }

    #[test]
    fn utc_offsets() {
        assert_eq!(parse_utc_offset("UTC").unwrap().local_minus_utc(), 0);
        assert_eq!(parse_utc_offset("-04:00").unwrap().local_minus_utc(), -4 * 3600);
        assert_eq!(parse_utc_offset("+9").unwrap().local_minus_utc(), 9 * 3600);
        assert!(parse_utc_offset("05:30").is_none());
        assert!(parse_utc_offset("+25:00").is_none());
        assert!(parse_utc_offset("+05:75").is_none());
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let config = BotConfig::from_lookup(lookup(MINIMAL)).unwrap();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("123:abc"));
        assert!(!rendered.contains("\"key\""));
        assert!(rendered.contains("<redacted>"));
    }
}
