use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_DROP_TTL_HOURS: u64 = 7 * 24;
const MAX_DROP_TTL_HOURS: u64 = 10 * 365 * 24;
const DEFAULT_MIKU_GIF_URL: &str = "https://i.imgur.com/4M7IWwP.gif";

#[derive(Clone, Debug)]
pub struct Config {
    /* Without a token only the HTTP API runs. */
    pub bot_token: Option<String>,
    pub port: u16,
    pub self_url: Option<String>,
    pub client_id: Option<u64>,
    pub guild_id: Option<u64>,
    pub log_channel_id: Option<u64>,
    pub miku_gif_url: String,
    pub drop_archive_user_id: Option<u64>,
    pub drop_ttl: Duration,
    pub storage_folder: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        /* Treat empty variables the same as missing ones; hosting dashboards like to leave them blank. */
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let number = |name: &'static str| -> Result<Option<u64>, ConfigError> {
            match get(name) {
                Some(value) => value
                    .trim()
                    .parse()
                    .map(Some)
                    .map_err(|source| ConfigError::InvalidNumber {
                        name,
                        value,
                        source,
                    }),
                None => Ok(None),
            }
        };

        let port = match get("PORT") {
            Some(value) => value
                .trim()
                .parse()
                .map_err(|source| ConfigError::InvalidNumber {
                    name: "PORT",
                    value,
                    source,
                })?,
            None => DEFAULT_PORT,
        };

        let drop_ttl_hours = number("DROP_TTL_HOURS")?.unwrap_or(DEFAULT_DROP_TTL_HOURS);
        let drop_ttl_secs = drop_ttl_hours
            .checked_mul(60 * 60)
            .filter(|_| drop_ttl_hours <= MAX_DROP_TTL_HOURS)
            .ok_or(ConfigError::OutOfRange {
                name: "DROP_TTL_HOURS",
                value: drop_ttl_hours,
                max: MAX_DROP_TTL_HOURS,
            })?;

        Ok(Config {
            bot_token: get("BOT_TOKEN"),
            port,
            self_url: get("SELF_URL").map(|url| url.trim_end_matches('/').to_string()),
            client_id: number("CLIENT_ID")?,
            guild_id: number("GUILD_ID")?,
            log_channel_id: number("LOG_CHANNEL_ID")?,
            miku_gif_url: get("MIKU_GIF_URL").unwrap_or_else(|| DEFAULT_MIKU_GIF_URL.to_string()),
            drop_archive_user_id: number("DROP_ARCHIVE_USER_ID")?,
            drop_ttl: Duration::from_secs(drop_ttl_secs),
            storage_folder: get("STORAGE_FOLDER")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
        })
    }
}
