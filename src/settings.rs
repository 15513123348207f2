use std::{env, fmt::Display, str::FromStr};

use anyhow::{anyhow, Result};
use dotenv::dotenv;
use tracing_subscriber::fmt;

#[derive(Debug)]
pub struct Settings {
    env: String,
    log_level: tracing::Level,
    api_base_url: String,
    cdn_base_url: String,
    user_agent: String,
    avatar_directory: String,
    download_size: u32,
    page_size: u32,
    batch_size: usize,
    max_concurrent_batches: usize,
    download_timeout_seconds: u64,
    max_avatar_bytes: usize,
    ratelimit_jitter: f64,
    cooldown_ticks: u32,
    max_ratelimit_retries: Option<u32>,
}

pub fn new() -> Result<Settings> {
    dotenv().ok();

    let settings = from_lookup(|key| env::var(key).ok())?;

    let subscriber_builder = fmt().with_target(false);

    if settings.is_dev() {
        subscriber_builder
            .compact()
            .with_max_level(settings.log_level)
            .init();
    } else {
        subscriber_builder
            .json()
            .with_max_level(settings.log_level)
            .init();
    }

    Ok(settings)
}

pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Settings> {
    let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

    let settings = Settings {
        env: get("ENV", "prod"),
        log_level: parse(&lookup, "LOG_LEVEL", tracing::Level::INFO)?,
        api_base_url: get("API_BASE_URL", "https://discord.com/api/v10"),
        cdn_base_url: get("CDN_BASE_URL", "https://cdn.discordapp.com"),
        user_agent: get(
            "USER_AGENT",
            concat!("DiscordBot (https://github.com/collage, ", env!("CARGO_PKG_VERSION"), ")"),
        ),
        avatar_directory: get("AVATAR_DIRECTORY", "avatars"),
        download_size: parse(&lookup, "DOWNLOAD_SIZE", 256)?,
        page_size: parse(&lookup, "PAGE_SIZE", 1000)?,
        batch_size: parse(&lookup, "BATCH_SIZE", 500)?,
        max_concurrent_batches: parse(&lookup, "MAX_CONCURRENT_BATCHES", 10)?,
        download_timeout_seconds: parse(&lookup, "DOWNLOAD_TIMEOUT_SECONDS", 60)?,
        max_avatar_bytes: parse(&lookup, "MAX_AVATAR_BYTES", 8 * 1024 * 1024)?,
        ratelimit_jitter: parse(&lookup, "RATELIMIT_JITTER", 1.10)?,
        cooldown_ticks: parse(&lookup, "COOLDOWN_TICKS", 20)?,
        max_ratelimit_retries: match lookup("MAX_RATELIMIT_RETRIES") {
            Some(_) => Some(parse(&lookup, "MAX_RATELIMIT_RETRIES", 0)?),
            None => None,
        },
    };

    settings.validate()?;

    Ok(settings)
}

fn parse<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow!("invalid value {:?} for {}: {}", value, key, e)),
        None => Ok(default),
    }
}

impl Settings {
    fn validate(&self) -> Result<()> {
        if self.download_size == 0 {
            return Err(anyhow!("DOWNLOAD_SIZE must be positive"));
        }
        if self.page_size == 0 || self.batch_size == 0 || self.max_concurrent_batches == 0 {
            return Err(anyhow!(
                "PAGE_SIZE, BATCH_SIZE and MAX_CONCURRENT_BATCHES must be positive"
            ));
        }
        if self.cooldown_ticks == 0 {
            return Err(anyhow!("COOLDOWN_TICKS must be positive"));
        }
        if !(self.ratelimit_jitter >= 1.0) || !self.ratelimit_jitter.is_finite() {
            return Err(anyhow!("RATELIMIT_JITTER must be at least 1.0"));
        }
        Ok(())
    }

    pub fn env(&self) -> String {
        self.env.clone()
    }

    pub fn is_dev(&self) -> bool {
        self.env() == "dev"
    }

    pub fn api_base_url(&self) -> String {
        self.api_base_url.clone()
    }

    pub fn cdn_base_url(&self) -> String {
        self.cdn_base_url.clone()
    }

    pub fn user_agent(&self) -> String {
        self.user_agent.clone()
    }

    pub fn avatar_directory(&self) -> String {
        self.avatar_directory.clone()
    }

    pub fn download_size(&self) -> u32 {
        self.download_size
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn max_concurrent_batches(&self) -> usize {
        self.max_concurrent_batches
    }

    pub fn download_timeout_seconds(&self) -> u64 {
        self.download_timeout_seconds
    }

    pub fn max_avatar_bytes(&self) -> usize {
        self.max_avatar_bytes
    }

    pub fn ratelimit_jitter(&self) -> f64 {
        self.ratelimit_jitter
    }

    pub fn cooldown_ticks(&self) -> u32 {
        self.cooldown_ticks
    }

    pub fn max_ratelimit_retries(&self) -> Option<u32> {
        self.max_ratelimit_retries
    }
}
