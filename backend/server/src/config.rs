use std::{env, fmt::Display, fs::read_to_string, str::FromStr, time::Duration};

use tracing::{info, warn};

pub const DEFAULT_MAX_SIZE: usize = 1000;
pub const DEFAULT_LIMIT: usize = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Backend {
    Memory,
    Redis,
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Backend::Memory),
            "redis" => Ok(Backend::Redis),
            other => Err(format!("unknown backend '{other}', expected memory or redis")),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub backend: Backend,
    pub redis_url: String,
    pub leaderboard_key: String,
    pub max_size: usize,
    pub default_limit: usize,
    pub redis_timeout: Duration,
    pub admin_routes: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 1111,
            backend: Backend::Memory,
            redis_url: "redis://redis:6379".to_string(),
            leaderboard_key: "click_game:leaderboard".to_string(),
            max_size: DEFAULT_MAX_SIZE,
            default_limit: DEFAULT_LIMIT,
            redis_timeout: Duration::from_millis(2000),
            admin_routes: false,
        }
    }
}

impl Config {
    pub fn load() -> Self {
        let redis_url: String = try_load("REDIS_URL", "redis://redis:6379");

        Self {
            port: try_load("RUST_PORT", "1111"),
            backend: try_load("LEADERBOARD_BACKEND", "memory"),
            redis_url: with_password(redis_url, read_secret("REDIS_PASSWORD")),
            leaderboard_key: try_load("LEADERBOARD_KEY", "click_game:leaderboard"),
            max_size: at_least_one("LEADERBOARD_MAX_SIZE", try_load("LEADERBOARD_MAX_SIZE", "1000")),
            default_limit: at_least_one(
                "LEADERBOARD_DEFAULT_LIMIT",
                try_load("LEADERBOARD_DEFAULT_LIMIT", "5"),
            ),
            redis_timeout: Duration::from_millis(try_load("REDIS_TIMEOUT_MS", "2000")),
            admin_routes: try_load("ADMIN_ROUTES", "false"),
        }
    }
}

fn var(key: &str) -> Result<String, ()> {
    env::var(key).map_err(|_| {
        warn!("Environment variable {key} not found, using default");
    })
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
        })
        .expect("Environment misconfigured!")
}

fn at_least_one(key: &str, value: usize) -> usize {
    if value == 0 {
        warn!("{key} must be at least 1, using 1");
        return 1;
    }

    value
}

/// Secrets are optional here, Redis may run without auth.
fn read_secret(secret_name: &str) -> Option<String> {
    let path = format!("/run/secrets/{secret_name}");

    read_to_string(&path)
        .map(|s| s.trim().to_string())
        .map_err(|e| {
            info!("No {secret_name} secret ({e}), continuing without it");
        })
        .ok()
        .filter(|s| !s.is_empty())
}

fn with_password(url: String, password: Option<String>) -> String {
    let Some(password) = password else {
        return url;
    };

    match url.split_once("://") {
        Some((scheme, rest)) if !rest.contains('@') => format!("{scheme}://:{password}@{rest}"),
        _ => url,
    }
}
