use std::{net::SocketAddr, str::FromStr};

use anyhow::{ensure, Context};

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub db_max_connections: u32,
    pub session_idle: time::Duration,
    pub secure_cookies: bool,
    pub feed_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite://heartroom.db?mode=rwc".to_owned(),
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            db_max_connections: 16,
            session_idle: time::Duration::minutes(60),
            secure_cookies: false,
            feed_capacity: 64,
        }
    }
}

impl Config {
    /// Reads `.env` if there is one, then the process environment.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| dotenv::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        fn parsed<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
        where
            T: FromStr,
            T::Err: std::error::Error + Send + Sync + 'static,
        {
            match lookup(key) {
                Some(value) => value.trim().parse().with_context(|| format!("{key}={value:?} is not valid")),
                None => Ok(default),
            }
        }

        let default = Config::default();
        let session_minutes: i64 = parsed(&lookup, "SESSION_IDLE_MINUTES", default.session_idle.whole_minutes())?;
        ensure!(session_minutes > 0, "SESSION_IDLE_MINUTES={session_minutes} must be at least 1");
        let db_max_connections: u32 = parsed(&lookup, "DB_MAX_CONNECTIONS", default.db_max_connections)?;
        ensure!(db_max_connections > 0, "DB_MAX_CONNECTIONS must be at least 1");

        Ok(Config {
            database_url: lookup("DATABASE_URL").unwrap_or(default.database_url),
            bind_addr: parsed(&lookup, "BIND_ADDR", default.bind_addr)?,
            db_max_connections,
            session_idle: time::Duration::minutes(session_minutes),
            secure_cookies: parsed(&lookup, "SECURE_COOKIES", default.secure_cookies)?,
            feed_capacity: parsed(&lookup, "FEED_CAPACITY", default.feed_capacity)?,
        })
    }
}
