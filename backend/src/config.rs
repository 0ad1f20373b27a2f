use std::env;
use std::str::FromStr;
use std::time::Duration;

pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub schedule_buffer: Duration,
    pub timeout_retry_attempts: u32,
    pub expiry_sweep_interval: Duration,
}

fn var_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            port: var_or("PORT", 3000),
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:pickban.db?mode=rwc".to_string()),
            schedule_buffer: Duration::from_millis(var_or("SCHEDULE_BUFFER_MS", 2000)),
            timeout_retry_attempts: var_or("TIMEOUT_RETRY_ATTEMPTS", 3).max(1),
            expiry_sweep_interval: Duration::from_secs(var_or("EXPIRY_SWEEP_SECS", 300).max(1)),
        }
    }

    pub fn addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}
