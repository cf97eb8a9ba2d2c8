use std::env;
use std::fmt::Display;
use std::str::FromStr;

use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub listen_addr: String,
    pub sweep_interval_secs: u64,
    pub missed_grace_minutes: i64,
    pub notify_webhook_url: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            listen_addr: env::var("LISTEN_ADDR").unwrap_or_else(|_| {
                warn!("LISTEN_ADDR not set, using default");
                "0.0.0.0:3000".to_string()
            }),
            sweep_interval_secs: parse_env_or("SWEEP_INTERVAL_SECS", 60),
            missed_grace_minutes: parse_env_or("MISSED_GRACE_MINUTES", 15),
            notify_webhook_url: env::var("NOTIFY_WEBHOOK_URL").unwrap_or_default(),
        };

        if !config.is_notification_configured() {
            warn!("NOTIFY_WEBHOOK_URL not set - reschedule notices will only be logged");
        }

        config
    }

    pub fn is_notification_configured(&self) -> bool {
        !self.notify_webhook_url.is_empty()
    }
}

fn parse_env_or<T>(name: &str, default: T) -> T
where
    T: FromStr + Display + Copy,
{
    match env::var(name) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("{} is not a valid number, using {}", name, default);
            default
        }),
        Err(_) => default,
    }
}
