use std::env;

use chrono::Duration;

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    pub database_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub access_token_secret: String,
    pub refresh_token_secret: String,
    pub access_token_expiry_secs: i64,
    pub refresh_token_expiry_secs: i64,
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        dotenv::dotenv().ok();

        // Expiries accept the short forms used in .env files ("15m", "7d").
        let access_expiry_mins = parse_with_suffix(env::var("ACCESS_TOKEN_EXPIRY").ok(), 'm', 15);
        let refresh_expiry_days = parse_with_suffix(env::var("REFRESH_TOKEN_EXPIRY").ok(), 'd', 7);

        Ok(Config {
            database_url: env::var("DATABASE_URL")?,
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            access_token_secret: env::var("ACCESS_TOKEN_SECRET")?,
            refresh_token_secret: env::var("REFRESH_TOKEN_SECRET")?,
            access_token_expiry_secs: access_expiry_mins * 60,
            refresh_token_expiry_secs: refresh_expiry_days * 24 * 3600,
        })
    }

    pub fn access_token_expiry(&self) -> Duration {
        Duration::seconds(self.access_token_expiry_secs)
    }

    pub fn refresh_token_expiry(&self) -> Duration {
        Duration::seconds(self.refresh_token_expiry_secs)
    }
}

fn parse_with_suffix(raw: Option<String>, suffix: char, default: i64) -> i64 {
    raw.and_then(|v| v.trim().trim_end_matches(suffix).parse().ok())
        .unwrap_or(default)
}
