use anyhow::{anyhow, Result};
use chrono_tz::Tz;
use std::env;

const DEV_JWT_SECRET: &str = "your-super-secret-jwt-key-change-this-in-production-12345";

#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres connection string. When unset the server keeps shifts in memory.
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub client_base_url: String,
    /// Zone in which shift dates and times of day are interpreted.
    pub shift_timezone: Tz,
    /// Location names created at startup when running without a database.
    pub seed_locations: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        Self::from_env_only()
    }

    /// Load configuration from environment variables only (without loading .env files)
    /// This is useful for testing where you want to control the environment directly
    pub fn from_env_only() -> Result<Self> {
        let shift_timezone = match env::var("SHIFT_TIMEZONE") {
            Ok(raw) => parse_timezone(&raw)?,
            Err(_) => Tz::UTC,
        };

        Ok(Config {
            database_url: env::var("DATABASE_URL")
                .ok()
                .filter(|url| !url.trim().is_empty()),
            jwt_secret: env::var("JWT_SECRET").unwrap_or_else(|_| DEV_JWT_SECRET.to_string()),
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            client_base_url: env::var("CLIENT_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            shift_timezone,
            seed_locations: env::var("SEED_LOCATIONS")
                .map(|raw| parse_list(&raw))
                .unwrap_or_default(),
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn uses_dev_jwt_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_timezone(raw: &str) -> Result<Tz> {
    raw.trim()
        .parse::<Tz>()
        .map_err(|_| anyhow!("Invalid SHIFT_TIMEZONE '{}': expected an IANA zone name", raw))
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}
