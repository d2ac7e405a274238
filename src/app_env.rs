use anyhow::Context;
use std::env;

/// URL for accessing the PostgreSQL database (should contain a schema name in the path)
pub const DB_URL: &str = "DATABASE_URL";
/// Log level configuration for the application. For formatting info, see
/// [tracing-subscriber's EnvFilter documentation](https://docs.rs/tracing-subscriber/latest/tracing_subscriber/filter/struct.EnvFilter.html)
pub const LOG_LEVEL: &str = "LOG_LEVEL";
/// Secret used to sign and verify session tokens
pub const JWT_SECRET: &str = "JWT_SECRET";
/// TCP port the HTTP server listens on
pub const PORT: &str = "PORT";
/// Deployment environment name. A value of "production" makes [JWT_SECRET] mandatory.
pub const APP_ENV: &str = "APP_ENV";


/// Application settings resolved from the environment at startup.
#[derive(Debug)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Config, anyhow::Error> {
        Self::from_lookup(|var_name| env::var(var_name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Config, anyhow::Error> {
        let database_url = lookup(DB_URL)
            .with_context(|| format!("the {DB_URL} environment variable must be set"))?;
        let jwt_secret = match lookup(JWT_SECRET) {
            Some(secret) => secret,
            // The development fallback must never sign tokens in production
            None if lookup(APP_ENV).as_deref() == Some("production") => {
                anyhow::bail!("the {JWT_SECRET} environment variable must be set in production")
            }
            None => "supersecret".to_owned(),
        };
        let port = match lookup(PORT) {
            Some(raw_port) => raw_port
                .parse()
                .with_context(|| format!("{PORT} must be a port number, got {raw_port}"))?,
            None => 3000,
        };

        Ok(Config {
            database_url,
            jwt_secret,
            port,
        })
    }
}
