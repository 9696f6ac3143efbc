use secrecy::Secret;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub base_url: String,
    pub host: String,
    pub port: u16,

    // Optional first-run admin account, created only when the drivers
    // table is empty
    pub bootstrap_username: Option<String>,
    pub bootstrap_password: Option<Secret<String>>,
    pub bootstrap_license_number: Option<String>,

    // Security
    pub session_secret: Secret<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, config::ConfigError> {
        // Load .env file if it exists (for local development)
        let _ = dotenvy::dotenv();

        let config = config::Config::builder()
            .add_source(config::Environment::default().separator("__"))
            .build()?;

        Ok(Self {
            database_url: config.get("database_url")?,
            base_url: config.get("base_url")?,
            host: config.get("host").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: config.get("port")?,

            bootstrap_username: config.get("bootstrap_username").ok(),
            bootstrap_password: config
                .get::<String>("bootstrap_password")
                .ok()
                .map(Secret::new),
            bootstrap_license_number: config.get("bootstrap_license_number").ok(),

            session_secret: Secret::new(config.get("session_secret")?),
        })
    }
}
