use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::auth::credentials::hash_password;

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub username: String,
    /// Argon2 PHC string. Either supplied directly or derived from `APP_PASSWORD`.
    pub password_hash: String,
    pub azure: AzureConfig,
    pub articles_dir: PathBuf,
    pub generated_dir: PathBuf,
    pub image_dir: PathBuf,
    pub session_ttl_minutes: u64,
    pub default_firm: String,
    pub default_location: String,
    pub port: u16,
    pub rust_log: String,
}

/// Endpoints and keys for the two Azure OpenAI deployments.
#[derive(Debug, Clone)]
pub struct AzureConfig {
    pub text_endpoint: String,
    pub text_key: String,
    pub text_deployment: String,
    pub image_endpoint: String,
    pub image_key: String,
    pub image_deployment: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let password_hash = match std::env::var("APP_PASSWORD_HASH") {
            Ok(hash) => hash,
            Err(_) => hash_password(&require_env("APP_PASSWORD")?)
                .context("APP_PASSWORD could not be hashed")?,
        };

        Ok(Config {
            username: require_env("APP_USERNAME")?,
            password_hash,
            azure: AzureConfig {
                text_endpoint: require_env("AZURE_OPENAI_ENDPOINT")?,
                text_key: require_env("AZURE_OPENAI_KEY")?,
                text_deployment: require_env("AZURE_OPENAI_DEPLOYMENT")?,
                image_endpoint: require_env("AZURE_DALLE_ENDPOINT")?,
                image_key: require_env("AZURE_DALLE_KEY")?,
                image_deployment: require_env("AZURE_DALLE_DEPLOYMENT")?,
            },
            articles_dir: env_or("ARTICLES_DIR", "articles").into(),
            generated_dir: env_or("GENERATED_DIR", "generated").into(),
            image_dir: env_or("IMAGE_DIR", "static/generated").into(),
            session_ttl_minutes: env_or("SESSION_TTL_MINUTES", "60")
                .parse::<u64>()
                .context("SESSION_TTL_MINUTES must be a whole number of minutes")?,
            default_firm: env_or("DEFAULT_FIRM", "Your Firm Name"),
            default_location: env_or("DEFAULT_LOCATION", "Your Location"),
            port: env_or("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }

    /// Creates the article, text and image directories if they do not exist yet.
    pub fn ensure_dirs(&self) -> Result<()> {
        for dir in [&self.articles_dir, &self.generated_dir, &self.image_dir] {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create directory '{}'", dir.display()))?;
        }
        Ok(())
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
