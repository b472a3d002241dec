use std::env;

pub const DEFAULT_JWT_SECRET: &str = "your-secret-key-change-in-production";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("DB_PATH environment variable is not set")]
    MissingDbPath,
}

/// Process configuration resolved from the environment at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: String,
    pub db_path: String,
    pub jwt_secret: String,
    pub jwt_configured: bool,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let db_path = env::var("DB_PATH").map_err(|_| ConfigError::MissingDbPath)?;

        let jwt_secret = env::var("JWT_SECRET").ok();
        let jwt_configured = jwt_secret.is_some();
        let jwt_secret = jwt_secret.unwrap_or_else(|| DEFAULT_JWT_SECRET.to_string());

        Ok(ServerConfig {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT").unwrap_or_else(|_| "8080".to_string()),
            db_path,
            jwt_secret,
            jwt_configured,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn jwt_uses_default(&self) -> bool {
        self.jwt_secret == DEFAULT_JWT_SECRET
    }
}
