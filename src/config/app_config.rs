use crate::error::{AppError, Result};
use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub storage: StorageConfig,
    pub cors: CorsConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub name: String,
    pub host: String,
    pub port: u16,
    pub max_body_size: usize,
    pub read_timeout: u64,
    pub write_timeout: u64,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub access_expires: i64,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub bucket: String,
    pub assets_url: String,
    pub file_limit: usize,
}

#[derive(Debug, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            server: ServerConfig {
                name: env::var("APP_NAME").unwrap_or_else(|_| "okro-api".to_string()),
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("PORT")
                    .unwrap_or_else(|_| "3000".to_string())
                    .parse()
                    .map_err(|_| AppError::ConfigError("Invalid PORT value".to_string()))?,
                max_body_size: env::var("MAX_BODY_SIZE")
                    .unwrap_or_else(|_| "10485760".to_string())
                    .parse()
                    .map_err(|_| AppError::ConfigError("Invalid MAX_BODY_SIZE value".to_string()))?,
                read_timeout: env::var("READ_TIMEOUT")
                    .unwrap_or_else(|_| "60".to_string())
                    .parse()
                    .map_err(|_| AppError::ConfigError("Invalid READ_TIMEOUT value".to_string()))?,
                write_timeout: env::var("WRITE_TIMEOUT")
                    .unwrap_or_else(|_| "60".to_string())
                    .parse()
                    .map_err(|_| AppError::ConfigError("Invalid WRITE_TIMEOUT value".to_string()))?,
            },
            database: DatabaseConfig {
                url: env::var("DB_URL")?,
                max_connections: env::var("DB_MAX_CONNECTIONS")
                    .unwrap_or_else(|_| "20".to_string())
                    .parse()
                    .map_err(|_| {
                        AppError::ConfigError("Invalid DB_MAX_CONNECTIONS value".to_string())
                    })?,
            },
            jwt: JwtConfig {
                secret: env::var("JWT_SECRET")?,
                access_expires: env::var("JWT_ACCESS_EXPIRES")
                    .unwrap_or_else(|_| "86400".to_string())
                    .parse()
                    .map_err(|_| {
                        AppError::ConfigError("Invalid JWT_ACCESS_EXPIRES value".to_string())
                    })?,
            },
            storage: StorageConfig {
                bucket: env::var("S3_BUCKET")?,
                assets_url: env::var("ASSETS_URL")?
                    .trim_end_matches('/')
                    .to_string(),
                file_limit: env::var("FILE_LIMIT")
                    .unwrap_or_else(|_| "2097152".to_string())
                    .parse()
                    .map_err(|_| AppError::ConfigError("Invalid FILE_LIMIT value".to_string()))?,
            },
            cors: CorsConfig {
                allowed_origins: env::var("FRONTEND_URL")?
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .collect(),
            },
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
