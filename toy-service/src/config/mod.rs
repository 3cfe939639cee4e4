use secrecy::Secret;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

pub const DEFAULT_LOCAL_URI: &str = "mongodb://localhost:27017";

#[derive(Debug, Clone)]
pub struct ToyConfig {
    pub common: core_config::Config,
    pub service_name: String,
    pub mongodb: MongoConfig,
    pub cors: CorsConfig,
    pub otlp_endpoint: Option<String>,
}

#[derive(Debug, Clone)]
pub struct MongoConfig {
    pub uri: Secret<String>,
    pub database: String,
    pub collection: String,
}

#[derive(Debug, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl ToyConfig {
    pub fn load() -> Result<Self, AppError> {
        // Handles .env and the APP__ prefix
        let mut common = core_config::Config::load()?;

        if let Ok(port) = env::var("PORT") {
            common.port = port.parse().map_err(|e| {
                AppError::ConfigError(anyhow::anyhow!("Invalid PORT '{}': {}", port, e))
            })?;
        }

        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        Ok(ToyConfig {
            common,
            service_name: "toy-service".to_string(),
            mongodb: MongoConfig {
                uri: resolve_mongo_uri(is_prod)?,
                database: get_env("MONGODB_DATABASE", Some("kidduDB"), is_prod)?,
                collection: get_env("MONGODB_COLLECTION", Some("toys"), false)?,
            },
            cors: CorsConfig {
                allowed_origins: parse_origins(&get_env("CORS_ALLOWED_ORIGINS", Some("*"), false)?),
            },
            otlp_endpoint: env::var("OTLP_ENDPOINT").ok().filter(|e| !e.is_empty()),
        })
    }
}

/// `MONGODB_URI` wins; otherwise an Atlas SRV string is assembled from
/// `DB_USER`/`DB_PASS`/`DB_HOST`; otherwise a local server outside production.
fn resolve_mongo_uri(is_prod: bool) -> Result<Secret<String>, AppError> {
    if let Ok(uri) = env::var("MONGODB_URI") {
        return Ok(Secret::new(uri));
    }

    match (env::var("DB_USER"), env::var("DB_PASS")) {
        (Ok(user), Ok(pass)) => {
            let host = get_env("DB_HOST", None, is_prod)?;
            Ok(build_connection_string(&user, &pass, &host))
        }
        _ => get_env("MONGODB_URI", Some(DEFAULT_LOCAL_URI), is_prod).map(Secret::new),
    }
}

pub fn build_connection_string(user: &str, pass: &str, host: &str) -> Secret<String> {
    Secret::new(format!(
        "mongodb+srv://{}:{}@{}/?retryWrites=true&w=majority",
        urlencoding::encode(user),
        urlencoding::encode(pass),
        host
    ))
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}
