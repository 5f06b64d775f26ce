use crate::utils::AppError;
use std::time::Duration;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_DATABASE_NAME: &str = "workout_api";
const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Runtime configuration, read from the environment (and `.env`).
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub database_name: String,
    pub database_timeout: Duration,
    /// Empty means any origin is allowed.
    pub cors_allowed_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| AppError::Config(format!("PORT must be an integer, got '{}'", raw)))?,
            None => DEFAULT_PORT,
        };

        let database_url = lookup("DATABASE_URL")
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| AppError::Config("DATABASE_URL must be set".to_string()))?;

        let database_name = lookup("DATABASE_NAME")
            .filter(|name| !name.trim().is_empty())
            .or_else(|| database_name_from_url(&database_url))
            .unwrap_or_else(|| DEFAULT_DATABASE_NAME.to_string());

        let timeout_secs = match lookup("DATABASE_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                AppError::Config(format!("DATABASE_TIMEOUT_SECS must be an integer, got '{}'", raw))
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let cors_allowed_origins = lookup("CORS_ALLOWED_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(|origin| origin.trim().to_string())
                    .filter(|origin| !origin.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Config {
            host,
            port,
            database_url,
            database_name,
            database_timeout: Duration::from_secs(timeout_secs),
            cors_allowed_origins,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Extracts the database name from the path of a connection string,
/// e.g. `mongodb://host:27017/fitness?retryWrites=true` gives `fitness`.
fn database_name_from_url(url: &str) -> Option<String> {
    let without_scheme = url.split_once("://").map(|(_, rest)| rest).unwrap_or(url);
    let (_, path) = without_scheme.split_once('/')?;
    let name = path.split('?').next().unwrap_or_default().trim();

    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config, AppError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[("DATABASE_URL", "mongodb://localhost:27017")]).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.database_name, "workout_api");
        assert_eq!(config.database_timeout, Duration::from_secs(5));
        assert!(config.cors_allowed_origins.is_empty());
        assert_eq!(config.bind_address(), "0.0.0.0:3000");
    }

    #[test]
    fn test_port_override_and_invalid_port() {
        let config = config_from(&[("DATABASE_URL", "mongodb://db"), ("PORT", "8080")]).unwrap();
        assert_eq!(config.port, 8080);

        let err = config_from(&[("DATABASE_URL", "mongodb://db"), ("PORT", "eighty")]).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_database_url_is_required() {
        assert!(matches!(config_from(&[]), Err(AppError::Config(_))));
        assert!(matches!(config_from(&[("DATABASE_URL", "  ")]), Err(AppError::Config(_))));
    }

    #[test]
    fn test_database_name_resolution() {
        let config = config_from(&[("DATABASE_URL", "mongodb://u:p@host:27017/fitness?retryWrites=true")]).unwrap();
        assert_eq!(config.database_name, "fitness");

        let config = config_from(&[
            ("DATABASE_URL", "mongodb://host/fitness"),
            ("DATABASE_NAME", "override"),
        ])
        .unwrap();
        assert_eq!(config.database_name, "override");

        let config = config_from(&[("DATABASE_URL", "mongodb://host:27017/?tls=true")]).unwrap();
        assert_eq!(config.database_name, "workout_api");
    }

    #[test]
    fn test_cors_origins_are_split() {
        let config = config_from(&[
            ("DATABASE_URL", "mongodb://db"),
            ("CORS_ALLOWED_ORIGINS", "http://localhost:8081, http://127.0.0.1:19006,"),
        ])
        .unwrap();
        assert_eq!(
            config.cors_allowed_origins,
            vec!["http://localhost:8081".to_string(), "http://127.0.0.1:19006".to_string()]
        );
    }
}
