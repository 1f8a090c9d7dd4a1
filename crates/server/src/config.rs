use std::net::SocketAddr;
use thiserror::Error;

const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:3000";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    Missing(&'static str),

    #[error("environment variable {name} has invalid value {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Runtime settings, read from the environment (and `.env`)
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub database_url: String,
    pub oidc_issuer_url: String,
    pub oidc_audience: Option<String>,
    pub bind_address: SocketAddr,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let bind_address = lookup("BIND_ADDRESS").unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());
        let bind_address = bind_address
            .parse()
            .map_err(|_| ConfigError::Invalid {
                name: "BIND_ADDRESS",
                value: bind_address.clone(),
            })?;

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            oidc_issuer_url: required("OIDC_ISSUER_URL")?,
            oidc_audience: lookup("OIDC_AUDIENCE").filter(|value| !value.is_empty()),
            bind_address,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/catalogue"),
            ("OIDC_ISSUER_URL", "https://keycloak.example/realms/mops"),
        ]))
        .unwrap();

        assert_eq!(config.bind_address, "0.0.0.0:3000".parse().unwrap());
        assert_eq!(config.oidc_audience, None);
    }

    #[test]
    fn test_missing_database_url() {
        let err = Config::from_lookup(lookup(&[("OIDC_ISSUER_URL", "https://kc")])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("DATABASE_URL"));
    }

    #[test]
    fn test_invalid_bind_address() {
        let err = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/catalogue"),
            ("OIDC_ISSUER_URL", "https://kc"),
            ("BIND_ADDRESS", "localhost"),
        ]))
        .unwrap_err();

        assert!(matches!(err, ConfigError::Invalid { name: "BIND_ADDRESS", .. }));
    }

    #[test]
    fn test_audience() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/catalogue"),
            ("OIDC_ISSUER_URL", "https://kc"),
            ("OIDC_AUDIENCE", "module-catalogue"),
            ("BIND_ADDRESS", "127.0.0.1:8080"),
        ]))
        .unwrap();

        assert_eq!(config.oidc_audience.as_deref(), Some("module-catalogue"));
        assert_eq!(config.bind_address.port(), 8080);
    }
}
