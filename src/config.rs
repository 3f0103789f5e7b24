//! Process configuration, read once from the environment at startup.
//!
//! | Variable | Default |
//! |---|---|
//! | `PORT` | `3000` |
//! | `APP_ENV` | `local` |
//! | `CORS_ORIGIN` | `*` |
//! | `API_PREFIX` | `/api` |
//! | `APP_VERSION` | `0.0.0` |
//! | `GIT_SHA` | `dev` |
//! | `BUILD_DATE` | startup time, RFC 3339 |
//!
//! An empty variable counts as unset.

use std::net::{Ipv4Addr, SocketAddr};

use crate::error::Error;

/// Which origin the CORS stage advertises.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CorsOrigin {
    /// `CORS_ORIGIN=*`: reflect whatever `Origin` the request carries.
    Any,
    /// Any other value, sent verbatim.
    Exact(String),
}

impl CorsOrigin {
    fn parse(value: &str) -> Self {
        if value == "*" { Self::Any } else { Self::Exact(value.to_owned()) }
    }
}

/// Immutable process-wide configuration.
///
/// Built once in `main` and shared as `Arc<Config>`; every handler reads it
/// through [`Request::config`](crate::Request::config).
#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub env: String,
    pub cors_origin: CorsOrigin,
    pub api_prefix: String,
    pub version: String,
    pub git_sha: String,
    pub build_date: String,
}

impl Config {
    /// Reads the process environment.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup. `from_env` is this with
    /// `std::env::var`; tests pass a map.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let port = match get("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| Error::Config { var: "PORT", value: raw })?,
            None => 3000,
        };

        Ok(Self {
            port,
            env: get("APP_ENV").unwrap_or_else(|| "local".to_owned()),
            cors_origin: CorsOrigin::parse(get("CORS_ORIGIN").as_deref().unwrap_or("*")),
            api_prefix: get("API_PREFIX").unwrap_or_else(|| "/api".to_owned()),
            version: get("APP_VERSION").unwrap_or_else(|| "0.0.0".to_owned()),
            git_sha: get("GIT_SHA").unwrap_or_else(|| "dev".to_owned()),
            build_date: get("BUILD_DATE").unwrap_or_else(crate::timestamp),
        })
    }

    /// Listen address: every interface, configured port.
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            env: "local".to_owned(),
            cors_origin: CorsOrigin::Any,
            api_prefix: "/api".to_owned(),
            version: "0.0.0".to_owned(),
            git_sha: "dev".to_owned(),
            build_date: crate::timestamp(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn from_pairs(pairs: &[(&str, &str)]) -> Result<Config, Error> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_when_environment_is_empty() {
        let config = from_pairs(&[]).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.env, "local");
        assert_eq!(config.cors_origin, CorsOrigin::Any);
        assert_eq!(config.api_prefix, "/api");
        assert_eq!(config.version, "0.0.0");
        assert_eq!(config.git_sha, "dev");
        assert!(chrono::DateTime::parse_from_rfc3339(&config.build_date).is_ok());
    }

    #[test]
    fn explicit_values_win() {
        let config = from_pairs(&[
            ("PORT", "8080"),
            ("APP_ENV", "staging"),
            ("CORS_ORIGIN", "https://app.example.com"),
            ("API_PREFIX", "/v1"),
            ("APP_VERSION", "9.9.9"),
            ("GIT_SHA", "abc1234"),
            ("BUILD_DATE", "2024-01-01T00:00:00.000Z"),
        ])
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.env, "staging");
        assert_eq!(config.cors_origin, CorsOrigin::Exact("https://app.example.com".into()));
        assert_eq!(config.api_prefix, "/v1");
        assert_eq!(config.version, "9.9.9");
        assert_eq!(config.git_sha, "abc1234");
        assert_eq!(config.build_date, "2024-01-01T00:00:00.000Z");
        assert_eq!(config.addr().port(), 8080);
    }

    #[test]
    fn empty_values_count_as_unset() {
        let config = from_pairs(&[("APP_ENV", ""), ("PORT", ""), ("API_PREFIX", "")]).unwrap();
        assert_eq!(config.env, "local");
        assert_eq!(config.port, 3000);
        assert_eq!(config.api_prefix, "/api");
    }

    #[test]
    fn invalid_port_is_an_error() {
        let err = from_pairs(&[("PORT", "eighty")]).unwrap_err();
        assert!(matches!(err, Error::Config { var: "PORT", .. }));

        assert!(from_pairs(&[("PORT", "70000")]).is_err());
    }
}
