//! Server configuration.
//!
//! Sources, later ones winning: built-in defaults, a YAML file, and
//! `HBNB_`-prefixed environment variables (`__` separates sections, e.g.
//! `HBNB_AUTH__JWT_SECRET`). Secrets stay wrapped in [`SecretString`]
//! from the moment they are read.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;

use figment::Figment;
use figment::providers::{Env, Format, Yaml};
use secrecy::SecretString;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 8080),
        }
    }
}

/// Which repository backend serves the domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Process-local maps; state is lost on restart.
    Memory,
    /// SeaORM over `database.url`.
    Sql,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub backend: Backend,
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Sql,
            url: "sqlite://hbnb.db?mode=rwc".to_owned(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub jwt_secret: SecretString,
    /// Access-token lifetime in seconds.
    pub token_ttl_secs: i64,
    /// Admin account ensured at startup, for a freshly created database.
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: SecretString::from("jwt-secret-key-change-in-production"),
            token_ttl_secs: 86_400,
            bootstrap_admin: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BootstrapAdmin {
    pub email: String,
    pub password: SecretString,
    #[serde(default = "default_admin_name")]
    pub first_name: String,
    #[serde(default = "default_admin_name")]
    pub last_name: String,
}

fn default_admin_name() -> String {
    "Admin".to_owned()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `tracing-subscriber` env-filter directive.
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_owned(),
        }
    }
}

/// Load configuration; a missing file is fine, env vars still apply.
pub fn load(path: &Path) -> Result<AppConfig, figment::Error> {
    Figment::new()
        .merge(Yaml::file(path))
        .merge(Env::prefixed("HBNB_").split("__"))
        .extract()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn defaults_apply_without_any_source() {
        let config: AppConfig = Figment::new().extract().unwrap();
        assert_eq!(config.database.backend, Backend::Sql);
        assert_eq!(config.server.bind_addr.port(), 8080);
        assert_eq!(config.auth.token_ttl_secs, 86_400);
        assert!(config.auth.bootstrap_admin.is_none());
    }

    #[test]
    fn yaml_overrides_defaults() {
        let config: AppConfig = Figment::new()
            .merge(Yaml::string(
                r"
                server:
                  bind_addr: 0.0.0.0:9000
                database:
                  backend: memory
                auth:
                  bootstrap_admin:
                    email: admin@example.com
                    password: admin123
                ",
            ))
            .extract()
            .unwrap();

        assert_eq!(config.server.bind_addr.port(), 9000);
        assert_eq!(config.database.backend, Backend::Memory);
        let admin = config.auth.bootstrap_admin.unwrap();
        assert_eq!(admin.email, "admin@example.com");
        assert_eq!(admin.first_name, "Admin");
    }

    #[test]
    fn env_wins_over_yaml() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("HBNB_DATABASE__BACKEND", "memory");
            jail.set_env("HBNB_LOG__FILTER", "debug,sea_orm=warn");

            let config: AppConfig = Figment::new()
                .merge(Yaml::string("log:\n  filter: info"))
                .merge(Env::prefixed("HBNB_").split("__"))
                .extract()?;

            assert_eq!(config.database.backend, Backend::Memory);
            assert_eq!(config.log.filter, "debug,sea_orm=warn");
            Ok(())
        });
    }
}
