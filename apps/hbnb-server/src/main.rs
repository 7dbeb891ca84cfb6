//! HBnB server binary.
//!
//! Wires configuration, tracing, the chosen repository backend, the
//! domain services and the REST router, then serves until ctrl-c.

mod config;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use sea_orm::Database;
use sea_orm_migration::MigratorTrait;
use secrecy::ExposeSecret;
use time::Duration;
use tower_http::cors::CorsLayer;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use rentals::api::rest;
use rentals::auth::{PasswordHasher, TokenService};
use rentals::domain::repos::{
    AmenitiesRepository, PlacesRepository, ReviewsRepository, UsersRepository,
};
use rentals::domain::DomainError;
use rentals::domain::service::{AppServices, ServiceConfig};
use rentals::infra::memory::{
    InMemoryAmenitiesRepository, InMemoryPlacesRepository, InMemoryReviewsRepository,
    InMemoryUsersRepository,
};
use rentals::infra::storage::migrations::Migrator;
use rentals::infra::storage::{
    OrmAmenitiesRepository, OrmPlacesRepository, OrmReviewsRepository, OrmUsersRepository,
};
use rentals::security::SecurityContext;
use rentals_sdk::NewUser;

use config::{AppConfig, Backend, BootstrapAdmin};

#[derive(Debug, Parser)]
#[command(name = "hbnb-server", about = "HBnB property-rental API server")]
struct Args {
    /// Path to the YAML configuration file.
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,

    /// Override `server.bind_addr` from the configuration.
    #[arg(long)]
    bind: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let cfg = config::load(&args.config)
        .with_context(|| format!("loading configuration from {}", args.config.display()))?;

    init_tracing(&cfg)?;

    let addr = args.bind.unwrap_or(cfg.server.bind_addr);
    let tokens = Arc::new(TokenService::new(
        &cfg.auth.jwt_secret,
        Duration::seconds(cfg.auth.token_ttl_secs),
    ));
    let hasher = PasswordHasher::default();

    match cfg.database.backend {
        Backend::Memory => {
            tracing::warn!("memory backend selected, data will not survive a restart");
            let services = Arc::new(AppServices::new(
                InMemoryUsersRepository::default(),
                InMemoryPlacesRepository::default(),
                InMemoryAmenitiesRepository::default(),
                InMemoryReviewsRepository::default(),
                hasher,
                Arc::clone(&tokens),
                ServiceConfig::default(),
            ));
            bootstrap_admin(&services, cfg.auth.bootstrap_admin.as_ref()).await?;
            serve(rest::router(services, tokens), addr).await
        }
        Backend::Sql => {
            let db = Database::connect(cfg.database.url.as_str())
                .await
                .with_context(|| format!("connecting to {}", cfg.database.url))?;
            Migrator::up(&db, None).await.context("running migrations")?;

            let services = Arc::new(AppServices::new(
                OrmUsersRepository::new(db.clone()),
                OrmPlacesRepository::new(db.clone()),
                OrmAmenitiesRepository::new(db.clone()),
                OrmReviewsRepository::new(db),
                hasher,
                Arc::clone(&tokens),
                ServiceConfig::default(),
            ));
            bootstrap_admin(&services, cfg.auth.bootstrap_admin.as_ref()).await?;
            serve(rest::router(services, tokens), addr).await
        }
    }
}

fn init_tracing(cfg: &AppConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cfg.log.filter))
        .context("invalid log filter")?;
    tracing_subscriber::fmt().with_env_filter(filter).init();
    Ok(())
}

/// Ensure the configured admin account exists. An already-registered
/// email is fine; anything else aborts startup.
async fn bootstrap_admin<UR, PR, AR, RR>(
    services: &AppServices<UR, PR, AR, RR>,
    admin: Option<&BootstrapAdmin>,
) -> anyhow::Result<()>
where
    UR: UsersRepository,
    PR: PlacesRepository,
    AR: AmenitiesRepository,
    RR: ReviewsRepository,
{
    let Some(admin) = admin else {
        return Ok(());
    };

    let payload = NewUser {
        first_name: admin.first_name.clone(),
        last_name: admin.last_name.clone(),
        email: admin.email.clone(),
        password: admin.password.expose_secret().to_owned(),
        is_admin: true,
    };

    match services
        .users
        .create_user(&SecurityContext::admin(Uuid::nil()), payload)
        .await
    {
        Ok(user) => {
            tracing::info!("bootstrap admin {} created ({})", user.email, user.id);
            Ok(())
        }
        Err(DomainError::Conflict { .. }) => {
            tracing::debug!("bootstrap admin {} already present", admin.email);
            Ok(())
        }
        Err(err) => Err(err).context("creating bootstrap admin"),
    }
}

async fn serve(router: axum::Router, addr: SocketAddr) -> anyhow::Result<()> {
    let router = router.layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!("listening on {addr}");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {err}");
        return;
    }
    tracing::info!("shutdown signal received");
}
