//! Backend entry-point: loads settings, prepares the database and token
//! secret, then serves the REST API, WebSocket rooms and OpenAPI docs.

mod server;

use std::ffi::OsString;

use actix_web::web;
#[cfg(feature = "metrics")]
use actix_web_prom::{PrometheusMetrics, PrometheusMetricsBuilder};
use color_eyre::eyre::{Context, Result, eyre};
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use server::{ServerConfig, create_server};
use snaptrack::inbound::http::health::HealthState;
use snaptrack::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use snaptrack::outbound::security::{BuildMode, token_secret_from_env};
use snaptrack::settings::ServerSettings;

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = load_settings(std::env::args_os())?;
    let config = build_server_config(&settings).await?;
    let bind_addr = config.bind_addr();

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config).wrap_err("failed to start server")?;
    info!(%bind_addr, "listening");
    server.await.wrap_err("server terminated with an error")
}

fn load_settings<I>(args: I) -> Result<ServerSettings>
where
    I: IntoIterator<Item = OsString>,
{
    ServerSettings::load_from_iter(args).map_err(|e| eyre!("failed to load settings: {e}"))
}

async fn build_server_config(settings: &ServerSettings) -> Result<ServerConfig> {
    let bind_addr = settings.bind_addr()?;
    let database_url = settings.database_url()?.to_owned();

    let token_secret =
        token_secret_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
            .wrap_err("failed to load token secret")?;
    info!(
        fingerprint = %token_secret.fingerprint(),
        ephemeral = token_secret.is_ephemeral(),
        "token secret loaded"
    );

    let migrations_url = database_url.clone();
    let applied = tokio::task::spawn_blocking(move || run_pending_migrations(&migrations_url))
        .await
        .wrap_err("migration task failed")??;
    info!(applied, "database migrations applied");

    let pool = DbPool::new(PoolConfig::new(database_url).with_max_size(settings.db_pool_size()))
        .await
        .wrap_err("failed to build database pool")?;

    let config = ServerConfig::new(bind_addr, pool, token_secret)
        .with_cloudinary(
            settings.cloudinary_credentials(),
            settings.cloudinary_api_base()?,
        )
        .with_ws_allowed_origins(settings.ws_allowed_origins()?)
        .with_room_capacity(settings.room_capacity())
        .with_upload_limit(settings.upload_limit_bytes());

    #[cfg(feature = "metrics")]
    let config = config.with_metrics(initialize_metrics(|| {
        PrometheusMetricsBuilder::new("snaptrack")
            .endpoint("/metrics")
            .build()
    }));

    Ok(config)
}

/// Build Prometheus middleware, logging and continuing without metrics when
/// construction fails.
#[cfg(feature = "metrics")]
fn initialize_metrics<F, E>(build: F) -> Option<PrometheusMetrics>
where
    F: FnOnce() -> std::result::Result<PrometheusMetrics, E>,
    E: std::fmt::Display,
{
    match build() {
        Ok(metrics) => Some(metrics),
        Err(e) => {
            warn!(error = %e, "Prometheus metrics disabled");
            None
        }
    }
}
