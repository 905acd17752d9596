//! Backend entry-point: loads configuration, selects adapters and serves the
//! inquiry API with its health probes.

mod server;

use actix_web::web;
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use inquiry_backend::inbound::http::health::HealthState;
use inquiry_backend::inbound::http::session_config::{BuildMode, session_settings_from_env};
use inquiry_backend::outbound::persistence::{DbPool, PoolConfig};
use inquiry_backend::settings::InquirySettings;

use server::{ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = InquirySettings::load_from_iter(std::env::args_os())
        .map_err(|e| std::io::Error::other(format!("failed to load configuration: {e}")))?;
    let session = session_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .map_err(std::io::Error::other)?;
    let bind_addr = settings.bind_addr().map_err(std::io::Error::other)?;

    let mut config = ServerConfig::new(session, bind_addr);
    if let Some(url) = settings.database_url.as_deref() {
        let pool = DbPool::new(PoolConfig::new(url).with_max_size(settings.db_max_connections()))
            .await
            .map_err(std::io::Error::other)?;
        config = config.with_db_pool(pool);
    }

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), &settings, config)?;
    info!(%bind_addr, "inquiry backend listening");

    let result = server.await;
    health_state.mark_unhealthy();
    result
}
