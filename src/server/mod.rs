//! HTTP surface of the service.
//!
//! Thin axum adapter over [`crate::analysis`]: every route parses its input,
//! calls one use case with the shared [`AppState`] and maps failures to
//! `{"detail": "..."}` bodies via [`AppError`].

pub mod errors;
pub mod handlers;
pub mod router;
pub mod state;

pub use errors::AppError;
pub use router::create_router;
pub use state::{build_app_state, AppState};

use crate::config::get_config;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Serve `app_state` on `listener` until the process exits.
pub async fn run(listener: TcpListener, app_state: AppState) -> anyhow::Result<()> {
    let app = create_router(app_state);
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}

/// Load `.env` and the configuration, install logging, bind and serve.
pub async fn start(config_path: Option<&str>) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = get_config(config_path)?;
    let addr = config.addr()?;
    info!(
        provider = ?config.provider,
        model = %config.model,
        logo_lookup = config.logo_lookup,
        "configuration loaded"
    );

    let app_state = build_app_state(&config)?;
    let listener = TcpListener::bind(addr).await?;
    run(listener, app_state).await
}
