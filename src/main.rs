//! image-mesh binary entrypoint wiring the REST API, the static file server and the sweeper.

use std::{env, net::SocketAddr};

use anyhow::Context;
use axum::Router;
use time::OffsetDateTime;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use image_mesh::{
    config::AppConfig,
    dao::source::HttpImageSource,
    routes,
    services::sweeper,
    state::{AppState, SharedState},
};

const DEFAULT_PORT: u16 = 5000;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let source = HttpImageSource::new(config.fetch_timeout).context("building HTTP client")?;
    let sweep_interval = config.sweep_interval;
    let app_state = AppState::new(config, source.shared());

    prepare_public_dir(&app_state).await?;
    if let Some(period) = sweep_interval {
        info!(?period, "starting periodic sweeper");
        tokio::spawn(sweeper::run(app_state.clone(), period));
    }

    let welcome = app_state.config().welcome_message();
    let app = build_router(app_state);

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(DEFAULT_PORT);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");
    info!("{welcome}");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    let service = app.into_make_service();
    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Create the serving directory and drop whatever a previous run left stale.
async fn prepare_public_dir(state: &SharedState) -> anyhow::Result<()> {
    let store = state.store();
    store
        .ensure_dir()
        .await
        .with_context(|| format!("creating {}", store.dir().display()))?;

    let report = store.sweep(OffsetDateTime::now_utc()).await;
    if report.failed > 0 {
        warn!(failed = report.failed, "startup sweep could not delete every stale file");
    }
    info!(
        dir = %store.dir().display(),
        kept = report.kept,
        deleted = report.deleted,
        "serving directory ready"
    );
    Ok(())
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                warn!(error = %err, "failed to install SIGTERM handler; waiting for Ctrl+C only");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
