use std::process;
use std::sync::Arc;

use identicon_renderer::server::{self, AppState, settings, telemetry};
use identicon_renderer::{IdenticonGenerator, MemoryCacheStore, NoopCacheStore};
use thiserror::Error;
use tracing::{Dispatch, Level, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;

#[derive(Debug, Error)]
enum AppError {
    #[error("failed to load configuration: {0}")]
    Settings(#[from] settings::LoadError),
    #[error(transparent)]
    Telemetry(#[from] telemetry::TelemetryError),
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        source: std::io::Error,
    },
    #[error("server error: {0}")]
    Serve(std::io::Error),
}

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (_, settings) = settings::load_with_cli()?;
    telemetry::init(&settings.logging)?;

    let generator = if settings.cache.enabled {
        IdenticonGenerator::new(
            settings.generator.clone(),
            Arc::new(MemoryCacheStore::new(settings.cache.capacity.get())),
        )
    } else {
        IdenticonGenerator::new(settings.generator.clone(), Arc::new(NoopCacheStore))
    };
    let state = AppState::new(Arc::new(generator), settings.debug);

    let addr = settings.server.addr;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| AppError::Bind { addr, source })?;

    info!(
        %addr,
        cache_enabled = settings.cache.enabled,
        cache_capacity = settings.cache.capacity.get(),
        debug = settings.debug,
        "identicon server listening"
    );

    axum::serve(listener, server::router(state).into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Serve)?;

    info!("identicon server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
