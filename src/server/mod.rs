//! HTTP surface: routes, settings and telemetry for the `identicon-server`
//! binary.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;

use crate::generator::IdenticonGenerator;

mod error;
mod handlers;
pub mod settings;
pub mod telemetry;

pub use error::ApiError;

/// Shared state for every route.
#[derive(Clone)]
pub struct AppState {
    pub generator: Arc<IdenticonGenerator>,
    /// Expose underlying error text in 500 responses.
    pub debug: bool,
}

impl AppState {
    pub fn new(generator: Arc<IdenticonGenerator>, debug: bool) -> Self {
        Self { generator, debug }
    }
}

/// Builds the avatar router.
///
/// - `GET /avatar/{seed}`: image bytes
/// - `GET /avatar/{seed}/info`: JSON metadata
/// - `GET /health`: 204
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/avatar/{seed}", get(handlers::avatar))
        .route("/avatar/{seed}/info", get(handlers::avatar_info))
        .route("/health", get(handlers::health))
        .with_state(state)
}
