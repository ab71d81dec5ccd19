use std::collections::HashMap;

use axum::Json;
use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::header::CONTENT_LENGTH;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use tracing::{debug, error};

use super::AppState;
use super::error::{ApiError, messages};
use crate::error::GenerateError;
use crate::generator::RenderedImage;
use crate::options::{AvatarRequest, FIELD_BACKGROUND, FIELD_FORMAT, FIELD_SIZE};

const SOURCE: &str = "server::handlers";

pub(super) async fn avatar(
    State(state): State<AppState>,
    Path(seed): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response, ApiError> {
    let request = AvatarRequest::parse(
        &seed,
        params.get(FIELD_SIZE).map(String::as_str),
        params.get(FIELD_FORMAT).map(String::as_str),
        params.get(FIELD_BACKGROUND).map(String::as_str),
        state.generator.config(),
    )
    .map_err(ApiError::validation)?;

    let generator = state.generator.clone();
    let outcome = tokio::task::spawn_blocking(move || generator.generate_request(&request))
        .await
        .map_err(|err| {
            error!(target = SOURCE, seed = %seed, error = %err, "render task failed");
            ApiError::generation(err.to_string(), state.debug)
        })?;

    match outcome {
        Ok(image) => {
            debug!(
                target = SOURCE,
                cache_key = %image.cache_key,
                from_cache = image.from_cache,
                bytes = image.bytes.len(),
                "served avatar"
            );
            Ok(image_response(&state, image))
        }
        Err(GenerateError::Validation(details)) => Err(ApiError::validation(details)),
        Err(GenerateError::Render(err)) => {
            error!(target = SOURCE, seed = %seed, error = %err, "failed to generate avatar");
            Err(ApiError::generation(err.to_string(), state.debug))
        }
    }
}

pub(super) async fn avatar_info(
    State(state): State<AppState>,
    Path(seed): Path<String>,
) -> Result<Response, ApiError> {
    match state.generator.info(&seed) {
        Ok(info) => Ok(Json(info).into_response()),
        Err(GenerateError::Validation(details)) => {
            let message = details.first_message().unwrap_or(messages::SEED_REQUIRED);
            Err(ApiError::plain(StatusCode::BAD_REQUEST, message))
        }
        Err(GenerateError::Render(err)) => {
            error!(target = SOURCE, seed = %seed, error = %err, "failed to describe avatar");
            Err(ApiError::plain(
                StatusCode::INTERNAL_SERVER_ERROR,
                messages::INFO_FAILED,
            ))
        }
    }
}

pub(super) async fn health() -> StatusCode {
    StatusCode::NO_CONTENT
}

fn image_response(state: &AppState, image: RenderedImage) -> Response {
    let headers = state.generator.response_headers(&image, Utc::now());
    let mut response = Response::new(Body::from(image.bytes.clone()));
    *response.status_mut() = StatusCode::OK;

    let map = response.headers_mut();
    for (name, value) in headers.pairs() {
        if let Ok(value) = HeaderValue::from_str(value) {
            map.insert(HeaderName::from_static(name), value);
        }
    }
    if let Ok(value) = HeaderValue::from_str(&image.bytes.len().to_string()) {
        map.insert(CONTENT_LENGTH, value);
    }

    response
}
