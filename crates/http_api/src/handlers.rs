use axum::{
    Json,
    extract::{Query, State},
    http::{StatusCode, Uri},
    response::IntoResponse,
};

use app_api::{EmptyRequest, UptimeRequest};
use uptime_app::AppError;

use crate::{errors::HttpError, state::HttpState};

pub async fn uptime(
    State(state): State<HttpState>,
    Query(req): Query<UptimeRequest>,
) -> Result<impl IntoResponse, HttpError> {
    // Every request rescans the logs; keep that off the async workers.
    let response = tokio::task::spawn_blocking(move || app_api::uptime(&state.context, req))
        .await
        .map_err(|err| HttpError::new(StatusCode::INTERNAL_SERVER_ERROR, err.to_string(), None))??;
    Ok(Json(response))
}

pub async fn sources(State(state): State<HttpState>) -> Result<impl IntoResponse, HttpError> {
    let response = app_api::sources(&state.context, EmptyRequest::default())?;
    Ok(Json(response))
}

pub async fn not_found(uri: Uri) -> HttpError {
    AppError::NotFound(format!("no route for {}", uri.path())).into()
}
