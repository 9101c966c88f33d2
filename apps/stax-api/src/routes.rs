use axum::{
	Json, Router,
	extract::State,
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::Serialize;
use stax_service::{Error as ServiceError, ScoredBook, SearchRequest};

use crate::state::{AppState, ConfigInfo};

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/config", get(config_info))
		.route("/search", post(search))
		.with_state(state)
}

async fn health() -> Json<serde_json::Value> {
	Json(serde_json::json!({ "status": "ok" }))
}

async fn config_info(State(state): State<AppState>) -> Json<ConfigInfo> {
	Json(state.info.as_ref().clone())
}

async fn search(
	State(state): State<AppState>,
	Json(payload): Json<SearchRequest>,
) -> Result<Json<Vec<ScoredBook>>, ApiError> {
	let results = state.service.search(payload).await?;

	Ok(Json(results))
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
}
impl ApiError {
	fn new(status: StatusCode, error_code: impl Into<String>, message: impl Into<String>) -> Self {
		Self { status, error_code: error_code.into(), message: message.into() }
	}
}
impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		match err {
			ServiceError::InvalidRequest { message } =>
				Self::new(StatusCode::BAD_REQUEST, "invalid_request", message),
			ServiceError::Provider { message } =>
				Self::new(StatusCode::BAD_GATEWAY, "provider_error", message),
			ServiceError::Storage { message } =>
				Self::new(StatusCode::INTERNAL_SERVER_ERROR, "storage_error", message),
		}
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody { error_code: self.error_code, message: self.message };

		(self.status, Json(body)).into_response()
	}
}
