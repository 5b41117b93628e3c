use crate::database::error::DatabaseError;
use crate::room::model::RoomId;
use crate::token_authority::AuthenticationFailedError;
use crate::user::model::UserId;
use axum::Json;
use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Seconds a client should wait before retrying after a storage failure.
const RETRY_AFTER_SECONDS: &str = "1";

/// Type-erased error response
///
/// NOTE: This type is inspired by RFC7807 (Problem Details for HTTP APIs) but spares on a lot of
/// the details to avoid complexity.
///
/// See: <https://www.rfc-editor.org/rfc/rfc7807.html>
#[derive(Debug, Serialize)]
pub struct ApiErrorResponse {
	r#type: &'static str,
	status: u16,
	message: String,
}

impl IntoResponse for ApiErrorResponse {
	fn into_response(self) -> Response {
		let status_code = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
		(status_code, Json(self)).into_response()
	}
}

#[derive(Debug, Error)]
pub enum ApiError {
	#[error("Authentication failed.")]
	Unauthorized,
	#[error("User {0} does not exist.")]
	UnknownUser(UserId),
	#[error("Room {0} does not exist.")]
	RoomNotFound(RoomId),
	#[error("Invalid request: {0}")]
	InvalidRequest(String),
	#[error("Storage is currently unavailable.")]
	Storage(#[from] DatabaseError),
}

impl From<PathRejection> for ApiError {
	fn from(rejection: PathRejection) -> Self {
		Self::InvalidRequest(rejection.body_text())
	}
}

impl From<QueryRejection> for ApiError {
	fn from(rejection: QueryRejection) -> Self {
		Self::InvalidRequest(rejection.body_text())
	}
}

impl From<AuthenticationFailedError> for ApiError {
	fn from(_error: AuthenticationFailedError) -> Self {
		Self::Unauthorized
	}
}

impl From<&ApiError> for ApiErrorResponse {
	fn from(error: &ApiError) -> Self {
		use ApiError::*;
		let (r#type, status) = match error {
			Unauthorized => ("authentication-failed", StatusCode::UNAUTHORIZED),
			UnknownUser(_) => ("unknown-user", StatusCode::NOT_FOUND),
			RoomNotFound(_) => ("room-not-found", StatusCode::NOT_FOUND),
			InvalidRequest(_) => ("invalid-request", StatusCode::BAD_REQUEST),
			Storage(_) => ("storage-unavailable", StatusCode::SERVICE_UNAVAILABLE),
		};

		ApiErrorResponse {
			r#type,
			status: status.as_u16(),
			message: error.to_string(),
		}
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let response = ApiErrorResponse::from(&self);
		if let ApiError::Storage(error) = self {
			error!(%error, "Storage failure while answering request.");
			if !error.is_unavailable() {
				return response.into_response();
			}
			return (
				[(header::RETRY_AFTER, HeaderValue::from_static(RETRY_AFTER_SECONDS))],
				response,
			)
				.into_response();
		}

		response.into_response()
	}
}
