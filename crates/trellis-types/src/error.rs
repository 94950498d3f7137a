//! Error type shared by every Trellis crate.

use axum::{
	Json,
	http::StatusCode,
	response::{IntoResponse, Response},
};
use serde_json::json;

pub type ClResult<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	/// The persistence layer has no such row
	#[error("not found")]
	NotFound,

	/// Authorization refused the operation
	#[error("permission denied")]
	PermissionDenied,

	/// Operational failure inside a collaborator (details are logged, not exposed)
	#[error("database error")]
	DbError,

	/// No endpoint is registered for the key in the queried scope
	#[error("no endpoint registered for {key} in scope '{scope}'")]
	NoRegisteredEndpoint { scope: Box<str>, key: Box<str> },

	/// A second endpoint tried to claim the primary flag for a key
	#[error("primary endpoint already registered for {key} in scope '{scope}'")]
	DuplicatePrimary { scope: Box<str>, key: Box<str> },

	/// Every scope failed to resolve a URL
	#[error(
		"no URL for resource type '{resource_type}' (handle: {handle}, mode: {mode}), tried scopes: {tried}"
	)]
	LookupError { resource_type: Box<str>, handle: Box<str>, mode: Box<str>, tried: Box<str> },

	#[error("configuration error: {0}")]
	ConfigError(String),

	#[error("validation error: {0}")]
	ValidationError(String),

	#[error("internal error: {0}")]
	Internal(String),

	// externals
	#[error("io error: {0}")]
	Io(#[from] std::io::Error),
}

impl Error {
	pub fn status_code(&self) -> StatusCode {
		match self {
			Error::NotFound | Error::NoRegisteredEndpoint { .. } | Error::LookupError { .. } => {
				StatusCode::NOT_FOUND
			}
			Error::PermissionDenied => StatusCode::FORBIDDEN,
			Error::ValidationError(_) => StatusCode::BAD_REQUEST,
			_ => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}
}

impl IntoResponse for Error {
	fn into_response(self) -> Response {
		let status = self.status_code();
		let message = match self {
			Error::NotFound | Error::NoRegisteredEndpoint { .. } | Error::LookupError { .. } => {
				"not found".to_string()
			}
			Error::PermissionDenied => "permission denied".to_string(),
			Error::ValidationError(msg) => msg,
			_ => "internal server error".to_string(),
		};
		(status, Json(json!({ "error": { "code": status.as_u16(), "message": message } })))
			.into_response()
	}
}


// vim: ts=4
