//! Client-level error types shared across the request pipeline, session stores, and transports.

// crates.io
use http::{Method, StatusCode};
// self
use crate::{
	_prelude::*,
	config::ClientConfigError,
	jsonapi::{ErrorDocument, FieldErrors},
	session::SessionError,
};

/// Client-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical client error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Session store failure.
	#[error("{0}")]
	Session(
		#[from]
		#[source]
		SessionError,
	),
	/// Local configuration or request construction problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Response body could not be decoded.
	#[error(transparent)]
	Decode(#[from] DecodeError),
	/// Backend answered with a non-success status.
	#[error(transparent)]
	Api(#[from] ApiError),

	/// The refresh call failed; the session has been torn down.
	#[error("Session refresh failed; the session has been terminated.")]
	RefreshFailed {
		/// Failure reported by the refresh call itself.
		#[source]
		source: Box<Error>,
		/// Store failure hit while clearing the session, if any; the token may still be stored.
		cleanup: Option<SessionError>,
	},
	/// The session was terminated while this request waited for a refresh.
	#[error("Session was terminated before the request could be replayed.")]
	SessionTerminated,
}
impl Error {
	/// Returns the HTTP status attached to the error, if the backend produced one.
	///
	/// Refresh failures report the status of the refresh call.
	pub fn status(&self) -> Option<StatusCode> {
		match self {
			Self::Api(err) => Some(err.status),
			Self::Decode(err) => Some(err.status()),
			Self::RefreshFailed { source, .. } => source.status(),
			_ => None,
		}
	}

	/// Returns `true` when the error ends the current session.
	pub fn is_session_terminal(&self) -> bool {
		matches!(self, Self::RefreshFailed { .. } | Self::SessionTerminated)
	}

	/// Returns the backend error when the failure is an [`ApiError`].
	pub fn as_api(&self) -> Option<&ApiError> {
		match self {
			Self::Api(err) => Some(err),
			_ => None,
		}
	}
}

/// Configuration and request-construction failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// Client configuration failed validation.
	#[error(transparent)]
	Client(#[from] ClientConfigError),
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] http::Error),
	/// Request path cannot be resolved against the base URL.
	#[error("Request path `{path}` cannot be resolved against the base URL.")]
	InvalidPath {
		/// Path supplied by the caller.
		path: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Request body could not be serialized.
	#[error("Request body could not be serialized.")]
	RequestBody {
		/// Underlying serialization failure.
		#[source]
		source: serde_json::Error,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the backend.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the backend.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

/// Failures raised while decoding a successful response body.
#[derive(Debug, ThisError)]
pub enum DecodeError {
	/// Response body is not the expected JSON shape.
	#[error("Response body is malformed at `{}`.", .source.path())]
	Json {
		/// Structured parsing failure, including the JSON path that failed.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status of the decoded response.
		status: StatusCode,
	},
	/// Token response did not carry a usable access token.
	#[error("Token response does not contain an access token.")]
	MissingToken {
		/// HTTP status of the decoded response.
		status: StatusCode,
	},
}
impl DecodeError {
	/// Returns the HTTP status of the response that failed to decode.
	pub fn status(&self) -> StatusCode {
		match self {
			Self::Json { status, .. } | Self::MissingToken { status } => *status,
		}
	}
}

/// Non-success response returned by the backend.
///
/// JSON:API error documents are parsed eagerly so callers can surface field-level
/// validation messages without re-reading the body.
#[derive(Clone, Debug, ThisError)]
#[error("{method} {url} failed with HTTP {status}.")]
pub struct ApiError {
	/// Method of the failed request.
	pub method: Method,
	/// Resolved URL of the failed request.
	pub url: Url,
	/// HTTP status returned by the backend.
	pub status: StatusCode,
	/// Retry-After hint from upstream, if supplied.
	pub retry_after: Option<Duration>,
	/// Truncated body preview for diagnostics.
	pub body_preview: Option<String>,
	/// Parsed JSON:API error document, when the body carried one.
	pub errors: Option<ErrorDocument>,
}
impl ApiError {
	/// Returns `true` for `401 Unauthorized`.
	pub fn is_unauthorized(&self) -> bool {
		self.status == StatusCode::UNAUTHORIZED
	}

	/// Groups JSON:API error messages by the attribute their pointer targets.
	pub fn field_errors(&self) -> FieldErrors {
		self.errors.as_ref().map(ErrorDocument::field_errors).unwrap_or_default()
	}
}
