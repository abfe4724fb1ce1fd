//! Caller-facing request and response types.
//!
//! [`ApiRequest`] is what data-fetching code hands to the client: a method, a path
//! relative to the configured base URL, optional headers, and an optional body. The
//! client decorates it (media type, bearer token) right before each attempt, so the
//! same value can be replayed after a refresh. [`ApiResponse`] is the successful
//! result; non-success statuses become [`ApiError`].

// crates.io
use http::{
	HeaderMap, HeaderName, HeaderValue, Method, StatusCode,
	header::RETRY_AFTER,
};
use serde::de::DeserializeOwned;
use time::format_description::well_known::Rfc2822;
// self
use crate::{
	_prelude::*,
	error::{ApiError, ConfigError, DecodeError},
	jsonapi::{Document, ErrorDocument},
};

const BODY_PREVIEW_LIMIT: usize = 512;

/// Outbound call, replayable across a token refresh.
#[derive(Clone, Debug)]
pub struct ApiRequest {
	/// HTTP method.
	pub method: Method,
	/// Path (and optional query) resolved against the configured base URL.
	pub path: String,
	/// Extra headers supplied by the caller.
	pub headers: HeaderMap,
	/// Optional request body.
	pub body: Option<Vec<u8>>,
	retried: bool,
}
impl ApiRequest {
	/// Creates a request for `method` + `path`.
	pub fn new(method: Method, path: impl Into<String>) -> Self {
		Self { method, path: path.into(), headers: HeaderMap::new(), body: None, retried: false }
	}

	/// Shorthand for a `GET` request.
	pub fn get(path: impl Into<String>) -> Self {
		Self::new(Method::GET, path)
	}

	/// Shorthand for a `POST` request.
	pub fn post(path: impl Into<String>) -> Self {
		Self::new(Method::POST, path)
	}

	/// Shorthand for a `PUT` request.
	pub fn put(path: impl Into<String>) -> Self {
		Self::new(Method::PUT, path)
	}

	/// Shorthand for a `PATCH` request.
	pub fn patch(path: impl Into<String>) -> Self {
		Self::new(Method::PATCH, path)
	}

	/// Shorthand for a `DELETE` request.
	pub fn delete(path: impl Into<String>) -> Self {
		Self::new(Method::DELETE, path)
	}

	/// Adds (or replaces) a header.
	pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
		self.headers.insert(name, value);

		self
	}

	/// Sets a raw body.
	pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
		self.body = Some(body.into());

		self
	}

	/// Serializes `value` as the JSON body.
	pub fn json<T>(self, value: &T) -> Result<Self, ConfigError>
	where
		T: ?Sized + Serialize,
	{
		let body =
			serde_json::to_vec(value).map_err(|source| ConfigError::RequestBody { source })?;

		Ok(self.body(body))
	}

	/// Returns `true` if this attempt is already a replay after a refresh.
	pub fn is_retried(&self) -> bool {
		self.retried
	}

	/// Marks this attempt as a replay. A replayed attempt that fails with `401` is
	/// returned to the caller instead of triggering another refresh.
	pub fn into_retry(mut self) -> Self {
		self.retried = true;

		self
	}
}

/// Successful (or not-yet-classified) response returned by the transport.
#[derive(Clone, Debug)]
pub struct ApiResponse {
	url: Url,
	status: StatusCode,
	headers: HeaderMap,
	body: Vec<u8>,
}
impl ApiResponse {
	/// Wraps a raw HTTP response received from `url`.
	pub fn from_http(url: Url, response: http::Response<Vec<u8>>) -> Self {
		let (parts, body) = response.into_parts();

		Self { url, status: parts.status, headers: parts.headers, body }
	}

	/// URL the response was received from.
	pub fn url(&self) -> &Url {
		&self.url
	}

	/// HTTP status code.
	pub fn status(&self) -> StatusCode {
		self.status
	}

	/// Response headers.
	pub fn headers(&self) -> &HeaderMap {
		&self.headers
	}

	/// Raw response body.
	pub fn body(&self) -> &[u8] {
		&self.body
	}

	/// Consumes the response and returns the raw body.
	pub fn into_body(self) -> Vec<u8> {
		self.body
	}

	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		self.status.is_success()
	}

	/// Body decoded as UTF-8, replacing invalid sequences.
	pub fn text(&self) -> String {
		String::from_utf8_lossy(&self.body).into_owned()
	}

	/// Decodes the body as JSON, reporting the failing JSON path on error.
	pub fn json<T>(&self) -> Result<T, DecodeError>
	where
		T: DeserializeOwned,
	{
		let mut de = serde_json::Deserializer::from_slice(&self.body);

		serde_path_to_error::deserialize(&mut de)
			.map_err(|source| DecodeError::Json { source, status: self.status })
	}

	/// Decodes the body as a JSON:API document with typed attributes.
	pub fn document<A>(&self) -> Result<Document<A>, DecodeError>
	where
		A: DeserializeOwned,
	{
		self.json()
	}

	/// Parses the `Retry-After` header as a relative duration.
	pub fn retry_after(&self) -> Option<Duration> {
		parse_retry_after(&self.headers)
	}

	/// Converts a non-success response into an [`ApiError`] for `method`.
	pub fn into_api_error(self, method: Method) -> ApiError {
		let retry_after = self.retry_after();
		let errors = ErrorDocument::parse(&self.body);
		let body_preview = body_preview(&self.body);

		ApiError { method, url: self.url, status: self.status, retry_after, body_preview, errors }
	}
}

fn body_preview(body: &[u8]) -> Option<String> {
	let text = String::from_utf8_lossy(body);
	let trimmed = text.trim();

	if trimmed.is_empty() {
		return None;
	}

	Some(trimmed.chars().take(BODY_PREVIEW_LIMIT).collect())
}

fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
	let value = headers.get(RETRY_AFTER)?;
	let raw = value.to_str().ok()?.trim();

	if let Ok(secs) = raw.parse::<u64>() {
		return i64::try_from(secs).ok().map(Duration::seconds);
	}
	if let Ok(moment) = OffsetDateTime::parse(raw, &Rfc2822) {
		let delta = moment - OffsetDateTime::now_utc();

		if delta.is_positive() {
			return Some(delta);
		}
	}

	None
}
