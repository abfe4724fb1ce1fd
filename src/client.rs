//! Session-aware request pipeline.
//!
//! [`SessionClient`] is what every data-fetching call goes through. Before each attempt
//! it reads the session store and attaches the bearer token; when an attempt comes back
//! `401` it refreshes the session (single-flight, see [`refresh`]) and replays the
//! attempt exactly once with the new token. Refresh and logout endpoints never trigger
//! a refresh, and a replayed attempt is never replayed again.

pub mod refresh;

mod auth;

pub use refresh::*;

// crates.io
use http::{
	HeaderValue, StatusCode, Uri,
	header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
};
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	config::ClientConfig,
	error::{ConfigError, TransportError},
	jsonapi::Document,
	obs::{self, CallKind, CallOutcome, CallSpan},
	request::{ApiRequest, ApiResponse},
	session::{
		NoopListener, SessionError, SessionListener, SessionStore, SessionTerminated,
		SessionToken, TerminationReason,
	},
	transport::{HttpRequest, HttpTransport},
};
#[cfg(feature = "reqwest")] use crate::transport::ReqwestTransport;

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport.
pub type ReqwestSessionClient = SessionClient<ReqwestTransport>;

/// Authenticated request client bound to one backend and one session slot.
///
/// The client owns the transport, the injected session store, and the listener that
/// receives session-terminated events. Cloning is cheap and clones share the store,
/// the refresh guard, and the refresh metrics.
pub struct SessionClient<T>
where
	T: HttpTransport,
{
	/// Transport used for every outbound call.
	pub transport: Arc<T>,
	/// Session store holding the bearer token.
	pub store: Arc<dyn SessionStore>,
	/// Validated client configuration.
	pub config: ClientConfig,
	/// Receiver for session-terminated events.
	pub listener: Arc<dyn SessionListener>,
	/// Shared counters for refresh outcomes.
	pub refresh_metrics: Arc<RefreshMetrics>,
	refresh_guard: Arc<AsyncMutex<()>>,
}
impl<T> SessionClient<T>
where
	T: HttpTransport,
{
	/// Creates a client that reuses the caller-provided transport.
	pub fn with_transport(
		config: ClientConfig,
		store: Arc<dyn SessionStore>,
		transport: impl Into<Arc<T>>,
	) -> Self {
		Self {
			transport: transport.into(),
			store,
			config,
			listener: Arc::new(NoopListener),
			refresh_metrics: Default::default(),
			refresh_guard: Arc::new(AsyncMutex::new(())),
		}
	}

	/// Sets or replaces the session-terminated listener.
	pub fn with_listener(mut self, listener: Arc<dyn SessionListener>) -> Self {
		self.listener = listener;

		self
	}

	/// Returns the token currently held by the session store.
	pub async fn session_token(&self) -> Result<Option<SessionToken>> {
		Ok(self.store.get().await?)
	}

	/// Sends `request` through the session pipeline.
	///
	/// Resolves with the response for 2xx statuses. A `401` is recovered from
	/// transparently when the refresh succeeds; every other status becomes
	/// [`Error::Api`]. A failed refresh terminates the session and resolves with
	/// [`Error::RefreshFailed`].
	pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
		const KIND: CallKind = CallKind::Request;

		let span = CallSpan::new(KIND, "send");

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		let result = span.instrument(self.send_with_recovery(request)).await;

		match &result {
			Ok(_) => obs::record_call_outcome(KIND, CallOutcome::Success),
			Err(_) => obs::record_call_outcome(KIND, CallOutcome::Failure),
		}

		result
	}

	/// GETs `path` and decodes the JSON body.
	pub async fn fetch_json<R>(&self, path: &str) -> Result<R>
	where
		R: DeserializeOwned,
	{
		Ok(self.send(ApiRequest::get(path)).await?.json()?)
	}

	/// GETs `path` and decodes a JSON:API document with typed attributes.
	pub async fn fetch_document<A>(&self, path: &str) -> Result<Document<A>>
	where
		A: DeserializeOwned,
	{
		Ok(self.send(ApiRequest::get(path)).await?.document()?)
	}

	async fn send_with_recovery(&self, request: ApiRequest) -> Result<ApiResponse> {
		let sent_with = self.store.get().await?;
		let response = self.dispatch(&request, sent_with.as_ref()).await?;

		if response.is_success() {
			return Ok(response);
		}
		if !self.should_refresh(&request, &response) {
			return Err(response.into_api_error(request.method).into());
		}

		let token = self.refresh_after_rejection(sent_with.as_ref()).await?;
		let replay = request.into_retry();
		let response = self.dispatch(&replay, Some(&token)).await?;

		if response.is_success() {
			Ok(response)
		} else {
			Err(response.into_api_error(replay.method).into())
		}
	}

	fn should_refresh(&self, request: &ApiRequest, response: &ApiResponse) -> bool {
		response.status() == StatusCode::UNAUTHORIZED
			&& !request.is_retried()
			&& !self.config.is_refresh_exempt(response.url())
	}

	/// Performs one attempt with `token` attached; statuses are not interpreted here.
	pub(crate) async fn dispatch(
		&self,
		request: &ApiRequest,
		token: Option<&SessionToken>,
	) -> Result<ApiResponse> {
		let url = self.config.resolve(&request.path)?;
		let prepared = self.prepare(request, &url, token)?;
		let response = self.transport.call(prepared).await.map_err(TransportError::network)?;

		Ok(ApiResponse::from_http(url, response))
	}

	fn prepare(
		&self,
		request: &ApiRequest,
		url: &Url,
		token: Option<&SessionToken>,
	) -> Result<HttpRequest> {
		let mut prepared = HttpRequest::new(request.body.clone().unwrap_or_default());

		*prepared.method_mut() = request.method.clone();
		*prepared.uri_mut() = url.as_str().parse::<Uri>().map_err(request_error)?;
		*prepared.headers_mut() = request.headers.clone();

		let media_type = HeaderValue::from_str(&self.config.media_type).map_err(request_error)?;
		let headers = prepared.headers_mut();

		if request.body.is_some() {
			headers.entry(CONTENT_TYPE).or_insert_with(|| media_type.clone());
		}

		headers.entry(ACCEPT).or_insert(media_type);

		if let Some(token) = token {
			headers.insert(AUTHORIZATION, token.bearer_header().map_err(request_error)?);
		}

		Ok(prepared)
	}

	/// Clears the stored token and notifies the listener.
	pub(crate) async fn terminate_session(
		&self,
		reason: TerminationReason,
	) -> Result<(), SessionError> {
		let cleared = self.store.clear().await.map(|_| ());

		if let Err(err) = &cleared {
			obs::trace_session_clear_failed(err);
		}

		let event = SessionTerminated { reason, login_redirect: self.config.login_redirect.clone() };

		obs::trace_session_terminated(&event);
		self.listener.session_terminated(&event);

		cleared
	}
}
#[cfg(feature = "reqwest")]
impl SessionClient<ReqwestTransport> {
	/// Creates a new client for the provided configuration and session store.
	///
	/// The client provisions its own reqwest-backed transport (honoring the configured
	/// timeout) so callers do not need to pass HTTP handles explicitly.
	pub fn new(config: ClientConfig, store: Arc<dyn SessionStore>) -> Result<Self> {
		let transport = ReqwestTransport::from_config(&config)?;

		Ok(Self::with_transport(config, store, transport))
	}
}
impl<T> Clone for SessionClient<T>
where
	T: HttpTransport,
{
	fn clone(&self) -> Self {
		Self {
			transport: self.transport.clone(),
			store: self.store.clone(),
			config: self.config.clone(),
			listener: self.listener.clone(),
			refresh_metrics: self.refresh_metrics.clone(),
			refresh_guard: self.refresh_guard.clone(),
		}
	}
}
impl<T> Debug for SessionClient<T>
where
	T: HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SessionClient")
			.field("base_url", &self.config.base_url.as_str())
			.field("endpoints", &self.config.endpoints)
			.field("refresh_metrics", &self.refresh_metrics)
			.finish()
	}
}

fn request_error(err: impl Into<http::Error>) -> Error {
	ConfigError::HttpRequest(err.into()).into()
}
