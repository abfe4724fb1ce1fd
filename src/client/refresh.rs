//! Session refresh with a single-flight guard.
//!
//! Every attempt that comes back `401` lands in [`SessionClient::refresh_after_rejection`]
//! together with the token it was sent with. Refreshes are serialized behind one async
//! mutex per client. Once a waiter holds the guard it compares the stored token with the
//! rejected one: a different token means a concurrent refresh already rotated the
//! session, so the waiter reuses it; an emptied store means a concurrent refresh failed
//! (or the user logged out), so the waiter gives up with [`Error::SessionTerminated`].
//! Only a waiter that still sees the rejected token calls the refresh endpoint.
//!
//! A failed refresh is terminal: the store is cleared, the listener receives a
//! [`SessionTerminated`](crate::session::SessionTerminated) event, and the caller gets
//! [`Error::RefreshFailed`] wrapping the refresh call's own error. A store that fails to
//! clear is reported in the same error's `cleanup` field.
//!
//! Logout takes the same guard, so a refresh already in flight lands before the session is
//! cleared and can never restore it afterwards.

mod metrics;

pub use metrics::RefreshMetrics;

// self
use crate::{
	_prelude::*,
	client::SessionClient,
	error::DecodeError,
	obs::{self, CallKind, CallOutcome, CallSpan},
	request::{ApiRequest, ApiResponse},
	session::{SessionToken, TerminationReason},
	transport::HttpTransport,
};

impl<T> SessionClient<T>
where
	T: HttpTransport,
{
	/// Refreshes the session on demand, sharing the single-flight guard with the
	/// request pipeline.
	pub async fn refresh_session(&self) -> Result<SessionToken> {
		let current = self.store.get().await?;

		self.refresh_after_rejection(current.as_ref()).await
	}

	/// Obtains a token newer than `rejected`, calling the refresh endpoint at most once
	/// across concurrent callers.
	pub(crate) async fn refresh_after_rejection(
		&self,
		rejected: Option<&SessionToken>,
	) -> Result<SessionToken> {
		const KIND: CallKind = CallKind::Refresh;

		let span = CallSpan::new(KIND, "refresh_after_rejection");

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		let result = span
			.instrument(async move {
				self.refresh_metrics.record_attempt();

				let _singleflight = self.refresh_guard.lock().await;
				let current = self.store.get().await.inspect_err(|_| {
					self.refresh_metrics.record_failure();
				})?;

				if current.as_ref() != rejected {
					return match current {
						Some(token) => {
							self.refresh_metrics.record_reuse();

							Ok(token)
						},
						None => {
							self.refresh_metrics.record_failure();

							Err(Error::SessionTerminated)
						},
					};
				}

				let token = match self.call_refresh_endpoint(current.as_ref()).await {
					Ok(token) => token,
					Err(err) => {
						self.refresh_metrics.record_failure();

						let status = err.status().map(|status| status.as_u16());
						let cleanup = self
							.terminate_session(TerminationReason::RefreshFailed { status })
							.await
							.err();

						return Err(Error::RefreshFailed { source: Box::new(err), cleanup });
					},
				};

				self.store.set(token.clone()).await.inspect_err(|_| {
					self.refresh_metrics.record_failure();
				})?;
				self.refresh_metrics.record_success();

				Ok(token)
			})
			.await;

		match &result {
			Ok(_) => obs::record_call_outcome(KIND, CallOutcome::Success),
			Err(_) => obs::record_call_outcome(KIND, CallOutcome::Failure),
		}

		result
	}

	async fn call_refresh_endpoint(&self, current: Option<&SessionToken>) -> Result<SessionToken> {
		let request = ApiRequest::post(self.config.endpoints.refresh.clone());
		let response = self.dispatch(&request, current).await?;

		if !response.is_success() {
			return Err(response.into_api_error(request.method).into());
		}

		Ok(parse_token_response(&response)?)
	}
}

/// Extracts the access token from a login or refresh response.
///
/// Accepts a flat `{"access_token": ..}` body (or `token`) as well as a JSON:API
/// document carrying the token in `data.attributes`.
pub(crate) fn parse_token_response(response: &ApiResponse) -> Result<SessionToken, DecodeError> {
	let payload = response.json::<TokenPayload>()?;
	let token = match payload {
		TokenPayload::Document { data } => data.attributes.access_token,
		TokenPayload::Flat { access_token } => access_token,
	};

	token
		.filter(|value| !value.trim().is_empty())
		.map(SessionToken::new)
		.ok_or(DecodeError::MissingToken { status: response.status() })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TokenPayload {
	Document {
		data: TokenResource,
	},
	Flat {
		#[serde(default, alias = "token")]
		access_token: Option<String>,
	},
}

#[derive(Deserialize)]
struct TokenResource {
	attributes: TokenAttributes,
}

#[derive(Deserialize)]
struct TokenAttributes {
	#[serde(default, alias = "token")]
	access_token: Option<String>,
}
