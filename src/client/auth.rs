//! Login and logout against the backend's auth endpoints.

// self
use crate::{
	_prelude::*,
	client::{SessionClient, refresh},
	obs::{self, CallKind, CallOutcome, CallSpan},
	request::ApiRequest,
	session::{SessionToken, TerminationReason},
	transport::HttpTransport,
};

impl<T> SessionClient<T>
where
	T: HttpTransport,
{
	/// Exchanges `credentials` for a session token and stores it.
	///
	/// The login call never carries the current bearer and a `401` from it is returned
	/// as [`Error::Api`] without attempting a refresh.
	pub async fn login<B>(&self, credentials: &B) -> Result<SessionToken>
	where
		B: ?Sized + Serialize,
	{
		const KIND: CallKind = CallKind::Login;

		let span = CallSpan::new(KIND, "login");

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		let result = span
			.instrument(async move {
				let request = ApiRequest::post(self.config.endpoints.login.clone()).json(credentials)?;
				let response = self.dispatch(&request, None).await?;

				if !response.is_success() {
					return Err(response.into_api_error(request.method).into());
				}

				let token = refresh::parse_token_response(&response)?;

				self.store.set(token.clone()).await?;

				Ok(token)
			})
			.await;

		match &result {
			Ok(_) => obs::record_call_outcome(KIND, CallOutcome::Success),
			Err(_) => obs::record_call_outcome(KIND, CallOutcome::Failure),
		}

		result
	}

	/// Ends the session on the backend and locally.
	///
	/// The store is cleared and the listener notified even when the backend call fails;
	/// the backend failure is still reported to the caller. Logout waits for an in-flight
	/// refresh and then revokes the token it produced.
	pub async fn logout(&self) -> Result<()> {
		const KIND: CallKind = CallKind::Logout;

		let span = CallSpan::new(KIND, "logout");

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		let result = span
			.instrument(async move {
				let _singleflight = self.refresh_guard.lock().await;
				let current = self.store.get().await?;
				let request = ApiRequest::post(self.config.endpoints.logout.clone());
				let backend = match self.dispatch(&request, current.as_ref()).await {
					Ok(response) if response.is_success() => Ok(()),
					Ok(response) => Err(response.into_api_error(request.method).into()),
					Err(err) => Err(err),
				};
				let cleared = self.terminate_session(TerminationReason::LoggedOut).await;

				backend?;

				Ok(cleared?)
			})
			.await;

		match &result {
			Ok(_) => obs::record_call_outcome(KIND, CallOutcome::Success),
			Err(_) => obs::record_call_outcome(KIND, CallOutcome::Failure),
		}

		result
	}
}
