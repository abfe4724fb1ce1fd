// self
use crate::{
	_prelude::*,
	obs::CallKind,
	session::{SessionError, SessionTerminated},
};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedCall<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedCall<F> = F;

/// A span builder used by client operations.
#[derive(Clone, Debug)]
pub struct CallSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl CallSpan {
	/// Creates a new span tagged with the provided call kind + stage.
	pub fn new(kind: CallKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("jsonapi_auth_client.call", call = kind.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedCall<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Emits a `warn` event describing a terminated session (when tracing is enabled).
pub fn trace_session_terminated(event: &SessionTerminated) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(
			reason = event.reason.as_str(),
			login_redirect = %event.login_redirect,
			"session terminated"
		);
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = event;
	}
}

/// Emits an `error` event when the session store could not be cleared (when tracing is
/// enabled).
pub fn trace_session_clear_failed(err: &SessionError) {
	#[cfg(feature = "tracing")]
	{
		tracing::error!(error = %err, "session store could not be cleared");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = err;
	}
}
