//! Session storage contracts, built-in stores, and session lifecycle events.

pub mod events;
pub mod file;
pub mod memory;
pub mod token;

pub use events::*;
pub use file::FileSessionStore;
pub use memory::MemorySessionStore;
pub use token::*;

// self
use crate::_prelude::*;

/// Boxed future returned by [`SessionStore`] operations.
pub type SessionFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, SessionError>> + 'a + Send>>;

/// Single-slot storage for the bearer token of the current session.
///
/// The client reads the slot before every outbound request, writes it after login and
/// successful refreshes, and clears it on logout or terminal refresh failure.
pub trait SessionStore
where
	Self: Send + Sync,
{
	/// Returns the stored token, if any.
	fn get(&self) -> SessionFuture<'_, Option<SessionToken>>;

	/// Persists or replaces the stored token.
	fn set(&self, token: SessionToken) -> SessionFuture<'_, ()>;

	/// Removes the stored token, returning the previous value.
	fn clear(&self) -> SessionFuture<'_, Option<SessionToken>>;
}

/// Error type produced by [`SessionStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum SessionError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

#[cfg(test)]
mod tests {
	// std
	use std::error::Error as StdError;
	// self
	use super::*;

	#[test]
	fn session_error_converts_into_client_error_with_source() {
		let session_error = SessionError::Backend { message: "keychain locked".into() };
		let client_error: Error = session_error.clone().into();

		assert!(matches!(client_error, Error::Session(_)));
		assert!(client_error.to_string().contains("keychain locked"));

		let source = StdError::source(&client_error)
			.expect("Client error should expose the original session error as its source.");

		assert_eq!(source.to_string(), session_error.to_string());
	}
}
