//! Thread-safe in-memory [`SessionStore`] for local development and tests.

// self
use crate::{
	_prelude::*,
	session::{SessionFuture, SessionStore, SessionToken},
};

type SessionSlot = Arc<RwLock<Option<SessionToken>>>;

/// Keeps the session token in-process; nothing survives a restart.
#[derive(Clone, Debug, Default)]
pub struct MemorySessionStore(SessionSlot);
impl MemorySessionStore {
	/// Creates a store pre-seeded with `token`.
	pub fn with_token(token: SessionToken) -> Self {
		Self(Arc::new(RwLock::new(Some(token))))
	}

	/// Synchronous peek used by tests and diagnostics.
	pub fn current(&self) -> Option<SessionToken> {
		self.0.read().clone()
	}
}
impl SessionStore for MemorySessionStore {
	fn get(&self) -> SessionFuture<'_, Option<SessionToken>> {
		let slot = self.0.clone();

		Box::pin(async move { Ok(slot.read().clone()) })
	}

	fn set(&self, token: SessionToken) -> SessionFuture<'_, ()> {
		let slot = self.0.clone();

		Box::pin(async move {
			*slot.write() = Some(token);

			Ok(())
		})
	}

	fn clear(&self) -> SessionFuture<'_, Option<SessionToken>> {
		let slot = self.0.clone();

		Box::pin(async move { Ok(slot.write().take()) })
	}
}
