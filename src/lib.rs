//! JSON:API request client that keeps a bearer session alive.
//!
//! Stored tokens are attached to every call. An expired session is refreshed once
//! (single-flight) and the failed call is replayed; a failed refresh is handed back to the
//! host as a session-terminated event.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod client;
pub mod config;
pub mod error;
pub mod jsonapi;
pub mod obs;
pub mod request;
pub mod session;
pub mod transport;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		client::SessionClient,
		config::ClientConfig,
		session::{MemorySessionStore, SessionListener, SessionStore, SessionTerminated},
		transport::ReqwestTransport,
	};

	/// Client type alias used by reqwest-backed integration tests.
	pub type ReqwestTestClient = SessionClient<ReqwestTransport>;

	/// Listener that keeps every session-terminated event for later assertions.
	#[derive(Debug, Default)]
	pub struct RecordingListener(Mutex<Vec<SessionTerminated>>);
	impl RecordingListener {
		/// Returns a snapshot of the recorded events.
		pub fn events(&self) -> Vec<SessionTerminated> {
			self.0.lock().clone()
		}
	}
	impl SessionListener for RecordingListener {
		fn session_terminated(&self, event: &SessionTerminated) {
			self.0.lock().push(event.clone());
		}
	}

	/// Builds a reqwest transport that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_transport() -> ReqwestTransport {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestTransport::with_client(client)
	}

	/// Constructs a [`SessionClient`] pointed at `base_url`, backed by an in-memory session
	/// store and a recording listener.
	pub fn build_reqwest_test_client(
		base_url: &str,
	) -> (ReqwestTestClient, Arc<MemorySessionStore>, Arc<RecordingListener>) {
		let config = ClientConfig::builder(
			Url::parse(base_url).expect("Mock server base URL should parse successfully."),
		)
		.build()
		.expect("Default client configuration should be valid.");
		let store_backend = Arc::new(MemorySessionStore::default());
		let store: Arc<dyn SessionStore> = store_backend.clone();
		let listener = Arc::new(RecordingListener::default());
		let client = SessionClient::with_transport(config, store, test_reqwest_transport())
			.with_listener(listener.clone());

		(client, store_backend, listener)
	}
}

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use http;
#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use {color_eyre as _, httpmock as _};
