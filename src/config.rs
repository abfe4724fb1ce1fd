//! Client configuration: backend base URL, auth endpoint paths, and login redirect.
//!
//! Configurations are normally assembled with [`ClientConfig::builder`], which applies
//! the backend's default endpoint layout and validates the result. Hosts that keep
//! settings in a file can deserialize a [`ClientConfig`] directly and call
//! [`ClientConfig::validate`].

/// Builder API for assembling client configurations.
pub mod builder;

pub use builder::*;

// self
use crate::{_prelude::*, error::ConfigError, jsonapi::MEDIA_TYPE};

/// Auth endpoints the client calls on its own.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AuthEndpoint {
	/// Exchanges credentials for a session token.
	Login,
	/// Exchanges the current (possibly expired) session for a new token.
	Refresh,
	/// Ends the session on the backend.
	Logout,
}
impl AuthEndpoint {
	/// Returns a stable label suitable for errors and span fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Login => "login",
			Self::Refresh => "refresh",
			Self::Logout => "logout",
		}
	}
}
impl Display for AuthEndpoint {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Paths of the auth endpoints, resolved against [`ClientConfig::base_url`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthEndpoints {
	/// Login endpoint path.
	pub login: String,
	/// Refresh endpoint path.
	pub refresh: String,
	/// Logout endpoint path.
	pub logout: String,
}
impl AuthEndpoints {
	/// Returns the configured path for `endpoint`.
	pub fn path(&self, endpoint: AuthEndpoint) -> &str {
		match endpoint {
			AuthEndpoint::Login => &self.login,
			AuthEndpoint::Refresh => &self.refresh,
			AuthEndpoint::Logout => &self.logout,
		}
	}
}
impl Default for AuthEndpoints {
	fn default() -> Self {
		Self {
			login: "/api/v1/auth/login".into(),
			refresh: "/api/v1/auth/refresh".into(),
			logout: "/api/v1/auth/logout".into(),
		}
	}
}

/// Immutable client configuration consumed by [`SessionClient`](crate::client::SessionClient).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
	/// Base URL every request path is resolved against.
	pub base_url: Url,
	/// Auth endpoint paths.
	#[serde(default)]
	pub endpoints: AuthEndpoints,
	/// Login entry point handed to the host when the session terminates.
	pub login_redirect: Url,
	/// Media type sent in `Accept` and, for bodies, `Content-Type`.
	#[serde(default = "default_media_type")]
	pub media_type: String,
	/// Optional per-request timeout applied by the bundled transport.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub request_timeout_secs: Option<u64>,
}
impl ClientConfig {
	/// Creates a new builder rooted at `base_url`.
	pub fn builder(base_url: Url) -> ClientConfigBuilder {
		ClientConfigBuilder::new(base_url)
	}

	/// Resolves a request path (optionally carrying a query string) against the base URL.
	pub fn resolve(&self, path: &str) -> Result<Url, ConfigError> {
		self.base_url
			.join(path)
			.map_err(|source| ConfigError::InvalidPath { path: path.to_owned(), source })
	}

	/// Resolves one of the auth endpoints.
	pub fn endpoint_url(&self, endpoint: AuthEndpoint) -> Result<Url, ConfigError> {
		self.resolve(self.endpoints.path(endpoint))
	}

	/// Returns `true` when a `401` from `url` must not trigger a refresh.
	///
	/// The refresh and logout endpoints are exempt so a rejected refresh can never
	/// recurse into another refresh.
	pub fn is_refresh_exempt(&self, url: &Url) -> bool {
		[AuthEndpoint::Refresh, AuthEndpoint::Logout].into_iter().any(|endpoint| {
			self.endpoint_url(endpoint).is_ok_and(|exempt| {
				exempt.origin() == url.origin() && exempt.path() == url.path()
			})
		})
	}
}

fn default_media_type() -> String {
	MEDIA_TYPE.to_owned()
}
