// self
use crate::{
	_prelude::*,
	config::{AuthEndpoint, AuthEndpoints, ClientConfig},
	jsonapi::MEDIA_TYPE,
};

/// Errors raised while constructing or validating configurations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum ClientConfigError {
	/// Base URL and login redirect must use HTTP(S).
	#[error("The {field} URL must use http or https: {url}.")]
	UnsupportedScheme {
		/// Which URL failed validation.
		field: &'static str,
		/// URL that failed validation.
		url: String,
	},
	/// Base URL cannot have paths joined onto it.
	#[error("The base URL cannot be used as a base: {url}.")]
	CannotBeABase {
		/// URL that failed validation.
		url: String,
	},
	/// Endpoint paths must be absolute.
	#[error("The {endpoint} endpoint path must start with '/': `{path}`.")]
	InvalidEndpointPath {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Path that failed validation.
		path: String,
	},
	/// Media type cannot be blank.
	#[error("Media type cannot be empty.")]
	EmptyMediaType,
	/// Timeout must be positive when supplied.
	#[error("Request timeout must be at least one second.")]
	ZeroTimeout,
}

/// Builder for [`ClientConfig`] values.
#[derive(Debug)]
pub struct ClientConfigBuilder {
	/// Base URL every request path is resolved against.
	pub base_url: Url,
	/// Auth endpoint paths.
	pub endpoints: AuthEndpoints,
	/// Optional login redirect; defaults to `/login` on the base URL.
	pub login_redirect: Option<Url>,
	/// Media type for content negotiation.
	pub media_type: String,
	/// Optional per-request timeout in seconds.
	pub request_timeout_secs: Option<u64>,
}
impl ClientConfigBuilder {
	/// Creates a new builder with the backend's default endpoint layout.
	pub fn new(base_url: Url) -> Self {
		Self {
			base_url,
			endpoints: AuthEndpoints::default(),
			login_redirect: None,
			media_type: MEDIA_TYPE.into(),
			request_timeout_secs: None,
		}
	}

	/// Overrides the login endpoint path.
	pub fn login_path(mut self, path: impl Into<String>) -> Self {
		self.endpoints.login = path.into();

		self
	}

	/// Overrides the refresh endpoint path.
	pub fn refresh_path(mut self, path: impl Into<String>) -> Self {
		self.endpoints.refresh = path.into();

		self
	}

	/// Overrides the logout endpoint path.
	pub fn logout_path(mut self, path: impl Into<String>) -> Self {
		self.endpoints.logout = path.into();

		self
	}

	/// Sets the login entry point reported on session termination.
	pub fn login_redirect(mut self, url: Url) -> Self {
		self.login_redirect = Some(url);

		self
	}

	/// Overrides the negotiated media type.
	pub fn media_type(mut self, media_type: impl Into<String>) -> Self {
		self.media_type = media_type.into();

		self
	}

	/// Applies a per-request timeout to the bundled transport.
	pub fn request_timeout_secs(mut self, secs: u64) -> Self {
		self.request_timeout_secs = Some(secs);

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<ClientConfig, ClientConfigError> {
		let login_redirect = match self.login_redirect {
			Some(url) => url,
			None => self
				.base_url
				.join("/login")
				.map_err(|_| ClientConfigError::CannotBeABase { url: self.base_url.to_string() })?,
		};
		let config = ClientConfig {
			base_url: self.base_url,
			endpoints: self.endpoints,
			login_redirect,
			media_type: self.media_type,
			request_timeout_secs: self.request_timeout_secs,
		};

		config.validate()?;

		Ok(config)
	}
}

impl ClientConfig {
	/// Validates invariants for the configuration.
	pub fn validate(&self) -> Result<(), ClientConfigError> {
		validate_http_url("base", &self.base_url)?;

		if self.base_url.cannot_be_a_base() {
			return Err(ClientConfigError::CannotBeABase { url: self.base_url.to_string() });
		}

		validate_http_url("login redirect", &self.login_redirect)?;

		for endpoint in [AuthEndpoint::Login, AuthEndpoint::Refresh, AuthEndpoint::Logout] {
			validate_endpoint_path(endpoint, self.endpoints.path(endpoint))?;
		}

		if self.media_type.trim().is_empty() {
			return Err(ClientConfigError::EmptyMediaType);
		}
		if self.request_timeout_secs == Some(0) {
			return Err(ClientConfigError::ZeroTimeout);
		}

		Ok(())
	}
}

fn validate_http_url(field: &'static str, url: &Url) -> Result<(), ClientConfigError> {
	match url.scheme() {
		"http" | "https" => Ok(()),
		_ => Err(ClientConfigError::UnsupportedScheme { field, url: url.to_string() }),
	}
}

fn validate_endpoint_path(endpoint: AuthEndpoint, path: &str) -> Result<(), ClientConfigError> {
	if path.len() > 1 && path.starts_with('/') && !path.starts_with("//") {
		Ok(())
	} else {
		Err(ClientConfigError::InvalidEndpointPath {
			endpoint: endpoint.as_str(),
			path: path.to_owned(),
		})
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn url(value: &str) -> Url {
		Url::parse(value).expect("Failed to parse configuration fixture URL.")
	}

	#[test]
	fn builder_applies_backend_defaults() {
		let config = ClientConfig::builder(url("http://localhost:8000/"))
			.build()
			.expect("Default configuration should validate.");

		assert_eq!(config.endpoints.refresh, "/api/v1/auth/refresh");
		assert_eq!(config.endpoints.logout, "/api/v1/auth/logout");
		assert_eq!(config.endpoints.login, "/api/v1/auth/login");
		assert_eq!(config.login_redirect.as_str(), "http://localhost:8000/login");
		assert_eq!(config.media_type, MEDIA_TYPE);
		assert_eq!(config.request_timeout_secs, None);
	}

	#[test]
	fn builder_rejects_bad_inputs() {
		let err = ClientConfig::builder(url("ftp://erp.example.com/"))
			.build()
			.expect_err("Non-HTTP base URLs must be rejected.");

		assert!(matches!(err, ClientConfigError::UnsupportedScheme { field: "base", .. }));

		let err = ClientConfig::builder(url("https://erp.example.com/"))
			.refresh_path("api/v1/auth/refresh")
			.build()
			.expect_err("Relative endpoint paths must be rejected.");

		assert!(matches!(
			err,
			ClientConfigError::InvalidEndpointPath { endpoint: "refresh", .. }
		));

		let err = ClientConfig::builder(url("https://erp.example.com/"))
			.media_type("  ")
			.build()
			.expect_err("Blank media types must be rejected.");

		assert_eq!(err, ClientConfigError::EmptyMediaType);

		let err = ClientConfig::builder(url("https://erp.example.com/"))
			.request_timeout_secs(0)
			.build()
			.expect_err("Zero timeouts must be rejected.");

		assert_eq!(err, ClientConfigError::ZeroTimeout);

		let err = ClientConfig::builder(url("mailto:ops@example.com"))
			.login_redirect(url("https://erp.example.com/login"))
			.build()
			.expect_err("Opaque base URLs must be rejected.");

		assert!(matches!(err, ClientConfigError::UnsupportedScheme { .. }));
	}

	#[test]
	fn custom_redirect_is_kept() {
		let config = ClientConfig::builder(url("https://erp.example.com/"))
			.login_redirect(url("https://erp.example.com/auth/sign-in?next=%2F"))
			.logout_path("/api/v2/session/end")
			.build()
			.expect("Custom configuration should validate.");

		assert_eq!(config.login_redirect.as_str(), "https://erp.example.com/auth/sign-in?next=%2F");
		assert_eq!(config.endpoints.path(AuthEndpoint::Logout), "/api/v2/session/end");
	}
}
