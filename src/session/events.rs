//! Session lifecycle notifications delivered to the host environment.
//!
//! The client never navigates anywhere itself. When a session ends it hands a
//! [`SessionTerminated`] event (carrying the login entry point) to the configured
//! [`SessionListener`], and the host maps that onto whatever navigation it has.

// self
use crate::_prelude::*;

/// Why a session ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum TerminationReason {
	/// The refresh call failed; `status` is its HTTP status when one was received.
	RefreshFailed {
		/// HTTP status returned by the refresh endpoint.
		status: Option<u16>,
	},
	/// The user logged out explicitly.
	LoggedOut,
}
impl TerminationReason {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::RefreshFailed { .. } => "refresh_failed",
			Self::LoggedOut => "logged_out",
		}
	}
}

/// Event emitted once the stored token has been cleared.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTerminated {
	/// Why the session ended.
	pub reason: TerminationReason,
	/// Login entry point the host should navigate to.
	pub login_redirect: Url,
}

/// Receives session lifecycle events.
///
/// Implementations run inline on the task that detected the termination, so they should
/// hand work off (channel send, UI dispatch) rather than block.
pub trait SessionListener
where
	Self: Send + Sync,
{
	/// Called after the stored token was cleared.
	fn session_terminated(&self, event: &SessionTerminated);
}

/// Listener that ignores every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopListener;
impl SessionListener for NoopListener {
	fn session_terminated(&self, _event: &SessionTerminated) {}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn termination_event_serializes_with_reason_tag() {
		let event = SessionTerminated {
			reason: TerminationReason::RefreshFailed { status: Some(401) },
			login_redirect: Url::parse("https://erp.example.com/login")
				.expect("Login fixture URL should parse."),
		};
		let value = serde_json::to_value(&event).expect("Event should serialize to JSON.");

		assert_eq!(
			value,
			serde_json::json!({
				"reason": {"kind": "refresh_failed", "status": 401},
				"login_redirect": "https://erp.example.com/login"
			})
		);
		assert_eq!(event.reason.as_str(), "refresh_failed");
	}
}
