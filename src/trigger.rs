//! Policy deciding whether a 401 response warrants a refresh attempt.

// self
use crate::http::RelayResponse;

/// Classifies 401 responses into "expired, worth refreshing" versus
/// "unrecoverable, hand it back".
///
/// Consulted only after the relay has already observed a 401 status. The
/// trigger must fail closed: when in doubt, answer `false` so a fundamentally
/// invalid credential never loops through refresh attempts.
pub trait RefreshTrigger
where
	Self: Send + Sync,
{
	/// Returns `true` when the response indicates an expired access token.
	fn should_refresh(&self, response: &RelayResponse) -> bool;
}

/// Default trigger matching the auth service's expiry wording inside the
/// `{ "message": string }` error envelope.
///
/// The exact phrase is server-owned, so it is configuration rather than a
/// hard-coded constant; the default matches what the platform backend emits
/// for expired bearer tokens.
#[derive(Clone, Debug)]
pub struct ExpiredMessageTrigger {
	needle: String,
}
impl ExpiredMessageTrigger {
	/// Message fragment the platform backend emits for expired tokens.
	pub const DEFAULT_NEEDLE: &'static str = "Invalid or expired token";

	/// Creates a trigger matching the provided message fragment.
	pub fn new(needle: impl Into<String>) -> Self {
		Self { needle: needle.into() }
	}
}
impl Default for ExpiredMessageTrigger {
	fn default() -> Self {
		Self::new(Self::DEFAULT_NEEDLE)
	}
}
impl RefreshTrigger for ExpiredMessageTrigger {
	fn should_refresh(&self, response: &RelayResponse) -> bool {
		// Unparseable bodies classify as "do not refresh".
		response.error_message().is_some_and(|message| message.contains(&self.needle))
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use http::{HeaderMap, StatusCode};
	// self
	use super::*;

	fn unauthorized(body: &str) -> RelayResponse {
		RelayResponse {
			status: StatusCode::UNAUTHORIZED,
			headers: HeaderMap::new(),
			body: body.as_bytes().to_vec(),
		}
	}

	#[test]
	fn expiry_wording_triggers_a_refresh() {
		let trigger = ExpiredMessageTrigger::default();

		assert!(trigger.should_refresh(&unauthorized("{\"message\":\"Invalid or expired token\"}")));
	}

	#[test]
	fn other_auth_failures_do_not_trigger() {
		let trigger = ExpiredMessageTrigger::default();

		assert!(!trigger.should_refresh(&unauthorized("{\"message\":\"Invalid token\"}")));
		assert!(!trigger.should_refresh(&unauthorized("{\"message\":\"No token provided\"}")));
	}

	#[test]
	fn unparseable_bodies_fail_closed() {
		let trigger = ExpiredMessageTrigger::default();

		assert!(!trigger.should_refresh(&unauthorized("gateway timeout")));
		assert!(!trigger.should_refresh(&unauthorized("")));
	}

	#[test]
	fn custom_wording_is_respected() {
		let trigger = ExpiredMessageTrigger::new("token_expired");

		assert!(trigger.should_refresh(&unauthorized("{\"message\":\"token_expired\"}")));
		assert!(!trigger.should_refresh(&unauthorized("{\"message\":\"Invalid or expired token\"}")));
	}
}
