//! Credential data model persisted by the relay's stores.

pub mod secret;

pub use secret::TokenSecret;

// self
use crate::_prelude::*;

/// Persisted credential state for one signed-in session.
///
/// Key names mirror the platform's persisted key-value entries
/// (`accessToken`, `refreshToken`, `user`). The relay only writes
/// `access_token` and `refreshed_at`; the logout path owns clearing the
/// whole set. A stale `user` alongside a cleared `access_token` is
/// tolerated, no cross-field invariant is enforced.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialSet {
	/// Short-lived bearer credential authorizing API calls.
	pub access_token: Option<TokenSecret>,
	/// Longer-lived credential exchanged for new access tokens.
	///
	/// The relay never reads this field; the refresh credential travels on
	/// cookies held by the transport. It is persisted so login flows that do
	/// receive one keep it alongside the rest of the session.
	pub refresh_token: Option<TokenSecret>,
	/// Cached user record as received from the auth service.
	pub user: Option<serde_json::Value>,
	/// Instant of the most recent access-token rotation.
	pub refreshed_at: Option<OffsetDateTime>,
}
impl CredentialSet {
	/// Returns `true` when no credential or cached user data is present.
	pub fn is_empty(&self) -> bool {
		self.access_token.is_none() && self.refresh_token.is_none() && self.user.is_none()
	}

	/// Returns `true` when an access token is present.
	///
	/// Presence is the relay's whole notion of "logged in"; validity is the
	/// server's call.
	pub fn is_logged_in(&self) -> bool {
		self.access_token.is_some()
	}
}
impl Debug for CredentialSet {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CredentialSet")
			.field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
			.field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
			.field("user", &self.user.as_ref().map(|_| ".."))
			.field("refreshed_at", &self.refreshed_at)
			.finish()
	}
}
