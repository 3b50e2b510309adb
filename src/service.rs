//! Descriptor for the remote auth service the relay recovers against.

// self
use crate::{_prelude::*, error::ConfigError};

const REFRESH_PATH: &str = "auth/refresh";
const LOGOUT_PATH: &str = "auth/logout";

/// Endpoint set for the remote auth service.
///
/// The refresh endpoint is called with no body; the refresh credential rides
/// on cookies held by the transport. The logout endpoint revokes the remote
/// session before the local credential clear.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthServiceDescriptor {
	/// `POST` target exchanging the cookie-borne refresh credential for a new
	/// access token.
	pub refresh_endpoint: Url,
	/// `POST` target revoking the remote session on logout.
	pub logout_endpoint: Url,
}
impl AuthServiceDescriptor {
	/// Creates a descriptor from explicit endpoints.
	pub fn new(refresh_endpoint: Url, logout_endpoint: Url) -> Self {
		Self { refresh_endpoint, logout_endpoint }
	}

	/// Derives the conventional `auth/refresh` + `auth/logout` endpoints from
	/// an API base URL, with or without a trailing slash.
	pub fn from_base(base: &Url) -> Result<Self, ConfigError> {
		Ok(Self {
			refresh_endpoint: join_endpoint(base, REFRESH_PATH)?,
			logout_endpoint: join_endpoint(base, LOGOUT_PATH)?,
		})
	}
}

fn join_endpoint(base: &Url, segment: &str) -> Result<Url, ConfigError> {
	let mut base = base.clone();

	if !base.path().ends_with('/') {
		let path = format!("{}/", base.path());

		base.set_path(&path);
	}

	base.join(segment).map_err(|source| ConfigError::InvalidEndpoint { source })
}
