//! Refresh and logout calls against the remote auth service.
//!
//! The refresh endpoint takes no body; the refresh credential rides on
//! cookies held by the transport. A successful refresh hands back the new
//! access token from the `{ data: { accessToken } }` envelope. Logout
//! revokes the remote session and clears the local store; callers that need
//! a guaranteed clear regardless of the remote outcome chain it with
//! [`Relay::clear_credentials`], which is exactly what the send flow does.

mod metrics;

pub use metrics::RefreshMetrics;

// crates.io
use http::{HeaderValue, Method, header::CONTENT_TYPE};
// self
use crate::{
	_prelude::*,
	creds::TokenSecret,
	error::AuthServiceError,
	http::{OutboundRequest, RelayHttpClient},
	obs::{self, FlowKind},
	relay::Relay,
};

#[derive(Deserialize)]
struct RefreshEnvelope {
	data: RefreshData,
}
#[derive(Deserialize)]
struct RefreshData {
	#[serde(rename = "accessToken")]
	access_token: String,
}

impl<C> Relay<C>
where
	C: ?Sized + RelayHttpClient,
{
	/// Exchanges the cookie-borne refresh credential for a new access token.
	///
	/// Any non-2xx status or malformed payload is a refresh failure; the
	/// relay performs no retries here, this is one-shot recovery rather than
	/// a resilience layer.
	pub async fn refresh_access_token(&self) -> Result<TokenSecret> {
		obs::observe_flow(FlowKind::Refresh, "refresh_access_token", async move {
			self.refresh_metrics.record_attempt();

			let mut request =
				OutboundRequest::bare(Method::POST, self.descriptor.refresh_endpoint.clone());

			request.headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

			let response = self
				.http_client
				.execute(request)
				.await
				.map_err(Error::from)
				.inspect_err(|_| self.refresh_metrics.record_failure())?;

			if !response.is_success() {
				self.refresh_metrics.record_failure();

				return Err(AuthServiceError::Rejected {
					operation: "refresh",
					status: response.status.as_u16(),
				}
				.into());
			}

			let mut deserializer = serde_json::Deserializer::from_slice(&response.body);
			let envelope: RefreshEnvelope = serde_path_to_error::deserialize(&mut deserializer)
				.map_err(|source| {
					self.refresh_metrics.record_failure();

					AuthServiceError::MalformedPayload { source, status: response.status.as_u16() }
				})?;

			self.refresh_metrics.record_success();

			Ok(TokenSecret::new(envelope.data.access_token))
		})
		.await
	}

	/// Revokes the remote session, then clears every persisted credential.
	///
	/// A transport failure or non-2xx answer from the logout endpoint is an
	/// error and leaves the local store untouched so the caller can decide on
	/// a fallback.
	pub async fn logout(&self) -> Result<()> {
		obs::observe_flow(FlowKind::Logout, "logout", async move {
			let request =
				OutboundRequest::bare(Method::POST, self.descriptor.logout_endpoint.clone());
			let response = self.http_client.execute(request).await?;

			if !response.is_success() {
				return Err(AuthServiceError::Rejected {
					operation: "logout",
					status: response.status.as_u16(),
				}
				.into());
			}

			self.store.clear().await?;

			Ok(())
		})
		.await
	}

	/// Local-only credential clear, the fallback when remote logout fails.
	pub async fn clear_credentials(&self) -> Result<()> {
		self.store.clear().await?;

		Ok(())
	}
}
