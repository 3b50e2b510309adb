//! The authenticated send flow: fast-path passthrough plus one-shot expiry
//! recovery.
//!
//! The relay issues the caller's request with a bearer header attached,
//! returns anything that is not a 401 untouched, and on an expiry-classified
//! 401 performs refresh-then-retry exactly once. Recovery is best-effort by
//! contract: every failure inside it demotes to a logout (with a local-only
//! clear as fallback) and the caller receives the original 401, never an
//! error.

// crates.io
use http::StatusCode;
// self
use crate::{
	_prelude::*,
	http::{RelayHttpClient, RelayResponse},
	obs::{self, FlowKind},
	relay::Relay,
	request::RequestOptions,
};

impl<C> Relay<C>
where
	C: ?Sized + RelayHttpClient,
{
	/// Sends an authenticated request, recovering from token expiry at most
	/// once.
	///
	/// Errors escape only from the outer edges of the flow: a transport
	/// failure on the first attempt, a credential store read failure, or a
	/// header-assembly problem. Everything after a refresh has been claimed
	/// resolves to a response, with the original 401 standing in whenever
	/// recovery fails or another refresh is already in flight.
	pub async fn send(&self, url: Url, options: RequestOptions) -> Result<RelayResponse> {
		obs::observe_flow(FlowKind::Send, "send", async move {
			let token = self.store.access_token().await?;
			let request = options.outbound(url.clone(), token.as_ref())?;
			let response = self.http_client.execute(request).await?;

			if response.status != StatusCode::UNAUTHORIZED {
				return Ok(response);
			}
			if !self.trigger.should_refresh(&response) {
				return Ok(response);
			}

			let Some(_guard) = self.begin_refresh() else {
				// A refresh is already in flight; this caller does not wait
				// and does not retry.
				self.refresh_metrics.record_suppressed();

				return Ok(response);
			};

			match self.recover(&url, &options).await {
				Ok(retried) => Ok(retried),
				Err(_) => {
					if self.logout().await.is_err() {
						let _ = self.clear_credentials().await;
					}

					Ok(response)
				},
			}
		})
		.await
	}

	/// Refreshes the token, persists it, and reissues the original request.
	async fn recover(&self, url: &Url, options: &RequestOptions) -> Result<RelayResponse> {
		let token = self.refresh_access_token().await?;

		self.store.set_access_token(token.clone()).await?;

		let request = options.outbound(url.clone(), Some(&token))?;

		Ok(self.http_client.execute(request).await?)
	}
}
