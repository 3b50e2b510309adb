//! The authenticated request relay: bearer attachment, expiry recovery,
//! single-flight refresh.

pub mod refresh;
pub mod send;

pub use refresh::RefreshMetrics;

// std
use std::sync::atomic::{AtomicBool, Ordering};
// self
use crate::{
	_prelude::*,
	http::RelayHttpClient,
	service::AuthServiceDescriptor,
	store::CredentialStore,
	trigger::{ExpiredMessageTrigger, RefreshTrigger},
};
#[cfg(feature = "reqwest")]
use crate::{error::ConfigError, http::ReqwestHttpClient};

#[cfg(feature = "reqwest")]
/// Relay specialized for the crate's default reqwest transport stack.
pub type ReqwestRelay = Relay<ReqwestHttpClient>;

/// Sits between application code and the network: attaches bearer
/// credentials to outgoing requests and transparently recovers from
/// access-token expiry once per concurrent burst.
///
/// The relay owns the HTTP client, credential store, auth service
/// descriptor, and refresh trigger so [`send`](Relay::send) can focus on the
/// recovery protocol. Exactly one refresh is ever in flight per relay,
/// enforced by a non-blocking advisory flag; concurrent 401s observed while
/// a refresh runs are returned to their callers unretried. That bail-out is
/// a known limitation: a burst of expired-token requests surfaces several
/// unrecovered 401s even though the single refresh would have covered them.
pub struct Relay<C>
where
	C: ?Sized + RelayHttpClient,
{
	/// HTTP client used for every outbound request.
	pub http_client: Arc<C>,
	/// Credential store read on every call and written by refresh/logout.
	pub store: Arc<dyn CredentialStore>,
	/// Remote auth service endpoints.
	pub descriptor: AuthServiceDescriptor,
	/// Policy deciding which 401s warrant a refresh attempt.
	pub trigger: Arc<dyn RefreshTrigger>,
	/// Shared metrics recorder for refresh outcomes.
	pub refresh_metrics: Arc<RefreshMetrics>,
	refresh_in_flight: Arc<AtomicBool>,
}
impl<C> Relay<C>
where
	C: ?Sized + RelayHttpClient,
{
	/// Creates a relay that reuses the caller-provided transport.
	pub fn with_http_client(
		store: Arc<dyn CredentialStore>,
		descriptor: AuthServiceDescriptor,
		http_client: impl Into<Arc<C>>,
	) -> Self {
		Self {
			http_client: http_client.into(),
			store,
			descriptor,
			trigger: Arc::new(ExpiredMessageTrigger::default()),
			refresh_metrics: Default::default(),
			refresh_in_flight: Default::default(),
		}
	}

	/// Replaces the refresh trigger policy.
	pub fn with_trigger(mut self, trigger: Arc<dyn RefreshTrigger>) -> Self {
		self.trigger = trigger;

		self
	}

	/// Returns `true` while a refresh call is in flight.
	pub fn refresh_in_flight(&self) -> bool {
		self.refresh_in_flight.load(Ordering::Acquire)
	}

	/// Claims the refresh slot; `None` means another refresh already holds it.
	///
	/// The returned guard releases the slot on drop, so the flag is false
	/// after every exit path including unwinds.
	pub(crate) fn begin_refresh(&self) -> Option<RefreshGuard> {
		self.refresh_in_flight
			.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
			.ok()?;

		Some(RefreshGuard(self.refresh_in_flight.clone()))
	}
}
#[cfg(feature = "reqwest")]
impl Relay<ReqwestHttpClient> {
	/// Creates a relay with a cookie-carrying reqwest transport.
	///
	/// The cookie jar is what carries the refresh credential to the auth
	/// service, standing in for the browser's `credentials: 'include'`.
	pub fn new(
		store: Arc<dyn CredentialStore>,
		descriptor: AuthServiceDescriptor,
	) -> Result<Self, ConfigError> {
		Ok(Self::with_http_client(store, descriptor, ReqwestHttpClient::new()?))
	}
}
impl<C> Clone for Relay<C>
where
	C: ?Sized + RelayHttpClient,
{
	fn clone(&self) -> Self {
		Self {
			http_client: self.http_client.clone(),
			store: self.store.clone(),
			descriptor: self.descriptor.clone(),
			trigger: self.trigger.clone(),
			refresh_metrics: self.refresh_metrics.clone(),
			refresh_in_flight: self.refresh_in_flight.clone(),
		}
	}
}
impl<C> Debug for Relay<C>
where
	C: ?Sized + RelayHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Relay")
			.field("descriptor", &self.descriptor)
			.field("refresh_in_flight", &self.refresh_in_flight())
			.finish()
	}
}

/// RAII guard owning the refresh slot.
pub(crate) struct RefreshGuard(Arc<AtomicBool>);
impl Drop for RefreshGuard {
	fn drop(&mut self) {
		self.0.store(false, Ordering::Release);
	}
}
