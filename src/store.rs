//! Storage contracts and built-in backends for persisted credentials.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{_prelude::*, creds::{CredentialSet, TokenSecret}};

/// Boxed future returned by [`CredentialStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Capability contract for the credential store the relay reads and writes.
///
/// Injected as `Arc<dyn CredentialStore>` so callers can swap persisted
/// backends for test doubles instead of reaching into ambient global state.
/// Backends provide no transactional isolation; a logout racing a refresh
/// resolves last-writer-wins.
pub trait CredentialStore
where
	Self: Send + Sync,
{
	/// Returns a copy of the full persisted credential set.
	fn snapshot(&self) -> StoreFuture<'_, CredentialSet>;

	/// Returns the current access token, if one is present.
	fn access_token(&self) -> StoreFuture<'_, Option<TokenSecret>>;

	/// Installs a rotated access token and stamps the rotation instant.
	fn set_access_token(&self, token: TokenSecret) -> StoreFuture<'_, ()>;

	/// Replaces the whole credential set (login-time install).
	fn save(&self, set: CredentialSet) -> StoreFuture<'_, ()>;

	/// Removes every persisted key.
	fn clear(&self) -> StoreFuture<'_, ()>;
}

/// Error type produced by [`CredentialStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}
