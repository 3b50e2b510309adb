//! Thread-safe in-memory [`CredentialStore`] implementation for tests and demos.

// self
use crate::{
	_prelude::*,
	creds::{CredentialSet, TokenSecret},
	store::{CredentialStore, StoreFuture},
};

type SharedSet = Arc<RwLock<CredentialSet>>;

/// Keeps the credential set in-process; nothing survives a restart.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(SharedSet);
impl MemoryStore {
	/// Creates a store pre-seeded with the provided credential set.
	pub fn seeded(set: CredentialSet) -> Self {
		Self(Arc::new(RwLock::new(set)))
	}

	fn rotate_now(shared: SharedSet, token: TokenSecret) {
		let mut guard = shared.write();

		guard.access_token = Some(token);
		guard.refreshed_at = Some(OffsetDateTime::now_utc());
	}
}
impl CredentialStore for MemoryStore {
	fn snapshot(&self) -> StoreFuture<'_, CredentialSet> {
		let shared = self.0.clone();

		Box::pin(async move { Ok(shared.read().clone()) })
	}

	fn access_token(&self) -> StoreFuture<'_, Option<TokenSecret>> {
		let shared = self.0.clone();

		Box::pin(async move { Ok(shared.read().access_token.clone()) })
	}

	fn set_access_token(&self, token: TokenSecret) -> StoreFuture<'_, ()> {
		let shared = self.0.clone();

		Box::pin(async move {
			Self::rotate_now(shared, token);

			Ok(())
		})
	}

	fn save(&self, set: CredentialSet) -> StoreFuture<'_, ()> {
		let shared = self.0.clone();

		Box::pin(async move {
			*shared.write() = set;

			Ok(())
		})
	}

	fn clear(&self) -> StoreFuture<'_, ()> {
		let shared = self.0.clone();

		Box::pin(async move {
			*shared.write() = CredentialSet::default();

			Ok(())
		})
	}
}
