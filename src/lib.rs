//! Transparent bearer-auth relay. Attaches credentials to outgoing requests, recovers from
//! access-token expiry exactly once per concurrent burst, and keeps persisted credential state
//! consistent through refresh and logout.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod creds;
pub mod error;
pub mod http;
pub mod obs;
pub mod relay;
pub mod request;
pub mod service;
pub mod store;
pub mod trigger;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		creds::{CredentialSet, TokenSecret},
		http::ReqwestHttpClient,
		relay::Relay,
		service::AuthServiceDescriptor,
		store::{CredentialStore, MemoryStore},
	};

	/// Relay type alias used by reqwest-backed integration tests.
	pub type ReqwestTestRelay = Relay<ReqwestHttpClient>;

	/// Builds a cookie-carrying reqwest HTTP client for mock-server tests.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.cookie_store(true)
			.build()
			.expect("Failed to build Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Builds an in-memory store seeded with a full signed-in credential set.
	pub fn seeded_store(access: &str) -> Arc<MemoryStore> {
		Arc::new(MemoryStore::seeded(CredentialSet {
			access_token: Some(TokenSecret::new(access)),
			refresh_token: Some(TokenSecret::new("refresh-cookie")),
			user: Some(serde_json::json!({ "id": "user-1" })),
			refreshed_at: None,
		}))
	}

	/// Constructs a [`Relay`] backed by a seeded in-memory store and the reqwest transport used
	/// across integration tests.
	pub fn build_reqwest_test_relay(
		descriptor: AuthServiceDescriptor,
		access: &str,
	) -> (ReqwestTestRelay, Arc<MemoryStore>) {
		let store_backend = seeded_store(access);
		let store: Arc<dyn CredentialStore> = store_backend.clone();
		let relay = Relay::with_http_client(store, descriptor, test_reqwest_http_client());

		(relay, store_backend)
	}
}

mod _prelude {
	pub use std::{
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use parking_lot::RwLock;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::OffsetDateTime;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use bearer_relay as _;
#[cfg(all(test, feature = "reqwest"))] use httpmock as _;
