#![cfg(feature = "reqwest")]

// crates.io
use httpmock::prelude::*;
// self
use bearer_relay::{
	_preludet::*,
	creds::{CredentialSet, TokenSecret},
	request::RequestOptions,
	service::AuthServiceDescriptor,
	store::CredentialStore,
};

const STALE: &str = "stale-access";
const EXPIRED_BODY: &str = "{\"message\":\"Invalid or expired token\"}";

fn build_descriptor(server: &MockServer) -> AuthServiceDescriptor {
	let base =
		Url::parse(&server.url("/api")).expect("Mock base URL should parse successfully.");

	AuthServiceDescriptor::from_base(&base)
		.expect("Descriptor should derive from the mock base URL.")
}

fn protected_url(server: &MockServer, path: &str) -> Url {
	Url::parse(&server.url(path)).expect("Protected endpoint URL should parse successfully.")
}

#[tokio::test]
async fn expiry_401_refreshes_rotates_and_retries_once() {
	let server = MockServer::start_async().await;
	let (relay, store) = build_reqwest_test_relay(build_descriptor(&server), STALE);
	let stale_call = server
		.mock_async(|when, then| {
			when.method(GET).path("/profile").header("authorization", "Bearer stale-access");
			then.status(401).header("content-type", "application/json").body(EXPIRED_BODY);
		})
		.await;
	let fresh_call = server
		.mock_async(|when, then| {
			when.method(GET).path("/profile").header("authorization", "Bearer NEW");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"data\":{\"id\":\"user-1\"}}");
		})
		.await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/auth/refresh");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"data\":{\"accessToken\":\"NEW\"}}");
		})
		.await;
	let response = relay
		.send(protected_url(&server, "/profile"), RequestOptions::get())
		.await
		.expect("Expiry recovery should resolve to the retried response.");

	stale_call.assert_async().await;
	refresh.assert_async().await;
	fresh_call.assert_async().await;

	assert_eq!(response.status.as_u16(), 200);
	assert_eq!(response.body, b"{\"data\":{\"id\":\"user-1\"}}");
	assert!(!relay.refresh_in_flight());

	let snapshot = store.snapshot().await.expect("Store snapshot should succeed.");

	assert_eq!(snapshot.access_token.as_ref().map(|t| t.expose()), Some("NEW"));
	assert!(snapshot.refreshed_at.is_some());
	assert_eq!(relay.refresh_metrics.attempts(), 1);
	assert_eq!(relay.refresh_metrics.successes(), 1);
}

#[tokio::test]
async fn rejected_refresh_logs_out_and_returns_the_original_401() {
	let server = MockServer::start_async().await;
	let (relay, store) = build_reqwest_test_relay(build_descriptor(&server), STALE);
	let _protected = server
		.mock_async(|when, then| {
			when.method(GET).path("/profile");
			then.status(401).header("content-type", "application/json").body(EXPIRED_BODY);
		})
		.await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/auth/refresh");
			then.status(401)
				.header("content-type", "application/json")
				.body("{\"message\":\"Refresh token expired\"}");
		})
		.await;
	let logout = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/auth/logout");
			then.status(200).header("content-type", "application/json").body("{\"data\":null}");
		})
		.await;
	let response = relay
		.send(protected_url(&server, "/profile"), RequestOptions::get())
		.await
		.expect("A failed refresh should resolve to the original 401, not an error.");

	refresh.assert_async().await;
	logout.assert_async().await;

	assert_eq!(response.status.as_u16(), 401);
	assert_eq!(response.body, EXPIRED_BODY.as_bytes());
	assert!(!relay.refresh_in_flight());

	let snapshot = store.snapshot().await.expect("Store snapshot should succeed.");

	assert!(snapshot.is_empty());
	assert_eq!(relay.refresh_metrics.failures(), 1);
}

#[tokio::test]
async fn failed_remote_logout_still_clears_locally() {
	let server = MockServer::start_async().await;
	let (relay, store) = build_reqwest_test_relay(build_descriptor(&server), STALE);
	let _protected = server
		.mock_async(|when, then| {
			when.method(GET).path("/profile");
			then.status(401).header("content-type", "application/json").body(EXPIRED_BODY);
		})
		.await;
	let _refresh = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/auth/refresh");
			then.status(500).body("{\"message\":\"boom\"}");
		})
		.await;
	let logout = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/auth/logout");
			then.status(503).body("{\"message\":\"unavailable\"}");
		})
		.await;
	let response = relay
		.send(protected_url(&server, "/profile"), RequestOptions::get())
		.await
		.expect("Logout failure should not surface; the original 401 comes back.");

	logout.assert_async().await;

	assert_eq!(response.status.as_u16(), 401);

	let snapshot = store.snapshot().await.expect("Store snapshot should succeed.");

	assert!(snapshot.is_empty());
}

#[tokio::test]
async fn malformed_refresh_payload_counts_as_a_failure() {
	let server = MockServer::start_async().await;
	let (relay, store) = build_reqwest_test_relay(build_descriptor(&server), STALE);
	let _protected = server
		.mock_async(|when, then| {
			when.method(GET).path("/profile");
			then.status(401).header("content-type", "application/json").body(EXPIRED_BODY);
		})
		.await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/auth/refresh");
			// 200 but the envelope is missing `accessToken`.
			then.status(200).header("content-type", "application/json").body("{\"data\":{}}");
		})
		.await;
	let _logout = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/auth/logout");
			then.status(200).body("{\"data\":null}");
		})
		.await;
	let response = relay
		.send(protected_url(&server, "/profile"), RequestOptions::get())
		.await
		.expect("Malformed refresh payloads should resolve to the original 401.");

	refresh.assert_async().await;

	assert_eq!(response.status.as_u16(), 401);
	assert_eq!(relay.refresh_metrics.failures(), 1);

	let snapshot = store.snapshot().await.expect("Store snapshot should succeed.");

	assert!(snapshot.is_empty());
}

#[tokio::test]
async fn refresh_transport_failure_releases_the_slot_for_the_next_call() {
	let server = MockServer::start_async().await;
	let logout_url = Url::parse(&server.url("/api/auth/logout"))
		.expect("Logout endpoint URL should parse successfully.");
	// Refresh points at a dead port while logout stays reachable.
	let refresh_url = Url::parse("http://127.0.0.1:9/api/auth/refresh")
		.expect("Dead refresh endpoint URL should parse successfully.");
	let descriptor = AuthServiceDescriptor::new(refresh_url, logout_url);
	let (relay, store) = build_reqwest_test_relay(descriptor, STALE);
	let protected = server
		.mock_async(|when, then| {
			when.method(GET).path("/profile");
			then.status(401).header("content-type", "application/json").body(EXPIRED_BODY);
		})
		.await;
	let _logout = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/auth/logout");
			then.status(200).body("{\"data\":null}");
		})
		.await;
	let first = relay
		.send(protected_url(&server, "/profile"), RequestOptions::get())
		.await
		.expect("Refresh transport failure should resolve to the original 401.");

	assert_eq!(first.status.as_u16(), 401);
	assert!(!relay.refresh_in_flight());
	assert!(store.snapshot().await.expect("Store snapshot should succeed.").is_empty());

	// Re-seed and go again; the slot must be claimable for a second attempt.
	store
		.save(CredentialSet {
			access_token: Some(TokenSecret::new(STALE)),
			refresh_token: Some(TokenSecret::new("refresh-cookie")),
			user: None,
			refreshed_at: None,
		})
		.await
		.expect("Re-seeding the store should succeed.");

	let second = relay
		.send(protected_url(&server, "/profile"), RequestOptions::get())
		.await
		.expect("Second recovery attempt should also resolve to the original 401.");

	assert_eq!(second.status.as_u16(), 401);
	assert!(!relay.refresh_in_flight());
	assert_eq!(relay.refresh_metrics.attempts(), 2);
	assert_eq!(relay.refresh_metrics.failures(), 2);

	protected.assert_calls_async(2).await;
}
