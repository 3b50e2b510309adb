//! Transport primitives for the relay.
//!
//! The module exposes [`RelayHttpClient`] alongside the buffered
//! [`RelayResponse`] so downstream crates can integrate custom HTTP clients.
//! Responses are fully buffered on purpose: the relay must be able to inspect
//! a 401 body to classify it and still hand the untouched original response
//! back to the caller when recovery is not attempted or fails.

// std
use std::ops::Deref;
// crates.io
use http::{HeaderMap, Method, StatusCode};
#[cfg(feature = "reqwest")] use reqwest::multipart::{Form, Part};
// self
use crate::{
	_prelude::*,
	error::TransportError,
	request::{Body, FieldValue},
};
#[cfg(feature = "reqwest")] use crate::error::ConfigError;

/// Boxed future returned by [`RelayHttpClient::execute`].
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<RelayResponse, TransportError>> + 'a + Send>>;

/// Abstraction over HTTP transports capable of executing relay requests.
///
/// The trait is the relay's only dependency on an HTTP stack. Callers provide
/// an implementation (typically behind `Arc<T>` where `T: RelayHttpClient`);
/// implementations must be `Send + Sync + 'static` so one transport can be
/// shared across relay instances without additional wrappers. The refresh
/// credential travels on cookies, so implementations are expected to hold a
/// cookie jar scoped to the auth service.
pub trait RelayHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Executes the request and buffers the full response.
	fn execute(&self, request: OutboundRequest) -> TransportFuture<'_>;
}

/// One in-flight HTTP call: method, destination, assembled headers, body.
///
/// Owned by the relay for the duration of a single attempt; retries build a
/// fresh value so multipart bodies get a fresh boundary.
#[derive(Clone, Debug)]
pub struct OutboundRequest {
	/// HTTP method.
	pub method: Method,
	/// Destination URL.
	pub url: Url,
	/// Fully assembled request headers.
	pub headers: HeaderMap,
	/// Request body.
	pub body: Body,
}
impl OutboundRequest {
	/// Builds a request carrying no body and no extra headers.
	pub fn bare(method: Method, url: Url) -> Self {
		Self { method, url, headers: HeaderMap::new(), body: Body::Empty }
	}
}

/// Fully buffered HTTP response returned by relay transports.
#[derive(Clone, Debug)]
pub struct RelayResponse {
	/// HTTP status code.
	pub status: StatusCode,
	/// Response headers.
	pub headers: HeaderMap,
	/// Raw response body bytes.
	pub body: Vec<u8>,
}
impl RelayResponse {
	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		self.status.is_success()
	}

	/// Decodes the body as JSON into the requested type.
	pub fn json<T>(&self) -> Result<T, serde_json::Error>
	where
		T: serde::de::DeserializeOwned,
	{
		serde_json::from_slice(&self.body)
	}

	/// Returns the body as UTF-8 text, replacing invalid sequences.
	pub fn text(&self) -> String {
		String::from_utf8_lossy(&self.body).into_owned()
	}

	/// Extracts the `message` field from the platform's error envelope, if
	/// the body parses as one.
	pub fn error_message(&self) -> Option<String> {
		#[derive(Deserialize)]
		struct ErrorEnvelope {
			message: String,
		}

		self.json::<ErrorEnvelope>().ok().map(|envelope| envelope.message)
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one
/// place. The default construction enables the cookie store because the auth
/// service delivers and consumes the refresh credential via cookies; custom
/// clients passed through [`ReqwestHttpClient::with_client`] should do the
/// same or refresh calls will arrive bare.
#[cfg(feature = "reqwest")]
#[derive(Clone)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Builds a cookie-carrying reqwest client.
	pub fn new() -> Result<Self, ConfigError> {
		let client =
			ReqwestClient::builder().cookie_store(true).build().map_err(ConfigError::from)?;

		Ok(Self(client))
	}

	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl RelayHttpClient for ReqwestHttpClient {
	fn execute(&self, request: OutboundRequest) -> TransportFuture<'_> {
		let client = self.0.clone();

		Box::pin(async move {
			let mut builder =
				client.request(request.method, request.url).headers(request.headers);

			builder = match request.body {
				Body::Empty => builder,
				Body::Json(bytes) => builder.body(bytes),
				Body::Multipart(fields) => builder.multipart(build_form(fields)?),
			};

			let response = builder.send().await.map_err(TransportError::from)?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let body = response.bytes().await.map_err(TransportError::from)?.to_vec();

			Ok(RelayResponse { status, headers, body })
		})
	}
}

#[cfg(feature = "reqwest")]
fn build_form(fields: Vec<crate::request::MultipartField>) -> Result<Form, TransportError> {
	let mut form = Form::new();

	for field in fields {
		match field.value {
			FieldValue::Text(text) => form = form.text(field.name, text),
			FieldValue::Bytes { data, file_name, mime } => {
				let mut part = Part::bytes(data).file_name(file_name);

				if let Some(mime) = mime {
					part = part.mime_str(&mime).map_err(TransportError::from)?;
				}

				form = form.part(field.name, part);
			},
		}
	}

	Ok(form)
}
