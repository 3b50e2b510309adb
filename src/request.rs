//! Pending-request representation and header assembly.
//!
//! Mirrors the platform client's header rules: a JSON content-type by
//! default, a bearer header whenever a token is on hand, caller headers
//! winning on overlap, and no content-type at all for multipart bodies so
//! the transport gets to set the boundary.

// crates.io
use http::{
	HeaderMap, HeaderName, HeaderValue, Method,
	header::{AUTHORIZATION, CONTENT_TYPE},
};
// self
use crate::{_prelude::*, creds::TokenSecret, error::ConfigError, http::OutboundRequest};

/// Caller-facing request options: method, extra headers, body.
///
/// Created by the caller, passed by value into the relay, and not retained
/// after the call resolves. Cloneable so the relay can rebuild the request
/// for the single post-refresh retry.
#[derive(Clone, Debug)]
pub struct RequestOptions {
	/// HTTP method, defaults to GET.
	pub method: Method,
	/// Caller-supplied headers, taking precedence over relay defaults.
	pub headers: HeaderMap,
	/// Request body.
	pub body: Body,
}
impl RequestOptions {
	/// Creates options for the provided method with no headers or body.
	pub fn new(method: Method) -> Self {
		Self { method, headers: HeaderMap::new(), body: Body::Empty }
	}

	/// Shorthand for a GET request.
	pub fn get() -> Self {
		Self::new(Method::GET)
	}

	/// Shorthand for a POST request.
	pub fn post() -> Self {
		Self::new(Method::POST)
	}

	/// Attaches a serialized JSON body.
	pub fn json<T>(mut self, payload: &T) -> Result<Self, ConfigError>
	where
		T: Serialize,
	{
		self.body = Body::Json(serde_json::to_vec(payload)?);

		Ok(self)
	}

	/// Attaches a multipart body described by owned fields.
	pub fn multipart(mut self, fields: Vec<MultipartField>) -> Self {
		self.body = Body::Multipart(fields);

		self
	}

	/// Adds (or replaces) a caller header.
	pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
		self.headers.insert(name, value);

		self
	}

	/// Builds the outbound request for one attempt with the provided token.
	pub(crate) fn outbound(
		&self,
		url: Url,
		token: Option<&TokenSecret>,
	) -> Result<OutboundRequest, ConfigError> {
		Ok(OutboundRequest {
			method: self.method.clone(),
			url,
			headers: self.assemble_headers(token)?,
			body: self.body.clone(),
		})
	}

	/// Merges relay defaults with caller headers.
	///
	/// Order matters: defaults first, caller overrides second, and the
	/// multipart carve-out last so even a caller-supplied content-type is
	/// dropped when the transport must pick the boundary.
	pub(crate) fn assemble_headers(
		&self,
		token: Option<&TokenSecret>,
	) -> Result<HeaderMap, ConfigError> {
		let mut headers = HeaderMap::new();

		headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

		if let Some(token) = token {
			let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose()))
				.map_err(|source| ConfigError::InvalidAuthHeader { source })?;

			value.set_sensitive(true);
			headers.insert(AUTHORIZATION, value);
		}

		for (name, value) in &self.headers {
			headers.insert(name, value.clone());
		}

		if matches!(self.body, Body::Multipart(_)) {
			headers.remove(CONTENT_TYPE);
		}

		Ok(headers)
	}
}
impl Default for RequestOptions {
	fn default() -> Self {
		Self::get()
	}
}

/// Request body variants accepted by the relay.
#[derive(Clone, Debug)]
pub enum Body {
	/// No body.
	Empty,
	/// Pre-serialized JSON payload.
	Json(Vec<u8>),
	/// Multipart payload described by owned fields; the transport builds the
	/// actual form (and its boundary) once per attempt.
	Multipart(Vec<MultipartField>),
}

/// One named part of a multipart body.
#[derive(Clone, Debug)]
pub struct MultipartField {
	/// Form field name.
	pub name: String,
	/// Field payload.
	pub value: FieldValue,
}
impl MultipartField {
	/// Creates a plain text field.
	pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
		Self { name: name.into(), value: FieldValue::Text(value.into()) }
	}

	/// Creates a file field with raw bytes and a file name.
	pub fn file(
		name: impl Into<String>,
		file_name: impl Into<String>,
		data: Vec<u8>,
	) -> Self {
		Self {
			name: name.into(),
			value: FieldValue::Bytes { data, file_name: file_name.into(), mime: None },
		}
	}

	/// Sets an explicit mime type on a file field; no-op for text fields.
	pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
		if let FieldValue::Bytes { mime: slot, .. } = &mut self.value {
			*slot = Some(mime.into());
		}

		self
	}
}

/// Payload carried by a [`MultipartField`].
#[derive(Clone, Debug)]
pub enum FieldValue {
	/// UTF-8 text value.
	Text(String),
	/// Raw bytes uploaded as a file part.
	Bytes {
		/// File contents.
		data: Vec<u8>,
		/// File name advertised to the server.
		file_name: String,
		/// Optional explicit mime type.
		mime: Option<String>,
	},
}
