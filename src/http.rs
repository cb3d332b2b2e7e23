//! Transport primitives.
//!
//! [`HttpTransport`] is the crate's only dependency on an HTTP stack. The request client hands
//! it a fully resolved [`HttpRequest`] (absolute URL, headers, optional JSON body) and expects
//! the raw status plus body bytes back. Non-success statuses are not transport failures; the
//! client classifies them after the transport returns.

// std
#[cfg(feature = "reqwest")] use std::ops::Deref;
// self
use crate::{_prelude::*, error::TransportError};

/// Boxed future returned by [`HttpTransport::execute`].
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<HttpResponse, TransportError>> + 'a + Send>>;

/// Abstraction over HTTP stacks capable of executing a single request.
///
/// Implementations must be `Send + Sync + 'static` so clients can share them behind `Arc`
/// and move them into request futures.
pub trait HttpTransport
where
	Self: 'static + Send + Sync,
{
	/// Executes `request` and returns the raw response.
	fn execute(&self, request: HttpRequest) -> TransportFuture<'_>;
}

/// HTTP verbs issued by the request client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
	/// `GET`
	Get,
	/// `POST`
	Post,
	/// `PUT`
	Put,
	/// `PATCH`
	Patch,
	/// `DELETE`
	Delete,
}
impl Method {
	/// Returns the canonical upper-case verb.
	pub const fn as_str(self) -> &'static str {
		match self {
			Method::Get => "GET",
			Method::Post => "POST",
			Method::Put => "PUT",
			Method::Patch => "PATCH",
			Method::Delete => "DELETE",
		}
	}
}
impl Display for Method {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Fully resolved request handed to an [`HttpTransport`].
#[derive(Clone, Debug, PartialEq)]
pub struct HttpRequest {
	/// HTTP verb.
	pub method: Method,
	/// Absolute URL including query parameters.
	pub url: Url,
	/// Extra headers (name, value) in insertion order.
	pub headers: Vec<(String, String)>,
	/// JSON body, if any.
	pub body: Option<serde_json::Value>,
}
impl HttpRequest {
	/// Returns the first header value matching `name` (case-insensitive).
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers
			.iter()
			.find(|(key, _)| key.eq_ignore_ascii_case(name))
			.map(|(_, value)| value.as_str())
	}
}

/// Raw response returned by an [`HttpTransport`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpResponse {
	/// HTTP status code.
	pub status: u16,
	/// Opaque response body.
	pub body: Vec<u8>,
}
impl HttpResponse {
	/// Creates a response from its parts.
	pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
		Self { status, body: body.into() }
	}

	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// Timeouts, proxies, and TLS settings belong to the wrapped client; configure them on a
/// [`ReqwestClient`] builder and pass it to [`ReqwestTransport::with_client`].
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransport(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	fn build(&self, request: HttpRequest) -> Result<reqwest::Request, TransportError> {
		let method = match request.method {
			Method::Get => reqwest::Method::GET,
			Method::Post => reqwest::Method::POST,
			Method::Put => reqwest::Method::PUT,
			Method::Patch => reqwest::Method::PATCH,
			Method::Delete => reqwest::Method::DELETE,
		};
		let mut builder = self.0.request(method, request.url);

		for (name, value) in &request.headers {
			builder = builder.header(name.as_str(), value.as_str());
		}
		if let Some(body) = &request.body {
			let bytes = serde_json::to_vec(body).map_err(TransportError::network)?;

			builder = builder.header(reqwest::header::CONTENT_TYPE, "application/json").body(bytes);
		}

		Ok(builder.build()?)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestTransport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestTransport {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl HttpTransport for ReqwestTransport {
	fn execute(&self, request: HttpRequest) -> TransportFuture<'_> {
		Box::pin(async move {
			let request = self.build(request)?;
			let response = self.0.execute(request).await?;
			let status = response.status().as_u16();
			let body = response.bytes().await?.to_vec();

			Ok(HttpResponse { status, body })
		})
	}
}
