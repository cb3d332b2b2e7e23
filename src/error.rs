//! Crate-level error types shared by the request client, refresh flows, and stores.

// self
use crate::{_prelude::*, schema::ValidationError};

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS, IO).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Response payload did not satisfy the requested schema.
	#[error(transparent)]
	Validation(#[from] ValidationError),

	/// Server answered with a non-success status code.
	#[error("Server responded with HTTP {status}.")]
	HttpStatus {
		/// HTTP status code returned by the server.
		status: u16,
		/// Raw response body, kept for diagnostics.
		body: Vec<u8>,
	},
	/// Request was cancelled through its [`CancelHandle`](crate::client::CancelHandle).
	#[error("Request was cancelled.")]
	Cancelled,
}
impl Error {
	/// Returns the HTTP status carried by the failure, if the server produced one.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::HttpStatus { status, .. } => Some(*status),
			_ => None,
		}
	}

	/// Returns `true` when the server rejected the request with `401 Unauthorized`.
	pub fn is_unauthorized(&self) -> bool {
		self.status() == Some(401)
	}
}

/// Configuration and request-construction failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Base URL cannot be parsed.
	#[error("Base URL `{value}` is invalid.")]
	InvalidBaseUrl {
		/// Offending input.
		value: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Request URL cannot be resolved against the base URL.
	#[error("Request URL `{value}` is invalid.")]
	InvalidRequestUrl {
		/// Offending input after base URL resolution.
		value: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Request body could not be serialized to JSON.
	#[error("Request body could not be serialized.")]
	RequestBody(#[from] serde_json::Error),
	/// Authorization header name is not a valid HTTP header name.
	#[error("Header `{name}` is not a valid HTTP header.")]
	InvalidHeader {
		/// Header name that failed validation.
		name: String,
	},
	/// Authorization prefix cannot appear in an HTTP header value.
	#[error("Authorization prefix `{prefix}` is not a valid header value.")]
	InvalidPrefix {
		/// Prefix that failed validation.
		prefix: String,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while sending the request.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while sending the request.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}
