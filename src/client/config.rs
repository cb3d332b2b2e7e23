//! Client configuration and its validating builder.

// self
use crate::{_prelude::*, error::ConfigError};

/// Header used for the access token unless overridden.
pub const DEFAULT_AUTHORIZATION_KEY: &str = "Authorization";
/// Scheme prefix placed before the access token unless overridden.
pub const DEFAULT_AUTHORIZATION_PREFIX: &str = "Bearer";

/// Instance-wide request client settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
	/// Base URL prepended to relative request paths.
	pub base_url: Option<Url>,
	/// Header name carrying the access token.
	pub authorization_key: String,
	/// Prefix placed before the access token in the header value.
	pub authorization_prefix: String,
	/// Initial trailing-slash mode.
	pub trailing_slash: bool,
}
impl ClientConfig {
	/// Returns a builder seeded with the defaults.
	pub fn builder() -> ClientConfigBuilder {
		ClientConfigBuilder::default()
	}

	/// Formats the authorization header value for `token`.
	pub fn authorization_value(&self, token: &str) -> String {
		authorization_value(&self.authorization_prefix, token)
	}
}
impl Default for ClientConfig {
	fn default() -> Self {
		Self {
			base_url: None,
			authorization_key: DEFAULT_AUTHORIZATION_KEY.into(),
			authorization_prefix: DEFAULT_AUTHORIZATION_PREFIX.into(),
			trailing_slash: false,
		}
	}
}

/// Builder for [`ClientConfig`].
#[derive(Clone, Debug, Default)]
pub struct ClientConfigBuilder {
	base_url: Option<String>,
	authorization_key: Option<String>,
	authorization_prefix: Option<String>,
	trailing_slash: bool,
}
impl ClientConfigBuilder {
	/// Sets the base URL. Scheme-relative values (`//host/path`) resolve to `https:`.
	pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
		self.base_url = Some(base_url.into());

		self
	}

	/// Overrides the authorization header name.
	pub fn authorization_key(mut self, key: impl Into<String>) -> Self {
		self.authorization_key = Some(key.into());

		self
	}

	/// Overrides the authorization scheme prefix (e.g. `JWT`).
	pub fn authorization_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.authorization_prefix = Some(prefix.into());

		self
	}

	/// Enables the trailing-slash mode from the start.
	pub fn trailing_slash(mut self, enabled: bool) -> Self {
		self.trailing_slash = enabled;

		self
	}

	/// Validates the inputs and produces a [`ClientConfig`].
	pub fn build(self) -> Result<ClientConfig, ConfigError> {
		let base_url = self.base_url.as_deref().map(parse_base_url).transpose()?;
		let authorization_key =
			self.authorization_key.unwrap_or_else(|| DEFAULT_AUTHORIZATION_KEY.into());
		let authorization_prefix =
			self.authorization_prefix.unwrap_or_else(|| DEFAULT_AUTHORIZATION_PREFIX.into());

		if !is_header_name(&authorization_key) {
			return Err(ConfigError::InvalidHeader { name: authorization_key });
		}
		if !authorization_prefix.bytes().all(|b| b == b' ' || b.is_ascii_graphic()) {
			return Err(ConfigError::InvalidPrefix { prefix: authorization_prefix });
		}

		Ok(ClientConfig {
			base_url,
			authorization_key,
			authorization_prefix,
			trailing_slash: self.trailing_slash,
		})
	}
}

/// Parses an absolute or scheme-relative base URL.
pub fn parse_base_url(value: &str) -> Result<Url, ConfigError> {
	let candidate =
		if value.starts_with("//") { format!("https:{value}") } else { value.to_owned() };

	Url::parse(&candidate)
		.map_err(|source| ConfigError::InvalidBaseUrl { value: value.to_owned(), source })
}

pub(crate) fn authorization_value(prefix: &str, token: &str) -> String {
	if prefix.is_empty() { token.to_owned() } else { format!("{prefix} {token}") }
}

fn is_header_name(name: &str) -> bool {
	!name.is_empty()
		&& name.bytes().all(|b| b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b))
}
