//! Token bundles passed into [`AuthClient::sign`](crate::flows::AuthClient::sign) and handed to
//! refresh callbacks.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Tokens supplied to [`AuthClient::sign`](crate::flows::AuthClient::sign).
///
/// Empty strings are treated the same as absent values.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SignTokens {
	/// Access token to install immediately.
	pub access: Option<TokenSecret>,
	/// Refresh token to persist.
	pub refresh: Option<TokenSecret>,
}
impl SignTokens {
	/// Signs in with an access token only.
	pub fn access(access: impl Into<String>) -> Self {
		Self { access: non_empty(access), refresh: None }
	}

	/// Signs in with a refresh token only; an access token is obtained through the refresh
	/// callback.
	pub fn refresh(refresh: impl Into<String>) -> Self {
		Self { access: None, refresh: non_empty(refresh) }
	}

	/// Signs in with both tokens.
	pub fn both(access: impl Into<String>, refresh: impl Into<String>) -> Self {
		Self { access: non_empty(access), refresh: non_empty(refresh) }
	}

	/// Resumes from the persisted refresh token, if any.
	pub fn resume() -> Self {
		Self::default()
	}

	pub(crate) fn normalized(self) -> Self {
		Self {
			access: self.access.filter(|secret| !secret.expose().is_empty()),
			refresh: self.refresh.filter(|secret| !secret.expose().is_empty()),
		}
	}
}

/// Token pair handed to a [`RefreshCallback`](crate::flows::RefreshCallback).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RefreshTokens {
	/// Access token in use when the refresh was triggered, if one was installed.
	pub access: Option<TokenSecret>,
	/// Refresh token to exchange.
	pub refresh: TokenSecret,
}
impl RefreshTokens {
	/// Creates a pair from its parts.
	pub fn new(access: Option<TokenSecret>, refresh: TokenSecret) -> Self {
		Self { access, refresh }
	}
}

fn non_empty(value: impl Into<String>) -> Option<TokenSecret> {
	let value = value.into();

	(!value.is_empty()).then(|| TokenSecret::new(value))
}
