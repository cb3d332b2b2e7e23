//! Sign-in and single-flight access-token refresh.
//!
//! [`AuthClient::sign`] installs tokens and falls back to the refresh callback when only a
//! refresh token is known. Every refresh funnels through one async mutex shared by a client
//! and its clones: a caller that waited behind an in-flight refresh of the same refresh token
//! reuses its outcome instead of invoking the callback again.

mod metrics;

pub use metrics::RefreshMetrics;

// std
use std::sync::atomic::{AtomicU64, Ordering};
// self
use crate::{
	_prelude::*,
	auth::{RefreshTokens, SignTokens, TokenSecret},
	flows::AuthClient,
	http::HttpTransport,
	obs::{self, FlowKind},
};

/// Result of [`AuthClient::sign`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SignOutcome {
	/// An access token was supplied and installed.
	Signed,
	/// No access token was supplied; the refresh callback produced one.
	Refreshed,
	/// No access token was supplied and the refresh callback did not produce one.
	RefreshFailed,
	/// Neither token was supplied nor persisted.
	NoTokens,
}
impl SignOutcome {
	/// Returns `true` when an access token is installed afterwards.
	pub fn is_signed_in(self) -> bool {
		matches!(self, SignOutcome::Signed | SignOutcome::Refreshed)
	}
}

#[derive(Debug, Default)]
pub(crate) struct SingleFlight {
	generation: AtomicU64,
	last_flight: AsyncMutex<LastFlight>,
}
impl SingleFlight {
	fn generation(&self) -> u64 {
		self.generation.load(Ordering::Acquire)
	}
}

// Refresh token the most recent flight exchanged, and whether it produced an access token.
#[derive(Debug, Default)]
struct LastFlight {
	refresh: Option<TokenSecret>,
	outcome: bool,
}

impl<T> AuthClient<T>
where
	T: ?Sized + HttpTransport,
{
	/// Installs `tokens`.
	///
	/// A supplied access token is installed and a supplied refresh token is persisted. When no
	/// access token is supplied, the supplied (or else the persisted) refresh token is exchanged
	/// through the refresh callback.
	pub async fn sign(&self, tokens: SignTokens) -> Result<SignOutcome> {
		obs::observe(FlowKind::Sign, "sign", self.install(tokens)).await
	}

	async fn install(&self, tokens: SignTokens) -> Result<SignOutcome> {
		let SignTokens { access, refresh } = tokens.normalized();

		if let Some(access) = &access {
			self.client.set_access_token(Some(access.clone()));
		}
		if let Some(refresh) = &refresh {
			self.tokens.set_refresh_token(refresh.expose())?;
		}
		if access.is_some() {
			return Ok(SignOutcome::Signed);
		}

		let refresh = match refresh {
			Some(refresh) => refresh,
			None => match self.tokens.refresh_secret()? {
				Some(stored) => stored,
				None => return Ok(SignOutcome::NoTokens),
			},
		};

		if self.refresh_access_token(RefreshTokens::new(None, refresh)).await {
			Ok(SignOutcome::Refreshed)
		} else {
			Ok(SignOutcome::RefreshFailed)
		}
	}

	/// Refreshes the access token from the installed access token and the persisted refresh
	/// token.
	///
	/// Returns `false` without calling the refresh callback when either token is missing.
	pub async fn refresh(&self) -> bool {
		let Some(access) = self.client.access_token() else {
			obs::flow_warn!("No access token is installed; skipping refresh.");

			return false;
		};
		let refresh = match self.tokens.refresh_secret() {
			Ok(Some(refresh)) => refresh,
			Ok(None) => {
				obs::flow_warn!("No refresh token is persisted; skipping refresh.");

				return false;
			},
			Err(_e) => {
				obs::flow_warn!(error = %_e, "Refresh token could not be read; skipping refresh.");

				return false;
			},
		};

		self.refresh_access_token(RefreshTokens::new(Some(access), refresh)).await
	}

	/// Invokes the refresh callback once and installs the access token it returns.
	///
	/// Concurrent callers are serialized. A caller that queued behind a refresh of the same
	/// refresh token completed meanwhile, or whose access token was already replaced, reuses
	/// that result without invoking the callback.
	pub(crate) async fn refresh_access_token(&self, tokens: RefreshTokens) -> bool {
		let Some(callback) = self.refresh_callback.clone() else {
			obs::flow_warn!("No refresh callback is configured; skipping refresh.");

			return false;
		};

		obs::observe(FlowKind::Refresh, "refresh_access_token", async move {
			self.refresh_metrics.record_attempt();

			let observed = self.single_flight.generation();
			let mut last_flight = self.single_flight.last_flight.lock().await;

			if self.single_flight.generation() != observed
				&& last_flight.refresh.as_ref() == Some(&tokens.refresh)
			{
				self.refresh_metrics.record_coalesced();

				return last_flight.outcome;
			}
			if let Some(stale) = &tokens.access {
				let replaced = self.client.access_token().is_some_and(|current| current != *stale);

				if replaced {
					self.refresh_metrics.record_coalesced();

					return true;
				}
			}

			let refresh = tokens.refresh.clone();
			let access = callback
				.refresh(tokens, self.client.base_url())
				.await
				.filter(|access| !access.is_empty());
			let outcome = match access {
				Some(access) => {
					self.client.set_access_token(Some(TokenSecret::new(access)));
					self.refresh_metrics.record_success();

					true
				},
				None => {
					obs::flow_warn!("Refresh callback did not return an access token.");
					self.refresh_metrics.record_failure();

					false
				},
			};

			*last_flight = LastFlight { refresh: Some(refresh), outcome };

			self.single_flight.generation.fetch_add(1, Ordering::AcqRel);

			outcome
		})
		.await
	}
}
