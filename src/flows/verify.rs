//! GET with transparent refresh-and-replay.
//!
//! A failed first attempt is retried only when all of the following hold, checked in order:
//! a refresh token is persisted, the failure was a `401`, an access token is installed, that
//! token is not provably unexpired, and a refresh callback is configured. Tokens whose payload
//! cannot be decoded count as expired. The refresh runs at most once and the request is
//! replayed at most once; whatever the replay yields is final.

// self
use crate::{
	_prelude::*,
	auth::{self, RawClaims, RefreshTokens},
	client::{CancelHandle, Query, RequestSpec, ResponseHandle},
	flows::AuthClient,
	http::{HttpTransport, Method},
	obs::{self, FlowKind},
};

impl<T> AuthClient<T>
where
	T: ?Sized + HttpTransport,
{
	/// Issues `GET url` and, when it fails because the access token expired, refreshes once and
	/// replays once.
	///
	/// Cancelling the returned handle aborts whichever request is in flight. An in-progress
	/// refresh is left to finish so other callers can reuse it, but no replay is sent.
	pub fn get_with_verify(&self, url: &str, params: impl Into<Query>) -> ResponseHandle {
		let spec = RequestSpec::new(Method::Get, url).with_params(params);
		let cancel = CancelHandle::default();
		let stages = cancel.clone();
		let this = self.clone();
		let flow = obs::observe(FlowKind::VerifiedRequest, "get_with_verify", async move {
			let error = match stages.guard(this.client.dispatch(spec.clone())).await {
				Ok(response) => return Ok(response),
				Err(e) => e,
			};
			let Some(tokens) = this.refresh_candidate(&error, OffsetDateTime::now_utc()) else {
				return Err(error);
			};

			if !this.refresh_access_token(tokens).await {
				return Err(error);
			}

			stages.guard(this.client.dispatch(spec)).await
		});

		ResponseHandle::new(Box::pin(flow), cancel)
	}

	/// Decides whether `error` warrants a refresh, returning the tokens to refresh with.
	pub(crate) fn refresh_candidate(
		&self,
		error: &Error,
		now: OffsetDateTime,
	) -> Option<RefreshTokens> {
		let refresh = match self.tokens.refresh_secret() {
			Ok(Some(refresh)) => refresh,
			Ok(None) => {
				obs::flow_debug!("No refresh token is persisted; not refreshing.");

				return None;
			},
			Err(_e) => {
				obs::flow_warn!(error = %_e, "Refresh token could not be read; not refreshing.");

				return None;
			},
		};

		if !error.is_unauthorized() {
			obs::flow_debug!(status = ?error.status(), "Failure is not a 401; not refreshing.");

			return None;
		}

		let Some(access) = self.client.access_token() else {
			obs::flow_debug!("No access token is installed; not refreshing.");

			return None;
		};
		let unexpired = auth::decode::<RawClaims>(access.expose())
			.is_some_and(|payload| payload.exp.is_some() && !payload.is_expired_at(now));

		if unexpired {
			obs::flow_debug!("Access token is not expired; not refreshing.");

			return None;
		}
		if self.refresh_callback.is_none() {
			obs::flow_warn!("No refresh callback is configured; not refreshing.");

			return None;
		}

		Some(RefreshTokens::new(Some(access), refresh))
	}
}
