mod common;

// std
use std::{
	sync::{
		Arc,
		atomic::{AtomicUsize, Ordering},
	},
	time::Duration,
};
// crates.io
use parking_lot::Mutex;
// self
use common::*;
use token_relay::{
	auth::{RefreshTokens, SignTokens},
	client::{CancelHandle, Query},
	error::Error,
	flows::SignOutcome,
	http::HttpResponse,
	url::Url,
};

async fn signed_client(
	transport: &Arc<ScriptedTransport>,
	log: &RefreshLog,
	access: &str,
	reply: &'static str,
) -> token_relay::flows::AuthClient<ScriptedTransport> {
	let client = with_refresh_reply(auth_client(transport), log, reply);

	client
		.sign(SignTokens::both(access, "refresh-1"))
		.await
		.expect("Signing in with both tokens should succeed.");

	client
}

#[tokio::test]
async fn expired_token_is_refreshed_and_replayed_once() {
	let transport = ScriptedTransport::accepting("new-token");
	let log = RefreshLog::default();
	let expired = expired_jwt();
	let client = signed_client(&transport, &log, &expired, "new-token").await;
	let response = client
		.get_with_verify("/protected", Query::new())
		.response()
		.await
		.expect("Replay with the refreshed token should succeed.");

	assert_eq!(response.status, 200);
	assert_eq!(log.calls(), 1);
	assert_eq!(transport.authorizations(), vec![
		Some(format!("Bearer {expired}")),
		Some("Bearer new-token".to_owned()),
	]);

	let (tokens, base_url) = log.last().expect("Callback input should be recorded.");

	assert_eq!(tokens.access.as_ref().map(|secret| secret.expose()), Some(expired.as_str()));
	assert_eq!(tokens.refresh.expose(), "refresh-1");
	assert_eq!(base_url.as_ref().map(Url::as_str), Some(BASE_URL));
	assert_eq!(client.access_token().as_ref().map(|secret| secret.expose()), Some("new-token"));
}

#[tokio::test]
async fn empty_refresh_result_surfaces_the_original_failure() {
	let transport = ScriptedTransport::accepting("never");
	let log = RefreshLog::default();
	let client = signed_client(&transport, &log, &expired_jwt(), "").await;
	let err = client
		.get_with_verify("/protected", Query::new())
		.response()
		.await
		.expect_err("Failed refresh must surface the first failure.");

	assert_eq!(err.status(), Some(401));
	assert_eq!(log.calls(), 1);
	assert_eq!(transport.request_count(), 1);
}

#[tokio::test]
async fn non_401_failures_are_not_refreshed() {
	let transport = ScriptedTransport::new(|_| HttpResponse::new(500, "boom"));
	let log = RefreshLog::default();
	let client = signed_client(&transport, &log, &expired_jwt(), "new-token").await;
	let err = client
		.get_with_verify("/protected", Query::new())
		.response()
		.await
		.expect_err("Server errors pass through unchanged.");

	match err {
		Error::HttpStatus { status, body } => {
			assert_eq!(status, 500);
			assert_eq!(body, b"boom".to_vec());
		},
		other => panic!("Unexpected error: {other:?}."),
	}

	assert_eq!(log.calls(), 0);
	assert_eq!(transport.request_count(), 1);
}

#[tokio::test]
async fn unexpired_token_is_not_refreshed_on_401() {
	let transport = ScriptedTransport::accepting("new-token");
	let log = RefreshLog::default();
	let client = signed_client(&transport, &log, &live_jwt(), "new-token").await;
	let err = client
		.get_with_verify("/protected", Query::new())
		.response()
		.await
		.expect_err("A 401 on a live token is not retried.");

	assert!(err.is_unauthorized());
	assert_eq!(log.calls(), 0);
	assert_eq!(transport.request_count(), 1);
}

#[tokio::test]
async fn millisecond_expiry_counts_as_unexpired() {
	let transport = ScriptedTransport::accepting("new-token");
	let log = RefreshLog::default();
	let millis = jwt_expiring_at(1_900_000_000_000);
	let client = signed_client(&transport, &log, &millis, "new-token").await;
	let err = client
		.get_with_verify("/protected", Query::new())
		.response()
		.await
		.expect_err("A far-future expiry is not retried.");

	assert!(err.is_unauthorized());
	assert_eq!(log.calls(), 0);
	assert_eq!(transport.request_count(), 1);
}

#[tokio::test]
async fn missing_refresh_token_skips_the_refresh() {
	let transport = ScriptedTransport::accepting("new-token");
	let log = RefreshLog::default();
	let client = with_refresh_reply(auth_client(&transport), &log, "new-token");

	client.sign(SignTokens::access(expired_jwt())).await.expect("Sign should succeed.");

	let err = client
		.get_with_verify("/protected", Query::new())
		.response()
		.await
		.expect_err("Without a refresh token the 401 is final.");

	assert!(err.is_unauthorized());
	assert_eq!(log.calls(), 0);
}

#[tokio::test]
async fn failed_replay_is_final() {
	let transport = ScriptedTransport::accepting("never");
	let log = RefreshLog::default();
	let client = signed_client(&transport, &log, &expired_jwt(), "still-rejected").await;
	let err = client
		.get_with_verify("/protected", Query::new())
		.response()
		.await
		.expect_err("Replay failure surfaces to the caller.");

	assert!(err.is_unauthorized());
	assert_eq!(log.calls(), 1);
	assert_eq!(transport.authorizations().last(), Some(&Some("Bearer still-rejected".to_owned())));
	assert_eq!(transport.request_count(), 2);
}

#[tokio::test]
async fn successful_first_attempt_never_refreshes() {
	let expired = expired_jwt();
	let transport = ScriptedTransport::accepting(&expired);
	let log = RefreshLog::default();
	let client = signed_client(&transport, &log, &expired, "new-token").await;

	client
		.get_with_verify("/protected", [("page", "1")])
		.response()
		.await
		.expect("First attempt should succeed.");

	assert_eq!(log.calls(), 0);
	assert_eq!(
		transport.requests()[0].url.as_str(),
		"https://api.example.com/v1/protected?page=1"
	);
}

#[tokio::test]
async fn concurrent_expiries_share_one_refresh() {
	let transport = ScriptedTransport::accepting("new-token");
	let calls = Arc::new(AtomicUsize::new(0));
	let counter = Arc::clone(&calls);
	let client = auth_client(&transport).with_refresh_fn(move |_: RefreshTokens, _: Option<Url>| {
		counter.fetch_add(1, Ordering::SeqCst);

		async {
			tokio::time::sleep(Duration::from_millis(20)).await;

			Some("new-token".to_owned())
		}
	});

	client
		.sign(SignTokens::both(expired_jwt(), "refresh-1"))
		.await
		.expect("Sign should succeed.");

	let (first, second) = tokio::join!(
		client.get_with_verify("/a", Query::new()).response(),
		client.get_with_verify("/b", Query::new()).response(),
	);

	first.expect("First verified request should succeed after the shared refresh.");
	second.expect("Second verified request should succeed after the shared refresh.");

	assert_eq!(calls.load(Ordering::SeqCst), 1);
	assert_eq!(client.refresh_metrics.successes(), 1);
	assert_eq!(client.refresh_metrics.coalesced(), 1);
	assert_eq!(transport.request_count(), 4);
}

#[tokio::test]
async fn cancel_before_dispatch_sends_nothing() {
	let transport = ScriptedTransport::accepting("new-token");
	let log = RefreshLog::default();
	let client = signed_client(&transport, &log, &expired_jwt(), "new-token").await;
	let handle = client.get_with_verify("/protected", Query::new());

	handle.cancel();

	assert!(matches!(handle.response().await, Err(Error::Cancelled)));
	assert_eq!(transport.request_count(), 0);
	assert_eq!(log.calls(), 0);
}

#[tokio::test]
async fn cancel_during_refresh_keeps_the_token_but_skips_the_replay() {
	let transport = ScriptedTransport::accepting("new-token");
	let pending: Arc<Mutex<Option<CancelHandle>>> = Default::default();
	let cancel_slot = Arc::clone(&pending);
	let client = auth_client(&transport).with_refresh_fn(move |_: RefreshTokens, _: Option<Url>| {
		if let Some(cancel) = cancel_slot.lock().take() {
			cancel.cancel();
		}

		async { Some("new-token".to_owned()) }
	});

	client
		.sign(SignTokens::both(expired_jwt(), "refresh-1"))
		.await
		.expect("Sign should succeed.");

	let handle = client.get_with_verify("/protected", Query::new());

	*pending.lock() = Some(handle.cancel_handle());

	assert!(matches!(handle.response().await, Err(Error::Cancelled)));
	assert_eq!(transport.request_count(), 1);
	assert_eq!(client.access_token().as_ref().map(|secret| secret.expose()), Some("new-token"));
}

#[tokio::test]
async fn sign_with_a_new_refresh_token_does_not_reuse_a_failed_refresh() {
	let transport = ScriptedTransport::accepting("new-token");
	let seen: Arc<Mutex<Vec<String>>> = Default::default();
	let recorder = Arc::clone(&seen);
	let client = auth_client(&transport).with_refresh_fn(
		move |tokens: RefreshTokens, _: Option<Url>| {
			let accepted = tokens.refresh.expose() == "good-refresh";

			recorder.lock().push(tokens.refresh.expose().to_owned());

			async move {
				tokio::time::sleep(Duration::from_millis(20)).await;

				accepted.then(|| "new-token".to_owned())
			}
		},
	);

	client
		.sign(SignTokens::both(expired_jwt(), "revoked-refresh"))
		.await
		.expect("Sign should succeed.");

	let (verified, signed) = tokio::join!(
		client.get_with_verify("/protected", Query::new()).response(),
		client.sign(SignTokens::refresh("good-refresh")),
	);

	assert!(verified.expect_err("Revoked refresh token cannot recover.").is_unauthorized());
	assert_eq!(signed.expect("Sign should succeed."), SignOutcome::Refreshed);
	assert_eq!(*seen.lock(), vec!["revoked-refresh".to_owned(), "good-refresh".to_owned()]);
	assert_eq!(client.refresh_metrics.coalesced(), 0);
	assert_eq!(client.access_token().as_ref().map(|secret| secret.expose()), Some("new-token"));
}
