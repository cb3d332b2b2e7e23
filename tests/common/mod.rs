#![allow(dead_code)]

// std
use std::sync::Arc;
// crates.io
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use parking_lot::Mutex;
use time::OffsetDateTime;
// self
use token_relay::{
	auth::RefreshTokens,
	client::ClientConfig,
	flows::AuthClient,
	http::{HttpRequest, HttpResponse, HttpTransport, TransportFuture},
	url::Url,
};

pub const BASE_URL: &str = "https://api.example.com/v1";

type Responder = Box<dyn Fn(&HttpRequest) -> HttpResponse + Send + Sync>;

/// In-process transport that answers through a closure and records every request it sees.
pub struct ScriptedTransport {
	responder: Responder,
	requests: Mutex<Vec<HttpRequest>>,
}
impl ScriptedTransport {
	pub fn new(
		responder: impl 'static + Send + Sync + Fn(&HttpRequest) -> HttpResponse,
	) -> Arc<Self> {
		Arc::new(Self { responder: Box::new(responder), requests: Mutex::new(Vec::new()) })
	}

	/// Answers `200 {}` only when the request carries `Bearer {token}`, `401` otherwise.
	pub fn accepting(token: &str) -> Arc<Self> {
		let expected = format!("Bearer {token}");

		Self::new(move |request| {
			if request.header("Authorization") == Some(expected.as_str()) {
				HttpResponse::new(200, r#"{"ok":true}"#)
			} else {
				HttpResponse::new(401, r#"{"error":"unauthorized"}"#)
			}
		})
	}

	pub fn requests(&self) -> Vec<HttpRequest> {
		self.requests.lock().clone()
	}

	pub fn request_count(&self) -> usize {
		self.requests.lock().len()
	}

	pub fn authorizations(&self) -> Vec<Option<String>> {
		self.requests
			.lock()
			.iter()
			.map(|request| request.header("Authorization").map(str::to_owned))
			.collect()
	}
}
impl HttpTransport for ScriptedTransport {
	fn execute(&self, request: HttpRequest) -> TransportFuture<'_> {
		let response = (self.responder)(&request);

		self.requests.lock().push(request);

		Box::pin(async move { Ok(response) })
	}
}

pub fn config() -> ClientConfig {
	ClientConfig::builder().base_url(BASE_URL).build().expect("Fixture config should build.")
}

pub fn auth_client(transport: &Arc<ScriptedTransport>) -> AuthClient<ScriptedTransport> {
	AuthClient::with_transport(config(), Arc::clone(transport))
}

/// Builds an unsigned JWT whose payload carries `exp` as Unix seconds.
pub fn jwt_expiring_at(exp: i64) -> String {
	let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
	let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"sub":"user-1","exp":{exp}}}"#));

	format!("{header}.{payload}.c2lnbmF0dXJl")
}

pub fn expired_jwt() -> String {
	jwt_expiring_at(OffsetDateTime::now_utc().unix_timestamp() - 3_600)
}

pub fn live_jwt() -> String {
	jwt_expiring_at(OffsetDateTime::now_utc().unix_timestamp() + 3_600)
}

/// Records every refresh-callback invocation.
#[derive(Clone, Default)]
pub struct RefreshLog(Arc<Mutex<Vec<(RefreshTokens, Option<Url>)>>>);
impl RefreshLog {
	pub fn calls(&self) -> usize {
		self.0.lock().len()
	}

	pub fn last(&self) -> Option<(RefreshTokens, Option<Url>)> {
		self.0.lock().last().cloned()
	}

	fn record(&self, tokens: RefreshTokens, base_url: Option<Url>) {
		self.0.lock().push((tokens, base_url));
	}
}

/// Installs a refresh callback that logs its input and answers `reply`.
pub fn with_refresh_reply(
	client: AuthClient<ScriptedTransport>,
	log: &RefreshLog,
	reply: &'static str,
) -> AuthClient<ScriptedTransport> {
	let log = log.clone();

	client.with_refresh_fn(move |tokens: RefreshTokens, base_url: Option<Url>| {
		log.record(tokens, base_url);

		async move { Some(reply.to_owned()) }
	})
}
