//! Lists a REST resource through an in-process API whose access tokens expire.
//!
//! 1. Implement [`HttpTransport`] so the demo runs without a network.
//! 2. Sign in with an already expired access token plus a refresh token.
//! 3. Issue [`AuthClient::get_with_verify`]; the `401` triggers the refresh callback, which
//!    exchanges the refresh token through a second [`RequestClient`] sharing the transport.
//! 4. Validate the replayed response with a [`schema::json`] schema.

// std
use std::sync::Arc;
// crates.io
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use color_eyre::Result;
use serde::Deserialize;
use serde_json::json;
use time::OffsetDateTime;
// self
use token_relay::{
	auth::{RefreshTokens, SignTokens},
	client::{ClientConfig, Query, RequestClient},
	flows::AuthClient,
	http::{HttpRequest, HttpResponse, HttpTransport, Method, TransportFuture},
	schema,
	url::Url,
};

const FRESH_TOKEN: &str = "fresh-access";

#[derive(Debug, Deserialize)]
struct Refreshed {
	access: String,
}

#[derive(Debug, Deserialize)]
struct Page {
	count: u32,
	results: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
	id: u32,
	name: String,
}

/// Accepts only [`FRESH_TOKEN`] and hands it out from `/user/token/refresh`.
struct DemoApi;
impl HttpTransport for DemoApi {
	fn execute(&self, request: HttpRequest) -> TransportFuture<'_> {
		let expected = format!("Bearer {FRESH_TOKEN}");
		let fresh = request.header("Authorization") == Some(expected.as_str());
		let response = match (request.method, request.url.path()) {
			(Method::Post, "/api/user/token/refresh") =>
				HttpResponse::new(200, json!({ "access": FRESH_TOKEN }).to_string()),
			(Method::Get, "/api/items/") if fresh => {
				let page = json!({
					"count": 2,
					"results": [{ "id": 1, "name": "lamp" }, { "id": 2, "name": "desk" }],
				});

				HttpResponse::new(200, page.to_string())
			},
			(Method::Get, "/api/items/") => HttpResponse::new(401, r#"{"detail":"token expired"}"#),
			_ => HttpResponse::new(404, ""),
		};

		println!("{} {} -> {}", request.method, request.url, response.status);

		Box::pin(async move { Ok(response) })
	}
}

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let transport = Arc::new(DemoApi);
	let config = ClientConfig::builder().base_url("//api.example.com/api").trailing_slash(true);
	let refresher = RequestClient::<DemoApi>::with_transport(
		ClientConfig::default(),
		Arc::clone(&transport),
	);
	let client = AuthClient::<DemoApi>::with_transport(config.build()?, transport).with_refresh_fn(
		move |tokens: RefreshTokens, base_url: Option<Url>| {
			let refresher = refresher.clone();

			async move {
				let base_url = base_url?;
				let url = format!("{}/user/token/refresh", base_url.as_str().trim_end_matches('/'));
				let body = json!({ "refresh": tokens.refresh.expose() });
				let schema = schema::json::<Refreshed>();
				let refreshed = refresher.post(&url, &body).parse(&schema).await.ok().flatten()?;

				Some(refreshed.access)
			}
		},
	);

	client.sign(SignTokens::both(expired_token(), "demo-refresh")).await?;

	let page = client
		.get_with_verify("/items", Query::new().pair("ordering", "name"))
		.validate(&schema::json::<Page>())
		.await?;

	println!("{} item(s):", page.count);

	for item in page.results {
		println!("  #{} {}", item.id, item.name);
	}

	println!(
		"refresh attempts={} successes={}",
		client.refresh_metrics.attempts(),
		client.refresh_metrics.successes()
	);

	Ok(())
}

fn expired_token() -> String {
	let exp = OffsetDateTime::now_utc().unix_timestamp() - 60;
	let payload = URL_SAFE_NO_PAD.encode(json!({ "sub": "demo", "exp": exp }).to_string());

	format!("eyJhbGciOiJub25lIn0.{payload}.")
}
