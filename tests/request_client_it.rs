mod common;

// std
use std::sync::Arc;
// crates.io
use serde::{Deserialize, Serialize};
use serde_json::json;
// self
use common::*;
use token_relay::{
	auth::TokenSecret,
	client::{ClientConfig, Query, RequestClient},
	error::Error,
	http::{HttpResponse, Method},
	schema,
};

#[derive(Debug, PartialEq, Deserialize)]
struct Item {
	id: u32,
	name: String,
}

#[derive(Serialize)]
struct NewItem<'a> {
	name: &'a str,
}

fn request_client(transport: &Arc<ScriptedTransport>) -> RequestClient<ScriptedTransport> {
	RequestClient::with_transport(config(), Arc::clone(transport))
}

#[tokio::test]
async fn authorization_header_is_read_when_the_request_is_sent() {
	let transport = ScriptedTransport::accepting("late");
	let client = request_client(&transport);
	let handle = client.get("/me", Query::new());

	client.set_access_token(Some(TokenSecret::new("late")));
	handle.response().await.expect("Token installed before the first poll should be sent.");

	assert_eq!(transport.authorizations(), vec![Some("Bearer late".to_owned())]);
}

#[tokio::test]
async fn empty_access_token_sends_no_header() {
	let transport = ScriptedTransport::new(|_| HttpResponse::new(200, "{}"));
	let client = request_client(&transport);

	client.set_access_token(Some(TokenSecret::new("")));

	assert!(client.access_token().is_none());

	client.get("/me", Query::new()).response().await.expect("Request should succeed.");

	assert_eq!(transport.authorizations(), vec![None]);
}

#[tokio::test]
async fn custom_header_and_empty_prefix_send_the_bare_token() {
	let transport = ScriptedTransport::new(|_| HttpResponse::new(204, ""));
	let config = ClientConfig::builder()
		.base_url(BASE_URL)
		.authorization_key("X-Api-Token")
		.authorization_prefix("")
		.build()
		.expect("Config should build.");
	let client = RequestClient::<ScriptedTransport>::with_transport(config, Arc::clone(&transport));

	client.set_access_token(Some(TokenSecret::new("raw")));
	client.delete("/session").response().await.expect("Delete should succeed.");

	let request = &transport.requests()[0];

	assert_eq!(request.header("X-Api-Token"), Some("raw"));
	assert_eq!(request.header("Authorization"), None);
	assert_eq!(request.method, Method::Delete);
}

#[tokio::test]
async fn trailing_slash_toggle_applies_to_later_requests() {
	let transport = ScriptedTransport::new(|_| HttpResponse::new(200, "{}"));
	let client = request_client(&transport);

	client.get("/items", [("page", "2")]).response().await.expect("Request should succeed.");
	client.set_trailing_slash(true);
	client.get("/items", [("page", "2")]).response().await.expect("Request should succeed.");
	client.get("/items/", Query::new()).response().await.expect("Request should succeed.");

	let urls: Vec<String> =
		transport.requests().iter().map(|request| request.url.to_string()).collect();

	assert_eq!(urls, vec![
		"https://api.example.com/v1/items?page=2",
		"https://api.example.com/v1/items/?page=2",
		"https://api.example.com/v1/items/",
	]);
}

#[tokio::test]
async fn rest_resource_maps_verbs_onto_paths() {
	let transport = ScriptedTransport::new(|_| HttpResponse::new(200, "{}"));
	let client = request_client(&transport);
	let items = client.rest("/items");

	items.get_all(Query::new().pair("q", "lamp")).response().await.expect("List should succeed.");
	items.get_by_id(7, Query::new()).response().await.expect("Detail should succeed.");
	items.create(&NewItem { name: "lamp" }).response().await.expect("Create should succeed.");
	items.update(7, &NewItem { name: "desk" }).response().await.expect("Update should succeed.");
	items
		.partial_update(7, &json!({ "name": "chair" }))
		.response()
		.await
		.expect("Partial update should succeed.");
	items.remove(7).response().await.expect("Remove should succeed.");

	let calls: Vec<(Method, String)> = transport
		.requests()
		.iter()
		.map(|request| (request.method, request.url.path().to_owned()))
		.collect();

	assert_eq!(calls, vec![
		(Method::Get, "/v1/items".to_owned()),
		(Method::Get, "/v1/items/7".to_owned()),
		(Method::Post, "/v1/items".to_owned()),
		(Method::Put, "/v1/items/7".to_owned()),
		(Method::Patch, "/v1/items/7".to_owned()),
		(Method::Delete, "/v1/items/7".to_owned()),
	]);

	let requests = transport.requests();

	assert_eq!(requests[0].url.query(), Some("q=lamp"));
	assert_eq!(requests[2].body, Some(json!({ "name": "lamp" })));
	assert_eq!(requests[4].body, Some(json!({ "name": "chair" })));
	assert_eq!(requests[5].body, None);
}

#[tokio::test]
async fn parse_distinguishes_invalid_payloads_from_failures() {
	let transport = ScriptedTransport::new(|request| match request.url.path() {
		"/v1/items/1" => HttpResponse::new(200, r#"{"id":1,"name":"lamp"}"#),
		"/v1/items/2" => HttpResponse::new(200, r#"{"id":"two"}"#),
		_ => HttpResponse::new(404, r#"{"error":"missing"}"#),
	});
	let client = request_client(&transport);
	let items = client.rest("/items");
	let item_schema = schema::json::<Item>();
	let found = items
		.get_by_id(1, Query::new())
		.parse(&item_schema)
		.await
		.expect("Valid payload should parse.");

	assert_eq!(found, Some(Item { id: 1, name: "lamp".into() }));

	let invalid = items
		.get_by_id(2, Query::new())
		.parse(&item_schema)
		.await
		.expect("Invalid payloads resolve to absence, not an error.");

	assert_eq!(invalid, None);

	let err = items
		.get_by_id(3, Query::new())
		.parse(&item_schema)
		.await
		.expect_err("Non-2xx statuses surface as errors.");

	assert!(matches!(err, Error::HttpStatus { status: 404, .. }));
}

#[tokio::test]
async fn clients_can_share_token_and_base_url() {
	let transport = ScriptedTransport::accepting("shared");
	let primary = request_client(&transport);
	let secondary = RequestClient::<ScriptedTransport>::with_transport(
		ClientConfig::default(),
		Arc::clone(&transport),
	);

	primary.set_access_token(Some(TokenSecret::new("shared")));
	secondary.sync_token(&primary);
	secondary.sync_base_url(&primary);
	secondary.get("/me", Query::new()).response().await.expect("Synced client should succeed.");

	assert_eq!(transport.requests()[0].url.as_str(), "https://api.example.com/v1/me");
	assert_eq!(transport.authorizations(), vec![Some("Bearer shared".to_owned())]);
}

#[tokio::test]
async fn absolute_urls_bypass_the_base_url() {
	let transport = ScriptedTransport::new(|_| HttpResponse::new(200, "{}"));
	let client = request_client(&transport);

	client
		.get("https://auth.example.com/token", Query::new())
		.response()
		.await
		.expect("Absolute request should succeed.");

	assert_eq!(transport.requests()[0].url.as_str(), "https://auth.example.com/token");
}
