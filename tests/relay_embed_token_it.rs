// crates.io
use axum::{
	Router,
	body::Body,
	http::{Request, StatusCode, header},
};
use httpmock::prelude::*;
use serde_json::{Value, json};
use tower::ServiceExt;
// self
use powerbi_embed_relay::{
	_preludet::*,
	flows::Exchanger,
	relay::{EmbedBearer, Relay},
};

const GENERATE_TOKEN_PATH: &str = "/v1.0/myorg/groups/ws-42/reports/rep-7/GenerateToken";
const COMMON_TOKEN_PATH: &str = "/authority/common/oauth2/v2.0/token";

fn post_json(uri: &str, bearer: Option<&str>, body: Value) -> Request<Body> {
	let mut builder = Request::post(uri).header(header::CONTENT_TYPE, "application/json");

	if let Some(bearer) = bearer {
		builder = builder.header(header::AUTHORIZATION, format!("Bearer {bearer}"));
	}

	builder.body(Body::from(body.to_string())).expect("Test request should build.")
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
	let response = router.oneshot(request).await.expect("Router should always respond.");
	let status = response.status();
	let body = axum::body::to_bytes(response.into_body(), usize::MAX)
		.await
		.expect("Response body should be readable.");

	(status, serde_json::from_slice(&body).expect("Response body should be JSON."))
}

fn target() -> Value {
	json!({ "groupId": "ws-42", "reportId": "rep-7" })
}

#[tokio::test]
async fn embed_token_uses_header_bearer_and_view_access() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path(GENERATE_TOKEN_PATH)
				.header("authorization", "Bearer caller-token")
				.json_body(json!({ "accessLevel": "view", "allowSaveAs": false }));
			then.status(200).header("content-type", "application/json").json_body(json!({
				"token": "embed-token",
				"tokenId": "4b76f5ed",
				"expiration": "2024-05-01T10:00:00Z"
			}));
		})
		.await;
	let router = build_test_relay(&server.base_url(), EmbedBearer::Forwarded).router();
	let (status, body) =
		send(router, post_json("/embed-token", Some("caller-token"), target())).await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(
		body,
		json!({
			"accessToken": "caller-token",
			"embedToken": "embed-token",
			"expiration": "2024-05-01T10:00:00Z"
		})
	);

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn embed_token_falls_back_to_body_bearer() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path(GENERATE_TOKEN_PATH)
				.header("authorization", "Bearer body-token");
			then.status(200)
				.header("content-type", "application/json")
				.json_body(json!({ "token": "embed-token" }));
		})
		.await;
	let router = build_test_relay(&server.base_url(), EmbedBearer::Forwarded).router();
	let mut request = target();

	request["action"] = json!("embed_token");
	request["accessToken"] = json!("body-token");

	let (status, body) = send(router, post_json("/", None, request)).await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["accessToken"], "body-token");
	assert_eq!(body["embedToken"], "embed-token");
	assert!(body.get("expiration").is_none());

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn embed_token_requires_target_and_bearer() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path(GENERATE_TOKEN_PATH);
			then.status(200)
				.header("content-type", "application/json")
				.json_body(json!({ "token": "unused" }));
		})
		.await;
	let router = build_test_relay(&server.base_url(), EmbedBearer::Forwarded).router();
	let (status, body) = send(
		router.clone(),
		post_json("/embed-token", Some("caller-token"), json!({ "groupId": "ws-42" })),
	)
	.await;

	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(body["error"], "Missing required fields: reportId.");

	let (status, body) = send(router, post_json("/embed-token", None, target())).await;

	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert!(body["error"].as_str().is_some_and(|message| message.contains("bearer")));

	mock.assert_calls_async(0).await;
}

#[tokio::test]
async fn repeated_requests_are_not_cached() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path(GENERATE_TOKEN_PATH);
			then.status(200)
				.header("content-type", "application/json")
				.json_body(json!({ "token": "embed-token" }));
		})
		.await;
	let router = build_test_relay(&server.base_url(), EmbedBearer::Forwarded).router();

	for _ in 0..2 {
		let (status, _) =
			send(router.clone(), post_json("/embed-token", Some("caller-token"), target())).await;

		assert_eq!(status, StatusCode::OK);
	}

	mock.assert_calls_async(2).await;
}

#[tokio::test]
async fn reporting_api_rejection_propagates_status_and_message() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(POST).path(GENERATE_TOKEN_PATH);
			then.status(403).header("content-type", "application/json").json_body(json!({
				"error": {
					"code": "PowerBINotAuthorizedException",
					"message": "The service principal is not a workspace member."
				}
			}));
		})
		.await;

	let router = build_test_relay(&server.base_url(), EmbedBearer::Forwarded).router();
	let (status, body) =
		send(router, post_json("/embed-token", Some("caller-token"), target())).await;

	assert_eq!(status, StatusCode::FORBIDDEN);
	assert_eq!(
		body["error"],
		"Failed to generate embed token: The service principal is not a workspace member."
	);
}

#[tokio::test]
async fn malformed_success_body_is_a_bad_gateway() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(POST).path(GENERATE_TOKEN_PATH);
			then.status(200)
				.header("content-type", "application/json")
				.json_body(json!({ "tokenId": "missing-token" }));
		})
		.await;

	let router = build_test_relay(&server.base_url(), EmbedBearer::Forwarded).router();
	let (status, body) =
		send(router, post_json("/embed-token", Some("caller-token"), target())).await;

	assert_eq!(status, StatusCode::BAD_GATEWAY);
	assert!(body["error"].as_str().is_some_and(|message| message.contains("malformed JSON")));
}

#[tokio::test]
async fn server_credentials_exchange_before_generating() {
	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path(COMMON_TOKEN_PATH)
				.form_urlencoded_tuple("grant_type", "client_credentials")
				.form_urlencoded_tuple("client_id", "relay-app")
				.form_urlencoded_tuple("client_secret", "relay-secret");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"server-token\",\"token_type\":\"Bearer\",\"expires_in\":3599}",
			);
		})
		.await;
	let embed_mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path(GENERATE_TOKEN_PATH)
				.header("authorization", "Bearer server-token");
			then.status(200)
				.header("content-type", "application/json")
				.json_body(json!({ "token": "embed-token" }));
		})
		.await;
	let policy =
		EmbedBearer::ServerCredentials(test_server_credentials("relay-app", "relay-secret"));
	let router = build_test_relay(&server.base_url(), policy).router();
	let (status, body) =
		send(router, post_json("/embed-token", Some("ignored-caller-token"), target())).await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["accessToken"], "server-token");
	assert_eq!(body["embedToken"], "embed-token");

	token_mock.assert_calls_async(1).await;
	embed_mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn report_list_forwards_bearer() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/v1.0/myorg/groups/ws-42/reports")
				.header("authorization", "Bearer caller-token");
			then.status(200).header("content-type", "application/json").json_body(json!({
				"@odata.context": "https://api.powerbi.com/v1.0/myorg/$metadata#reports",
				"value": [{
					"id": "rep-7",
					"name": "Sales",
					"embedUrl": "https://app.powerbi.com/reportEmbed?reportId=rep-7",
					"webUrl": "https://app.powerbi.com/groups/ws-42/reports/rep-7",
					"datasetId": "ds-1"
				}]
			}));
		})
		.await;
	let router = build_test_relay(&server.base_url(), EmbedBearer::Forwarded).router();
	let request = Request::get("/groups/ws-42/reports")
		.header(header::AUTHORIZATION, "Bearer caller-token")
		.body(Body::empty())
		.expect("Test request should build.");
	let (status, body) = send(router, request).await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["reports"][0]["id"], "rep-7");
	assert_eq!(body["reports"][0]["datasetId"], "ds-1");

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn dot_segment_identifiers_are_rejected_without_upstream_calls() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.any_request();
			then.status(200)
				.header("content-type", "application/json")
				.json_body(json!({ "token": "unused" }));
		})
		.await;
	let router = build_test_relay(&server.base_url(), EmbedBearer::Forwarded).router();
	let target = json!({ "groupId": "..", "reportId": "." });
	let (status, body) =
		send(router, post_json("/embed-token", Some("caller-token"), target)).await;

	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(body["error"], "Group identifier cannot be `.` or `..`.");

	mock.assert_calls_async(0).await;
}

#[tokio::test]
async fn reporting_api_timeout_maps_to_gateway_timeout() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(POST).path(GENERATE_TOKEN_PATH);
			then.status(200)
				.delay(StdDuration::from_secs(3))
				.header("content-type", "application/json")
				.json_body(json!({ "token": "late" }));
		})
		.await;

	let exchanger = Exchanger::new(
		test_descriptor(&server.base_url()),
		test_reqwest_http_client_with_timeout(StdDuration::from_millis(200)),
	);
	let router = Relay::new(exchanger, EmbedBearer::Forwarded).router();
	let (status, body) =
		send(router, post_json("/embed-token", Some("caller-token"), target())).await;

	assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
	assert_eq!(body["error"], "The reporting API did not respond before the timeout.");
}

#[tokio::test]
async fn report_list_requires_bearer() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/v1.0/myorg/groups/ws-42/reports");
			then.status(200).header("content-type", "application/json").json_body(json!({
				"value": []
			}));
		})
		.await;
	let router = build_test_relay(&server.base_url(), EmbedBearer::Forwarded).router();
	let request =
		Request::get("/groups/ws-42/reports").body(Body::empty()).expect("Request should build.");
	let (status, body) = send(router, request).await;

	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert!(body["error"].as_str().is_some_and(|message| message.contains("bearer")));

	mock.assert_calls_async(0).await;
}
