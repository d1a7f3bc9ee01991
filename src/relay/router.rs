//! axum surface of the relay.

// crates.io
use axum::{
	Json, Router,
	body::Bytes,
	extract::{
		Path, State,
		rejection::{BytesRejection, PathRejection},
	},
	http::{
		HeaderMap, HeaderName, HeaderValue, Method, Uri,
		header::{ACCESS_CONTROL_ALLOW_HEADERS, AUTHORIZATION, CONTENT_TYPE},
	},
	routing::{get, post},
};
use tokio::net::TcpListener;
use tower_http::{
	cors::{Any, CorsLayer},
	set_header::SetResponseHeaderLayer,
	trace::TraceLayer,
};
// self
use crate::{
	_prelude::*,
	error::{ConfigError, ValidationError},
	relay::{
		CredentialExchangeRequest, CredentialExchangeResponse, EmbedTokenRequest,
		EmbedTokenResponse, HealthResponse, Relay, RelayRequest, RelayResponse,
		ReportListResponse, request,
	},
};

/// Request headers browsers may send cross-origin.
pub const ALLOWED_HEADERS: &str = "authorization, x-client-info, apikey, content-type";

impl Relay {
	/// Builds the HTTP router.
	///
	/// | Route                          | Operation                              |
	/// |--------------------------------|----------------------------------------|
	/// | `POST /`                       | dispatch on `action`                   |
	/// | `POST /token`                  | [`Relay::credential_exchange`]         |
	/// | `POST /embed-token`            | [`Relay::embed_token`]                 |
	/// | `GET /groups/{group_id}/reports` | [`Relay::list_reports`]              |
	/// | `GET /health`                  | liveness                               |
	///
	/// `OPTIONS` on any path is answered by the CORS layer before routing.
	pub fn router(self) -> Router {
		Router::new()
			.route("/", post(dispatch))
			.route("/token", post(credential_exchange))
			.route("/embed-token", post(embed_token))
			.route("/groups/{group_id}/reports", get(list_reports))
			.route("/health", get(health))
			.method_not_allowed_fallback(method_not_allowed)
			.fallback(unknown_route)
			.with_state(self)
			.layer(TraceLayer::new_for_http())
			.layer(SetResponseHeaderLayer::if_not_present(
				ACCESS_CONTROL_ALLOW_HEADERS,
				HeaderValue::from_static(ALLOWED_HEADERS),
			))
			.layer(cors_layer())
	}

	/// Serves the router on `listener` until `shutdown` resolves, then drains in-flight
	/// requests.
	pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> Result<(), ConfigError>
	where
		F: 'static + Send + Future<Output = ()>,
	{
		tracing::info!(addr = %listener.local_addr()?, "relay listening");

		axum::serve(listener, self.router()).with_graceful_shutdown(shutdown).await?;

		tracing::info!("relay stopped");

		Ok(())
	}
}

fn cors_layer() -> CorsLayer {
	CorsLayer::new()
		.allow_origin(Any)
		.allow_methods([Method::GET, Method::POST, Method::OPTIONS])
		.allow_headers([
			AUTHORIZATION,
			HeaderName::from_static("x-client-info"),
			HeaderName::from_static("apikey"),
			CONTENT_TYPE,
		])
}

/// Turns an extractor rejection into a JSON-rendered validation error.
fn body_bytes(body: Result<Bytes, BytesRejection>) -> Result<Bytes, ValidationError> {
	body.map_err(|e| ValidationError::InvalidBody { reason: e.body_text() })
}

fn authorization(headers: &HeaderMap) -> Option<&str> {
	headers.get(AUTHORIZATION).and_then(|value| value.to_str().ok())
}

async fn dispatch(
	State(relay): State<Relay>,
	headers: HeaderMap,
	body: Result<Bytes, BytesRejection>,
) -> Result<RelayResponse> {
	let request = request::parse_body::<RelayRequest>(&body_bytes(body)?)?;

	relay.dispatch(request, authorization(&headers)).await
}

async fn credential_exchange(
	State(relay): State<Relay>,
	body: Result<Bytes, BytesRejection>,
) -> Result<Json<CredentialExchangeResponse>> {
	let request = request::parse_body::<CredentialExchangeRequest>(&body_bytes(body)?)?;

	relay.credential_exchange(request).await.map(Json)
}

async fn embed_token(
	State(relay): State<Relay>,
	headers: HeaderMap,
	body: Result<Bytes, BytesRejection>,
) -> Result<Json<EmbedTokenResponse>> {
	let request = request::parse_body::<EmbedTokenRequest>(&body_bytes(body)?)?;

	relay.embed_token(request, authorization(&headers)).await.map(Json)
}

async fn list_reports(
	State(relay): State<Relay>,
	group_id: Result<Path<String>, PathRejection>,
	headers: HeaderMap,
) -> Result<Json<ReportListResponse>> {
	let Path(group_id) =
		group_id.map_err(|e| ValidationError::InvalidPath { reason: e.body_text() })?;

	relay.list_reports(&group_id, authorization(&headers)).await.map(Json)
}

async fn health() -> Json<HealthResponse> {
	Json(HealthResponse::OK)
}

async fn method_not_allowed(method: Method) -> Error {
	Error::UnsupportedRequest { method: method.to_string() }
}

async fn unknown_route(uri: Uri) -> Error {
	Error::UnknownRoute { path: uri.path().to_owned() }
}
