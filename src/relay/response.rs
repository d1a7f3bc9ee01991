//! Success payloads returned by the relay.

// crates.io
use axum::{
	Json,
	response::{IntoResponse, Response},
};
// self
use crate::{
	_prelude::*,
	auth::{GroupId, TokenSecret},
	flows::Report,
};

/// Body returned by a successful credential exchange.
///
/// Field names stay snake_case on the wire.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CredentialExchangeResponse {
	/// Bearer token issued by the identity provider.
	pub access_token: TokenSecret,
	/// Workspace echoed from the request.
	pub workspace_id: GroupId,
}

/// Body returned by a successful embed token request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbedTokenResponse {
	/// Bearer used for the `GenerateToken` call.
	pub access_token: TokenSecret,
	/// Report-scoped embed token.
	pub embed_token: TokenSecret,
	/// Upstream expiration, informational only.
	#[serde(skip_serializing_if = "Option::is_none", with = "time::serde::rfc3339::option")]
	pub expiration: Option<OffsetDateTime>,
}

/// Body returned by the report-list passthrough.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ReportListResponse {
	/// Reports in the workspace.
	pub reports: Vec<Report>,
}

/// Body returned by `GET /health`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
	/// Always `"ok"`.
	pub status: &'static str,
}
impl HealthResponse {
	/// The only health payload.
	pub const OK: Self = Self { status: "ok" };
}

/// Success payload of the multiplexed `POST /` route.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RelayResponse {
	/// Credential exchange result.
	CredentialExchange(CredentialExchangeResponse),
	/// Embed token result.
	EmbedToken(EmbedTokenResponse),
}
impl IntoResponse for RelayResponse {
	fn into_response(self) -> Response {
		Json(self).into_response()
	}
}
