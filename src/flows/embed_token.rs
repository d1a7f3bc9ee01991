//! Report-scoped embed token issuance through the reporting API's `GenerateToken` call.

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, EmbedTarget, EmbedToken},
	flows::{Exchanger, common},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
};

/// Request body sent to `GenerateToken`; the relay only issues view-only tokens.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateTokenRequest {
	access_level: &'static str,
	allow_save_as: bool,
}
impl GenerateTokenRequest {
	const VIEW: Self = Self { access_level: "view", allow_save_as: false };
}

impl Exchanger {
	/// Issues a view-only embed token for `target` using `bearer`.
	pub async fn generate_embed_token(
		&self,
		target: &EmbedTarget,
		bearer: &AccessToken,
	) -> Result<EmbedToken> {
		const KIND: FlowKind = FlowKind::EmbedToken;

		let span = FlowSpan::new(KIND, "generate_embed_token");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let url = self.descriptor.generate_token_endpoint(target)?;

				tracing::debug!(%target, "requesting embed token");

				let request = self
					.http_client
					.post(url)
					.bearer_auth(bearer.expose())
					.json(&GenerateTokenRequest::VIEW);

				common::send_reporting_request(request, "Failed to generate embed token").await
			})
			.await;

		common::record_result(KIND, &result);

		result
	}
}
