//! Client-credentials exchange against the identity provider's tenant token endpoint.

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, Credentials},
	flows::{Exchanger, common},
	oauth::BasicFacade,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
};

impl Exchanger {
	/// Exchanges service-principal `credentials` for a reporting API bearer token.
	///
	/// Sends exactly one form-encoded `client_credentials` grant to
	/// `{authority}/{tenant}/oauth2/v2.0/token` with the descriptor scope.
	pub async fn exchange_credentials(&self, credentials: &Credentials) -> Result<AccessToken> {
		const KIND: FlowKind = FlowKind::CredentialExchange;

		let span = FlowSpan::new(KIND, "exchange_credentials");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let facade = BasicFacade::for_credentials(
					&self.descriptor,
					credentials,
					self.http_client.clone(),
				)?;

				tracing::debug!(tenant = %credentials.tenant_id, "requesting access token");

				facade.exchange_client_credentials().await
			})
			.await;

		common::record_result(KIND, &result);

		result
	}
}
