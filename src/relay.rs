//! Token-exchange relay: request dispatch and the HTTP surface.
//!
//! [`Relay`] is an immutable, cheaply cloned value shared by every request. It owns the
//! [`Exchanger`] and the [`EmbedBearer`] policy chosen at construction; nothing is cached or
//! mutated between requests, and each operation performs its upstream calls strictly in
//! sequence.

pub mod request;
pub mod response;
pub mod router;

pub use request::*;
pub use response::*;
pub use router::*;

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, Credentials, GroupId, TokenSecret},
	config::RelayConfig,
	flows::Exchanger,
	http::ReqwestHttpClient,
};

/// Source of the bearer used for embed token issuance and report listing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum EmbedBearer {
	/// Use the caller's `Authorization: Bearer` header, falling back to the `accessToken`
	/// body field.
	#[default]
	Forwarded,
	/// Ignore caller tokens and exchange these credentials before every call.
	ServerCredentials(Credentials),
}

/// Stateless relay shared across request handlers.
#[derive(Clone, Debug)]
pub struct Relay {
	exchanger: Arc<Exchanger>,
	embed_bearer: Arc<EmbedBearer>,
}
impl Relay {
	/// Creates a relay from an exchanger and a bearer policy.
	pub fn new(exchanger: Exchanger, embed_bearer: EmbedBearer) -> Self {
		Self { exchanger: Arc::new(exchanger), embed_bearer: Arc::new(embed_bearer) }
	}

	/// Validates `config` and builds the relay it describes.
	pub fn from_config(config: &RelayConfig) -> Result<Self> {
		let descriptor = config.descriptor()?;
		let http_client = ReqwestHttpClient::with_timeout(config.upstream_timeout()?)?;
		let embed_bearer = config.embed_bearer()?;

		tracing::info!(
			authority = %descriptor.endpoints.authority,
			reporting_api = %descriptor.endpoints.reporting_api,
			server_credentials = matches!(embed_bearer, EmbedBearer::ServerCredentials(_)),
			"relay configured"
		);

		Ok(Self::new(Exchanger::new(descriptor, http_client), embed_bearer))
	}

	/// Exchanger performing the upstream calls.
	pub fn exchanger(&self) -> &Exchanger {
		&self.exchanger
	}

	/// Bearer policy fixed at construction.
	pub fn embed_bearer(&self) -> &EmbedBearer {
		&self.embed_bearer
	}

	/// Routes a multiplexed request to its operation.
	pub async fn dispatch(
		&self,
		request: RelayRequest,
		authorization: Option<&str>,
	) -> Result<RelayResponse> {
		match request {
			RelayRequest::CredentialExchange(request) =>
				self.credential_exchange(request).await.map(RelayResponse::CredentialExchange),
			RelayRequest::EmbedToken(request) =>
				self.embed_token(request, authorization).await.map(RelayResponse::EmbedToken),
		}
	}

	/// Exchanges caller-supplied credentials for an access token.
	pub async fn credential_exchange(
		&self,
		request: CredentialExchangeRequest,
	) -> Result<CredentialExchangeResponse> {
		let ValidatedExchange { credentials, workspace_id } = request.validate()?;
		let token = self.exchanger.exchange_credentials(&credentials).await?;

		tracing::info!(workspace = %workspace_id, "access token issued");

		Ok(CredentialExchangeResponse { access_token: token.secret().clone(), workspace_id })
	}

	/// Issues a view-only embed token for the requested report.
	pub async fn embed_token(
		&self,
		request: EmbedTokenRequest,
		authorization: Option<&str>,
	) -> Result<EmbedTokenResponse> {
		let (target, body_token) = request.validate()?;
		let bearer = self.resolve_bearer(authorization, body_token).await?;
		let embed = self.exchanger.generate_embed_token(&target, &bearer).await?;

		tracing::info!(%target, "embed token issued");

		Ok(EmbedTokenResponse {
			access_token: bearer.secret().clone(),
			embed_token: embed.token,
			expiration: embed.expiration,
		})
	}

	/// Lists the reports in `group_id`.
	pub async fn list_reports(
		&self,
		group_id: &str,
		authorization: Option<&str>,
	) -> Result<ReportListResponse> {
		let group = GroupId::new(group_id)?;
		let bearer = self.resolve_bearer(authorization, None).await?;
		let reports = self.exchanger.list_reports(&group, &bearer).await?;

		Ok(ReportListResponse { reports })
	}

	async fn resolve_bearer(
		&self,
		authorization: Option<&str>,
		body_token: Option<TokenSecret>,
	) -> Result<AccessToken> {
		match self.embed_bearer.as_ref() {
			EmbedBearer::Forwarded => Ok(forwarded_bearer(authorization, body_token)?),
			EmbedBearer::ServerCredentials(credentials) =>
				self.exchanger.exchange_credentials(credentials).await,
		}
	}
}
