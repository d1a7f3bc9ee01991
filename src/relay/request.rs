//! Inbound request shapes and their validation.
//!
//! Fields are read as optional strings so that every missing or blank field is reported in
//! one [`ValidationError::MissingFields`] before any outbound call is made.

// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	auth::{
		AccessToken, ClientId, Credentials, EmbedTarget, GroupId, ReportId, TenantId, TokenSecret,
	},
	error::ValidationError,
};

/// Body accepted by the multiplexed `POST /` route, discriminated by `action`.
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum RelayRequest {
	/// Client-credentials exchange.
	CredentialExchange(CredentialExchangeRequest),
	/// Embed token issuance.
	EmbedToken(EmbedTokenRequest),
}

/// Fields of a credential exchange.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialExchangeRequest {
	/// Application (client) identifier.
	#[serde(default)]
	pub client_id: Option<String>,
	/// Client secret.
	#[serde(default)]
	pub client_secret: Option<TokenSecret>,
	/// Tenant whose token endpoint is addressed.
	#[serde(default)]
	pub tenant_id: Option<String>,
	/// Workspace echoed back on success.
	#[serde(default)]
	pub workspace_id: Option<String>,
}
impl CredentialExchangeRequest {
	/// Checks that every field is present and non-blank.
	pub fn validate(self) -> Result<ValidatedExchange, ValidationError> {
		let mut fields = RequiredFields::default();
		let client_id = fields.text("clientId", self.client_id);
		let client_secret = fields.secret("clientSecret", self.client_secret);
		let tenant_id = fields.text("tenantId", self.tenant_id);
		let workspace_id = fields.text("workspaceId", self.workspace_id);

		match (client_id, client_secret, tenant_id, workspace_id) {
			(Some(client_id), Some(client_secret), Some(tenant_id), Some(workspace_id)) =>
				Ok(ValidatedExchange {
					credentials: Credentials {
						client_id: ClientId::new(client_id)?,
						client_secret,
						tenant_id: TenantId::new(tenant_id)?,
					},
					workspace_id: GroupId::new(workspace_id)?,
				}),
			_ => Err(fields.into_error()),
		}
	}
}

/// Credential exchange after validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidatedExchange {
	/// Credentials presented to the identity provider.
	pub credentials: Credentials,
	/// Workspace echoed back to the caller.
	pub workspace_id: GroupId,
}

/// Fields of an embed token request.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbedTokenRequest {
	/// Workspace containing the report.
	#[serde(default)]
	pub group_id: Option<String>,
	/// Report the token is scoped to.
	#[serde(default)]
	pub report_id: Option<String>,
	/// Bearer supplied in the body; the `Authorization` header wins when both are present.
	#[serde(default)]
	pub access_token: Option<TokenSecret>,
}
impl EmbedTokenRequest {
	/// Checks that `groupId` and `reportId` are present and non-blank.
	///
	/// The body bearer is returned untouched; whether it is needed depends on the relay's
	/// bearer policy.
	pub fn validate(self) -> Result<(EmbedTarget, Option<TokenSecret>), ValidationError> {
		let mut fields = RequiredFields::default();
		let group_id = fields.text("groupId", self.group_id);
		let report_id = fields.text("reportId", self.report_id);

		match (group_id, report_id) {
			(Some(group_id), Some(report_id)) => {
				let target = EmbedTarget {
					group_id: GroupId::new(group_id)?,
					report_id: ReportId::new(report_id)?,
				};

				Ok((target, self.access_token))
			},
			_ => Err(fields.into_error()),
		}
	}
}

/// Resolves the caller's bearer: `Authorization: Bearer` first, then the body field.
pub fn forwarded_bearer(
	authorization: Option<&str>,
	body_token: Option<TokenSecret>,
) -> Result<AccessToken, ValidationError> {
	authorization
		.and_then(AccessToken::from_authorization)
		.or_else(|| body_token.filter(|token| !token.is_blank()).map(AccessToken::from))
		.ok_or(ValidationError::MissingBearer)
}

/// Decodes a JSON object body into `T`.
///
/// A blank body is read as `{}` so that missing fields are still reported by name.
pub fn parse_body<T>(body: &[u8]) -> Result<T, ValidationError>
where
	T: DeserializeOwned,
{
	let value = if body.iter().all(u8::is_ascii_whitespace) {
		serde_json::Value::Object(Default::default())
	} else {
		serde_json::from_slice::<serde_json::Value>(body)
			.map_err(|e| ValidationError::InvalidBody { reason: e.to_string() })?
	};

	if !value.is_object() {
		return Err(ValidationError::InvalidBody { reason: "expected a JSON object".into() });
	}

	serde_path_to_error::deserialize(value).map_err(|e| ValidationError::InvalidBody {
		reason: match e.path().to_string().as_str() {
			"." => e.inner().to_string(),
			path => format!("{path}: {}", e.inner()),
		},
	})
}

/// Collects the wire names of absent or blank fields.
#[derive(Debug, Default)]
struct RequiredFields {
	missing: Vec<&'static str>,
}
impl RequiredFields {
	fn text(&mut self, name: &'static str, value: Option<String>) -> Option<String> {
		match value {
			Some(value) if !value.trim().is_empty() => Some(value),
			_ => {
				self.missing.push(name);

				None
			},
		}
	}

	fn secret(&mut self, name: &'static str, value: Option<TokenSecret>) -> Option<TokenSecret> {
		match value {
			Some(value) if !value.is_blank() => Some(value),
			_ => {
				self.missing.push(name);

				None
			},
		}
	}

	fn into_error(self) -> ValidationError {
		ValidationError::MissingFields { fields: self.missing }
	}
}
