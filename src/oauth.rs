//! Client-credentials facade over the `oauth2` crate.

pub use oauth2;

// crates.io
use oauth2::{
	AuthType, ClientId as OAuthClientId, ClientSecret, EndpointNotSet, EndpointSet,
	HttpClientError, RequestTokenError, Scope, TokenResponse, TokenUrl,
	basic::{BasicClient, BasicErrorResponse, BasicRequestTokenError},
};
// self
use crate::{
	_prelude::*,
	auth::{AccessToken, Credentials},
	error::{self, ConfigError, UpstreamService},
	http::{ReqwestHttpClient, ResponseMetadata, ResponseMetadataSlot},
	provider::ServiceDescriptor,
};

type ConfiguredBasicClient =
	BasicClient<EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

const UPSTREAM: UpstreamService = UpstreamService::IdentityProvider;
const FALLBACK_MESSAGE: &str = "Authentication failed";

/// One-shot client bound to a single set of credentials.
///
/// Secrets are posted in the form body (`client_secret_post`), which is what the Microsoft
/// identity platform expects for confidential clients.
pub(crate) struct BasicFacade {
	oauth_client: ConfiguredBasicClient,
	http_client: ReqwestHttpClient,
	scope: String,
}
impl BasicFacade {
	pub(crate) fn for_credentials(
		descriptor: &ServiceDescriptor,
		credentials: &Credentials,
		http_client: ReqwestHttpClient,
	) -> Result<Self> {
		let token_url = TokenUrl::from_url(descriptor.token_endpoint(&credentials.tenant_id)?);
		let oauth_client = BasicClient::new(OAuthClientId::new(credentials.client_id.to_string()))
			.set_client_secret(ClientSecret::new(credentials.client_secret.expose().to_owned()))
			.set_auth_type(AuthType::RequestBody)
			.set_token_uri(token_url);

		Ok(Self { oauth_client, http_client, scope: descriptor.scope.clone() })
	}

	/// Posts `grant_type=client_credentials` with the descriptor scope and returns the issued
	/// bearer token.
	pub(crate) async fn exchange_client_credentials(&self) -> Result<AccessToken> {
		let meta = ResponseMetadataSlot::default();
		let instrumented = self.http_client.instrumented(meta.clone());
		let response = self
			.oauth_client
			.exchange_client_credentials()
			.add_scope(Scope::new(self.scope.clone()))
			.request_async(&instrumented)
			.await
			.map_err(|err| map_request_error(meta.take(), err))?;

		Ok(AccessToken::new(response.access_token().secret().to_owned()))
	}
}

fn map_request_error(
	meta: Option<ResponseMetadata>,
	err: BasicRequestTokenError<HttpClientError<ReqwestError>>,
) -> Error {
	let status = meta.and_then(|value| value.status);

	match err {
		RequestTokenError::ServerResponse(response) =>
			UPSTREAM.error(describe_server_error(&response), status),
		RequestTokenError::Request(error) => map_transport_error(status, error),
		RequestTokenError::Parse(error, body) => match status {
			Some(code) if code >= 400 => UPSTREAM.error(describe_raw_failure(&body), status),
			_ => UPSTREAM.malformed_response(&error, status),
		},
		RequestTokenError::Other(message) => UPSTREAM
			.error(format!("Token endpoint returned an unexpected response: {message}."), status),
	}
}

/// Prefers the provider's `error_description`, falling back to the OAuth `error` code.
fn describe_server_error(response: &BasicErrorResponse) -> String {
	match response.error_description() {
		Some(description) if !description.trim().is_empty() => description.clone(),
		_ => format!("{FALLBACK_MESSAGE}: {}", response.error().as_ref()),
	}
}

fn describe_raw_failure(body: &[u8]) -> String {
	match error::body_preview(body) {
		Some(preview) => format!("{FALLBACK_MESSAGE}: {preview}"),
		None => FALLBACK_MESSAGE.to_owned(),
	}
}

fn map_transport_error(status: Option<u16>, err: HttpClientError<ReqwestError>) -> Error {
	match err {
		HttpClientError::Reqwest(inner) => UPSTREAM.transport_error(&inner),
		HttpClientError::Http(inner) => ConfigError::from(inner).into(),
		HttpClientError::Io(inner) =>
			UPSTREAM.error(format!("The {UPSTREAM} could not be reached: {inner}."), status),
		HttpClientError::Other(message) => UPSTREAM
			.error(format!("HTTP client error while calling the {UPSTREAM}: {message}."), status),
		_ => UPSTREAM.error(format!("HTTP client error while calling the {UPSTREAM}."), status),
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use oauth2::basic::BasicErrorResponseType;
	// self
	use super::*;
	use crate::auth::{ClientId, TenantId, TokenSecret};

	#[test]
	fn builds_request_body_client() {
		let descriptor = ServiceDescriptor::public_cloud().expect("Descriptor should build.");
		let credentials = Credentials {
			client_id: ClientId::new("client").expect("Client should be valid."),
			client_secret: TokenSecret::new("secret"),
			tenant_id: TenantId::new("tenant").expect("Tenant should be valid."),
		};
		let facade = BasicFacade::for_credentials(
			&descriptor,
			&credentials,
			ReqwestHttpClient::with_timeout(StdDuration::from_secs(1))
				.expect("HTTP client should build."),
		)
		.expect("Facade should build for valid credentials.");

		assert_eq!(facade.scope, descriptor.scope);
	}

	#[test]
	fn server_errors_prefer_description() {
		let response = BasicErrorResponse::new(
			BasicErrorResponseType::InvalidClient,
			Some("AADSTS7000215: Invalid client secret provided.".into()),
			None,
		);

		assert_eq!(
			describe_server_error(&response),
			"AADSTS7000215: Invalid client secret provided."
		);

		let response = BasicErrorResponse::new(BasicErrorResponseType::InvalidScope, None, None);

		assert_eq!(describe_server_error(&response), "Authentication failed: invalid_scope");
	}

	#[test]
	fn raw_failures_are_previewed() {
		assert_eq!(describe_raw_failure(b"  "), "Authentication failed");
		assert_eq!(
			describe_raw_failure(b"<html>down</html>"),
			"Authentication failed: <html>down</html>"
		);
	}
}
