//! Process configuration parsed from flags with environment fallbacks.
//!
//! The binary parses a [`RelayConfig`] once at startup and hands it to
//! [`Relay::from_config`](crate::relay::Relay::from_config); nothing reads the environment
//! afterwards.

// std
use std::net::SocketAddr;
// crates.io
use clap::{Parser, ValueEnum};
// self
use crate::{
	_prelude::*,
	auth::{ClientId, Credentials, TenantId, TokenSecret},
	error::ConfigError,
	provider::{DEFAULT_AUTHORITY, DEFAULT_REPORTING_API, DEFAULT_SCOPE, ServiceDescriptor},
	relay::EmbedBearer,
};

/// Where the bearer for embed token issuance comes from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum EmbedBearerMode {
	/// Use the caller's `Authorization: Bearer` header or `accessToken` body field.
	#[default]
	Forwarded,
	/// Exchange the relay's own service-principal credentials on every request.
	ServerCredentials,
}

/// Relay configuration.
#[derive(Clone, Debug, Parser)]
#[command(name = "powerbi-embed-relay", version, about, long_about = None)]
pub struct RelayConfig {
	/// Socket address the HTTP listener binds to.
	#[arg(long, env = "RELAY_LISTEN_ADDR", default_value = "0.0.0.0:8080")]
	pub listen_addr: SocketAddr,

	/// Bearer policy for embed token issuance.
	#[arg(
		long,
		env = "RELAY_EMBED_BEARER",
		value_enum,
		default_value_t = EmbedBearerMode::Forwarded
	)]
	pub embed_bearer: EmbedBearerMode,

	/// Service-principal client ID used by the `server-credentials` policy.
	#[arg(long, env = "POWERBI_CLIENT_ID")]
	pub powerbi_client_id: Option<String>,

	/// Service-principal client secret used by the `server-credentials` policy.
	#[arg(long, env = "POWERBI_CLIENT_SECRET", hide_env_values = true)]
	pub powerbi_client_secret: Option<TokenSecret>,

	/// Identity authority base URL.
	#[arg(long, env = "RELAY_AUTHORITY_URL", default_value = DEFAULT_AUTHORITY)]
	pub authority_url: Url,

	/// Reporting API base URL.
	#[arg(long, env = "RELAY_REPORTING_API_URL", default_value = DEFAULT_REPORTING_API)]
	pub reporting_api_url: Url,

	/// Scope requested during the client-credentials grant.
	#[arg(long, env = "RELAY_SCOPE", default_value = DEFAULT_SCOPE)]
	pub scope: String,

	/// Per-request timeout for upstream calls, in seconds.
	#[arg(long, env = "RELAY_UPSTREAM_TIMEOUT_SECS", default_value_t = 10)]
	pub upstream_timeout_secs: u64,

	/// Tracing filter directives.
	#[arg(long, env = "RUST_LOG", default_value = "info")]
	pub log_filter: String,
}
impl RelayConfig {
	/// Builds and validates the upstream service descriptor.
	pub fn descriptor(&self) -> Result<ServiceDescriptor, ConfigError> {
		Ok(ServiceDescriptor::builder()
			.authority(self.authority_url.clone())
			.reporting_api(self.reporting_api_url.clone())
			.scope(self.scope.clone())
			.build()?)
	}

	/// Upstream timeout; zero is rejected.
	pub fn upstream_timeout(&self) -> Result<StdDuration, ConfigError> {
		match self.upstream_timeout_secs {
			0 => Err(ConfigError::ZeroTimeout),
			secs => Ok(StdDuration::from_secs(secs)),
		}
	}

	/// Resolves the bearer policy, requiring both secrets for `server-credentials`.
	///
	/// Server credentials always address the `common` tenant.
	pub fn embed_bearer(&self) -> Result<EmbedBearer, ConfigError> {
		match self.embed_bearer {
			EmbedBearerMode::Forwarded => Ok(EmbedBearer::Forwarded),
			EmbedBearerMode::ServerCredentials => {
				let client_id = self
					.powerbi_client_id
					.as_deref()
					.and_then(|id| ClientId::new(id).ok())
					.ok_or(ConfigError::MissingServerCredentials)?;
				let client_secret = self
					.powerbi_client_secret
					.clone()
					.filter(|secret| !secret.is_blank())
					.ok_or(ConfigError::MissingServerCredentials)?;

				Ok(EmbedBearer::ServerCredentials(Credentials {
					client_id,
					client_secret,
					tenant_id: TenantId::common(),
				}))
			},
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn parse(args: &[&str]) -> RelayConfig {
		let argv = std::iter::once("powerbi-embed-relay").chain(args.iter().copied());

		RelayConfig::try_parse_from(argv).expect("Arguments should parse.")
	}

	#[test]
	fn defaults_target_public_cloud() {
		let config = parse(&[
			"--listen-addr",
			"127.0.0.1:9000",
			"--embed-bearer",
			"forwarded",
			"--upstream-timeout-secs",
			"10",
		]);

		assert_eq!(config.listen_addr.port(), 9000);
		assert!(matches!(config.embed_bearer(), Ok(EmbedBearer::Forwarded)));
		assert_eq!(
			config.upstream_timeout().expect("Timeout should resolve."),
			StdDuration::from_secs(10)
		);

		let descriptor = config.descriptor().expect("Descriptor should build.");

		assert_eq!(descriptor.endpoints.authority.as_str(), DEFAULT_AUTHORITY);
		assert_eq!(descriptor.scope, DEFAULT_SCOPE);
	}

	#[test]
	fn server_credentials_require_both_secrets() {
		let config = parse(&[
			"--embed-bearer",
			"server-credentials",
			"--powerbi-client-id",
			"app",
			"--powerbi-client-secret",
			"",
		]);

		assert!(matches!(config.embed_bearer(), Err(ConfigError::MissingServerCredentials)));

		let config = parse(&[
			"--embed-bearer",
			"server-credentials",
			"--powerbi-client-id",
			"app",
			"--powerbi-client-secret",
			"s3cret",
		]);

		match config.embed_bearer().expect("Policy should resolve.") {
			EmbedBearer::ServerCredentials(credentials) => {
				assert_eq!(credentials.tenant_id, TenantId::common());
				assert_eq!(credentials.client_secret.expose(), "s3cret");
			},
			other => panic!("Unexpected bearer policy: {other:?}."),
		}
	}

	#[test]
	fn invalid_values_are_rejected() {
		let config = parse(&["--upstream-timeout-secs", "0"]);

		assert!(matches!(config.upstream_timeout(), Err(ConfigError::ZeroTimeout)));

		let config = parse(&["--authority-url", "http://login.example.com/"]);

		assert!(matches!(config.descriptor(), Err(ConfigError::Descriptor(_))));
		assert!(
			RelayConfig::try_parse_from(["powerbi-embed-relay", "--embed-bearer", "sometimes"])
				.is_err()
		);
	}
}
