//! Stateless token-exchange relay for Power BI embedding: turns service-principal credentials
//! into bearer access tokens and report-scoped embed tokens so client secrets never reach the
//! browser.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod config;
pub mod error;
pub mod flows;
pub mod http;
pub mod oauth;
pub mod obs;
pub mod provider;
pub mod relay;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		auth::{ClientId, Credentials, TenantId, TokenSecret},
		flows::Exchanger,
		http::ReqwestHttpClient,
		provider::ServiceDescriptor,
		relay::{EmbedBearer, Relay},
	};

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		test_reqwest_http_client_with_timeout(StdDuration::from_secs(10))
	}

	/// Same as [`test_reqwest_http_client`] with a custom per-request timeout.
	pub fn test_reqwest_http_client_with_timeout(timeout: StdDuration) -> ReqwestHttpClient {
		let client = ReqwestHttpClient::builder(timeout)
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Builds a descriptor whose identity authority lives under `{base}/authority/` and whose
	/// reporting API lives under `{base}/v1.0/myorg/`.
	pub fn test_descriptor(base_url: &str) -> ServiceDescriptor {
		let base = base_url.trim_end_matches('/');

		ServiceDescriptor::builder()
			.authority(
				Url::parse(&format!("{base}/authority/"))
					.expect("Mock authority URL should parse successfully."),
			)
			.reporting_api(
				Url::parse(&format!("{base}/v1.0/myorg/"))
					.expect("Mock reporting API URL should parse successfully."),
			)
			.build()
			.expect("Mock service descriptor should build successfully.")
	}

	/// Constructs an [`Exchanger`] that talks to the mock server at `base_url`.
	pub fn build_test_exchanger(base_url: &str) -> Exchanger {
		Exchanger::new(test_descriptor(base_url), test_reqwest_http_client())
	}

	/// Constructs a [`Relay`] that talks to the mock server at `base_url`.
	pub fn build_test_relay(base_url: &str, embed_bearer: EmbedBearer) -> Relay {
		Relay::new(build_test_exchanger(base_url), embed_bearer)
	}

	/// Server-side credentials used by tests exercising the `server-credentials` bearer policy.
	pub fn test_server_credentials(client_id: &str, client_secret: &str) -> Credentials {
		Credentials {
			client_id: ClientId::new(client_id).expect("Test client identifier should be valid."),
			client_secret: TokenSecret::new(client_secret),
			tenant_id: TenantId::common(),
		}
	}
}

mod _prelude {
	pub use std::{
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
		time::Duration as StdDuration,
	};

	pub use parking_lot::Mutex;
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::OffsetDateTime;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use reqwest;
pub use url;

#[cfg(test)] use {httpmock as _, tower as _};
