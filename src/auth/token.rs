//! Tokens minted by the identity provider and the reporting API.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Bearer access token scoped to the reporting API.
///
/// Tokens are opaque to the relay; expiry is owned by the caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccessToken(TokenSecret);
impl AccessToken {
	const BEARER_SCHEME: &'static str = "bearer";

	/// Wraps a raw token string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(TokenSecret::new(value))
	}

	/// Parses an `Authorization` header value of the form `Bearer <token>`.
	///
	/// The scheme is matched case-insensitively; blank tokens yield `None`.
	pub fn from_authorization(value: &str) -> Option<Self> {
		let (scheme, token) = value.trim().split_once(char::is_whitespace)?;

		if !scheme.eq_ignore_ascii_case(Self::BEARER_SCHEME) {
			return None;
		}

		let token = token.trim();

		if token.is_empty() { None } else { Some(Self::new(token)) }
	}

	/// Returns the raw bearer value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		self.0.expose()
	}

	/// Borrows the redacted secret.
	pub fn secret(&self) -> &TokenSecret {
		&self.0
	}
}
impl From<TokenSecret> for AccessToken {
	fn from(secret: TokenSecret) -> Self {
		Self(secret)
	}
}

/// Report-scoped embed token returned by the reporting API's `GenerateToken` call.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbedToken {
	/// Opaque embed token consumed by the viewer.
	pub token: TokenSecret,
	/// Upstream token identifier, when supplied.
	#[serde(default)]
	pub token_id: Option<String>,
	/// Upstream expiration instant, when supplied.
	#[serde(default, with = "time::serde::rfc3339::option")]
	pub expiration: Option<OffsetDateTime>,
}
