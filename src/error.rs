//! Relay-level error types and their conversion into JSON error responses.

// crates.io
use axum::{
	Json,
	http::StatusCode,
	response::{IntoResponse, Response},
};
// self
use crate::{_prelude::*, auth::IdentifierError, provider::ServiceDescriptorError};

/// Relay-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

const BODY_PREVIEW_LIMIT: usize = 256;

/// Canonical relay error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Caller input is missing or malformed.
	#[error(transparent)]
	Validation(#[from] ValidationError),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),

	/// Identity provider rejected the client-credentials exchange or could not be reached.
	#[error("{message}")]
	UpstreamAuth {
		/// Provider-supplied description, or a relay summary when none was returned.
		message: String,
		/// Upstream HTTP status, when one was received.
		status: Option<u16>,
	},
	/// Reporting API rejected the call or could not be reached.
	#[error("{message}")]
	UpstreamEmbed {
		/// Reporting API message, or a relay summary when none was returned.
		message: String,
		/// Upstream HTTP status, when one was received.
		status: Option<u16>,
	},
	/// HTTP method is not accepted by the addressed route.
	#[error("Method {method} is not allowed.")]
	UnsupportedRequest {
		/// Method received from the caller.
		method: String,
	},
	/// No route matches the request path.
	#[error("No route matches {path}.")]
	UnknownRoute {
		/// Path received from the caller.
		path: String,
	},
}
impl Error {
	/// Status used when an upstream call exceeded its timeout.
	pub const GATEWAY_TIMEOUT: u16 = 504;

	/// HTTP status returned to the caller for this error.
	pub fn status(&self) -> StatusCode {
		match self {
			Self::Validation(_) => StatusCode::BAD_REQUEST,
			Self::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
			Self::UpstreamAuth { status, .. } | Self::UpstreamEmbed { status, .. } =>
				upstream_status(*status),
			Self::UnsupportedRequest { .. } => StatusCode::METHOD_NOT_ALLOWED,
			Self::UnknownRoute { .. } => StatusCode::NOT_FOUND,
		}
	}

	/// Returns true when the caller, not an upstream service, caused the failure.
	pub fn is_caller_error(&self) -> bool {
		matches!(
			self,
			Self::Validation(_) | Self::UnsupportedRequest { .. } | Self::UnknownRoute { .. }
		)
	}
}
impl From<IdentifierError> for Error {
	fn from(e: IdentifierError) -> Self {
		ValidationError::from(e).into()
	}
}
impl From<ServiceDescriptorError> for Error {
	fn from(e: ServiceDescriptorError) -> Self {
		ConfigError::from(e).into()
	}
}
impl IntoResponse for Error {
	fn into_response(self) -> Response {
		let status = self.status();
		let message = self.to_string();

		if self.is_caller_error() {
			tracing::warn!(status = status.as_u16(), error = %message, "request rejected");
		} else {
			tracing::error!(status = status.as_u16(), error = %message, "request failed");
		}

		(status, Json(serde_json::json!({ "error": message }))).into_response()
	}
}

/// Upstream service a failure originated from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UpstreamService {
	/// OAuth 2.0 token endpoint.
	IdentityProvider,
	/// Reporting REST API.
	ReportingApi,
}
impl UpstreamService {
	/// Returns a human-readable label used in error messages.
	pub const fn as_str(self) -> &'static str {
		match self {
			UpstreamService::IdentityProvider => "identity provider",
			UpstreamService::ReportingApi => "reporting API",
		}
	}

	/// Builds the [`Error`] variant owned by this service.
	pub fn error(self, message: impl Into<String>, status: Option<u16>) -> Error {
		let message = message.into();

		match self {
			UpstreamService::IdentityProvider => Error::UpstreamAuth { message, status },
			UpstreamService::ReportingApi => Error::UpstreamEmbed { message, status },
		}
	}

	/// Classifies a reqwest failure; timeouts surface as HTTP 504, everything else as 502.
	pub fn transport_error(self, err: &ReqwestError) -> Error {
		if err.is_timeout() {
			self.error(
				format!("The {self} did not respond before the timeout."),
				Some(Error::GATEWAY_TIMEOUT),
			)
		} else {
			self.error(format!("The {self} could not be reached: {err}."), None)
		}
	}

	/// Reports a success response whose body did not match the expected shape.
	pub fn malformed_response(
		self,
		err: &serde_path_to_error::Error<serde_json::Error>,
		status: Option<u16>,
	) -> Error {
		self.error(
			format!("The {self} returned malformed JSON at `{}`: {}.", err.path(), err.inner()),
			status,
		)
	}
}
impl Display for UpstreamService {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Caller-input failures; always answered with HTTP 400.
#[derive(Debug, PartialEq, Eq, ThisError)]
pub enum ValidationError {
	/// One or more required fields were absent or blank.
	#[error("Missing required fields: {}.", .fields.join(", "))]
	MissingFields {
		/// Wire names of the missing fields, in request order.
		fields: Vec<&'static str>,
	},
	/// Embed-token issuance requires a bearer token and none was supplied.
	#[error("Missing bearer token: supply an `Authorization: Bearer` header or `accessToken`.")]
	MissingBearer,
	/// The request body is not a JSON object of the expected shape.
	#[error("Request body is invalid: {reason}.")]
	InvalidBody {
		/// Parser-supplied explanation.
		reason: String,
	},
	/// A path parameter could not be decoded.
	#[error("Request path is invalid: {reason}.")]
	InvalidPath {
		/// Extractor-supplied explanation.
		reason: String,
	},
	/// An identifier failed validation.
	#[error(transparent)]
	Identifier(#[from] IdentifierError),
}

/// Configuration failures raised while constructing the relay.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// Service descriptor failed validation.
	#[error(transparent)]
	Descriptor(#[from] ServiceDescriptorError),
	/// An endpoint URL could not be derived from the descriptor.
	#[error("Endpoint URL is invalid: {url}.")]
	InvalidEndpoint {
		/// Offending URL.
		url: String,
	},
	/// The `server-credentials` bearer policy was selected without both secrets.
	#[error(
		"The server-credentials bearer policy requires POWERBI_CLIENT_ID and POWERBI_CLIENT_SECRET."
	)]
	MissingServerCredentials,
	/// Upstream timeout must be positive.
	#[error("Upstream timeout must be greater than zero.")]
	ZeroTimeout,
	/// Tracing filter directive could not be parsed.
	#[error("Log filter `{filter}` is invalid.")]
	InvalidLogFilter {
		/// Directive string that failed to parse.
		filter: String,
		/// Parser failure.
		#[source]
		source: BoxError,
	},
	/// Global tracing subscriber could not be installed.
	#[error("Tracing subscriber could not be installed.")]
	Subscriber {
		/// Installation failure.
		#[source]
		source: BoxError,
	},
	/// Listener could not be bound or served.
	#[error("Relay listener failed.")]
	Listener(#[from] std::io::Error),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Trimmed, length-limited preview of an upstream body; `None` when the body is blank.
pub(crate) fn body_preview(body: &[u8]) -> Option<String> {
	let text = String::from_utf8_lossy(body);
	let text = text.trim();

	if text.is_empty() {
		return None;
	}
	if text.chars().count() <= BODY_PREVIEW_LIMIT {
		return Some(text.to_owned());
	}

	let mut buf = text.chars().take(BODY_PREVIEW_LIMIT).collect::<String>();

	buf.push('…');

	Some(buf)
}

fn upstream_status(status: Option<u16>) -> StatusCode {
	status
		.filter(|code| *code >= 400)
		.and_then(|code| StatusCode::from_u16(code).ok())
		.unwrap_or(StatusCode::BAD_GATEWAY)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn upstream_errors_propagate_status() {
		let err = Error::UpstreamAuth { message: "AADSTS7000215".into(), status: Some(401) };

		assert_eq!(err.status(), StatusCode::UNAUTHORIZED);

		let err = Error::UpstreamEmbed { message: "gone".into(), status: None };

		assert_eq!(err.status(), StatusCode::BAD_GATEWAY);

		let err = Error::UpstreamEmbed { message: "odd".into(), status: Some(204) };

		assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
	}

	#[test]
	fn body_preview_trims_and_truncates() {
		assert_eq!(body_preview(b" \n "), None);
		assert_eq!(body_preview(b" oops "), Some("oops".into()));

		let long = "x".repeat(BODY_PREVIEW_LIMIT + 10);
		let preview = body_preview(long.as_bytes()).expect("Long bodies should preview.");

		assert_eq!(preview.chars().count(), BODY_PREVIEW_LIMIT + 1);
		assert!(preview.ends_with('…'));
	}

	#[test]
	fn missing_fields_are_listed_in_order() {
		let err =
			Error::from(ValidationError::MissingFields { fields: vec!["clientId", "tenantId"] });

		assert_eq!(err.status(), StatusCode::BAD_REQUEST);
		assert_eq!(err.to_string(), "Missing required fields: clientId, tenantId.");
		assert!(err.is_caller_error());
	}
}
