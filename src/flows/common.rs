//! Shared helpers for reporting API calls and flow outcome bookkeeping.

// crates.io
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	error::{self, UpstreamService},
	obs::{self, FlowKind, FlowOutcome},
};

const UPSTREAM: UpstreamService = UpstreamService::ReportingApi;

/// Error envelope returned by the reporting API.
#[derive(Debug, Default, Deserialize)]
struct ApiErrorEnvelope {
	#[serde(default)]
	error: Option<ApiErrorBody>,
}

#[derive(Debug, Default, Deserialize)]
struct ApiErrorBody {
	#[serde(default)]
	code: Option<String>,
	#[serde(default)]
	message: Option<String>,
}

/// Sends `request` to the reporting API and decodes a 2xx JSON body into `T`.
///
/// Non-2xx responses surface as [`Error::UpstreamEmbed`] carrying the upstream status;
/// `fallback` is used when the body explains nothing.
pub(crate) async fn send_reporting_request<T>(request: RequestBuilder, fallback: &str) -> Result<T>
where
	T: DeserializeOwned,
{
	let response = request.send().await.map_err(|e| UPSTREAM.transport_error(&e))?;
	let status = response.status();
	let body = response.bytes().await.map_err(|e| UPSTREAM.transport_error(&e))?;

	if !status.is_success() {
		return Err(UPSTREAM.error(describe_failure(&body, fallback), Some(status.as_u16())));
	}

	let mut deserializer = serde_json::Deserializer::from_slice(&body);

	serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|e| UPSTREAM.malformed_response(&e, Some(status.as_u16())))
}

/// Prefers `error.message`, then `error.code`, then a preview of the raw body.
fn describe_failure(body: &[u8], fallback: &str) -> String {
	let envelope = serde_json::from_slice::<ApiErrorEnvelope>(body).unwrap_or_default();
	let detail = envelope.error.and_then(|error| {
		error
			.message
			.filter(|message| !message.trim().is_empty())
			.or(error.code.filter(|code| !code.trim().is_empty()))
	});

	match detail.or_else(|| error::body_preview(body)) {
		Some(detail) => format!("{fallback}: {detail}"),
		None => fallback.to_owned(),
	}
}

/// Records the terminal outcome of a flow.
pub(crate) fn record_result<T>(kind: FlowKind, result: &Result<T>) {
	match result {
		Ok(_) => obs::record_flow_outcome(kind, FlowOutcome::Success),
		Err(e) => {
			tracing::debug!(flow = kind.as_str(), error = %e, "flow failed");
			obs::record_flow_outcome(kind, FlowOutcome::Failure);
		},
	}
}
