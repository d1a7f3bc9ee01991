//! Upstream flows driven by the relay: credential exchange, embed token issuance, and report
//! listing.

mod client_credentials;
mod common;
mod embed_token;
mod reports;

pub use reports::*;

// self
use crate::{_prelude::*, http::ReqwestHttpClient, provider::ServiceDescriptor};

/// Performs upstream calls against a single service descriptor.
///
/// The exchanger owns the pooled HTTP client and the descriptor; it keeps no per-request
/// state, so one instance is shared by every request the relay serves. Each call performs
/// exactly one outbound request and never retries.
#[derive(Clone, Debug)]
pub struct Exchanger {
	/// Upstream base URLs and scope.
	pub descriptor: ServiceDescriptor,
	/// HTTP client used for every outbound request.
	pub http_client: ReqwestHttpClient,
}
impl Exchanger {
	/// Creates an exchanger for `descriptor` that sends through `http_client`.
	pub fn new(descriptor: ServiceDescriptor, http_client: ReqwestHttpClient) -> Self {
		Self { descriptor, http_client }
	}
}
