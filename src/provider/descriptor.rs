//! Service descriptor data structures and endpoint derivation.

/// Builder API for assembling service descriptors.
pub mod builder;

pub use builder::*;

// self
use crate::{
	_prelude::*,
	auth::{EmbedTarget, GroupId, TenantId},
	error::ConfigError,
};

/// Public Microsoft Entra ID authority.
pub const DEFAULT_AUTHORITY: &str = "https://login.microsoftonline.com/";
/// Public Power BI REST base for the signed-in organization.
pub const DEFAULT_REPORTING_API: &str = "https://api.powerbi.com/v1.0/myorg/";
/// Default scope requested for reporting API access tokens.
pub const DEFAULT_SCOPE: &str = "https://analysis.windows.net/powerbi/api/.default";

/// Base URLs of the two upstream services.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceEndpoints {
	/// Identity authority; `{tenant}/oauth2/v2.0/token` is appended per request.
	pub authority: Url,
	/// Reporting API base; `groups/...` paths are appended per request.
	pub reporting_api: Url,
}

/// Immutable descriptor consumed by flows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceDescriptor {
	/// Upstream base URLs.
	pub endpoints: ServiceEndpoints,
	/// Scope requested during the client-credentials grant.
	pub scope: String,
}
impl ServiceDescriptor {
	/// Creates a new builder seeded with the public cloud defaults.
	pub fn builder() -> ServiceDescriptorBuilder {
		ServiceDescriptorBuilder::default()
	}

	/// Descriptor for the public Entra ID + Power BI cloud.
	pub fn public_cloud() -> Result<Self, ServiceDescriptorError> {
		Self::builder().build()
	}

	/// Token endpoint for `tenant`: `{authority}/{tenant}/oauth2/v2.0/token`.
	pub fn token_endpoint(&self, tenant: &TenantId) -> Result<Url, ConfigError> {
		append_segments(&self.endpoints.authority, [tenant.as_ref(), "oauth2", "v2.0", "token"])
	}

	/// Embed-token endpoint: `{api}/groups/{group}/reports/{report}/GenerateToken`.
	pub fn generate_token_endpoint(&self, target: &EmbedTarget) -> Result<Url, ConfigError> {
		append_segments(
			&self.endpoints.reporting_api,
			[
				"groups",
				target.group_id.as_ref(),
				"reports",
				target.report_id.as_ref(),
				"GenerateToken",
			],
		)
	}

	/// Report-list endpoint: `{api}/groups/{group}/reports`.
	pub fn reports_endpoint(&self, group: &GroupId) -> Result<Url, ConfigError> {
		append_segments(&self.endpoints.reporting_api, ["groups", group.as_ref(), "reports"])
	}
}

/// Appends percent-encoded path segments to `base`, treating a trailing slash as a
/// directory marker rather than an empty segment.
///
/// `url` drops `.` and `..` segments instead of encoding them; identifiers reject both at
/// construction, and literal segments here never use them.
fn append_segments<'a, I>(base: &Url, segments: I) -> Result<Url, ConfigError>
where
	I: IntoIterator<Item = &'a str>,
{
	let mut url = base.clone();

	url.path_segments_mut()
		.map_err(|_| ConfigError::InvalidEndpoint { url: base.to_string() })?
		.pop_if_empty()
		.extend(segments);

	Ok(url)
}
