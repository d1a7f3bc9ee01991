//! Request-scoped credential and target values.

// self
use crate::{
	_prelude::*,
	auth::{ClientId, GroupId, ReportId, TenantId, TokenSecret},
};

/// Service-principal credentials presented to the identity provider.
///
/// Values live for one request only; the secret stays redacted in `Debug` output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credentials {
	/// Application (client) identifier.
	pub client_id: ClientId,
	/// Client secret sent in the form body.
	pub client_secret: TokenSecret,
	/// Tenant whose token endpoint is addressed.
	pub tenant_id: TenantId,
}

/// Report an embed token is scoped to.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct EmbedTarget {
	/// Workspace containing the report.
	pub group_id: GroupId,
	/// Report inside the workspace.
	pub report_id: ReportId,
}
impl Display for EmbedTarget {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "{}/{}", self.group_id, self.report_id)
	}
}
