//! Report-list passthrough.

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, GroupId},
	flows::{Exchanger, common},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
};

/// Report metadata returned by the reporting API.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
	/// Report identifier.
	pub id: String,
	/// Display name.
	#[serde(default)]
	pub name: Option<String>,
	/// URL the viewer loads the embedded report from.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub embed_url: Option<String>,
	/// Link to the report in the reporting service's own UI.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub web_url: Option<String>,
	/// Dataset backing the report.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub dataset_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReportCollection {
	value: Vec<Report>,
}

impl Exchanger {
	/// Lists the reports in workspace `group` visible to `bearer`.
	pub async fn list_reports(&self, group: &GroupId, bearer: &AccessToken) -> Result<Vec<Report>> {
		const KIND: FlowKind = FlowKind::ReportList;

		let span = FlowSpan::new(KIND, "list_reports");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let url = self.descriptor.reports_endpoint(group)?;
				let request = self.http_client.get(url).bearer_auth(bearer.expose());
				let collection: ReportCollection =
					common::send_reporting_request(request, "Failed to list reports").await?;

				tracing::debug!(%group, count = collection.value.len(), "listed reports");

				Ok(collection.value)
			})
			.await;

		common::record_result(KIND, &result);

		result
	}
}
