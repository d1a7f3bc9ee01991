// crates.io
use tracing::{Instrument, Span, instrument::Instrumented};
use tracing_subscriber::EnvFilter;
// self
use crate::{_prelude::*, error::ConfigError, obs::FlowKind};

/// Span wrapper used by relay flows.
#[derive(Clone, Debug)]
pub struct FlowSpan {
	span: Span,
}
impl FlowSpan {
	/// Creates a new span tagged with the provided flow kind + stage.
	pub fn new(kind: FlowKind, stage: &'static str) -> Self {
		Self { span: tracing::info_span!("powerbi_embed_relay.flow", flow = kind.as_str(), stage) }
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> Instrumented<Fut>
	where
		Fut: Future,
	{
		fut.instrument(self.span.clone())
	}
}

/// Installs the global `fmt` subscriber filtered by `filter` (`RUST_LOG` syntax).
pub fn init_tracing(filter: &str) -> Result<(), ConfigError> {
	let env_filter = EnvFilter::try_new(filter).map_err(|e| ConfigError::InvalidLogFilter {
		filter: filter.to_owned(),
		source: Box::new(e),
	})?;

	tracing_subscriber::fmt()
		.with_env_filter(env_filter)
		.with_target(false)
		.try_init()
		.map_err(|source| ConfigError::Subscriber { source })
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[tokio::test]
	async fn instrument_wraps_future() {
		let span = FlowSpan::new(FlowKind::CredentialExchange, "instrument_wraps_future");
		let value = FlowSpan::instrument(&span, async { 42 }).await;

		assert_eq!(value, 42);
	}

	#[test]
	fn invalid_filter_is_rejected() {
		let err =
			init_tracing("relay=loudest").expect_err("Malformed directives must be rejected.");

		assert!(matches!(err, ConfigError::InvalidLogFilter { .. }));
	}
}
