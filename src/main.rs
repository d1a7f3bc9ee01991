//! Binary entry point for the Power BI embed relay.

// std
use std::process::ExitCode;
// crates.io
use clap::Parser;
use tokio::net::TcpListener;
// self
use powerbi_embed_relay::{
	config::RelayConfig,
	error::{ConfigError, Result},
	obs,
	relay::Relay,
};

#[tokio::main]
async fn main() -> ExitCode {
	let config = RelayConfig::parse();

	if let Err(e) = obs::init_tracing(&config.log_filter) {
		eprintln!("{e}");

		return ExitCode::FAILURE;
	}

	match run(config).await {
		Ok(()) => ExitCode::SUCCESS,
		Err(e) => {
			tracing::error!(error = %e, "relay exited with an error");

			ExitCode::FAILURE
		},
	}
}

async fn run(config: RelayConfig) -> Result<()> {
	let relay = Relay::from_config(&config)?;
	let listener = TcpListener::bind(config.listen_addr).await.map_err(ConfigError::from)?;

	relay.serve(listener, shutdown_signal()).await?;

	Ok(())
}

async fn shutdown_signal() {
	let ctrl_c = async {
		if let Err(e) = tokio::signal::ctrl_c().await {
			tracing::warn!(error = %e, "failed to listen for ctrl-c");
			std::future::pending::<()>().await;
		}
	};

	#[cfg(unix)]
	let terminate = async {
		match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
			Ok(mut signal) => {
				signal.recv().await;
			},
			Err(e) => {
				tracing::warn!(error = %e, "failed to listen for SIGTERM");
				std::future::pending::<()>().await;
			},
		}
	};
	#[cfg(not(unix))]
	let terminate = std::future::pending::<()>();

	tokio::select! {
		_ = ctrl_c => {},
		_ = terminate => {},
	}

	tracing::info!("shutdown signal received");
}
