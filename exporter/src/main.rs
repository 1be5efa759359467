//! Checkhost Exporter Entry Point

use std::sync::Arc;

use checkhost_exporter::checkhost::{CheckRequester, CheckResultMapper, HttpJsonFetcher};
use checkhost_exporter::cli::Cli;
use checkhost_exporter::cycle::CheckCycle;
use checkhost_exporter::metrics::{MetricPublisher, PrometheusGauge};
use checkhost_exporter::{logging, server, AppState};
use checkhost_exporter_common::config::ExporterConfig;
use checkhost_exporter_common::error::ExporterResult;
use clap::Parser;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let config = Cli::parse().into_config();

    if let Err(e) = logging::init(config.debug) {
        eprintln!("Error: failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    let domain = match config.validate() {
        Ok(domain) => domain.to_string(),
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(config, domain).await {
        error!(error = %e, "Checkhost exporter stopped");
        std::process::exit(1);
    }
}

async fn run(config: ExporterConfig, domain: String) -> ExporterResult<()> {
    info!(
        "Checkhost Exporter v{} (domain: {}, check: {}, nodes: {})",
        env!("CARGO_PKG_VERSION"),
        domain,
        config.check_type,
        config.nodes_count
    );

    let client = HttpJsonFetcher::build_client()?;
    let fetcher = Arc::new(HttpJsonFetcher::new(client, config.api_retries));
    let requester = Arc::new(CheckRequester::new(fetcher).with_api_url(config.api_url.as_str()));
    let mapper =
        CheckResultMapper::new(requester.clone()).with_max_poll_attempts(config.max_poll_attempts);

    let gauge = PrometheusGauge::new()?;
    let publisher = MetricPublisher::new(Arc::new(gauge.clone()), domain);

    let cycle = CheckCycle::new(requester, mapper, publisher)
        .with_check(config.check_type, config.nodes_count)
        .with_interval(config.check_interval_secs);

    let state = AppState { gauge };
    let bind_addr = config.bind_addr();

    tokio::select! {
        result = server::run(state, &bind_addr) => result,
        result = cycle.run() => result,
    }
}
