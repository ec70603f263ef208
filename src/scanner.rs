use crate::aggregate::Aggregator;
use crate::config::ScanConfig;
use crate::gate::AdmissionGate;
use crate::ports::port_range;
use crate::probe::{Prober, TcpProber};
use crate::types::ScanResults;
use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::info;

/// Scan the configured port range on one host using TCP connects with a worker limit.
///
/// - Validates the config, then builds the (optionally shuffled) port list.
/// - Probes through a [`TcpProber`] bounded by the config timeout.
/// - Returns one result per port, sorted by port.
pub async fn scan(config: &ScanConfig) -> Result<ScanResults> {
    config.validate()?;
    let ports = port_range(config.start, config.stop, config.randomize);
    let prober = TcpProber::new(config.host.clone(), config.timeout);
    info!(
        host = %config.host,
        ports = ports.len(),
        workers = config.workers,
        "starting scan"
    );
    let results = scan_ports(&ports, config.workers, prober).await?;
    info!(
        scanned = results.scanned_total,
        open = results.open_count,
        "scan finished"
    );
    Ok(results)
}

/// Probe every port in `ports` with at most `workers` probes in flight.
///
/// A slot is taken from the admission gate before each probe task is spawned and
/// held by the task until its probe returns. Each task's return value is its
/// result, so joining a task and collecting its result are the same step. Returns
/// only after every spawned task has been joined.
pub async fn scan_ports<P: Prober>(
    ports: &[u16],
    workers: usize,
    prober: P,
) -> Result<ScanResults> {
    let gate = AdmissionGate::new(workers)?;
    let prober = Arc::new(prober);
    let mut set = JoinSet::new();

    for &port in ports {
        let admission = gate.acquire().await?;
        let prober = prober.clone();
        set.spawn(async move {
            let _admission = admission; // keep slot until the probe completes
            prober.probe(port).await
        });
    }

    let mut aggregator = Aggregator::new(ports.len());
    while let Some(joined) = set.join_next().await {
        let result = joined.context("probe task failed")?;
        aggregator.push(result);
    }
    aggregator.finish()
}
