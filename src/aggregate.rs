use crate::types::{PortResult, ScanResults};
use anyhow::{bail, ensure, Result};

/// Collects exactly one result per dispatched probe and orders them for the report.
///
/// The aggregator has a single owner (the scheduler's join loop), so pushes need no lock.
#[derive(Debug)]
pub struct Aggregator {
    expected: usize,
    entries: Vec<PortResult>,
}

impl Aggregator {
    pub fn new(expected: usize) -> Self {
        Self {
            expected,
            entries: Vec::with_capacity(expected),
        }
    }

    pub fn push(&mut self, result: PortResult) {
        self.entries.push(result);
    }

    /// Check completeness, sort by port and count open ports.
    pub fn finish(self) -> Result<ScanResults> {
        let Aggregator {
            expected,
            mut entries,
        } = self;
        ensure!(
            entries.len() == expected,
            "expected {expected} results, received {}",
            entries.len()
        );

        entries.sort_by_key(|e| e.port);
        if let Some(dup) = entries.windows(2).find(|w| w[0].port == w[1].port) {
            bail!("duplicate result for port {}", dup[0].port);
        }

        let open_count = entries.iter().filter(|e| e.is_open()).count() as u64;
        Ok(ScanResults {
            scanned_total: expected as u64,
            open_count,
            entries,
        })
    }
}
