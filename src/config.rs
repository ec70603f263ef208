use anyhow::{bail, ensure, Result};
use std::fmt;
use std::time::Duration;

use crate::ports::port_from_u32;

pub const DEFAULT_WORKERS: usize = 10;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_OUTPUT: &str = "results.txt";
/// Upper bound on the per-probe timeout.
pub const MAX_TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);

/// Settings for one scan. Built once before scanning and never changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    pub host: String,
    pub start: u16,
    pub stop: u16,
    pub workers: usize,
    pub timeout: Duration,
    pub randomize: bool,
    pub open_only: bool,
}

impl ScanConfig {
    /// Build a config with default tuning from raw host and port values.
    pub fn new(host: impl Into<String>, start: u32, stop: u32) -> Result<Self> {
        let host = host.into();
        if host.trim().is_empty() || start == 0 || stop == 0 {
            bail!("host, starting port, and end port cannot be blank");
        }
        let cfg = Self {
            host: host.trim().to_string(),
            start: port_from_u32(start)?,
            stop: port_from_u32(stop)?,
            workers: DEFAULT_WORKERS,
            timeout: DEFAULT_TIMEOUT,
            randomize: false,
            open_only: false,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_randomize(mut self, randomize: bool) -> Self {
        self.randomize = randomize;
        self
    }

    pub fn with_open_only(mut self, open_only: bool) -> Self {
        self.open_only = open_only;
        self
    }

    /// Reject settings that would make the scan meaningless.
    pub fn validate(&self) -> Result<()> {
        ensure!(!self.host.trim().is_empty(), "host cannot be blank");
        ensure!(
            self.start >= 1 && self.stop >= 1,
            "invalid port range: ports must be within 1-65535"
        );
        ensure!(
            self.start <= self.stop,
            "invalid port range: start {} is greater than stop {}",
            self.start,
            self.stop
        );
        ensure!(self.workers > 0, "worker count must be at least 1");
        ensure!(!self.timeout.is_zero(), "timeout must be greater than zero");
        ensure!(
            self.timeout <= MAX_TIMEOUT,
            "timeout must not exceed {}s",
            MAX_TIMEOUT.as_secs()
        );
        Ok(())
    }

    /// Number of ports covered by `start..=stop`.
    pub fn port_count(&self) -> usize {
        if self.start > self.stop {
            0
        } else {
            usize::from(self.stop - self.start) + 1
        }
    }
}

impl fmt::Display for ScanConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  host         : {}", self.host)?;
        writeln!(f, "  ports        : {}-{} ({} ports)", self.start, self.stop, self.port_count())?;
        writeln!(f, "  workers      : {}", self.workers)?;
        writeln!(f, "  timeout_ms   : {}", self.timeout.as_millis())?;
        writeln!(f, "  randomize    : {}", self.randomize)?;
        write!(f, "  open_only    : {}", self.open_only)
    }
}
