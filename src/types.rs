use std::fmt;
use std::io;

/// Text used in the report banner column when a connect attempt ran out of time.
pub const TIMED_OUT_BANNER: &str = "Timed Out";

/// Terminal state of a single probe. None of these are errors: every probe ends in one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProbeOutcome {
    /// Connection established before the deadline.
    Open,
    /// Deadline elapsed while connecting.
    TimedOut,
    /// Peer actively refused the connection.
    Refused,
    /// Host or network unreachable.
    Unreachable,
    /// Any other connect failure, including name resolution.
    Failed,
}

impl ProbeOutcome {
    /// Classify a failed connect attempt.
    pub fn from_connect_error(err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::TimedOut => ProbeOutcome::TimedOut,
            io::ErrorKind::ConnectionRefused => ProbeOutcome::Refused,
            io::ErrorKind::HostUnreachable | io::ErrorKind::NetworkUnreachable => {
                ProbeOutcome::Unreachable
            }
            _ => ProbeOutcome::Failed,
        }
    }

    pub fn is_open(self) -> bool {
        self == ProbeOutcome::Open
    }
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProbeOutcome::Open => "open",
            ProbeOutcome::TimedOut => "timed out",
            ProbeOutcome::Refused => "refused",
            ProbeOutcome::Unreachable => "unreachable",
            ProbeOutcome::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// One scan result entry for a single port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortResult {
    pub port: u16,
    pub outcome: ProbeOutcome,
    /// Trimmed opening bytes from an open port. `None` when nothing was read.
    pub banner: Option<String>,
}

impl PortResult {
    pub fn open(port: u16, banner: impl Into<String>) -> Self {
        let banner = banner.into();
        Self {
            port,
            outcome: ProbeOutcome::Open,
            banner: (!banner.is_empty()).then_some(banner),
        }
    }

    pub fn timed_out(port: u16) -> Self {
        Self::closed(port, ProbeOutcome::TimedOut)
    }

    pub fn closed(port: u16, outcome: ProbeOutcome) -> Self {
        Self {
            port,
            outcome,
            banner: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.outcome.is_open()
    }

    /// Banner column as written to the text report.
    ///
    /// Timed-out probes read `Timed Out`, open ports show their banner and
    /// everything else is empty.
    pub fn banner_text(&self) -> &str {
        match self.outcome {
            ProbeOutcome::TimedOut => TIMED_OUT_BANNER,
            _ => self.banner.as_deref().unwrap_or(""),
        }
    }
}

/// Aggregate results of one completed scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanResults {
    pub scanned_total: u64,
    pub open_count: u64,
    /// Sorted ascending by port.
    pub entries: Vec<PortResult>,
}

impl ScanResults {
    pub fn open_entries(&self) -> impl Iterator<Item = &PortResult> {
        self.entries.iter().filter(|e| e.is_open())
    }
}
