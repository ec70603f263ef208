use crate::config::MAX_TIMEOUT;
use crate::types::{PortResult, ProbeOutcome};
use std::future::Future;
use std::io;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::net::TcpStream;
use tokio::time::{self, Instant};
use tracing::{debug, info};

/// Maximum number of bytes captured from an open port.
pub const BANNER_CAP: usize = 1024;

/// Something that can probe one port and always produce a result.
///
/// The scheduler only talks to this trait, which lets tests swap the network
/// for an instrumented stand-in.
pub trait Prober: Send + Sync + 'static {
    fn probe(&self, port: u16) -> impl Future<Output = PortResult> + Send;
}

/// Probes ports on a single host over TCP.
#[derive(Debug, Clone)]
pub struct TcpProber {
    host: String,
    timeout: Duration,
}

impl TcpProber {
    pub fn new(host: impl Into<String>, timeout: Duration) -> Self {
        Self {
            host: host.into(),
            timeout,
        }
    }
}

impl Prober for TcpProber {
    fn probe(&self, port: u16) -> impl Future<Output = PortResult> + Send {
        probe_port(&self.host, port, self.timeout)
    }
}

/// Connect to `host:port` and grab a banner, all within `timeout`.
///
/// - Connect and banner read share one deadline measured from the start of the attempt.
/// - On success reads up to [`BANNER_CAP`] bytes until EOF or the deadline, then trims whitespace.
/// - A connect that runs out of time is [`ProbeOutcome::TimedOut`]; other failures are classified
///   from the I/O error.
pub async fn probe_port(host: &str, port: u16, timeout: Duration) -> PortResult {
    probe_with_connect(port, timeout, TcpStream::connect((host, port))).await
}

/// Same as [`probe_port`] but with a caller-supplied connect future.
///
/// Timeouts longer than [`MAX_TIMEOUT`] are clamped to it.
pub async fn probe_with_connect<C, S>(port: u16, timeout: Duration, connect: C) -> PortResult
where
    C: Future<Output = io::Result<S>>,
    S: AsyncRead + Unpin,
{
    let deadline = Instant::now() + timeout.min(MAX_TIMEOUT);
    match time::timeout_at(deadline, connect).await {
        Ok(Ok(mut stream)) => {
            info!(port, "found open port");
            let banner = read_banner(&mut stream, deadline).await;
            drop(stream);
            PortResult::open(port, banner)
        }
        Ok(Err(e)) => {
            let outcome = ProbeOutcome::from_connect_error(&e);
            debug!(port, %outcome, error = %e, "connect failed");
            PortResult::closed(port, outcome)
        }
        Err(_) => {
            debug!(port, "connect timed out");
            PortResult::timed_out(port)
        }
    }
}

/// Read until EOF, the byte cap, an error or the deadline; keep whatever arrived.
async fn read_banner<S: AsyncRead + Unpin>(stream: &mut S, deadline: Instant) -> String {
    let mut banner = Vec::with_capacity(BANNER_CAP);
    let mut chunk = [0u8; BANNER_CAP];
    while banner.len() < BANNER_CAP {
        let want = BANNER_CAP - banner.len();
        match time::timeout_at(deadline, stream.read(&mut chunk[..want])).await {
            Ok(Ok(0)) => break,
            Ok(Ok(n)) => banner.extend_from_slice(&chunk[..n]),
            Ok(Err(_)) | Err(_) => break,
        }
    }
    let mut text = String::from_utf8_lossy(&banner).trim().to_string();
    truncate_at_char_boundary(&mut text, BANNER_CAP);
    text
}

/// Lossy decoding widens each invalid byte to three, so re-apply the cap in bytes.
fn truncate_at_char_boundary(text: &mut String, max_len: usize) {
    if text.len() <= max_len {
        return;
    }
    let mut end = max_len;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    text.truncate(end);
    text.truncate(text.trim_end().len());
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{duplex, AsyncWriteExt, DuplexStream};

    #[tokio::test]
    async fn pending_connect_times_out() {
        let connect = std::future::pending::<io::Result<DuplexStream>>();
        let r = probe_with_connect(9, Duration::from_millis(50), connect).await;
        assert_eq!(r.outcome, ProbeOutcome::TimedOut);
        assert!(!r.is_open());
        assert_eq!(r.banner_text(), "Timed Out");
    }

    #[tokio::test]
    async fn refused_connect_is_closed_without_banner() {
        let connect = async { Err::<DuplexStream, _>(io::Error::from(io::ErrorKind::ConnectionRefused)) };
        let r = probe_with_connect(9, Duration::from_millis(50), connect).await;
        assert_eq!(r.outcome, ProbeOutcome::Refused);
        assert_eq!(r.banner_text(), "");
    }

    #[tokio::test]
    async fn banner_is_trimmed() {
        let (client, mut server) = duplex(64);
        server.write_all(b"  SSH-2.0-OpenSSH_9.6\r\n").await.unwrap();
        drop(server);
        let r = probe_with_connect(22, Duration::from_secs(1), async { Ok(client) }).await;
        assert!(r.is_open());
        assert_eq!(r.banner.as_deref(), Some("SSH-2.0-OpenSSH_9.6"));
    }

    #[tokio::test]
    async fn banner_is_capped() {
        let (client, mut server) = duplex(8192);
        server.write_all(&[b'A'; 4096]).await.unwrap();
        let r = probe_with_connect(80, Duration::from_secs(1), async { Ok(client) }).await;
        let banner = r.banner.expect("banner captured");
        assert_eq!(banner.len(), BANNER_CAP);
        drop(server);
    }

    #[tokio::test]
    async fn binary_banner_stays_within_cap() {
        let (client, mut server) = duplex(8192);
        server.write_all(&[0xFF; 4096]).await.unwrap();
        let r = probe_with_connect(80, Duration::from_secs(1), async { Ok(client) }).await;
        let banner = r.banner.expect("banner captured");
        assert!(banner.len() <= BANNER_CAP, "banner is {} bytes", banner.len());
        assert!(banner.chars().all(|c| c == char::REPLACEMENT_CHARACTER));
        drop(server);
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let mut text = "\u{FFFD}".repeat(400);
        truncate_at_char_boundary(&mut text, 1024);
        assert_eq!(text.len(), 1023);
        let mut short = String::from("SSH-2.0");
        truncate_at_char_boundary(&mut short, 1024);
        assert_eq!(short, "SSH-2.0");
    }

    #[tokio::test]
    async fn huge_timeout_does_not_overflow() {
        let (client, server) = duplex(64);
        drop(server);
        let r = probe_with_connect(443, Duration::MAX, async { Ok(client) }).await;
        assert!(r.is_open());
        assert_eq!(r.banner, None);
    }

    #[tokio::test]
    async fn silent_peer_returns_open_at_deadline() {
        let (client, _server) = duplex(64);
        let start = Instant::now();
        let r = probe_with_connect(25, Duration::from_millis(100), async { Ok(client) }).await;
        assert!(r.is_open());
        assert_eq!(r.banner, None);
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn partial_banner_kept_when_deadline_hits() {
        let (client, mut server) = duplex(64);
        server.write_all(b"220 ready").await.unwrap();
        let r = probe_with_connect(21, Duration::from_millis(100), async { Ok(client) }).await;
        assert_eq!(r.banner.as_deref(), Some("220 ready"));
        drop(server);
    }
}
