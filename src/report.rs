use crate::types::{PortResult, ScanResults};
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Format one report line: `Port:<n>\tStatus:<open|closed>\tBanner:<text>\n`.
///
/// Ports with fewer than three digits get an extra tab so the columns line up.
pub fn format_line(result: &PortResult) -> String {
    let status = if result.is_open() { "open" } else { "closed" };
    let port = result.port.to_string();
    let pad = if port.len() < 3 { "\t\t" } else { "\t" };
    format!(
        "Port:{port}{pad}Status:{status}\tBanner:{}\n",
        result.banner_text()
    )
}

/// Write sorted results as text lines, skipping closed ports when `open_only` is set.
pub fn write_report<W: Write>(mut out: W, entries: &[PortResult], open_only: bool) -> Result<()> {
    for result in entries {
        if open_only && !result.is_open() {
            continue;
        }
        out.write_all(format_line(result).as_bytes())?;
    }
    out.flush()?;
    Ok(())
}

/// Create (or truncate) `path` and write the report into it.
pub fn write_report_file(path: &Path, entries: &[PortResult], open_only: bool) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create output file: {}", path.display()))?;
    write_report(BufWriter::new(file), entries, open_only)
        .with_context(|| format!("failed to write report: {}", path.display()))
}

/// Print a summary table of open ports to stdout.
pub fn print_open_table(results: &ScanResults) {
    const BANNER_MAX: usize = 60;
    let port_w = "port".len().max(5);
    let mut banner_w = "banner".len();
    for e in results.open_entries() {
        banner_w = banner_w.max(e.banner_text().chars().count().min(BANNER_MAX));
    }

    println!(
        "\nOpen ports: {} (scanned: {})",
        results.open_count, results.scanned_total
    );
    if results.open_count == 0 {
        return;
    }
    println!(
        "{:>port_w$}  {:<banner_w$}",
        "port",
        "banner",
        port_w = port_w,
        banner_w = banner_w
    );
    println!(
        "{:-<port_w$}  {:-<banner_w$}",
        "",
        "",
        port_w = port_w,
        banner_w = banner_w
    );
    for e in results.open_entries() {
        let bsnip: String = e
            .banner_text()
            .chars()
            .map(|c| if c.is_control() { ' ' } else { c })
            .take(BANNER_MAX)
            .collect();
        println!(
            "{:>port_w$}  {:<banner_w$}",
            e.port,
            bsnip,
            port_w = port_w,
            banner_w = banner_w
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ProbeOutcome;

    fn sample() -> Vec<PortResult> {
        vec![
            PortResult::open(80, "HELLO"),
            PortResult::closed(81, ProbeOutcome::Refused),
            PortResult::timed_out(82),
            PortResult::open(443, ""),
        ]
    }

    fn render(entries: &[PortResult], open_only: bool) -> String {
        let mut buf = Vec::new();
        write_report(&mut buf, entries, open_only).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn short_ports_get_extra_tab() {
        assert_eq!(
            format_line(&PortResult::open(80, "HELLO")),
            "Port:80\t\tStatus:open\tBanner:HELLO\n"
        );
        assert_eq!(
            format_line(&PortResult::open(443, "")),
            "Port:443\tStatus:open\tBanner:\n"
        );
    }

    #[test]
    fn full_report_lists_every_entry() {
        let text = render(&sample(), false);
        assert_eq!(
            text,
            "Port:80\t\tStatus:open\tBanner:HELLO\n\
             Port:81\t\tStatus:closed\tBanner:\n\
             Port:82\t\tStatus:closed\tBanner:Timed Out\n\
             Port:443\tStatus:open\tBanner:\n"
        );
    }

    #[test]
    fn open_only_drops_closed_entries() {
        let text = render(&sample(), true);
        assert!(!text.contains("Status:closed"));
        assert_eq!(text.lines().count(), 2);
    }

    #[test]
    fn write_report_file_roundtrip() {
        let path = std::env::temp_dir().join(format!("port-scan-rs-report-{}.txt", std::process::id()));
        write_report_file(&path, &sample(), true).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert!(text.starts_with("Port:80\t\tStatus:open"));
    }

    #[test]
    fn missing_directory_is_an_error() {
        let path = Path::new("/nonexistent-dir-for-port-scan-rs/results.txt");
        assert!(write_report_file(path, &sample(), false).is_err());
    }
}
