use std::path::PathBuf;
use std::time::Duration;

use port_scan_rs::config::{ScanConfig, DEFAULT_OUTPUT};
use port_scan_rs::limits::{self, Advisory, DescriptorLimit, SystemLimit};
use port_scan_rs::{logging, report, scanner};

use anyhow::Result;
use clap::Parser;
use tracing::warn;

/// port-scan-rs: bounded-concurrency TCP connect scanner with banner grabbing for a single host.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "port-scan-rs",
    version,
    about = "Bounded-concurrency TCP connect scanner with banner grabbing for a single host.",
    long_about = None
)]
struct Cli {
    /// Host to scan (name or IP address).
    #[arg(long)]
    host: String,

    /// Starting port.
    #[arg(long, default_value_t = 0)]
    start: u32,

    /// Final port to scan.
    #[arg(long, default_value_t = 0)]
    stop: u32,

    /// Number of concurrent workers.
    #[arg(long, default_value_t = 10)]
    workers: usize,

    /// Timeout for each connection in milliseconds.
    #[arg(long = "timeout-ms", default_value_t = 10_000)]
    timeout_ms: u64,

    /// Randomize port order.
    #[arg(long, default_value_t = false)]
    random: bool,

    /// File to dump results.
    #[arg(long = "output-file", default_value = DEFAULT_OUTPUT)]
    output_file: PathBuf,

    /// Only write open ports to the output file.
    #[arg(long = "open-only", default_value_t = false)]
    open_only: bool,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log warnings and errors.
    #[arg(short, long, default_value_t = false, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    fn scan_config(&self) -> Result<ScanConfig> {
        let cfg = ScanConfig::new(self.host.as_str(), self.start, self.stop)?
            .with_workers(self.workers)
            .with_timeout(Duration::from_millis(self.timeout_ms))
            .with_randomize(self.random)
            .with_open_only(self.open_only);
        Ok(cfg)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.quiet, cli.verbose)?;

    match limits::check_workers(cli.workers, SystemLimit.ceiling())? {
        Advisory::Fine => {}
        Advisory::Suggest(msg) => warn!("{msg}"),
    }

    let config = cli.scan_config()?;

    println!("port-scan-rs configuration:");
    println!("{config}");
    println!("  output       : {}", cli.output_file.display());

    let results = scanner::scan(&config).await?;

    report::write_report_file(&cli.output_file, &results.entries, config.open_only)?;
    report::print_open_table(&results);
    println!("\nWrote results to {}", cli.output_file.display());

    Ok(())
}
