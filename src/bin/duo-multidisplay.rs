use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use clap::Parser;
use tracing::{error, info};
use zenbook_duo_linux::{
    DisplayCommandSpec, DisplayReconfigurator, Lsusb, MonitorConfig, PresenceMonitor, SessionKind, logging,
};

/// Switch the Zenbook Duo display layout when the keyboard is docked or detached.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Seconds between USB polls
    #[arg(long, default_value_t = 1.0, value_parser = parse_interval)]
    interval: f64,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn parse_interval(s: &str) -> Result<f64, String> {
    let secs: f64 = s.parse().map_err(|e| format!("{}", e))?;
    if secs.is_finite() && secs > 0.0 {
        Ok(secs)
    } else {
        Err(format!("interval must be a positive number of seconds, got {}", s))
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    logging::init(args.verbose, true);

    let shutdown = Arc::new(AtomicBool::new(false));
    for signal in [signal_hook::consts::SIGINT, signal_hook::consts::SIGTERM] {
        if let Err(e) = signal_hook::flag::register(signal, Arc::clone(&shutdown)) {
            error!("Failed to register handler for signal {}: {}", signal, e);
            return ExitCode::FAILURE;
        }
    }

    let session = SessionKind::detect();
    info!("Using {:?} display commands", session);

    let config = MonitorConfig {
        interval: Duration::from_secs_f64(args.interval),
        ..MonitorConfig::default()
    };
    let reconfigurator = DisplayReconfigurator::new(DisplayCommandSpec::for_session(session));

    PresenceMonitor::new(config, Lsusb::default(), reconfigurator).run(&shutdown);
    ExitCode::SUCCESS
}
