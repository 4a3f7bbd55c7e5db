use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use tracing::{debug, error, info};
use zenbook_duo_linux::{BrightnessController, BrightnessLevel, DuoError, logging};

const AFTER_HELP: &str = "\
Brightness levels:
  0, off     - Turn off keyboard backlight
  1, low     - Low brightness
  2, medium  - Medium brightness
  3, high    - High brightness

Examples:
  duo-kbd-brightness 2        # Set to medium brightness
  duo-kbd-brightness high     # Set to high brightness
  duo-kbd-brightness off      # Turn off backlight";

/// Control the ASUS Zenbook Duo keyboard backlight.
#[derive(Parser, Debug)]
#[command(version, about, after_help = AFTER_HELP)]
struct Args {
    /// Brightness level (0-3 or off/low/medium/high)
    level: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn run(args: &Args) -> Result<(), DuoError> {
    let level: BrightnessLevel = args.level.parse()?;
    BrightnessController::new()?.set_brightness(level)?;
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    logging::init(args.verbose, false);
    debug!("Verbose logging enabled");

    // Ctrl-C is honoured once the device has been released, never mid-transfer.
    let interrupted = Arc::new(AtomicBool::new(false));
    for signal in [signal_hook::consts::SIGINT, signal_hook::consts::SIGTERM] {
        if let Err(e) = signal_hook::flag::register(signal, Arc::clone(&interrupted)) {
            debug!("Failed to register handler for signal {}: {}", signal, e);
        }
    }

    let result = run(&args);

    if interrupted.load(Ordering::Relaxed) {
        info!("Operation cancelled by user");
        return ExitCode::FAILURE;
    }

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e @ DuoError::InvalidLevel { .. }) => {
            error!("Invalid input: {}", e);
            ExitCode::FAILURE
        }
        Err(e) => {
            error!("Failed to set keyboard brightness: {}", e);
            ExitCode::FAILURE
        }
    }
}
