//! Display layout switching through external tools.
//!
//! Each layout is an ordered list of candidate command lines. The
//! reconfigurator runs them one at a time, each under a timeout, and stops
//! at the first that exits successfully. Nothing here is fatal: when every
//! candidate fails the outcome is logged and returned.

use std::io::{ErrorKind, Read};
use std::process::{Command, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::error::CommandError;
use crate::protocol::{PRIMARY_CONNECTOR, RECONFIGURE_TIMEOUT, SECONDARY_CONNECTOR};

/// Poll period while waiting for a child process to exit.
const WAIT_POLL: Duration = Duration::from_millis(20);

/// Graphical session flavour, which decides the tool used for layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionKind {
    Wayland,
    X11,
}

impl SessionKind {
    /// Detect from `XDG_SESSION_TYPE` and `WAYLAND_DISPLAY`.
    pub fn detect() -> Self {
        let session_type = std::env::var("XDG_SESSION_TYPE").ok();
        let wayland_display = std::env::var_os("WAYLAND_DISPLAY");
        Self::from_env(session_type.as_deref(), wayland_display.is_some())
    }

    pub fn from_env(session_type: Option<&str>, wayland_display_set: bool) -> Self {
        if session_type == Some("wayland") || wayland_display_set {
            Self::Wayland
        } else {
            Self::X11
        }
    }
}

/// Candidate command lines for both layouts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayCommandSpec {
    /// Only the primary panel active (keyboard docked).
    pub primary_only: Vec<Vec<String>>,
    /// Secondary panel enabled to the right of the primary (keyboard detached).
    pub extended: Vec<Vec<String>>,
}

fn argv(args: &[&str]) -> Vec<String> {
    args.iter().map(|a| a.to_string()).collect()
}

impl DisplayCommandSpec {
    /// GNOME on Wayland, via Mutter's `gdctl`.
    pub fn gdctl(primary: &str, secondary: &str) -> Self {
        Self {
            primary_only: vec![argv(&["gdctl", "set", "--logical-monitor", "--monitor", primary, "--primary"])],
            extended: vec![argv(&[
                "gdctl", "set",
                "--logical-monitor", "--monitor", primary, "--primary",
                "--logical-monitor", "--monitor", secondary, "--right-of", primary,
            ])],
        }
    }

    /// X11 sessions, via `xrandr`.
    pub fn xrandr(primary: &str, secondary: &str) -> Self {
        Self {
            primary_only: vec![argv(&[
                "xrandr", "--output", primary, "--auto", "--primary", "--output", secondary, "--off",
            ])],
            extended: vec![argv(&[
                "xrandr", "--output", primary, "--auto", "--primary",
                "--output", secondary, "--auto", "--right-of", primary,
            ])],
        }
    }

    /// Default commands for `session` on the built-in panels.
    pub fn for_session(session: SessionKind) -> Self {
        match session {
            SessionKind::Wayland => Self::gdctl(PRIMARY_CONNECTOR, SECONDARY_CONNECTOR),
            SessionKind::X11 => Self::xrandr(PRIMARY_CONNECTOR, SECONDARY_CONNECTOR),
        }
    }

    /// Candidates for the requested layout.
    pub fn candidates(&self, extended: bool) -> &[Vec<String>] {
        if extended { &self.extended } else { &self.primary_only }
    }
}

/// Runs one external command under a timeout.
pub trait CommandRunner {
    fn run(&self, argv: &[String], timeout: Duration) -> Result<(), CommandError>;
}

/// Spawns real child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    fn run(&self, argv: &[String], timeout: Duration) -> Result<(), CommandError> {
        let (program, args) = argv.split_first().ok_or(CommandError::Empty)?;

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => CommandError::NotFound(program.clone()),
                _ => CommandError::Io(e),
            })?;

        // Drain stderr while waiting so a chatty child cannot block on a full pipe.
        let (tx, rx) = mpsc::channel();
        if let Some(mut pipe) = child.stderr.take() {
            thread::spawn(move || {
                let mut buf = Vec::new();
                let _ = pipe.read_to_end(&mut buf);
                let _ = tx.send(buf);
            });
        }

        let deadline = Instant::now() + timeout;
        let status = loop {
            if let Some(status) = child.try_wait()? {
                break status;
            }
            if Instant::now() >= deadline {
                let _ = child.kill();
                let _ = child.wait();
                return Err(CommandError::TimedOut(timeout));
            }
            thread::sleep(WAIT_POLL);
        };

        if status.success() {
            return Ok(());
        }

        // A grandchild may still hold the pipe open; never wait past the deadline for it.
        let grace = deadline.saturating_duration_since(Instant::now()).max(WAIT_POLL);
        let stderr = rx.recv_timeout(grace).unwrap_or_default();
        Err(CommandError::Failed {
            status,
            stderr: String::from_utf8_lossy(&stderr).trim().to_string(),
        })
    }
}

/// Result of one layout change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconfigureOutcome {
    /// The candidate at `index` succeeded.
    Applied { index: usize },
    /// Every candidate failed, or there were none.
    NoWorkingReconfigurator,
}

/// Applies display layouts by trying candidate commands in order.
pub struct DisplayReconfigurator<R: CommandRunner = ProcessRunner> {
    spec: DisplayCommandSpec,
    runner: R,
    timeout: Duration,
}

impl DisplayReconfigurator<ProcessRunner> {
    pub fn new(spec: DisplayCommandSpec) -> Self {
        Self::with_runner(spec, ProcessRunner)
    }
}

impl<R: CommandRunner> DisplayReconfigurator<R> {
    pub fn with_runner(spec: DisplayCommandSpec, runner: R) -> Self {
        Self {
            spec,
            runner,
            timeout: RECONFIGURE_TIMEOUT,
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Switch to the extended layout (`true`) or primary-only (`false`).
    pub fn apply(&self, extended: bool) -> ReconfigureOutcome {
        if extended {
            info!("Enabling secondary display {}", SECONDARY_CONNECTOR);
        } else {
            info!("Disabling secondary display {}", SECONDARY_CONNECTOR);
        }

        for (index, cmd) in self.spec.candidates(extended).iter().enumerate() {
            let line = cmd.join(" ");
            match self.runner.run(cmd, self.timeout) {
                Ok(()) => {
                    info!("Success with command: {}", line);
                    return ReconfigureOutcome::Applied { index };
                }
                Err(e) => warn!("Command failed: {} - {}", line, e),
            }
        }

        warn!("No working display reconfiguration command found");
        ReconfigureOutcome::NoWorkingReconfigurator
    }
}
