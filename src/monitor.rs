//! Polling loop that switches the display layout when the keyboard is
//! docked or detached.
//!
//! Every tick blocks on one enumeration and, on an edge, on one layout
//! change; the interval sleep starts after that work finishes, so a slow
//! external command stretches the period. Shutdown is cooperative: the flag
//! is checked before each tick and during the sleep.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use tracing::info;

use crate::display::{CommandRunner, DisplayReconfigurator};
use crate::presence::{PresenceEvent, PresenceState, PresenceStateMachine, UsbEnumerator, is_target_present};
use crate::protocol::{KEYBOARD_KEYWORDS, POLL_INTERVAL, VENDOR_ID_HEX};

/// Longest uninterrupted sleep, so shutdown is noticed promptly.
const SLEEP_SLICE: Duration = Duration::from_millis(100);

/// Monitor settings.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorConfig {
    pub interval: Duration,
    pub vendor_hex: String,
    pub keywords: Vec<String>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval: POLL_INTERVAL,
            vendor_hex: VENDOR_ID_HEX.to_string(),
            keywords: KEYBOARD_KEYWORDS.iter().map(|k| k.to_string()).collect(),
        }
    }
}

/// Keyboard presence monitor.
pub struct PresenceMonitor<E: UsbEnumerator, R: CommandRunner> {
    config: MonitorConfig,
    enumerator: E,
    reconfigurator: DisplayReconfigurator<R>,
    machine: PresenceStateMachine,
}

impl<E: UsbEnumerator, R: CommandRunner> PresenceMonitor<E, R> {
    pub fn new(config: MonitorConfig, enumerator: E, reconfigurator: DisplayReconfigurator<R>) -> Self {
        Self {
            config,
            enumerator,
            reconfigurator,
            machine: PresenceStateMachine::new(),
        }
    }

    pub fn state(&self) -> PresenceState {
        self.machine.state()
    }

    pub fn reconfigurator(&self) -> &DisplayReconfigurator<R> {
        &self.reconfigurator
    }

    /// Run one probe and react to the edge it produces, if any.
    pub fn tick(&mut self) -> Option<PresenceEvent> {
        let snapshot = self.enumerator.snapshot();
        let present = is_target_present(&snapshot, &self.config.vendor_hex, self.config.keywords.as_slice());
        let seeding = self.machine.state() == PresenceState::Unknown;

        let event = self.machine.observe(present);
        if seeding {
            info!(
                "Initial keyboard state: {}",
                if present { "connected" } else { "disconnected" }
            );
        }

        match event {
            // Docked keyboard covers the lower panel: primary only.
            Some(PresenceEvent::Connected) => {
                info!("Keyboard connected");
                self.reconfigurator.apply(false);
            }
            Some(PresenceEvent::Disconnected) => {
                info!("Keyboard disconnected");
                self.reconfigurator.apply(true);
            }
            None => {}
        }

        event
    }

    /// Poll until `shutdown` is set.
    pub fn run(&mut self, shutdown: &AtomicBool) {
        info!(
            "Monitoring for keyboard every {:?} (vendor {})",
            self.config.interval, self.config.vendor_hex
        );

        while !shutdown.load(Ordering::Relaxed) {
            self.tick();
            sleep_unless(shutdown, self.config.interval);
        }

        info!("Monitoring stopped");
    }
}

/// Sleep for `duration`, returning early once `shutdown` is set.
fn sleep_unless(shutdown: &AtomicBool, duration: Duration) {
    let deadline = Instant::now() + duration;
    loop {
        if shutdown.load(Ordering::Relaxed) {
            return;
        }
        let now = Instant::now();
        if now >= deadline {
            return;
        }
        thread::sleep((deadline - now).min(SLEEP_SLICE));
    }
}
