//! Periodic progress ticker
//!
//! Runs only while the session is playing. Each `start` spawns a fresh tokio
//! task tagged with a new generation; `stop` aborts it and bumps the
//! generation so ticks already queued in the inbox are recognised as stale.

use crate::command::Inbound;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{trace, warn};

/// Emits [`Inbound::Tick`] into the session inbox at a fixed period
#[derive(Debug)]
pub struct ProgressTicker {
    period: Duration,
    generation: u64,
    task: Option<JoinHandle<()>>,
    inbox: UnboundedSender<Inbound>,
}

impl ProgressTicker {
    pub fn new(period: Duration, inbox: UnboundedSender<Inbound>) -> Self {
        Self {
            period,
            generation: 0,
            task: None,
            inbox,
        }
    }

    /// Start ticking for the track loaded under `epoch`
    ///
    /// Restarts from scratch if already running. The first tick fires one
    /// period after the call. Without a tokio runtime nothing is spawned.
    pub fn start(&mut self, epoch: u64) {
        self.stop();

        let handle = match Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                warn!("No tokio runtime; progress ticks disabled");
                return;
            }
        };

        let generation = self.generation;
        let period = self.period;
        let inbox = self.inbox.clone();

        self.task = Some(handle.spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                interval.tick().await;
                if inbox.send(Inbound::Tick { epoch, generation }).is_err() {
                    break;
                }
            }
        }));
        trace!("Progress ticker started (generation {})", generation);
    }

    /// Stop ticking; ticks already sent become stale
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.generation = self.generation.wrapping_add(1);
    }

    /// Whether a tick tagged `generation` came from the running task
    pub fn is_current(&self, generation: u64) -> bool {
        self.task.is_some() && generation == self.generation
    }

    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }
}

impl Drop for ProgressTicker {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
