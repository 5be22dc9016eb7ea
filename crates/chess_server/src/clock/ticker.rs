//! Tokio-backed tick source feeding the session event queue.

use super::Ticker;
use crate::session::SessionEvent;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Duration, Instant};
use tracing::debug;

/// Enqueues [`SessionEvent::Tick`] once per `period` from a background task.
///
/// The first tick fires one full period after `start`, never immediately.
pub struct IntervalTicker {
    events: mpsc::UnboundedSender<SessionEvent>,
    period: Duration,
    task: Option<JoinHandle<()>>,
}

impl IntervalTicker {
    pub fn new(events: mpsc::UnboundedSender<SessionEvent>, period: Duration) -> Self {
        Self {
            events,
            period,
            task: None,
        }
    }

    /// One tick per second.
    pub fn every_second(events: mpsc::UnboundedSender<SessionEvent>) -> Self {
        Self::new(events, Duration::from_secs(1))
    }
}

impl Ticker for IntervalTicker {
    fn start(&mut self) {
        if self.task.is_some() {
            return;
        }

        let events = self.events.clone();
        let period = self.period;
        self.task = Some(tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            loop {
                ticker.tick().await;
                if events.send(SessionEvent::Tick).is_err() {
                    debug!("Session queue closed, tick task exiting");
                    break;
                }
            }
        }));
    }

    fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for IntervalTicker {
    fn drop(&mut self) {
        self.stop();
    }
}
