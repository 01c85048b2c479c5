use std::time::Duration;

use rand::Rng;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::debug;

/// Emits a tick each heartbeat interval.
///
/// The first tick is delayed by a random fraction of the interval so that
/// many clients reconnecting at once do not beat in lockstep. The
/// connection handler owns the socket and sends the actual payloads.
pub struct HeartbeatManager {
    interval: Duration,
    handle: Option<JoinHandle<()>>,
}

impl HeartbeatManager {
    #[must_use]
    pub const fn new(interval_ms: u64) -> Self {
        Self {
            interval: Duration::from_millis(interval_ms),
            handle: None,
        }
    }

    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Delay before the first heartbeat, `interval * jitter` with jitter in `[0, 1)`.
    pub fn first_delay<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        self.interval.mul_f64(rng.r#gen::<f64>())
    }

    pub fn start(&mut self) -> mpsc::Receiver<()> {
        self.stop();

        let (tick_tx, tick_rx) = mpsc::channel(1);
        let period = self.interval;
        let first_delay = self.first_delay(&mut rand::thread_rng());

        self.handle = Some(tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + first_delay, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                if tick_tx.send(()).await.is_err() {
                    break;
                }
            }

            debug!("Heartbeat loop stopped");
        }));

        tick_rx
    }

    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for HeartbeatManager {
    fn drop(&mut self) {
        self.stop();
    }
}
