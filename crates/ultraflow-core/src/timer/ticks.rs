//! Tick sources for the countdown.
//!
//! The runner only polls its source while the engine is running, so a source
//! never has more than one consumer and a paused timer never decrements.

use std::future::Future;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};

/// Something that yields a tick roughly once per second.
pub trait TickSource: Send {
    /// Restart the period so the next tick lands one full period from now.
    /// Called whenever the timer goes from paused to running.
    fn rearm(&mut self);

    /// Wait for the next tick. Resolves to `false` once the source is exhausted.
    /// Must be cancel-safe: the runner drops this future whenever a command wins.
    fn next_tick(&mut self) -> impl Future<Output = bool> + Send;
}

/// Wall-clock ticks backed by a tokio interval.
#[derive(Debug)]
pub struct IntervalTicks {
    interval: Interval,
}

impl IntervalTicks {
    pub fn new(period: Duration) -> Self {
        let mut interval = time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { interval }
    }

    pub fn every_second() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

impl TickSource for IntervalTicks {
    fn rearm(&mut self) {
        self.interval.reset();
    }

    async fn next_tick(&mut self) -> bool {
        self.interval.tick().await;
        true
    }
}

/// Ticks pushed by hand, for driving virtual time in tests and simulations.
#[derive(Debug)]
pub struct ManualTicks {
    rx: mpsc::UnboundedReceiver<()>,
}

/// Sending half of [`ManualTicks`].
#[derive(Debug, Clone)]
pub struct ManualTickHandle {
    tx: mpsc::UnboundedSender<()>,
}

impl ManualTicks {
    pub fn new() -> (Self, ManualTickHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { rx }, ManualTickHandle { tx })
    }
}

impl ManualTickHandle {
    pub fn tick(&self) {
        let _ = self.tx.send(());
    }

    pub fn advance(&self, ticks: u64) {
        for _ in 0..ticks {
            self.tick();
        }
    }
}

impl TickSource for ManualTicks {
    /// Ticks queued while paused belong to no running period; drop them.
    fn rearm(&mut self) {
        while self.rx.try_recv().is_ok() {}
    }

    async fn next_tick(&mut self) -> bool {
        self.rx.recv().await.is_some()
    }
}
