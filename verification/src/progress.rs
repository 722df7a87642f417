//! Cosmetic progress display for the processing state.
//!
//! The ticker counts from 0 to 100 in fixed increments, one per interval,
//! purely so a UI has something to animate. It is not tied to the record
//! write in any way.

use std::time::Duration;

/// Default increment per tick, in percent.
pub const DEFAULT_STEP: u8 = 10;
/// Default time between ticks.
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(300);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProgressTicker {
    step: u8,
    interval: Duration,
}

impl ProgressTicker {
    /// `step` is clamped to `1..=100`.
    pub fn new(step: u8, interval: Duration) -> Self {
        Self {
            step: step.clamp(1, 100),
            interval,
        }
    }

    /// Values emitted after each tick: strictly increasing, ending at 100.
    pub fn steps(&self) -> impl Iterator<Item = u8> {
        let step = self.step;
        (1..=100u8.div_ceil(step)).map(move |n| n.saturating_mul(step).min(100))
    }

    /// Tick through [`Self::steps`], calling `on_step` after each interval.
    pub async fn run(&self, on_step: impl FnMut(u8)) {
        self.run_from(0, on_step).await;
    }

    /// Like [`Self::run`], skipping steps at or below `from`.
    pub async fn run_from(&self, from: u8, mut on_step: impl FnMut(u8)) {
        for value in self.steps().filter(|value| *value > from) {
            tokio::time::sleep(self.interval).await;
            tracing::debug!(progress = value, "progress tick");
            on_step(value);
        }
    }
}

impl Default for ProgressTicker {
    fn default() -> Self {
        Self::new(DEFAULT_STEP, DEFAULT_INTERVAL)
    }
}
