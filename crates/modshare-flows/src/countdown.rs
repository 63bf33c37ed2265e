//! Ad-gate countdown
//!
//! Sharing a new story or showcase first shows an ad. The share payload is
//! held by an [`AdGate`] until its [`AdCountdown`] reaches zero.

use crate::error::AdGateError;
use std::time::Duration;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Seconds an ad is shown when nothing else is configured
pub const DEFAULT_AD_SECONDS: u32 = 60;

/// Result of one countdown tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Countdown is not running
    Idle,
    /// Seconds still to go
    Running(u32),
    /// Reached zero on this tick
    Completed,
}

/// One-second countdown
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdCountdown {
    duration: u32,
    remaining: u32,
    active: bool,
}

impl AdCountdown {
    /// Create stopped countdown
    #[inline]
    #[must_use]
    pub fn new(duration_secs: u32) -> Self {
        Self {
            duration: duration_secs,
            remaining: duration_secs,
            active: false,
        }
    }

    /// Create from a configured duration, rounded down to whole seconds
    #[must_use]
    pub fn from_duration(duration: Duration) -> Self {
        Self::new(u32::try_from(duration.as_secs()).unwrap_or(u32::MAX))
    }

    /// Start from the full duration
    pub fn start(&mut self) {
        self.active = true;
        self.remaining = self.duration;
    }

    /// Stop ticking, keep the remaining time
    pub fn pause(&mut self) {
        self.active = false;
    }

    /// Stop and rewind to the full duration
    pub fn reset(&mut self) {
        self.active = false;
        self.remaining = self.duration;
    }

    /// Advance one second
    pub fn tick(&mut self) -> Tick {
        if !self.active {
            return Tick::Idle;
        }
        if self.remaining <= 1 {
            self.remaining = 0;
            self.active = false;
            return Tick::Completed;
        }
        self.remaining -= 1;
        Tick::Running(self.remaining)
    }

    /// Seconds left
    #[inline]
    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Configured length in seconds
    #[inline]
    #[must_use]
    pub fn duration(&self) -> u32 {
        self.duration
    }

    /// Check if ticking
    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Check if the countdown ran out
    #[inline]
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.remaining == 0
    }

    /// Tick once per second until the countdown completes or stops
    ///
    /// `on_tick` sees the remaining seconds after every tick. Returns `true`
    /// when zero was reached; dropping the future stops the countdown where
    /// it is.
    pub async fn run(&mut self, mut on_tick: impl FnMut(u32)) -> bool {
        let period = Duration::from_secs(1);
        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            match self.tick() {
                Tick::Running(remaining) => on_tick(remaining),
                Tick::Completed => {
                    on_tick(0);
                    tracing::debug!(duration = self.duration, "ad countdown completed");
                    return true;
                }
                Tick::Idle => return false,
            }
        }
    }
}

impl Default for AdCountdown {
    fn default() -> Self {
        Self::new(DEFAULT_AD_SECONDS)
    }
}

/// Ad shown in front of a payload
///
/// The payload is released only once the countdown has run out.
#[derive(Debug)]
pub struct AdGate<T> {
    countdown: AdCountdown,
    payload: Option<T>,
}

impl<T> AdGate<T> {
    /// Open the gate and start its countdown
    #[must_use]
    pub fn open(payload: T, duration_secs: u32) -> Self {
        let mut countdown = AdCountdown::new(duration_secs);
        countdown.start();
        Self {
            countdown,
            payload: Some(payload),
        }
    }

    /// Open the gate for a configured duration
    #[must_use]
    pub fn open_for(payload: T, duration: Duration) -> Self {
        Self::open(payload, AdCountdown::from_duration(duration).duration())
    }

    /// Countdown driving this gate
    #[inline]
    #[must_use]
    pub fn countdown(&self) -> &AdCountdown {
        &self.countdown
    }

    /// Seconds until the gate can close
    #[inline]
    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.countdown.remaining()
    }

    /// Check if the gate may be dismissed
    #[inline]
    #[must_use]
    pub fn can_dismiss(&self) -> bool {
        self.countdown.is_complete() && self.payload.is_some()
    }

    /// Advance the countdown one second
    pub fn tick(&mut self) -> Tick {
        self.countdown.tick()
    }

    /// Run the countdown to completion
    pub async fn wait(&mut self) -> bool {
        self.countdown.run(|_| {}).await
    }

    /// Close the gate and take the payload
    ///
    /// # Errors
    /// `StillCounting` before zero, `AlreadyDismissed` on a second call.
    pub fn dismiss(&mut self) -> Result<T, AdGateError> {
        if !self.countdown.is_complete() {
            return Err(AdGateError::StillCounting {
                remaining: self.countdown.remaining(),
            });
        }
        self.payload.take().ok_or(AdGateError::AlreadyDismissed)
    }
}
