//! Pausable stopwatch measuring elapsed ticks.
//!
//! [`StopwatchState`] is a plain record with transitions that take the
//! current tick count as an argument, so it can be persisted between process
//! runs and tested without reading a clock. [`Stopwatch`] pairs a state with a
//! [`Clock`].

use chrono::{Duration, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Resolution of the ticks a stopwatch counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TickUnit {
    #[default]
    Millis,
    Nanos,
}

impl TickUnit {
    /// Converts a tick count in this unit into a duration.
    pub fn to_duration(self, ticks: i64) -> Duration {
        match self {
            TickUnit::Millis => Duration::try_milliseconds(ticks).unwrap_or(Duration::MAX),
            TickUnit::Nanos => Duration::nanoseconds(ticks),
        }
    }

    /// Converts a duration into ticks of this unit, saturating on overflow.
    pub fn ticks(self, duration: &Duration) -> i64 {
        match self {
            TickUnit::Millis => duration.num_milliseconds(),
            TickUnit::Nanos => duration.num_nanoseconds().unwrap_or_else(|| {
                if *duration < Duration::zero() {
                    i64::MIN
                } else {
                    i64::MAX
                }
            }),
        }
    }
}

/// Source of the current time, in ticks of the requested unit.
pub trait Clock {
    fn now(&self, unit: TickUnit) -> i64;
}

/// Wall clock based on the system time.
///
/// Wall time rather than a monotonic instant, so a stopwatch started in one
/// process can be read in another.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self, unit: TickUnit) -> i64 {
        let now = Utc::now();
        match unit {
            TickUnit::Millis => now.timestamp_millis(),
            TickUnit::Nanos => now
                .timestamp_nanos_opt()
                .unwrap_or_else(|| now.timestamp_millis().saturating_mul(1_000_000)),
        }
    }
}

/// Bookkeeping for a running or paused stopwatch. All values are in `unit` ticks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopwatchState {
    pub unit: TickUnit,
    /// Tick at which elapsed time was zero.
    pub started_at: i64,
    /// Ticks spent in completed pauses.
    pub paused_total: i64,
    /// Tick at which the current pause began.
    pub paused_at: Option<i64>,
    /// Manual adjustment added through [`StopwatchState::skip`].
    pub offset: i64,
}

impl StopwatchState {
    /// A running state whose elapsed time at `now` is `initial`.
    pub fn started(unit: TickUnit, now: i64, initial: i64) -> Self {
        Self {
            unit,
            started_at: now.saturating_sub(initial),
            paused_total: 0,
            paused_at: None,
            offset: 0,
        }
    }

    /// Restarts from `initial` ticks, clearing pauses and offsets.
    pub fn start(&mut self, now: i64, initial: i64) {
        *self = Self::started(self.unit, now, initial);
    }

    /// Freezes elapsed time. Pausing twice keeps the first pause.
    pub fn pause(&mut self, now: i64) {
        if self.paused_at.is_none() {
            self.paused_at = Some(now);
        }
    }

    /// Continues after a pause; no effect while running.
    pub fn resume(&mut self, now: i64) {
        if let Some(paused_at) = self.paused_at.take() {
            self.paused_total = self.paused_total.saturating_add(now.saturating_sub(paused_at));
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused_at.is_some()
    }

    /// Elapsed ticks at `now`, excluding paused time.
    pub fn elapsed(&self, now: i64) -> i64 {
        let until = self.paused_at.unwrap_or(now);
        until
            .saturating_sub(self.started_at)
            .saturating_sub(self.paused_total)
            .saturating_add(self.offset)
    }

    /// Moves elapsed time by `amount` ticks (negative rewinds). Rewinding past
    /// zero restarts the stopwatch at zero, keeping it paused if it was.
    pub fn skip(&mut self, now: i64, amount: i64) {
        self.offset = self.offset.saturating_add(amount);
        if self.elapsed(now) < 0 {
            let was_paused = self.is_paused();
            self.start(now, 0);
            if was_paused {
                self.pause(now);
            }
        }
    }
}

/// A stopwatch reading time from a [`Clock`]. Starts running on creation.
#[derive(Debug, Clone)]
pub struct Stopwatch<C: Clock = SystemClock> {
    state: StopwatchState,
    clock: C,
}

impl Stopwatch<SystemClock> {
    pub fn new() -> Self {
        Self::with_unit(TickUnit::default())
    }

    pub fn with_unit(unit: TickUnit) -> Self {
        Self::with_clock(SystemClock, unit)
    }
}

impl Default for Stopwatch<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> Stopwatch<C> {
    pub fn with_clock(clock: C, unit: TickUnit) -> Self {
        Self::starting_at(clock, unit, 0)
    }

    /// A running stopwatch that already shows `initial` elapsed ticks.
    pub fn starting_at(clock: C, unit: TickUnit, initial: i64) -> Self {
        let now = clock.now(unit);
        Self {
            state: StopwatchState::started(unit, now, initial),
            clock,
        }
    }

    /// Resumes tracking from a previously saved state.
    pub fn from_state(clock: C, state: StopwatchState) -> Self {
        Self { state, clock }
    }

    pub fn state(&self) -> &StopwatchState {
        &self.state
    }

    pub fn into_state(self) -> StopwatchState {
        self.state
    }

    pub fn unit(&self) -> TickUnit {
        self.state.unit
    }

    fn now(&self) -> i64 {
        self.clock.now(self.state.unit)
    }

    pub fn start(&mut self) {
        self.start_at(0);
    }

    pub fn start_at(&mut self, initial: i64) {
        let now = self.now();
        self.state.start(now, initial);
    }

    pub fn start_paused(&mut self, initial: i64) {
        self.start_at(initial);
        self.pause();
    }

    pub fn pause(&mut self) {
        let now = self.now();
        self.state.pause(now);
    }

    pub fn resume(&mut self) {
        let now = self.now();
        self.state.resume(now);
    }

    pub fn is_paused(&self) -> bool {
        self.state.is_paused()
    }

    /// Elapsed ticks in this stopwatch's unit.
    pub fn elapsed(&self) -> i64 {
        self.state.elapsed(self.now())
    }

    pub fn elapsed_duration(&self) -> Duration {
        self.state.unit.to_duration(self.elapsed())
    }

    pub fn skip(&mut self, amount: i64) {
        let now = self.now();
        self.state.skip(now, amount);
    }
}
