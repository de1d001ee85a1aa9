use std::{fmt, time::Instant};

use serde::{Deserialize, Serialize};

use crate::{
    core::sink::{SinkError, VisualSink},
    op::{OpLog, ReplayError},
    types::Delay,
};

/// Lifecycle of one playback session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlaybackState {
    /// Nothing loaded, or stopped.
    #[default]
    Idle,
    /// Timer armed and applying ops.
    Playing,
    /// Timer armed, ticks skipped.
    Paused,
    /// Every op applied; timer halted.
    Completed,
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::Playing => "playing",
            Self::Paused => "paused",
            Self::Completed => "completed",
        })
    }
}

/// Outcome of one timer fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Not playing; nothing happened.
    Skipped,
    /// One op was applied; `cursor` ops are now applied out of `total`.
    Applied {
        /// Ops applied so far.
        cursor: usize,
        /// Log length.
        total: usize,
    },
    /// The log was already exhausted; playback finished on this tick.
    Completed {
        /// Number of ops played.
        ops: usize,
    },
}

/// Rejected scheduler call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlaybackError {
    /// The call is not valid from the current state. Nothing changed.
    #[error("cannot {action} while {state}")]
    InvalidStateTransition {
        /// State at the time of the call.
        state: PlaybackState,
        /// Rejected action.
        action: &'static str,
    },
    /// Delay outside the accepted range.
    #[error("delay {0}ms is out of range")]
    InvalidDelay(u64),
    /// The log addresses indices the sink does not have.
    #[error("log does not fit the array: {0}")]
    LogMismatch(#[from] ReplayError),
    /// Applying an op to the sink failed.
    #[error(transparent)]
    Sink(#[from] SinkError),
}

/// Timer-driven replay of one [`OpLog`] against a [`VisualSink`].
///
/// The scheduler never sleeps. A driver asks for [`Scheduler::next_deadline`]
/// and calls [`Scheduler::poll`] once it has passed, or calls
/// [`Scheduler::tick`] directly to fire the timer by hand. Pausing keeps the
/// timer armed and turns ticks into no-ops, so resuming continues from the
/// same cursor.
#[derive(Debug, Default)]
pub struct Scheduler {
    state: PlaybackState,
    log: OpLog,
    cursor: usize,
    delay: Delay,
    // Time of the last fire (or of start); `None` while the timer is halted.
    last_fire: Option<Instant>,
}

impl Scheduler {
    /// Creates an idle scheduler with the given inter-tick delay.
    pub fn new(delay: Delay) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// True while a log is loaded and not finished, paused or not.
    pub fn is_playing(&self) -> bool {
        matches!(self.state, PlaybackState::Playing | PlaybackState::Paused)
    }

    /// True only while paused.
    pub fn is_paused(&self) -> bool {
        self.state == PlaybackState::Paused
    }

    /// Number of ops applied from the current log.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Length of the current log.
    pub fn total(&self) -> usize {
        self.log.len()
    }

    /// Current inter-tick delay.
    pub fn delay(&self) -> Delay {
        self.delay
    }

    /// Log being (or last) played.
    pub fn log(&self) -> &OpLog {
        &self.log
    }

    /// When the armed timer fires next, or `None` when halted.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.last_fire.map(|t| t + self.delay.as_duration())
    }

    /// Loads `log`, resets the cursor and sink highlights, and arms the timer.
    ///
    /// Accepted from idle or completed. While playing or paused the call is
    /// rejected and nothing changes.
    pub fn start(
        &mut self,
        log: OpLog,
        delay: Delay,
        sink: &mut VisualSink,
        now: Instant,
    ) -> Result<(), PlaybackError> {
        if self.is_playing() {
            return Err(self.reject("start"));
        }
        log.check_bounds(sink.len())?;

        sink.reset_highlights();
        self.log = log;
        self.cursor = 0;
        self.delay = delay;
        self.state = PlaybackState::Playing;
        self.last_fire = Some(now);
        tracing::debug!(ops = self.log.len(), delay_ms = delay.as_millis(), "playback started");
        Ok(())
    }

    /// Fires the timer if its deadline is at or before `now`.
    ///
    /// Returns `None` when the timer is halted or not yet due.
    pub fn poll(&mut self, now: Instant, sink: &mut VisualSink) -> Result<Option<Tick>, PlaybackError> {
        match self.next_deadline() {
            Some(deadline) if now >= deadline => {
                self.last_fire = Some(now);
                self.tick(sink).map(Some)
            }
            _ => Ok(None),
        }
    }

    /// One timer fire: apply the op under the cursor, or finish.
    pub fn tick(&mut self, sink: &mut VisualSink) -> Result<Tick, PlaybackError> {
        if self.state != PlaybackState::Playing {
            return Ok(Tick::Skipped);
        }

        let Some(op) = self.log.get(self.cursor).copied() else {
            self.state = PlaybackState::Completed;
            self.last_fire = None;
            tracing::debug!(ops = self.log.len(), "playback completed");
            return Ok(Tick::Completed {
                ops: self.log.len(),
            });
        };

        sink.apply(&op)?;
        self.cursor += 1;
        Ok(Tick::Applied {
            cursor: self.cursor,
            total: self.log.len(),
        })
    }

    /// Suspends progress without halting the timer. Pausing twice is the
    /// same as pausing once.
    pub fn pause(&mut self) -> Result<(), PlaybackError> {
        match self.state {
            PlaybackState::Playing => {
                self.state = PlaybackState::Paused;
                tracing::debug!(cursor = self.cursor, "playback paused");
                Ok(())
            }
            PlaybackState::Paused => Ok(()),
            _ => Err(self.reject("pause")),
        }
    }

    /// Continues from the paused cursor.
    pub fn resume(&mut self) -> Result<(), PlaybackError> {
        if self.state != PlaybackState::Paused {
            return Err(self.reject("resume"));
        }
        self.state = PlaybackState::Playing;
        tracing::debug!(cursor = self.cursor, "playback resumed");
        Ok(())
    }

    /// Changes the inter-tick delay. Takes effect from the next tick.
    pub fn set_rate(&mut self, delay_ms: u64) -> Result<(), PlaybackError> {
        self.delay = Delay::from_millis(delay_ms).ok_or(PlaybackError::InvalidDelay(delay_ms))?;
        Ok(())
    }

    /// Halts the timer and returns to idle. The sink keeps whatever the last
    /// applied op left in it. Returns the number of ops that were applied.
    pub fn stop(&mut self) -> usize {
        if self.state != PlaybackState::Idle {
            tracing::debug!(cursor = self.cursor, state = %self.state, "playback stopped");
        }
        self.state = PlaybackState::Idle;
        self.last_fire = None;
        self.cursor
    }

    fn reject(&self, action: &'static str) -> PlaybackError {
        tracing::debug!(state = %self.state, action, "ignored playback transition");
        PlaybackError::InvalidStateTransition {
            state: self.state,
            action,
        }
    }
}
