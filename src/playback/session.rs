use std::time::Instant;

use rand::Rng;

use crate::{
    core::{
        input::parse_custom,
        sink::{SinkError, VisualSink},
    },
    engine::registry::{Algorithm, CompileError, compile},
    op::OpLog,
    types::{Delay, Value},
};

use super::scheduler::{PlaybackError, Scheduler, Tick};

/// Rejected session call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// Scheduler rejected the call.
    #[error(transparent)]
    Playback(#[from] PlaybackError),
    /// Sink rejected the new array.
    #[error(transparent)]
    Sink(#[from] SinkError),
    /// The log could not be compiled.
    #[error(transparent)]
    Compile(#[from] CompileError),
    /// The array cannot be replaced while a log is being played.
    #[error("cannot {0} while playback is active")]
    PlaybackActive(&'static str),
    /// The log was compiled from an array that has since been replaced.
    #[error("log compiled for array epoch {compiled}, current epoch is {current}")]
    StaleLog {
        /// Epoch the log was compiled from.
        compiled: u64,
        /// Epoch of the sink now.
        current: u64,
    },
}

/// One sink plus the scheduler that replays into it.
///
/// The compile path always works on a copy of the sink's values, and array
/// replacement is refused while a log is loaded, so the display array is
/// never torn mid-replay.
#[derive(Debug, Default)]
pub struct Session {
    sink: VisualSink,
    scheduler: Scheduler,
    algorithm: Option<Algorithm>,
}

impl Session {
    /// Wraps `sink` with an idle scheduler.
    pub fn new(sink: VisualSink, delay: Delay) -> Self {
        Self {
            sink,
            scheduler: Scheduler::new(delay),
            algorithm: None,
        }
    }

    /// Renderer-facing state.
    pub fn sink(&self) -> &VisualSink {
        &self.sink
    }

    /// Playback state machine.
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Algorithm of the log last started, if it came from [`Session::start`].
    pub fn algorithm(&self) -> Option<Algorithm> {
        self.algorithm
    }

    /// Compiles the current array without starting playback.
    pub fn compile(&self, algorithm: Algorithm) -> Result<OpLog, SessionError> {
        Ok(compile(algorithm, self.sink.values())?)
    }

    /// Compiles the current array and starts playing it.
    pub fn start(&mut self, algorithm: Algorithm, now: Instant) -> Result<usize, SessionError> {
        if self.scheduler.is_playing() {
            return Err(PlaybackError::InvalidStateTransition {
                state: self.scheduler.state(),
                action: "start",
            }
            .into());
        }
        let log = self.compile(algorithm)?;
        let epoch = self.sink.epoch();
        self.start_log(log, Some(algorithm), epoch, now)
    }

    /// Starts a log compiled elsewhere from the array at `epoch`.
    pub fn start_log(
        &mut self,
        log: OpLog,
        algorithm: Option<Algorithm>,
        epoch: u64,
        now: Instant,
    ) -> Result<usize, SessionError> {
        if epoch != self.sink.epoch() {
            return Err(SessionError::StaleLog {
                compiled: epoch,
                current: self.sink.epoch(),
            });
        }
        let total = log.len();
        let delay = self.scheduler.delay();
        self.scheduler.start(log, delay, &mut self.sink, now)?;
        self.algorithm = algorithm;
        Ok(total)
    }

    /// Drives the scheduler timer; see [`Scheduler::poll`].
    pub fn poll(&mut self, now: Instant) -> Result<Option<Tick>, SessionError> {
        Ok(self.scheduler.poll(now, &mut self.sink)?)
    }

    /// Fires the scheduler timer once; see [`Scheduler::tick`].
    pub fn tick(&mut self) -> Result<Tick, SessionError> {
        Ok(self.scheduler.tick(&mut self.sink)?)
    }

    /// Pauses playback.
    pub fn pause(&mut self) -> Result<(), SessionError> {
        Ok(self.scheduler.pause()?)
    }

    /// Resumes playback.
    pub fn resume(&mut self) -> Result<(), SessionError> {
        Ok(self.scheduler.resume()?)
    }

    /// Flips between paused and playing; returns true when now paused.
    pub fn toggle_pause(&mut self) -> Result<bool, SessionError> {
        if self.scheduler.is_paused() {
            self.scheduler.resume()?;
        } else {
            self.scheduler.pause()?;
        }
        Ok(self.scheduler.is_paused())
    }

    /// Changes the playback delay.
    pub fn set_rate(&mut self, delay_ms: u64) -> Result<(), SessionError> {
        Ok(self.scheduler.set_rate(delay_ms)?)
    }

    /// Stops playback, leaving the array as last mutated.
    pub fn stop(&mut self) -> usize {
        self.scheduler.stop()
    }

    /// Stops playback and restores the original array.
    pub fn reset(&mut self) -> usize {
        let applied = self.scheduler.stop();
        self.sink.reset_to_original();
        applied
    }

    /// Replaces the array with validated custom values.
    pub fn load_custom(&mut self, values: Vec<Value>) -> Result<(), SessionError> {
        self.guard_idle("load a custom array")?;
        self.sink.load_custom(values).inspect_err(|err| {
            tracing::warn!(%err, "rejected custom array");
        })?;
        Ok(())
    }

    /// Parses and loads comma-separated custom values.
    pub fn load_custom_str(&mut self, input: &str) -> Result<(), SessionError> {
        self.guard_idle("load a custom array")?;
        let values = parse_custom(input).inspect_err(|err| {
            tracing::warn!(%err, "rejected custom array input");
        })?;
        self.load_custom(values)
    }

    /// Replaces the array with random values.
    pub fn generate_random(&mut self, size: usize, max_exclusive: Value) -> Result<(), SessionError> {
        self.generate_random_with(&mut rand::thread_rng(), size, max_exclusive)
    }

    /// [`Session::generate_random`] with a caller-supplied RNG.
    pub fn generate_random_with<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        size: usize,
        max_exclusive: Value,
    ) -> Result<(), SessionError> {
        self.guard_idle("generate a new array")?;
        self.sink.generate_random_with(rng, size, max_exclusive)?;
        Ok(())
    }

    fn guard_idle(&self, action: &'static str) -> Result<(), SessionError> {
        if self.scheduler.is_playing() {
            tracing::debug!(action, "array replacement rejected during playback");
            return Err(SessionError::PlaybackActive(action));
        }
        Ok(())
    }
}
