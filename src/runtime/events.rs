//! Runtime event stream payloads.

use crate::engine::registry::Algorithm;

/// Events emitted from the single-writer playback loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackEvent {
    /// A log was loaded and playback began.
    Started {
        /// Algorithm that produced the log, when known.
        algorithm: Option<Algorithm>,
        /// Log length.
        total: usize,
    },
    /// Ops applied so far; the renderer should redraw.
    Progress {
        /// Ops applied.
        applied: usize,
        /// Log length.
        total: usize,
    },
    /// Playback was paused.
    Paused,
    /// Playback was resumed.
    Resumed,
    /// The inter-tick delay changed.
    RateChanged {
        /// New delay in milliseconds.
        delay_ms: u64,
    },
    /// Every op was played.
    Completed {
        /// Number of ops played.
        ops: usize,
    },
    /// Playback was stopped before completion, or the view was reset.
    Stopped {
        /// Ops applied before stopping.
        applied: usize,
    },
    /// A new array replaced the old one.
    ArrayReplaced {
        /// New array length.
        len: usize,
    },
}
