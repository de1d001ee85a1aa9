//! Timed replay of op logs.

/// Timer-driven playback state machine.
pub mod scheduler;
/// Sink plus scheduler with the array-replacement guard.
pub mod session;
