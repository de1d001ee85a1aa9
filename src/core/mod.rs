//! Mutable visualization state and its input helpers.

/// Custom array parsing.
pub mod input;
/// Display array, reset snapshot and highlights.
pub mod sink;
