//! Algorithm-to-operation compilers.

/// Working-copy recorder used by every compiler.
pub mod recorder;
/// Algorithm catalogue and compile entry points.
pub mod registry;
/// The instrumented sorting algorithms.
pub mod sorts;
