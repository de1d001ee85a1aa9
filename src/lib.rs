//! Operation-recording sorting compilers and a timed playback engine.
//!
//! Compiling an algorithm produces an [`op::OpLog`]: the ordered compares,
//! swaps, overwrites and final-marks the algorithm performed. A
//! [`playback::scheduler::Scheduler`] then replays that log against a
//! [`crate::core::sink::VisualSink`] one op per timer tick, which a renderer reads.
//!
//! # Examples
//!
//! Compile and replay without a timer:
//! ```
//! use sortviz::{
//!     engine::registry::{compile, Algorithm},
//!     op::Op,
//! };
//!
//! let log = compile(Algorithm::Bubble, &[5, 3, 8, 1]).expect("compile");
//! assert_eq!(log.ops()[0], Op::Compare { i: 0, j: 1 });
//! assert_eq!(log.ops()[1], Op::Swap { i: 0, j: 1 });
//! assert_eq!(log.replay(&[5, 3, 8, 1]).expect("replay"), vec![1, 3, 5, 8]);
//! ```
//!
//! Timed playback through the runtime:
//! ```no_run
//! use sortviz::{
//!     core::sink::VisualSink,
//!     engine::registry::Algorithm,
//!     runtime::{events::PlaybackEvent, handle::{spawn_player, RuntimeConfig}},
//! };
//!
//! # #[tokio::main]
//! # async fn main() {
//! let handle = spawn_player(VisualSink::new(vec![50, 20, 80, 10]), RuntimeConfig::default());
//! let mut events = handle.subscribe();
//! handle.sort(Algorithm::Merge).await.expect("sort");
//! while let Ok(event) = events.recv().await {
//!     if let PlaybackEvent::Completed { ops } = event {
//!         println!("Completed ({ops} ops)");
//!         break;
//!     }
//! }
//! handle.shutdown().await.expect("shutdown");
//! # }
//! ```
#![warn(missing_docs)]

/// Visualization sink and custom-input parsing.
pub mod core;
/// Algorithm-to-operation compilers.
pub mod engine;
/// Operation model and log.
pub mod op;
/// Scheduler state machine and playback session.
pub mod playback;
/// Single-writer async runtime and events.
pub mod runtime;
/// Shared primitive types.
pub mod types;
