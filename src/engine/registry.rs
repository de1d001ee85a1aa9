//! Algorithm catalogue and the compile entry points.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{op::OpLog, types::Value};

use super::{
    recorder::Recorder,
    sorts::{self, CompileFn},
};

/// Failure to produce a log.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    /// The algorithm cannot faithfully handle this input.
    #[error("{algorithm} does not support {reason}")]
    UnsupportedOperation {
        /// Requested algorithm.
        algorithm: Algorithm,
        /// What made the input unsupported.
        reason: String,
    },
}

/// Unrecognized algorithm name under strict parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown algorithm: {0}")]
pub struct UnknownAlgorithm(pub String);

/// The sorting algorithms that can be compiled into a log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Algorithm {
    /// Bubble sort with early exit.
    #[default]
    Bubble,
    /// Selection sort.
    Selection,
    /// Insertion sort.
    Insertion,
    /// Top-down merge sort.
    Merge,
    /// Lomuto quick sort.
    Quick,
    /// Max-heap sort.
    Heap,
    /// Shell sort with halving gaps.
    Shell,
    /// Base-10 LSD radix sort.
    Radix,
}

impl Algorithm {
    /// Every algorithm in menu order.
    pub const ALL: [Self; 8] = [
        Self::Bubble,
        Self::Selection,
        Self::Insertion,
        Self::Merge,
        Self::Quick,
        Self::Heap,
        Self::Shell,
        Self::Radix,
    ];

    /// Display name, e.g. `"Bubble Sort"`.
    pub fn name(self) -> &'static str {
        match self {
            Self::Bubble => "Bubble Sort",
            Self::Selection => "Selection Sort",
            Self::Insertion => "Insertion Sort",
            Self::Merge => "Merge Sort",
            Self::Quick => "Quick Sort",
            Self::Heap => "Heap Sort",
            Self::Shell => "Shell Sort",
            Self::Radix => "Radix Sort",
        }
    }

    /// Resolves a display name, falling back to [`Algorithm::Bubble`] for
    /// anything unrecognized.
    pub fn from_name(name: &str) -> Self {
        name.parse().unwrap_or_default()
    }

    /// Compiler for this algorithm.
    pub fn compiler(self) -> CompileFn {
        match self {
            Self::Bubble => sorts::bubble,
            Self::Selection => sorts::selection,
            Self::Insertion => sorts::insertion,
            Self::Merge => sorts::merge,
            Self::Quick => sorts::quick,
            Self::Heap => sorts::heap,
            Self::Shell => sorts::shell,
            Self::Radix => sorts::radix,
        }
    }

    /// Rejects input this algorithm cannot sort correctly.
    pub fn check_input(self, input: &[Value]) -> Result<(), CompileError> {
        if self == Self::Radix {
            if let Some(value) = input.iter().find(|v| **v < 0) {
                return Err(CompileError::UnsupportedOperation {
                    algorithm: self,
                    reason: format!("negative value {value}"),
                });
            }
        }
        Ok(())
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = UnknownAlgorithm;

    /// Accepts display names (`"Quick Sort"`) and short forms (`"quick"`),
    /// case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        let short = wanted.strip_suffix(" sort").unwrap_or(&wanted);
        Self::ALL
            .into_iter()
            .find(|algo| {
                let name = algo.name().to_ascii_lowercase();
                name == wanted || name.strip_suffix(" sort") == Some(short)
            })
            .ok_or_else(|| UnknownAlgorithm(s.to_string()))
    }
}

/// Compiles `input` into a log with `algorithm`.
///
/// Runs on a private working copy; `input` is never mutated.
pub fn compile(algorithm: Algorithm, input: &[Value]) -> Result<OpLog, CompileError> {
    algorithm.check_input(input)?;

    let mut work = input.to_vec();
    let mut rec = Recorder::new();
    (algorithm.compiler())(&mut work, &mut rec);
    debug_assert!(work.is_sorted(), "{algorithm} left its working copy unsorted");

    let log = rec.finish();
    tracing::debug!(%algorithm, len = input.len(), ops = log.len(), "compiled op log");
    Ok(log)
}

/// Compiles by display name; unknown names use bubble sort.
pub fn compile_by_name(name: &str, input: &[Value]) -> Result<OpLog, CompileError> {
    compile(Algorithm::from_name(name), input)
}
