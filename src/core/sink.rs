use hashbrown::HashSet;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    op::{Op, ReplayError},
    types::{Index, Value},
};

/// Rejected sink mutation. Prior state is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SinkError {
    /// Values or parameters outside what the sink accepts.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Nothing left after parsing.
    #[error("array is empty")]
    EmptyInput,
    /// An op addressed an index outside the current array.
    #[error(transparent)]
    Replay(#[from] ReplayError),
}

/// Read-only copy of what a renderer needs for one frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SinkSnapshot {
    /// Current array contents.
    pub values: Vec<Value>,
    /// Primary highlighted index.
    pub highlight_a: Option<Index>,
    /// Secondary highlighted index.
    pub highlight_b: Option<Index>,
    /// Indices marked final since the current log started, ascending.
    pub finalized: Vec<Index>,
}

/// Mutable visualization state: the display array, its reset snapshot, and
/// the last-touched indices.
#[derive(Debug, Clone, Default)]
pub struct VisualSink {
    current: Vec<Value>,
    original: Vec<Value>,
    highlight_a: Option<Index>,
    highlight_b: Option<Index>,
    finalized: HashSet<Index>,
    epoch: u64,
}

impl VisualSink {
    /// Creates a sink over `values`, which also become the reset snapshot.
    pub fn new(values: Vec<Value>) -> Self {
        Self {
            original: values.clone(),
            current: values,
            ..Self::default()
        }
    }

    /// Current array contents.
    pub fn values(&self) -> &[Value] {
        &self.current
    }

    /// Snapshot restored by [`VisualSink::reset_to_original`].
    pub fn original(&self) -> &[Value] {
        &self.original
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.current.len()
    }

    /// True when the array has no elements.
    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    /// Both highlights, `None` meaning no emphasis.
    pub fn highlights(&self) -> (Option<Index>, Option<Index>) {
        (self.highlight_a, self.highlight_b)
    }

    /// True once `index` has received a mark-final since the last reset.
    pub fn is_final(&self, index: Index) -> bool {
        self.finalized.contains(&index)
    }

    /// Counter bumped every time the array is replaced.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Copies the renderer-facing state.
    pub fn snapshot(&self) -> SinkSnapshot {
        let mut finalized: Vec<Index> = self.finalized.iter().copied().collect();
        finalized.sort_unstable();
        SinkSnapshot {
            values: self.current.clone(),
            highlight_a: self.highlight_a,
            highlight_b: self.highlight_b,
            finalized,
        }
    }

    /// Applies one op and updates highlights the way a renderer expects.
    pub fn apply(&mut self, op: &Op) -> Result<(), SinkError> {
        op.apply_to(&mut self.current)?;
        match *op {
            Op::Compare { i, j } | Op::Swap { i, j } => {
                self.highlight_a = Some(i);
                self.highlight_b = Some(j);
            }
            Op::Overwrite { index, .. } => {
                self.highlight_a = Some(index);
                self.highlight_b = None;
            }
            Op::MarkFinal { index } => {
                self.highlight_a = Some(index);
                self.highlight_b = None;
                self.finalized.insert(index);
            }
        }
        Ok(())
    }

    /// Clears highlights and final marks without touching values.
    pub fn reset_highlights(&mut self) {
        self.highlight_a = None;
        self.highlight_b = None;
        self.finalized.clear();
    }

    /// Restores the snapshot taken when the array was last loaded.
    pub fn reset_to_original(&mut self) {
        self.current.clone_from(&self.original);
        self.reset_highlights();
    }

    /// Replaces the array with user-supplied positive values.
    pub fn load_custom(&mut self, values: Vec<Value>) -> Result<(), SinkError> {
        if values.is_empty() {
            return Err(SinkError::EmptyInput);
        }
        if let Some(bad) = values.iter().find(|v| **v <= 0) {
            return Err(SinkError::InvalidInput(format!("value must be positive: {bad}")));
        }
        self.replace(values);
        Ok(())
    }

    /// Replaces the array with `size` random values from `1..max_exclusive`.
    pub fn generate_random(&mut self, size: usize, max_exclusive: Value) -> Result<(), SinkError> {
        self.generate_random_with(&mut rand::thread_rng(), size, max_exclusive)
    }

    /// [`VisualSink::generate_random`] drawing from a caller-supplied RNG.
    pub fn generate_random_with<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        size: usize,
        max_exclusive: Value,
    ) -> Result<(), SinkError> {
        if size == 0 {
            return Err(SinkError::InvalidInput("size must be at least 1".to_string()));
        }
        if max_exclusive <= 1 {
            return Err(SinkError::InvalidInput(format!(
                "max value must exceed 1, got {max_exclusive}"
            )));
        }
        let values = (0..size).map(|_| rng.gen_range(1..max_exclusive)).collect();
        self.replace(values);
        Ok(())
    }

    fn replace(&mut self, values: Vec<Value>) {
        self.original.clone_from(&values);
        self.current = values;
        self.reset_highlights();
        self.epoch += 1;
    }
}
