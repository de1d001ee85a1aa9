//! Operation model and the append-only operation log.

use serde::{Deserialize, Serialize};

use crate::types::{Index, Value};

/// One atomic, replayable step recorded while an algorithm runs.
///
/// Ops are deltas: they carry no array snapshot, so a log only makes sense
/// when replayed in order against the array it was compiled from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Op {
    /// Two indices are being compared. No mutation.
    Compare {
        /// Left index.
        i: Index,
        /// Right index.
        j: Index,
    },
    /// Exchange the values at `i` and `j`.
    Swap {
        /// Left index.
        i: Index,
        /// Right index.
        j: Index,
    },
    /// Store `value` at `index`.
    Overwrite {
        /// Target index.
        index: Index,
        /// Value written.
        value: Value,
    },
    /// `index` holds its final sorted value. Visualization signal only.
    MarkFinal {
        /// Settled index.
        index: Index,
    },
}

impl Op {
    /// Largest index this op touches.
    pub fn max_index(&self) -> Index {
        match *self {
            Self::Compare { i, j } | Self::Swap { i, j } => i.max(j),
            Self::Overwrite { index, .. } | Self::MarkFinal { index } => index,
        }
    }

    /// True for ops that change array contents.
    pub fn is_mutation(&self) -> bool {
        matches!(self, Self::Swap { .. } | Self::Overwrite { .. })
    }

    /// Applies the mutation carried by this op to `values`.
    pub fn apply_to(&self, values: &mut [Value]) -> Result<(), ReplayError> {
        let len = values.len();
        if self.max_index() >= len {
            return Err(ReplayError::IndexOutOfBounds {
                op: *self,
                len,
            });
        }
        match *self {
            Self::Swap { i, j } => values.swap(i, j),
            Self::Overwrite { index, value } => values[index] = value,
            Self::Compare { .. } | Self::MarkFinal { .. } => {}
        }
        Ok(())
    }
}

/// Failure while replaying a log against an array.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReplayError {
    /// The op addresses an index outside the array.
    #[error("{op:?} out of bounds for array of length {len}")]
    IndexOutOfBounds {
        /// Offending op.
        op: Op,
        /// Length of the replay target.
        len: usize,
    },
}

/// Per-kind op tallies for one log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpCounts {
    /// Number of [`Op::Compare`].
    pub compares: usize,
    /// Number of [`Op::Swap`].
    pub swaps: usize,
    /// Number of [`Op::Overwrite`].
    pub overwrites: usize,
    /// Number of [`Op::MarkFinal`].
    pub marks: usize,
}

impl OpCounts {
    /// Sum over all kinds.
    pub fn total(&self) -> usize {
        self.compares + self.swaps + self.overwrites + self.marks
    }
}

/// Ordered, immutable sequence of ops produced by one compiler run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OpLog {
    ops: Vec<Op>,
}

impl OpLog {
    /// Borrow the ops in replay order.
    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    /// Number of ops.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// True when the log has no ops.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Op at `cursor`, if any.
    pub fn get(&self, cursor: usize) -> Option<&Op> {
        self.ops.get(cursor)
    }

    /// Iterate ops in replay order.
    pub fn iter(&self) -> std::slice::Iter<'_, Op> {
        self.ops.iter()
    }

    /// Largest index any op touches, or `None` for an empty log.
    pub fn max_index(&self) -> Option<Index> {
        self.ops.iter().map(Op::max_index).max()
    }

    /// Verifies every op addresses an index below `len`.
    pub fn check_bounds(&self, len: usize) -> Result<(), ReplayError> {
        match self.ops.iter().find(|op| op.max_index() >= len) {
            Some(op) => Err(ReplayError::IndexOutOfBounds { op: *op, len }),
            None => Ok(()),
        }
    }

    /// Tallies ops by kind.
    pub fn counts(&self) -> OpCounts {
        let mut counts = OpCounts::default();
        for op in &self.ops {
            match op {
                Op::Compare { .. } => counts.compares += 1,
                Op::Swap { .. } => counts.swaps += 1,
                Op::Overwrite { .. } => counts.overwrites += 1,
                Op::MarkFinal { .. } => counts.marks += 1,
            }
        }
        counts
    }

    /// Replays every op in order against a copy of `input`.
    pub fn replay(&self, input: &[Value]) -> Result<Vec<Value>, ReplayError> {
        let mut values = input.to_vec();
        for op in &self.ops {
            op.apply_to(&mut values)?;
        }
        Ok(values)
    }
}

impl From<Vec<Op>> for OpLog {
    fn from(ops: Vec<Op>) -> Self {
        Self { ops }
    }
}

impl<'a> IntoIterator for &'a OpLog {
    type Item = &'a Op;
    type IntoIter = std::slice::Iter<'a, Op>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replay_applies_mutations_in_order() {
        let log = OpLog::from(vec![
            Op::Compare { i: 0, j: 1 },
            Op::Swap { i: 0, j: 1 },
            Op::Overwrite { index: 2, value: 9 },
            Op::MarkFinal { index: 2 },
        ]);
        assert_eq!(log.replay(&[2, 1, 0]).expect("replay"), vec![1, 2, 9]);
        assert_eq!(
            log.counts(),
            OpCounts {
                compares: 1,
                swaps: 1,
                overwrites: 1,
                marks: 1
            }
        );
    }

    #[test]
    fn replay_rejects_out_of_bounds_op() {
        let log = OpLog::from(vec![Op::Swap { i: 0, j: 3 }]);
        assert_eq!(
            log.replay(&[1, 2]),
            Err(ReplayError::IndexOutOfBounds {
                op: Op::Swap { i: 0, j: 3 },
                len: 2
            })
        );
        assert!(log.check_bounds(4).is_ok());
        assert_eq!(log.max_index(), Some(3));
    }

    #[test]
    fn ops_serialize_with_kind_tag() {
        let json = serde_json::to_string(&Op::Overwrite { index: 1, value: 7 }).expect("json");
        assert_eq!(json, r#"{"op":"overwrite","index":1,"value":7}"#);
    }
}
