//! Working-copy recorder shared by every compiler.

use crate::{
    op::{Op, OpLog},
    types::{Index, Value},
};

/// Appends ops while applying the same mutation to the compiler's working copy.
///
/// Routing every mutation through here keeps log order identical to the order
/// in which the algorithm actually mutated its data.
#[derive(Debug, Default)]
pub struct Recorder {
    ops: Vec<Op>,
}

impl Recorder {
    /// Starts an empty recording.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a comparison of `i` and `j`.
    pub fn compare(&mut self, i: Index, j: Index) {
        self.ops.push(Op::Compare { i, j });
    }

    /// Records and performs a swap of `a[i]` and `a[j]`.
    pub fn swap(&mut self, a: &mut [Value], i: Index, j: Index) {
        self.ops.push(Op::Swap { i, j });
        a.swap(i, j);
    }

    /// Records and performs `a[index] = value`.
    pub fn overwrite(&mut self, a: &mut [Value], index: Index, value: Value) {
        self.ops.push(Op::Overwrite { index, value });
        a[index] = value;
    }

    /// Records that `index` is settled.
    pub fn mark_final(&mut self, index: Index) {
        self.ops.push(Op::MarkFinal { index });
    }

    /// Marks `0..len` final in ascending order.
    pub fn mark_all_final(&mut self, len: usize) {
        self.ops.extend((0..len).map(|index| Op::MarkFinal { index }));
    }

    /// Number of ops recorded so far.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// True when nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Seals the recording into an immutable log.
    pub fn finish(self) -> OpLog {
        OpLog::from(self.ops)
    }
}
