//! Instrumented sorting algorithms.
//!
//! Each compiler sorts its working copy through a [`Recorder`] so that the
//! recorded log, replayed against the original input, reproduces every
//! mutation in the order the algorithm performed it. All compilers share the
//! [`CompileFn`] signature and leave the working copy sorted ascending.

use crate::types::{Index, Value};

use super::recorder::Recorder;

/// Common signature of every compiler.
pub type CompileFn = fn(&mut [Value], &mut Recorder);

/// Bubble sort with early exit on a swap-free pass.
///
/// After the early exit, indices not yet settled by a pass are marked final
/// in descending order, so every index ends up marked.
pub fn bubble(a: &mut [Value], rec: &mut Recorder) {
    let n = a.len();
    let mut unmarked = n;
    for pass in 0..n.saturating_sub(1) {
        let mut swapped = false;
        for j in 0..n - 1 - pass {
            rec.compare(j, j + 1);
            if a[j] > a[j + 1] {
                rec.swap(a, j, j + 1);
                swapped = true;
            }
        }
        unmarked = n - 1 - pass;
        rec.mark_final(unmarked);
        if !swapped {
            break;
        }
    }
    for index in (0..unmarked).rev() {
        rec.mark_final(index);
    }
}

/// Selection sort. Tracking a new minimum records nothing.
pub fn selection(a: &mut [Value], rec: &mut Recorder) {
    let n = a.len();
    for i in 0..n.saturating_sub(1) {
        let mut min = i;
        for j in i + 1..n {
            rec.compare(min, j);
            if a[j] < a[min] {
                min = j;
            }
        }
        if min != i {
            rec.swap(a, i, min);
        }
        rec.mark_final(i);
    }
    if n > 0 {
        rec.mark_final(n - 1);
    }
}

/// Insertion sort by shifting, followed by an ascending final sweep.
pub fn insertion(a: &mut [Value], rec: &mut Recorder) {
    let n = a.len();
    for i in 1..n {
        let key = a[i];
        let mut slot = i;
        while slot > 0 {
            rec.compare(slot - 1, slot);
            if a[slot - 1] <= key {
                break;
            }
            let shifted = a[slot - 1];
            rec.overwrite(a, slot, shifted);
            slot -= 1;
        }
        rec.overwrite(a, slot, key);
    }
    rec.mark_all_final(n);
}

/// Top-down merge sort.
pub fn merge(a: &mut [Value], rec: &mut Recorder) {
    merge_range(a, rec, 0, a.len());
    rec.mark_all_final(a.len());
}

// Sorts `a[lo..hi]`; the left half keeps the midpoint, as in `(l + r) / 2`
// over inclusive bounds.
fn merge_range(a: &mut [Value], rec: &mut Recorder, lo: Index, hi: Index) {
    if hi - lo < 2 {
        return;
    }
    let mid = (lo + hi - 1) / 2 + 1;
    merge_range(a, rec, lo, mid);
    merge_range(a, rec, mid, hi);

    let mut merged = Vec::with_capacity(hi - lo);
    let (mut i, mut j) = (lo, mid);
    while i < mid && j < hi {
        rec.compare(i, j);
        if a[i] <= a[j] {
            merged.push(a[i]);
            i += 1;
        } else {
            merged.push(a[j]);
            j += 1;
        }
    }
    merged.extend_from_slice(&a[i..mid]);
    merged.extend_from_slice(&a[j..hi]);

    for (offset, value) in merged.into_iter().enumerate() {
        rec.overwrite(a, lo + offset, value);
    }
}

/// Quick sort with Lomuto partitioning around the last element.
///
/// Ranges are visited depth-first, left before right. An explicit stack
/// replaces recursion so already-sorted input cannot exhaust the call stack.
pub fn quick(a: &mut [Value], rec: &mut Recorder) {
    let mut pending = vec![(0, a.len())];
    while let Some((lo, hi)) = pending.pop() {
        if hi - lo < 2 {
            continue;
        }
        let pivot = partition(a, rec, lo, hi - 1);
        pending.push((pivot + 1, hi));
        pending.push((lo, pivot));
    }
    rec.mark_all_final(a.len());
}

fn partition(a: &mut [Value], rec: &mut Recorder, lo: Index, high: Index) -> Index {
    let pivot = a[high];
    let mut boundary = lo;
    for j in lo..high {
        rec.compare(j, high);
        if a[j] < pivot {
            rec.swap(a, boundary, j);
            boundary += 1;
        }
    }
    rec.swap(a, boundary, high);
    boundary
}

/// Heap sort over a max-heap.
pub fn heap(a: &mut [Value], rec: &mut Recorder) {
    let n = a.len();
    for root in (0..n / 2).rev() {
        sift_down(a, rec, n, root);
    }
    for end in (0..n).rev() {
        rec.swap(a, 0, end);
        sift_down(a, rec, end, 0);
        rec.mark_final(end);
    }
}

fn sift_down(a: &mut [Value], rec: &mut Recorder, len: usize, mut root: Index) {
    loop {
        let mut largest = root;
        let left = 2 * root + 1;
        let right = left + 1;
        if left < len {
            rec.compare(left, largest);
            if a[left] > a[largest] {
                largest = left;
            }
        }
        if right < len {
            rec.compare(right, largest);
            if a[right] > a[largest] {
                largest = right;
            }
        }
        if largest == root {
            return;
        }
        rec.swap(a, root, largest);
        root = largest;
    }
}

/// Shell sort with the halving gap sequence `n/2, n/4, .., 1`.
pub fn shell(a: &mut [Value], rec: &mut Recorder) {
    let n = a.len();
    let mut gap = n / 2;
    while gap > 0 {
        for i in gap..n {
            let key = a[i];
            let mut slot = i;
            while slot >= gap {
                rec.compare(slot - gap, slot);
                if a[slot - gap] <= key {
                    break;
                }
                let shifted = a[slot - gap];
                rec.overwrite(a, slot, shifted);
                slot -= gap;
            }
            rec.overwrite(a, slot, key);
        }
        gap /= 2;
    }
    rec.mark_all_final(n);
}

/// LSD radix sort, base 10. Records overwrites only, never compares.
///
/// Callers must reject negative input first; see
/// [`Algorithm::check_input`](super::registry::Algorithm::check_input).
pub fn radix(a: &mut [Value], rec: &mut Recorder) {
    let Some(max) = a.iter().copied().max() else {
        return;
    };
    let mut exp: Value = 1;
    while max / exp > 0 {
        counting_pass(a, rec, exp);
        match exp.checked_mul(10) {
            Some(next) => exp = next,
            None => break,
        }
    }
    rec.mark_all_final(a.len());
}

fn digit(value: Value, exp: Value) -> usize {
    ((value / exp) % 10).unsigned_abs() as usize
}

// Stable counting pass on one decimal digit.
fn counting_pass(a: &mut [Value], rec: &mut Recorder, exp: Value) {
    let mut count = [0usize; 10];
    for &value in a.iter() {
        count[digit(value, exp)] += 1;
    }
    for d in 1..10 {
        count[d] += count[d - 1];
    }

    let mut output = vec![0; a.len()];
    for &value in a.iter().rev() {
        let d = digit(value, exp);
        count[d] -= 1;
        output[count[d]] = value;
    }

    for (index, value) in output.into_iter().enumerate() {
        rec.overwrite(a, index, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::op::Op;

    fn run(f: CompileFn, input: &[Value]) -> (Vec<Value>, Vec<Op>) {
        let mut work = input.to_vec();
        let mut rec = Recorder::new();
        f(&mut work, &mut rec);
        (work, rec.finish().ops().to_vec())
    }

    #[test]
    fn insertion_shifts_then_places_key() {
        let (sorted, ops) = run(insertion, &[2, 1]);
        assert_eq!(sorted, vec![1, 2]);
        assert_eq!(
            ops,
            vec![
                Op::Compare { i: 0, j: 1 },
                Op::Overwrite { index: 1, value: 2 },
                Op::Overwrite { index: 0, value: 1 },
                Op::MarkFinal { index: 0 },
                Op::MarkFinal { index: 1 },
            ]
        );
    }

    #[test]
    fn quick_partitions_before_recursing() {
        let (sorted, ops) = run(quick, &[3, 1, 2]);
        assert_eq!(sorted, vec![1, 2, 3]);
        assert_eq!(
            &ops[..5],
            &[
                Op::Compare { i: 0, j: 2 },
                Op::Compare { i: 1, j: 2 },
                Op::Swap { i: 0, j: 1 },
                Op::Swap { i: 1, j: 2 },
                Op::MarkFinal { index: 0 },
            ]
        );
    }

    #[test]
    fn heap_single_element_swaps_with_itself() {
        let (_, ops) = run(heap, &[7]);
        assert_eq!(ops, vec![Op::Swap { i: 0, j: 0 }, Op::MarkFinal { index: 0 }]);
    }

    #[test]
    fn merge_splits_with_left_biased_midpoint() {
        let (sorted, ops) = run(merge, &[3, 2, 1]);
        assert_eq!(sorted, vec![1, 2, 3]);
        // [3,2] merges first, then [2,3] with [1].
        assert_eq!(ops[0], Op::Compare { i: 0, j: 1 });
        assert_eq!(ops[3], Op::Compare { i: 0, j: 2 });
    }

    #[test]
    fn radix_of_all_zeros_only_marks() {
        let (_, ops) = run(radix, &[0, 0]);
        assert_eq!(ops, vec![Op::MarkFinal { index: 0 }, Op::MarkFinal { index: 1 }]);
    }
}
