use proptest::prelude::*;

use sortviz::{
    engine::registry::{Algorithm, compile},
    op::Op,
    types::Value,
};

fn algorithm_strategy() -> impl Strategy<Value = Algorithm> {
    prop::sample::select(Algorithm::ALL.to_vec())
}

fn sorted(input: &[Value]) -> Vec<Value> {
    let mut out = input.to_vec();
    out.sort_unstable();
    out
}

proptest! {
    #[test]
    fn replay_reconstructs_sorted_array(
        algo in algorithm_strategy(),
        input in prop::collection::vec(0i64..1000, 0..64),
    ) {
        let log = compile(algo, &input).expect("compile");
        prop_assert_eq!(log.replay(&input).expect("replay"), sorted(&input));
    }

    #[test]
    fn same_input_compiles_to_identical_logs(
        algo in algorithm_strategy(),
        input in prop::collection::vec(0i64..50, 0..48),
    ) {
        let first = compile(algo, &input).expect("compile");
        let second = compile(algo, &input).expect("compile");
        prop_assert_eq!(first, second);
    }

    #[test]
    fn every_op_stays_in_bounds_and_every_index_ends_final(
        algo in algorithm_strategy(),
        input in prop::collection::vec(0i64..1000, 0..48),
    ) {
        let log = compile(algo, &input).expect("compile");
        prop_assert!(log.check_bounds(input.len()).is_ok());

        let mut marked = vec![false; input.len()];
        for op in &log {
            if let Op::MarkFinal { index } = op {
                marked[*index] = true;
            }
        }
        prop_assert!(marked.iter().all(|m| *m), "{algo} left indices unmarked");
    }

    #[test]
    fn compiling_never_touches_the_caller_array(
        algo in algorithm_strategy(),
        input in prop::collection::vec(0i64..1000, 0..32),
    ) {
        let before = input.clone();
        let _ = compile(algo, &input).expect("compile");
        prop_assert_eq!(input, before);
    }
}

#[test]
fn edge_shapes_sort_for_every_algorithm() {
    let shapes: [&[Value]; 6] = [
        &[],
        &[42],
        &[7, 7, 7, 7],
        &[1, 2, 3, 4, 5, 6],
        &[9, 8, 7, 6, 5, 4, 3, 2, 1],
        &[4, 1, 4, 0, 1, 4, 0],
    ];
    for algo in Algorithm::ALL {
        for shape in shapes {
            let log = compile(algo, shape).expect("compile");
            assert_eq!(log.replay(shape).expect("replay"), sorted(shape), "{algo} on {shape:?}");
        }
    }
}

#[test]
fn empty_input_yields_empty_log_everywhere() {
    for algo in Algorithm::ALL {
        let log = compile(algo, &[]).expect("compile");
        assert!(log.is_empty(), "{algo} produced ops for empty input");
    }
}

#[test]
fn already_sorted_large_input_does_not_blow_the_stack() {
    let input: Vec<Value> = (0..5_000).collect();
    let log = compile(Algorithm::Quick, &input).expect("compile");
    assert_eq!(log.replay(&input).expect("replay"), input);
}
