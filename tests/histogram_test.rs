use heap_db::{optimizer::IntHistogram, Op};

const EPSILON: f64 = 1e-9;

fn filled_histogram() -> IntHistogram {
    let mut hist = IntHistogram::new(10, 0, 99);
    for v in 0..100 {
        hist.add_value(v);
    }
    // skew a few buckets
    for _ in 0..50 {
        hist.add_value(42);
    }
    hist
}

#[test]
fn test_selectivities_are_fractions() {
    let hist = filled_histogram();
    for op in [
        Op::Equals,
        Op::NotEquals,
        Op::LessThan,
        Op::LessThanOrEq,
        Op::GreaterThan,
        Op::GreaterThanOrEq,
    ] {
        for v in [-10, 0, 42, 77, 99, 200] {
            let s = hist.estimate_selectivity(op, v);
            assert!((0.0..=1.0).contains(&s), "{:?} {} gave {}", op, v, s);
        }
    }
}

#[test]
fn test_equals_partition() {
    let hist = filled_histogram();
    for v in [0, 7, 42, 99] {
        let eq = hist.estimate_selectivity(Op::Equals, v);
        let ne = hist.estimate_selectivity(Op::NotEquals, v);
        assert!((eq + ne - 1.0).abs() < EPSILON, "eq + ne at {}", v);
    }
}

#[test]
fn test_ordering_partition() {
    let hist = filled_histogram();
    for v in [0, 7, 42, 99] {
        let lt = hist.estimate_selectivity(Op::LessThan, v);
        let eq = hist.estimate_selectivity(Op::Equals, v);
        let gt = hist.estimate_selectivity(Op::GreaterThan, v);
        assert!((lt + eq + gt - 1.0).abs() < EPSILON, "lt + eq + gt at {}", v);

        let le = hist.estimate_selectivity(Op::LessThanOrEq, v);
        let ge = hist.estimate_selectivity(Op::GreaterThanOrEq, v);
        assert!((le - (lt + eq)).abs() < EPSILON, "le at {}", v);
        assert!((ge - (gt + eq)).abs() < EPSILON, "ge at {}", v);
    }
}

#[test]
fn test_skewed_bucket_dominates() {
    let hist = filled_histogram();
    // bucket [40, 49] holds 10 + 50 of the 150 values
    let eq = hist.estimate_selectivity(Op::Equals, 42);
    assert!((eq - 60.0 / 150.0).abs() < EPSILON);

    let elsewhere = hist.estimate_selectivity(Op::Equals, 7);
    assert!((elsewhere - 10.0 / 150.0).abs() < EPSILON);
}

#[test]
fn test_out_of_range_probes() {
    let hist = filled_histogram();

    assert_eq!(hist.estimate_selectivity(Op::Equals, -5), 0.0);
    assert_eq!(hist.estimate_selectivity(Op::NotEquals, -5), 1.0);
    assert_eq!(hist.estimate_selectivity(Op::LessThan, -5), 0.0);
    assert_eq!(hist.estimate_selectivity(Op::LessThanOrEq, -5), 0.0);
    assert_eq!(hist.estimate_selectivity(Op::GreaterThan, -5), 1.0);
    assert_eq!(hist.estimate_selectivity(Op::GreaterThanOrEq, -5), 1.0);

    assert_eq!(hist.estimate_selectivity(Op::Equals, 1000), 0.0);
    assert_eq!(hist.estimate_selectivity(Op::NotEquals, 1000), 1.0);
    assert_eq!(hist.estimate_selectivity(Op::LessThan, 1000), 1.0);
    assert_eq!(hist.estimate_selectivity(Op::LessThanOrEq, 1000), 1.0);
    assert_eq!(hist.estimate_selectivity(Op::GreaterThan, 1000), 0.0);
    assert_eq!(hist.estimate_selectivity(Op::GreaterThanOrEq, 1000), 0.0);
}

#[test]
fn test_single_value_range() {
    let mut hist = IntHistogram::new(1, 5, 5);
    for _ in 0..4 {
        hist.add_value(5);
    }

    assert_eq!(hist.estimate_selectivity(Op::Equals, 5), 1.0);
    assert_eq!(hist.estimate_selectivity(Op::LessThan, 5), 0.0);
    assert_eq!(hist.estimate_selectivity(Op::GreaterThan, 5), 0.0);
    assert_eq!(hist.estimate_selectivity(Op::NotEquals, 5), 0.0);
}

#[test]
fn test_empty_histogram() {
    let hist = IntHistogram::new(4, 0, 7);
    assert_eq!(hist.estimate_selectivity(Op::Equals, 3), 0.0);
    assert_eq!(hist.estimate_selectivity(Op::LessThan, 3), 0.0);
}
