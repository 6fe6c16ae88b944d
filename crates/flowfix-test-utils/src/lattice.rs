//! Assertion helpers for checking that analysis domains obey the lattice
//! laws the dataflow engine relies on.
//!
//! Every helper checks all laws over the given sample elements and reports
//! every violation at once.
//!
//! # Example
//!
//! ```
//! use flowfix_test_utils::ConstValue;
//! use flowfix_test_utils::lattice::assert_finite_lattice_laws;
//!
//! assert_finite_lattice_laws(&[ConstValue::Const(1), ConstValue::Const(2)]);
//! ```

use std::cmp::Ordering;
use std::fmt::{Debug, Write};

use flowfix_dataflow::{AnalysisData, ValueDomain};
use flowfix_ir::{HasBottom, HasTop, Lattice};

fn report(what: &str, violations: Vec<String>) {
    if violations.is_empty() {
        return;
    }
    let mut msg = format!("{} {what} violation(s):\n", violations.len());
    for (i, v) in violations.iter().enumerate() {
        let _ = writeln!(msg, "  {}. {}", i + 1, v);
    }
    panic!("{msg}");
}

/// Join and meet are commutative, associative and idempotent, absorb each
/// other, and agree with `is_subseteq`.
pub fn assert_lattice_laws<L: Lattice + PartialEq + Debug>(elements: &[L]) {
    let mut violations = Vec::new();
    check_semilattice(elements, "join", L::join, &mut violations);
    check_semilattice(elements, "meet", L::meet, &mut violations);
    check_absorption(elements, &mut violations);
    check_ordering_consistent(elements, &mut violations);
    report("lattice law", violations);
}

/// [`assert_lattice_laws`] plus the bottom and top element laws. Bottom and
/// top are added to the samples automatically.
pub fn assert_finite_lattice_laws<L: HasBottom + HasTop + Clone + PartialEq + Debug>(
    elements: &[L],
) {
    let mut samples = elements.to_vec();
    samples.push(L::bottom());
    samples.push(L::top());

    let mut violations = Vec::new();
    check_semilattice(&samples, "join", L::join, &mut violations);
    check_semilattice(&samples, "meet", L::meet, &mut violations);
    check_absorption(&samples, &mut violations);
    check_ordering_consistent(&samples, &mut violations);
    check_bounds(&samples, &mut violations);
    report("lattice law", violations);
}

/// `ValueDomain::compare` agrees with `is_subseteq` and `merge` is an upper
/// bound of its inputs.
pub fn assert_compare_consistent<V: ValueDomain>(elements: &[V]) {
    let mut v = Vec::new();
    for a in elements {
        for b in elements {
            let expected = match (a.is_subseteq(b), b.is_subseteq(a)) {
                (true, true) => Some(Ordering::Equal),
                (true, false) => Some(Ordering::Less),
                (false, true) => Some(Ordering::Greater),
                (false, false) => None,
            };
            if a.compare(b) != expected {
                v.push(format!("{a:?}.compare({b:?}) = {:?}, expected {expected:?}", a.compare(b)));
            }
            let merged = a.merge(b);
            if !a.is_subseteq(&merged) || !b.is_subseteq(&merged) {
                v.push(format!("{a:?}.merge({b:?}) = {merged:?} is not an upper bound"));
            }
        }
    }
    report("value domain", v);
}

/// `AnalysisData::merge` is commutative, idempotent and an upper bound, which
/// is what the engine's monotonicity check asserts at run time.
pub fn assert_data_merge_laws<D: AnalysisData>(samples: &[D]) {
    let mut v = Vec::new();
    for a in samples {
        if a.merge(a) != *a {
            v.push(format!("merge not idempotent for {a:?}"));
        }
        if !a.is_subseteq(a) {
            v.push(format!("is_subseteq not reflexive for {a:?}"));
        }
        for b in samples {
            let ab = a.merge(b);
            if ab != b.merge(a) {
                v.push(format!("merge not commutative: {a:?}, {b:?}"));
            }
            if !a.is_subseteq(&ab) || !b.is_subseteq(&ab) {
                v.push(format!("merge of {a:?} and {b:?} is not an upper bound: {ab:?}"));
            }
        }
    }
    report("analysis data", v);
}

// ---- helpers that push violations instead of panicking ----

fn check_semilattice<L: PartialEq + Debug>(
    elements: &[L],
    name: &str,
    op: impl Fn(&L, &L) -> L,
    v: &mut Vec<String>,
) {
    for a in elements {
        if op(a, a) != *a {
            v.push(format!("{name} not idempotent on {a:?}"));
        }
        for b in elements {
            if op(a, b) != op(b, a) {
                v.push(format!("{name} not commutative on {a:?}, {b:?}"));
            }
            for c in elements {
                if op(&op(a, b), c) != op(a, &op(b, c)) {
                    v.push(format!("{name} not associative on {a:?}, {b:?}, {c:?}"));
                }
            }
        }
    }
}

fn check_absorption<L: Lattice + PartialEq + Debug>(elements: &[L], v: &mut Vec<String>) {
    for a in elements {
        for b in elements {
            if a.join(&a.meet(b)) != *a {
                v.push(format!("absorption violated: {a:?}.join({a:?}.meet({b:?})) != {a:?}"));
            }
            if a.meet(&a.join(b)) != *a {
                v.push(format!("absorption violated: {a:?}.meet({a:?}.join({b:?})) != {a:?}"));
            }
        }
    }
}

fn check_ordering_consistent<L: Lattice + PartialEq + Debug>(elements: &[L], v: &mut Vec<String>) {
    for a in elements {
        for b in elements {
            let sub = a.is_subseteq(b);
            if sub != (a.join(b) == *b) {
                v.push(format!("{a:?}.is_subseteq({b:?}) = {sub} disagrees with join"));
            }
            if sub != (a.meet(b) == *a) {
                v.push(format!("{a:?}.is_subseteq({b:?}) = {sub} disagrees with meet"));
            }
        }
    }
}

fn check_bounds<L: HasBottom + HasTop + PartialEq + Debug>(elements: &[L], v: &mut Vec<String>) {
    let bottom = L::bottom();
    let top = L::top();
    for x in elements {
        if !bottom.is_subseteq(x) || bottom.join(x) != *x {
            v.push(format!("bottom is not the least element below {x:?}"));
        }
        if !x.is_subseteq(&top) || top.meet(x) != *x {
            v.push(format!("top is not the greatest element above {x:?}"));
        }
    }
}
