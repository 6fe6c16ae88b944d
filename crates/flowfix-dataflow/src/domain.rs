use std::cmp::Ordering;
use std::fmt::Debug;
use std::hash::Hash;

use flowfix_ir::{HasBottom, HasTop, Lattice};

/// The value lattice of an analysis.
///
/// `bottom` means "no value reaches here", `top` means "any value". There is
/// no blanket implementation; a domain opts in by implementing the lattice
/// traits and then this one.
pub trait ValueDomain: Lattice + HasBottom + HasTop + Clone + Eq + Hash + Debug {
    /// Value used whenever a fact is not known precisely: unresolved calls,
    /// recursion cut-offs and absent map entries.
    fn unknown_or_may_be() -> Self {
        Self::top()
    }

    /// Least upper bound of two values flowing into the same point.
    fn merge(&self, other: &Self) -> Self {
        self.join(other)
    }

    /// Extrapolate `self` towards `next` so that ascending chains at loop
    /// headers stabilize. Defaults to [`merge`](Self::merge), which suffices
    /// for finite-height domains.
    fn widen(&self, next: &Self) -> Self {
        self.merge(next)
    }

    /// Partial order. `None` when the values are incomparable.
    fn compare(&self, other: &Self) -> Option<Ordering> {
        match (self.is_subseteq(other), other.is_subseteq(self)) {
            (true, true) => Some(Ordering::Equal),
            (true, false) => Some(Ordering::Less),
            (false, true) => Some(Ordering::Greater),
            (false, false) => None,
        }
    }
}
