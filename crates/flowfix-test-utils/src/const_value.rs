use std::fmt;

use flowfix_dataflow::ValueDomain;
use flowfix_ir::{HasBottom, HasTop, Lattice};

/// Flat constant lattice: `Bottom ⊑ Const(n) ⊑ Unknown`.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum ConstValue {
    Bottom,
    Const(i64),
    Unknown,
}

impl ConstValue {
    pub fn as_const(self) -> Option<i64> {
        match self {
            ConstValue::Const(value) => Some(value),
            _ => None,
        }
    }
}

impl Lattice for ConstValue {
    fn join(&self, other: &Self) -> Self {
        match (self, other) {
            (ConstValue::Bottom, x) | (x, ConstValue::Bottom) => *x,
            (ConstValue::Const(a), ConstValue::Const(b)) if a == b => *self,
            _ => ConstValue::Unknown,
        }
    }

    fn meet(&self, other: &Self) -> Self {
        match (self, other) {
            (ConstValue::Unknown, x) | (x, ConstValue::Unknown) => *x,
            (ConstValue::Const(a), ConstValue::Const(b)) if a == b => *self,
            _ => ConstValue::Bottom,
        }
    }

    fn is_subseteq(&self, other: &Self) -> bool {
        match (self, other) {
            (ConstValue::Bottom, _) | (_, ConstValue::Unknown) => true,
            (ConstValue::Const(a), ConstValue::Const(b)) => a == b,
            _ => false,
        }
    }
}

impl HasBottom for ConstValue {
    fn bottom() -> Self {
        ConstValue::Bottom
    }
}

impl HasTop for ConstValue {
    fn top() -> Self {
        ConstValue::Unknown
    }
}

impl ValueDomain for ConstValue {}

impl fmt::Display for ConstValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstValue::Bottom => write!(f, "bottom"),
            ConstValue::Const(value) => write!(f, "{value}"),
            ConstValue::Unknown => write!(f, "unknown"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lattice::{assert_compare_consistent, assert_finite_lattice_laws};

    #[test]
    fn test_const_value_lattice_laws() {
        let samples = [
            ConstValue::Bottom,
            ConstValue::Const(0),
            ConstValue::Const(1),
            ConstValue::Unknown,
        ];
        assert_finite_lattice_laws(&samples);
        assert_compare_consistent(&samples);
    }
}
