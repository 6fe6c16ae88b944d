/// Statically known outcome of a branch condition or boolean-valued call.
#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PredicateValueKind {
    AlwaysTrue,
    AlwaysFalse,
    #[default]
    Unknown,
}

impl PredicateValueKind {
    /// Classification of the logical negation of the predicate.
    pub fn negate(self) -> Self {
        match self {
            Self::AlwaysTrue => Self::AlwaysFalse,
            Self::AlwaysFalse => Self::AlwaysTrue,
            Self::Unknown => Self::Unknown,
        }
    }

    /// Combine the classifications of two paths producing the same value.
    pub fn merge(self, other: Self) -> Self {
        if self == other { self } else { Self::Unknown }
    }

    /// Whether the edge taken when the condition evaluates to `taken` can
    /// never execute.
    pub fn is_dead_edge(self, taken: bool) -> bool {
        match self {
            Self::AlwaysTrue => !taken,
            Self::AlwaysFalse => taken,
            Self::Unknown => false,
        }
    }

    /// Build a classification from a decided truth value.
    pub fn from_truthiness(truthy: Option<bool>) -> Self {
        match truthy {
            Some(true) => Self::AlwaysTrue,
            Some(false) => Self::AlwaysFalse,
            None => Self::Unknown,
        }
    }
}
