use std::sync::Arc;

use flowfix_ir::Operation;

use crate::entity::AnalysisEntity;

/// Symbolic index into an indexable entity such as an array element.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub enum AbstractIndex {
    /// A compile-time constant index.
    Constant(i64),
    /// An index whose value is tracked by another entity.
    Entity(Arc<AnalysisEntity>),
    /// An index computed by an operation with no tracked entity.
    Operation(Operation),
}

impl AbstractIndex {
    pub fn constant(index: i64) -> Self {
        Self::Constant(index)
    }

    pub fn entity(entity: AnalysisEntity) -> Self {
        Self::Entity(Arc::new(entity))
    }

    pub fn operation(operation: Operation) -> Self {
        Self::Operation(operation)
    }

    pub fn is_constant(&self) -> bool {
        matches!(self, Self::Constant(_))
    }
}

impl From<i64> for AbstractIndex {
    fn from(index: i64) -> Self {
        Self::Constant(index)
    }
}
