use flowfix_ir::{Block, CfgId, Operation};

/// Error type for dataflow analysis failures.
///
/// Framework errors cover malformed programs and engine limits. Failures
/// raised by an [`OperationVisitor`](crate::OperationVisitor) go in the
/// [`Custom`](Self::Custom) variant via [`DataflowError::custom`], or in the
/// visitor's own error type.
#[derive(Debug, thiserror::Error)]
pub enum DataflowError {
    #[error("unknown control-flow graph {0:?}")]
    UnknownGraph(CfgId),
    #[error("unknown block {0:?}")]
    UnknownBlock(Block),
    #[error("unknown operation {0:?}")]
    UnknownOperation(Operation),
    /// An operation's value was needed before the operation was visited.
    #[error("no value recorded for operation {0:?}")]
    MissingValue(Operation),
    /// A call site passes a different number of arguments than the callee
    /// declares parameters.
    #[error("call to {callee:?} passes {got} arguments, expected {expected}")]
    ArityMismatch {
        callee: CfgId,
        expected: usize,
        got: usize,
    },
    /// The opt-in block visit cap was hit before the fixpoint was reached.
    #[error("analysis of {cfg:?} did not converge within {limit} block visits")]
    IterationLimitExceeded { cfg: CfgId, limit: usize },
    #[error(transparent)]
    Custom(Box<dyn std::error::Error + Send + Sync>),
}

impl DataflowError {
    /// Wrap an arbitrary error as [`DataflowError::Custom`].
    pub fn custom(error: impl std::error::Error + Send + Sync + 'static) -> Self {
        DataflowError::Custom(Box::new(error))
    }
}
