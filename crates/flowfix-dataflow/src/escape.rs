use flowfix_ir::{Callable, Operation, Symbol};
use indexmap::IndexSet;
use rustc_hash::FxBuildHasher;

type FxIndexSet<T> = IndexSet<T, FxBuildHasher>;

/// Which lambdas and local functions of one analyzed graph escaped and which
/// were analyzed interprocedurally.
///
/// A callable that escaped, or that was never analyzed, must be treated
/// conservatively by any client relying on this graph's result.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LambdaAndLocalFunctionAnalysisInfo {
    escaped_local_functions: FxIndexSet<Symbol>,
    analyzed_local_functions: FxIndexSet<Symbol>,
    escaped_lambdas: FxIndexSet<Operation>,
    analyzed_lambdas: FxIndexSet<Operation>,
}

impl LambdaAndLocalFunctionAnalysisInfo {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn escaped_local_functions(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.escaped_local_functions.iter().copied()
    }

    pub fn analyzed_local_functions(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.analyzed_local_functions.iter().copied()
    }

    pub fn escaped_lambdas(&self) -> impl Iterator<Item = Operation> + '_ {
        self.escaped_lambdas.iter().copied()
    }

    pub fn analyzed_lambdas(&self) -> impl Iterator<Item = Operation> + '_ {
        self.analyzed_lambdas.iter().copied()
    }

    pub fn is_escaped(&self, callable: Callable) -> bool {
        match callable {
            Callable::LocalFunction(symbol) => self.escaped_local_functions.contains(&symbol),
            Callable::Lambda(creation) => self.escaped_lambdas.contains(&creation),
            Callable::Method(_) => false,
        }
    }

    pub fn is_analyzed(&self, callable: Callable) -> bool {
        match callable {
            Callable::LocalFunction(symbol) => self.analyzed_local_functions.contains(&symbol),
            Callable::Lambda(creation) => self.analyzed_lambdas.contains(&creation),
            Callable::Method(_) => false,
        }
    }

    /// Whether facts computed inside `callable` are incomplete for this graph.
    pub fn requires_conservative_treatment(&self, callable: Callable) -> bool {
        callable.is_lambda_or_local_function()
            && (self.is_escaped(callable) || !self.is_analyzed(callable))
    }

    pub fn is_empty(&self) -> bool {
        self.escaped_local_functions.is_empty()
            && self.analyzed_local_functions.is_empty()
            && self.escaped_lambdas.is_empty()
            && self.analyzed_lambdas.is_empty()
    }
}

/// Mutable accumulator owned by a running analysis; frozen into a
/// [`LambdaAndLocalFunctionAnalysisInfo`] once the analysis finishes.
#[derive(Debug, Default)]
pub(crate) struct EscapeTracker {
    info: LambdaAndLocalFunctionAnalysisInfo,
}

impl EscapeTracker {
    /// Returns false for methods, which are never tracked.
    pub(crate) fn mark_escaped(&mut self, callable: Callable) -> bool {
        match callable {
            Callable::LocalFunction(symbol) => {
                self.info.escaped_local_functions.insert(symbol);
                true
            }
            Callable::Lambda(creation) => {
                self.info.escaped_lambdas.insert(creation);
                true
            }
            Callable::Method(_) => false,
        }
    }

    pub(crate) fn mark_analyzed(&mut self, callable: Callable) {
        match callable {
            Callable::LocalFunction(symbol) => {
                self.info.analyzed_local_functions.insert(symbol);
            }
            Callable::Lambda(creation) => {
                self.info.analyzed_lambdas.insert(creation);
            }
            Callable::Method(_) => {}
        }
    }

    pub(crate) fn freeze(self) -> LambdaAndLocalFunctionAnalysisInfo {
        self.info
    }
}
