use std::sync::Arc;

use flowfix_ir::Operation;
use rustc_hash::FxHashMap;

use crate::data::{AnalysisData, DataGuard, merge_checked};
use crate::entity::AbstractLocation;
use crate::escape::EscapeTracker;
use crate::predicate::PredicateValueKind;
use crate::result::DataFlowAnalysisResult;

/// Per-graph state that outlives individual block visits.
///
/// Operation values are overwritten on every visit so that after the
/// fixpoint they hold the values computed from the final block inputs.
#[derive(Debug)]
pub(crate) struct Frame<V, D: AnalysisData> {
    pub(crate) values: FxHashMap<Operation, V>,
    pub(crate) predicate_kinds: FxHashMap<Operation, PredicateValueKind>,
    pub(crate) escapes: EscapeTracker,
    pub(crate) task_wrapped_values: FxHashMap<AbstractLocation, V>,
    pub(crate) interprocedural_results: FxHashMap<Operation, Arc<DataFlowAnalysisResult<V, D>>>,
    /// Unhandled-throw data reported by context-sensitive callees.
    pub(crate) callee_throw_data: Option<DataGuard<D>>,
    /// A call was cut off by the recursion guard or a call-chain limit.
    pub(crate) truncated: bool,
}

impl<V, D: AnalysisData> Default for Frame<V, D> {
    fn default() -> Self {
        Self {
            values: FxHashMap::default(),
            predicate_kinds: FxHashMap::default(),
            escapes: EscapeTracker::default(),
            task_wrapped_values: FxHashMap::default(),
            interprocedural_results: FxHashMap::default(),
            callee_throw_data: None,
            truncated: false,
        }
    }
}

impl<V, D: AnalysisData> Frame<V, D> {
    pub(crate) fn merge_callee_throw_data(&mut self, data: &D) {
        self.callee_throw_data = Some(match self.callee_throw_data.take() {
            Some(existing) => DataGuard::new(merge_checked(&*existing, data)),
            None => DataGuard::new(data.clone()),
        });
    }
}
