use std::sync::Arc;

use flowfix_ir::{Block, CaptureId, Callable, Operation, Program};

use super::Frame;
use crate::capture::InterproceduralCaptureId;
use crate::context::AnalysisContext;
use crate::data::AnalysisData;
use crate::domain::ValueDomain;
use crate::entity::AbstractLocation;
use crate::error::DataflowError;
use crate::predicate::PredicateValueKind;
use crate::result::DataFlowAnalysisResult;

/// The engine state a visitor may read and update while transferring one
/// operation.
pub struct FlowContext<'f, 'ir, L, V, D: AnalysisData> {
    analysis: &'f AnalysisContext<'ir, L>,
    frame: &'f mut Frame<V, D>,
    block: Block,
}

impl<'f, 'ir, L, V, D: AnalysisData> FlowContext<'f, 'ir, L, V, D> {
    pub(crate) fn new(
        analysis: &'f AnalysisContext<'ir, L>,
        frame: &'f mut Frame<V, D>,
        block: Block,
    ) -> Self {
        Self {
            analysis,
            frame,
            block,
        }
    }

    pub fn analysis(&self) -> &AnalysisContext<'ir, L> {
        self.analysis
    }

    pub fn program(&self) -> &'ir Program<L> {
        self.analysis.program()
    }

    /// Block currently being transferred.
    pub fn block(&self) -> Block {
        self.block
    }

    /// Payload of another operation of the program.
    pub fn payload(&self, operation: Operation) -> Option<&'ir L> {
        self.analysis.program().payload(operation)
    }

    /// Value most recently computed for `operation` in this graph.
    pub fn value(&self, operation: Operation) -> Option<&V> {
        self.frame.values.get(&operation)
    }

    /// Like [`value`](Self::value), but an operation that was never visited
    /// is an error.
    pub fn expect_value(&self, operation: Operation) -> Result<&V, DataflowError> {
        self.frame
            .values
            .get(&operation)
            .ok_or(DataflowError::MissingValue(operation))
    }

    pub fn predicate_kind(&self, operation: Operation) -> PredicateValueKind {
        self.frame
            .predicate_kinds
            .get(&operation)
            .copied()
            .unwrap_or_default()
    }

    pub fn set_predicate_kind(&mut self, operation: Operation, kind: PredicateValueKind) {
        self.frame.predicate_kinds.insert(operation, kind);
    }

    /// Qualify a flow capture of the current graph.
    pub fn capture_id(&self, capture: CaptureId) -> InterproceduralCaptureId {
        InterproceduralCaptureId::in_graph(capture, self.analysis.graph())
    }

    /// Record that a reference to `callable` flows somewhere the analysis
    /// cannot follow. Methods are ignored.
    pub fn mark_escaped(&mut self, callable: Callable) {
        if self.frame.escapes.mark_escaped(callable) {
            log::trace!(target: "dataflow", "{callable:?} escapes {:?}", self.analysis.cfg());
        }
    }

    pub fn task_wrapped_value(&self, location: &AbstractLocation) -> Option<&V> {
        self.frame.task_wrapped_values.get(location)
    }

    /// Remember the value wrapped by an asynchronous task allocated at
    /// `location`.
    pub fn set_task_wrapped_value(&mut self, location: AbstractLocation, value: V) {
        self.frame.task_wrapped_values.insert(location, value);
    }

    /// Callee result of an interprocedural call already dispatched in this
    /// graph.
    pub fn interprocedural_result(
        &self,
        operation: Operation,
    ) -> Option<&Arc<DataFlowAnalysisResult<V, D>>> {
        self.frame.interprocedural_results.get(&operation)
    }
}

impl<L, V: ValueDomain, D: AnalysisData> FlowContext<'_, '_, L, V, D> {
    /// Value of `operation`, or the unknown value when it has none yet.
    pub fn value_or_unknown(&self, operation: Operation) -> V {
        self.frame
            .values
            .get(&operation)
            .cloned()
            .unwrap_or_else(V::unknown_or_may_be)
    }
}
