use flowfix_ir::{Callable, ControlFlowGraph, Operation, Symbol};
use smallvec::SmallVec;

use crate::argument::ArgumentInfo;
use crate::data::AnalysisData;
use crate::domain::ValueDomain;
use crate::driver::FlowContext;
use crate::entity::{AbstractLocation, AnalysisEntity};
use crate::error::DataflowError;
use crate::predicate::PredicateValueKind;

/// What a call site invokes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CallTarget {
    /// A statically known callable.
    Direct(Callable),
    /// A delegate whose possible targets are all known.
    Delegate(SmallVec<[Callable; 2]>),
    /// A target the visitor could not pin down. A named lambda or local
    /// function escapes through such a call.
    Unresolved(Option<Callable>),
}

/// A call described by the visitor and dispatched by the engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallSite {
    pub target: CallTarget,
    /// Operations whose values are passed, in parameter order.
    pub arguments: SmallVec<[Operation; 4]>,
}

impl CallSite {
    pub fn new(target: CallTarget, arguments: impl IntoIterator<Item = Operation>) -> Self {
        Self {
            target,
            arguments: arguments.into_iter().collect(),
        }
    }

    pub fn direct(callable: Callable, arguments: impl IntoIterator<Item = Operation>) -> Self {
        Self::new(CallTarget::Direct(callable), arguments)
    }
}

/// Outcome of visiting one operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect<V> {
    /// The operation evaluated to this value.
    Value(V),
    /// The operation is a call; the engine dispatches it and records the
    /// callee's return value as the operation's value.
    Call(CallSite),
}

/// A resolved call about to be analyzed interprocedurally.
#[derive(Debug)]
pub struct InterproceduralCall<'a, V> {
    pub callable: Callable,
    pub callee: &'a ControlFlowGraph,
    pub call_site: Operation,
    pub arguments: &'a [ArgumentInfo<V>],
}

impl<'a, V> InterproceduralCall<'a, V> {
    /// Callee parameters paired with the caller's arguments.
    pub fn parameter_arguments(&self) -> impl Iterator<Item = (Symbol, &'a ArgumentInfo<V>)> + 'a {
        self.callee
            .parameters()
            .iter()
            .copied()
            .zip(self.arguments.iter())
    }

    pub fn is_lambda_or_local_function(&self) -> bool {
        self.callable.is_lambda_or_local_function()
    }
}

/// Per-operation transfer functions of an analysis.
///
/// The engine owns control flow: it walks blocks, merges data at joins,
/// prunes infeasible branches and dispatches calls. The visitor only says
/// what each operation does to the data flowing through it.
pub trait OperationVisitor<L> {
    type Value: ValueDomain;
    type Data: AnalysisData;
    type Error: From<DataflowError>;

    /// Transfer function for one operation.
    fn visit(
        &mut self,
        ctx: &mut FlowContext<'_, '_, L, Self::Value, Self::Data>,
        operation: Operation,
        payload: &L,
        data: &mut Self::Data,
    ) -> Result<Effect<Self::Value>, Self::Error>;

    /// Data a callee starts from. Parameters should be seeded from
    /// [`InterproceduralCall::parameter_arguments`].
    fn initial_callee_data(
        &mut self,
        call: &InterproceduralCall<'_, Self::Value>,
        caller: &Self::Data,
    ) -> Result<Self::Data, Self::Error>;

    /// Decide a branch condition. Defaults to the predicate kind recorded for
    /// the condition while visiting it.
    fn classify_branch(
        &mut self,
        ctx: &FlowContext<'_, '_, L, Self::Value, Self::Data>,
        condition: Operation,
        data: &Self::Data,
    ) -> PredicateValueKind {
        let _ = data;
        ctx.predicate_kind(condition)
    }

    /// Refine the data flowing along a feasible branch edge.
    fn narrow_branch(
        &mut self,
        ctx: &FlowContext<'_, '_, L, Self::Value, Self::Data>,
        condition: Operation,
        taken: bool,
        data: &mut Self::Data,
    ) -> Result<(), Self::Error> {
        let _ = (ctx, condition, taken, data);
        Ok(())
    }

    /// Entity holding the value of a call argument, if tracked.
    fn argument_entity(
        &self,
        ctx: &FlowContext<'_, '_, L, Self::Value, Self::Data>,
        argument: Operation,
    ) -> Option<AnalysisEntity> {
        let _ = (ctx, argument);
        None
    }

    fn argument_location(
        &self,
        ctx: &FlowContext<'_, '_, L, Self::Value, Self::Data>,
        argument: Operation,
        data: &Self::Data,
    ) -> AbstractLocation {
        let _ = (ctx, argument, data);
        AbstractLocation::NoLocation
    }

    /// Fold a context-sensitive callee's exit data back into the caller.
    /// `callee_exit` is `None` when the callee never returns normally.
    fn apply_callee_result(
        &mut self,
        ctx: &mut FlowContext<'_, '_, L, Self::Value, Self::Data>,
        call: &InterproceduralCall<'_, Self::Value>,
        callee_exit: Option<&Self::Data>,
        caller: &mut Self::Data,
    ) -> Result<(), Self::Error> {
        let _ = (ctx, call, callee_exit, caller);
        Ok(())
    }

    /// Forget caller facts a call the engine did not follow may have
    /// invalidated. Only invoked for pessimistic analyses.
    fn reset_for_unanalyzed_call(
        &mut self,
        ctx: &mut FlowContext<'_, '_, L, Self::Value, Self::Data>,
        call_site: Operation,
        site: &CallSite,
        data: &mut Self::Data,
    ) {
        let _ = (ctx, call_site, site, data);
    }
}
