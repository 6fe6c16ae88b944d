use std::collections::VecDeque;

use flowfix_ir::{BasicBlock, Block, BlockKind, Operation, Terminator};
use rustc_hash::FxHashMap;
use smallvec::{SmallVec, smallvec};

use super::{DataFlowAnalysis, FlowContext, Frame};
use crate::context::AnalysisContext;
use crate::data::{AnalysisData, DataGuard, merge_checked};
use crate::domain::ValueDomain;
use crate::error::DataflowError;
use crate::predicate::PredicateValueKind;
use crate::result::{BlockAnalysisResult, DataFlowAnalysisResult};
use crate::visitor::{Effect, OperationVisitor};

/// Worklist bookkeeping for one graph, indexed by block ordinal.
#[derive(Debug)]
struct FixpointState<D: AnalysisData> {
    worklist: VecDeque<Block>,
    /// Data on each `(from, to)` edge that has been executed.
    edges: FxHashMap<(Block, Block), DataGuard<D>>,
    inputs: Vec<Option<DataGuard<D>>>,
    outputs: Vec<Option<DataGuard<D>>>,
    visits: Vec<usize>,
}

impl<D: AnalysisData> FixpointState<D> {
    fn new(blocks: usize) -> Self {
        Self {
            worklist: VecDeque::new(),
            edges: FxHashMap::default(),
            inputs: std::iter::repeat_with(|| None).take(blocks).collect(),
            outputs: std::iter::repeat_with(|| None).take(blocks).collect(),
            visits: vec![0; blocks],
        }
    }

    fn enqueue(&mut self, block: Block) {
        if !self.worklist.contains(&block) {
            self.worklist.push_back(block);
        }
    }
}

type Outgoing<D> = SmallVec<[(Block, DataGuard<D>); 2]>;

// -- Execution engine -------------------------------------------------------

impl<'ir, L, T> DataFlowAnalysis<'ir, L, T>
where
    T: OperationVisitor<L>,
{
    /// Iterate the graph of `ctx` to its fixpoint from `initial` entry data.
    pub(crate) fn run_fixpoint(
        &mut self,
        ctx: &AnalysisContext<'ir, L>,
        initial: T::Data,
    ) -> Result<DataFlowAnalysisResult<T::Value, T::Data>, T::Error> {
        let program = self.program;
        let graph = ctx.graph();
        let initial = DataGuard::new(initial);
        let mut frame = Frame::default();
        let mut state = FixpointState::new(graph.blocks().len());
        state.enqueue(graph.entry());

        let mut iterations = 0;
        while let Some(block) = state.worklist.pop_front() {
            iterations += 1;
            if let Some(limit) = self.max_iterations {
                if iterations > limit {
                    return Err(DataflowError::IterationLimitExceeded {
                        cfg: ctx.cfg(),
                        limit,
                    }
                    .into());
                }
            }

            let info = program
                .block(block)
                .ok_or(DataflowError::UnknownBlock(block))?;
            let ordinal = info.ordinal();
            let Some(input) = self.block_input(ctx, &state, block, info, &initial) else {
                continue;
            };
            state.visits[ordinal] += 1;
            log::trace!(target: "dataflow", "visit {block:?} #{}", state.visits[ordinal]);
            let mut data = input.clone();
            state.inputs[ordinal] = Some(input);

            for &operation in info.operations() {
                self.transfer(ctx, &mut frame, block, operation, &mut *data)?;
            }
            let outgoing = self.flow_out(ctx, &mut frame, block, info, &*data)?;
            state.outputs[ordinal] = Some(data);

            for (successor, edge) in outgoing {
                let key = (block, successor);
                let changed = state
                    .edges
                    .get(&key)
                    .is_none_or(|previous| *previous != edge);
                if changed {
                    state.edges.insert(key, edge);
                    state.enqueue(successor);
                }
            }
        }

        log::debug!(
            target: "dataflow",
            "{:?} converged after {iterations} block visits",
            ctx.cfg()
        );
        self.collect_result(ctx, frame, state)
    }

    /// Merge the data on every executed incoming edge. `None` while no edge
    /// into the block has executed.
    fn block_input(
        &self,
        ctx: &AnalysisContext<'ir, L>,
        state: &FixpointState<T::Data>,
        block: Block,
        info: &BasicBlock,
        initial: &DataGuard<T::Data>,
    ) -> Option<DataGuard<T::Data>> {
        let graph = ctx.graph();
        let mut merged = (info.kind() == BlockKind::Entry).then(|| initial.clone());
        let mut from_back_edge = false;
        for &predecessor in info.predecessors() {
            let Some(edge) = state.edges.get(&(predecessor, block)) else {
                continue;
            };
            from_back_edge |= graph.is_back_edge(predecessor, block);
            merged = Some(match merged {
                Some(accumulated) => DataGuard::new(merge_checked(&*accumulated, &**edge)),
                None => edge.clone(),
            });
        }
        let merged = merged?;
        if !from_back_edge {
            return Some(merged);
        }
        let ordinal = info.ordinal();
        let widened = self.widening_strategy.apply(
            state.inputs[ordinal].as_deref(),
            &merged,
            state.visits[ordinal],
        );
        Some(widened.map_or(merged, DataGuard::new))
    }

    /// Run the visitor on one operation and record the value it produced.
    fn transfer(
        &mut self,
        ctx: &AnalysisContext<'ir, L>,
        frame: &mut Frame<T::Value, T::Data>,
        block: Block,
        operation: Operation,
        data: &mut T::Data,
    ) -> Result<(), T::Error> {
        let payload = ctx
            .program()
            .payload(operation)
            .ok_or(DataflowError::UnknownOperation(operation))?;
        let effect = {
            let mut flow = FlowContext::new(ctx, frame, block);
            self.visitor.visit(&mut flow, operation, payload, data)?
        };
        let value = match effect {
            Effect::Value(value) => value,
            Effect::Call(site) => self.dispatch(ctx, frame, block, operation, &site, data)?,
        };
        frame.values.insert(operation, value);
        Ok(())
    }

    /// Data leaving `block` along each feasible successor edge.
    fn flow_out(
        &mut self,
        ctx: &AnalysisContext<'ir, L>,
        frame: &mut Frame<T::Value, T::Data>,
        block: Block,
        info: &BasicBlock,
        data: &T::Data,
    ) -> Result<Outgoing<T::Data>, T::Error> {
        let Some(terminator) = info.terminator() else {
            return Ok(SmallVec::new());
        };
        let outgoing = match terminator {
            Terminator::Jump(target) => smallvec![(target, DataGuard::new(data.clone()))],
            Terminator::Branch {
                condition,
                when_true,
                when_false,
            } => self.flow_branch(ctx, frame, block, condition, when_true, when_false, data)?,
            Terminator::Return(_) => {
                smallvec![(ctx.graph().exit(), DataGuard::new(data.clone()))]
            }
            Terminator::Throw(_) | Terminator::Exit => SmallVec::new(),
        };
        Ok(outgoing)
    }

    #[allow(clippy::too_many_arguments)]
    fn flow_branch(
        &mut self,
        ctx: &AnalysisContext<'ir, L>,
        frame: &mut Frame<T::Value, T::Data>,
        block: Block,
        condition: Operation,
        when_true: Block,
        when_false: Block,
        data: &T::Data,
    ) -> Result<Outgoing<T::Data>, T::Error> {
        let kind = if self.configuration.predicate_analysis() {
            let flow = FlowContext::new(ctx, frame, block);
            let kind = self.visitor.classify_branch(&flow, condition, data);
            frame.predicate_kinds.insert(condition, kind);
            kind
        } else {
            PredicateValueKind::Unknown
        };

        let mut outgoing: Outgoing<T::Data> = SmallVec::new();
        for (target, taken) in [(when_true, true), (when_false, false)] {
            if kind.is_dead_edge(taken) {
                log::trace!(target: "dataflow", "{block:?} -> {target:?} is infeasible ({kind:?})");
                continue;
            }
            let mut edge = DataGuard::new(data.clone());
            {
                let flow = FlowContext::new(ctx, frame, block);
                self.visitor
                    .narrow_branch(&flow, condition, taken, &mut *edge)?;
            }
            match outgoing.iter_mut().find(|(existing, _)| *existing == target) {
                Some((_, existing)) => {
                    *existing = DataGuard::new(merge_checked(&**existing, &*edge));
                }
                None => outgoing.push((target, edge)),
            }
        }
        Ok(outgoing)
    }

    fn collect_result(
        &self,
        ctx: &AnalysisContext<'ir, L>,
        mut frame: Frame<T::Value, T::Data>,
        mut state: FixpointState<T::Data>,
    ) -> Result<DataFlowAnalysisResult<T::Value, T::Data>, T::Error> {
        let program = self.program;
        let graph = ctx.graph();
        let mut blocks = Vec::with_capacity(graph.blocks().len());
        let mut block_index = FxHashMap::default();
        let mut returned: Option<(T::Value, PredicateValueKind)> = None;
        let mut unhandled_throw_data = frame.callee_throw_data.take();

        for (ordinal, &block) in graph.blocks().iter().enumerate() {
            let info = program
                .block(block)
                .ok_or(DataflowError::UnknownBlock(block))?;
            let input = state.inputs[ordinal].take();
            let output = state.outputs[ordinal].take();
            if let Some(exit_data) = &output {
                match info.terminator() {
                    Some(Terminator::Return(Some(operation))) if graph.returns_value() => {
                        let value = frame
                            .values
                            .get(&operation)
                            .cloned()
                            .ok_or(DataflowError::MissingValue(operation))?;
                        let kind = frame
                            .predicate_kinds
                            .get(&operation)
                            .copied()
                            .unwrap_or_default();
                        returned = Some(match returned {
                            Some((merged, merged_kind)) => {
                                (merged.merge(&value), merged_kind.merge(kind))
                            }
                            None => (value, kind),
                        });
                    }
                    Some(Terminator::Throw(_)) => {
                        unhandled_throw_data = Some(match unhandled_throw_data {
                            Some(merged) => DataGuard::new(merge_checked(&*merged, &**exit_data)),
                            None => exit_data.clone(),
                        });
                    }
                    _ => {}
                }
            }
            block_index.insert(block, ordinal);
            blocks.push(BlockAnalysisResult {
                block,
                kind: info.kind(),
                input,
                output,
                visits: state.visits[ordinal],
            });
        }

        let return_value_and_predicate_kind = graph.returns_value().then(|| {
            returned.unwrap_or_else(|| (T::Value::unknown_or_may_be(), PredicateValueKind::Unknown))
        });

        Ok(DataFlowAnalysisResult {
            cfg: ctx.cfg(),
            owning_symbol: ctx.owning_symbol(),
            blocks,
            block_index,
            return_value_and_predicate_kind,
            lambda_and_local_function_info: frame.escapes.freeze(),
            unhandled_throw_data,
            task_wrapped_values: frame.task_wrapped_values,
            operation_values: frame.values,
            predicate_kinds: frame.predicate_kinds,
            interprocedural_results: frame.interprocedural_results,
            truncated: frame.truncated,
        })
    }
}
