use std::sync::Arc;

use flowfix_ir::{Block, BlockKind, CfgId, Operation, Symbol};
use rustc_hash::FxHashMap;

use crate::data::{AnalysisData, DataGuard};
use crate::entity::AbstractLocation;
use crate::escape::LambdaAndLocalFunctionAnalysisInfo;
use crate::predicate::PredicateValueKind;

/// Final data of one basic block.
///
/// `input` and `output` are `None` for blocks the analysis never reached.
#[derive(Clone, Debug, PartialEq)]
pub struct BlockAnalysisResult<D: AnalysisData> {
    pub(crate) block: Block,
    pub(crate) kind: BlockKind,
    pub(crate) input: Option<DataGuard<D>>,
    pub(crate) output: Option<DataGuard<D>>,
    pub(crate) visits: usize,
}

impl<D: AnalysisData> BlockAnalysisResult<D> {
    pub fn block(&self) -> Block {
        self.block
    }

    pub fn kind(&self) -> BlockKind {
        self.kind
    }

    /// Data at block entry.
    pub fn input(&self) -> Option<&D> {
        self.input.as_deref()
    }

    /// Data after the last operation of the block.
    pub fn output(&self) -> Option<&D> {
        self.output.as_deref()
    }

    pub fn is_reachable(&self) -> bool {
        self.input.is_some()
    }

    /// How many times the fixpoint loop processed this block.
    pub fn visits(&self) -> usize {
        self.visits
    }
}

/// Read-only view shared by every analysis result.
pub trait AnalysisResult {
    type Value;
    type Data: AnalysisData;

    fn cfg(&self) -> CfgId;

    fn block_result(&self, block: Block) -> Option<&BlockAnalysisResult<Self::Data>>;

    /// Merged value of every `return` in the graph, with its predicate kind.
    /// `None` when nothing is returned.
    fn return_value_and_predicate_kind(&self) -> Option<&(Self::Value, PredicateValueKind)>;

    fn lambda_and_local_function_info(&self) -> &LambdaAndLocalFunctionAnalysisInfo;

    /// Merge of the data at every `throw` not handled in the graph, including
    /// throws reported by analyzed callees.
    fn unhandled_throw_data(&self) -> Option<&Self::Data>;

    fn task_wrapped_values(&self) -> &FxHashMap<AbstractLocation, Self::Value>;
}

/// Result of analyzing one control-flow graph to its fixpoint.
#[derive(Clone, Debug)]
pub struct DataFlowAnalysisResult<V, D: AnalysisData> {
    pub(crate) cfg: CfgId,
    pub(crate) owning_symbol: Symbol,
    pub(crate) blocks: Vec<BlockAnalysisResult<D>>,
    pub(crate) block_index: FxHashMap<Block, usize>,
    pub(crate) return_value_and_predicate_kind: Option<(V, PredicateValueKind)>,
    pub(crate) lambda_and_local_function_info: LambdaAndLocalFunctionAnalysisInfo,
    pub(crate) unhandled_throw_data: Option<DataGuard<D>>,
    pub(crate) task_wrapped_values: FxHashMap<AbstractLocation, V>,
    pub(crate) operation_values: FxHashMap<Operation, V>,
    pub(crate) predicate_kinds: FxHashMap<Operation, PredicateValueKind>,
    pub(crate) interprocedural_results: FxHashMap<Operation, Arc<DataFlowAnalysisResult<V, D>>>,
    pub(crate) truncated: bool,
}

impl<V, D: AnalysisData> DataFlowAnalysisResult<V, D> {
    pub fn owning_symbol(&self) -> Symbol {
        self.owning_symbol
    }

    /// Block results in ordinal order.
    pub fn blocks(&self) -> &[BlockAnalysisResult<D>] {
        &self.blocks
    }

    pub fn entry_block_result(&self) -> Option<&BlockAnalysisResult<D>> {
        self.blocks.first()
    }

    pub fn exit_block_result(&self) -> Option<&BlockAnalysisResult<D>> {
        self.blocks.last()
    }

    /// Data reaching the exit block, i.e. the merge over all normal returns.
    pub fn exit_data(&self) -> Option<&D> {
        self.exit_block_result().and_then(BlockAnalysisResult::output)
    }

    /// Final value computed for `operation`.
    pub fn value(&self, operation: Operation) -> Option<&V> {
        self.operation_values.get(&operation)
    }

    pub fn predicate_kind(&self, operation: Operation) -> PredicateValueKind {
        self.predicate_kinds
            .get(&operation)
            .copied()
            .unwrap_or_default()
    }

    /// Result of the callee analyzed for the call at `operation`.
    pub fn interprocedural_result(
        &self,
        operation: Operation,
    ) -> Option<&Arc<DataFlowAnalysisResult<V, D>>> {
        self.interprocedural_results.get(&operation)
    }

    /// Whether a call was cut off by the recursion guard or a call-chain
    /// limit, in this graph or in any callee analyzed for it. Such a result
    /// depends on the call chain it was computed under.
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// Total block visits of the fixpoint loop.
    pub fn total_visits(&self) -> usize {
        self.blocks.iter().map(BlockAnalysisResult::visits).sum()
    }
}

impl<V, D: AnalysisData> AnalysisResult for DataFlowAnalysisResult<V, D> {
    type Value = V;
    type Data = D;

    fn cfg(&self) -> CfgId {
        self.cfg
    }

    fn block_result(&self, block: Block) -> Option<&BlockAnalysisResult<D>> {
        self.block_index
            .get(&block)
            .and_then(|&index| self.blocks.get(index))
    }

    fn return_value_and_predicate_kind(&self) -> Option<&(V, PredicateValueKind)> {
        self.return_value_and_predicate_kind.as_ref()
    }

    fn lambda_and_local_function_info(&self) -> &LambdaAndLocalFunctionAnalysisInfo {
        &self.lambda_and_local_function_info
    }

    fn unhandled_throw_data(&self) -> Option<&D> {
        self.unhandled_throw_data.as_deref()
    }

    fn task_wrapped_values(&self) -> &FxHashMap<AbstractLocation, V> {
        &self.task_wrapped_values
    }
}
