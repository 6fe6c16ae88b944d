use rustc_hash::FxHashSet;

use crate::identifier;

use super::{block::Block, operation::CaptureId, operation::Operation, symbol::Symbol};

identifier! {
    /// A unique identifier for a control-flow graph.
    struct CfgId
}

/// What kind of procedure a graph was lowered from.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GraphKind {
    /// Top-level method. `virtual` methods cannot be resolved statically.
    Method { is_virtual: bool },
    LocalFunction,
    /// Anonymous function created by `creation` in the parent graph.
    Lambda { creation: Operation },
}

impl GraphKind {
    pub fn is_lambda_or_local_function(&self) -> bool {
        matches!(self, GraphKind::LocalFunction | GraphKind::Lambda { .. })
    }
}

#[derive(Clone, Debug)]
pub struct ControlFlowGraph {
    pub(crate) id: CfgId,
    pub(crate) owner: Symbol,
    pub(crate) kind: GraphKind,
    pub(crate) parent: Option<CfgId>,
    pub(crate) parameters: Vec<Symbol>,
    pub(crate) returns_value: bool,
    pub(crate) blocks: Vec<Block>,
    pub(crate) lvalue_captures: FxHashSet<CaptureId>,
    pub(crate) back_edges: FxHashSet<(Block, Block)>,
}

impl ControlFlowGraph {
    pub fn id(&self) -> CfgId {
        self.id
    }

    /// Symbol of the procedure this graph was built for.
    pub fn owner(&self) -> Symbol {
        self.owner
    }

    pub fn kind(&self) -> GraphKind {
        self.kind
    }

    /// Enclosing graph for lambdas and local functions.
    pub fn parent(&self) -> Option<CfgId> {
        self.parent
    }

    pub fn parameters(&self) -> &[Symbol] {
        &self.parameters
    }

    pub fn returns_value(&self) -> bool {
        self.returns_value
    }

    /// Blocks in ordinal order. The first block is the entry, the last the exit.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn entry(&self) -> Block {
        self.blocks[0]
    }

    pub fn exit(&self) -> Block {
        self.blocks[self.blocks.len() - 1]
    }

    /// Whether `from -> to` closes a cycle in a depth-first walk from the
    /// entry. Every cycle reachable from the entry contains one.
    pub fn is_back_edge(&self, from: Block, to: Block) -> bool {
        self.back_edges.contains(&(from, to))
    }

    /// Whether `capture` is captured by reference (an assignable location).
    pub fn is_lvalue_capture(&self, capture: CaptureId) -> bool {
        self.lvalue_captures.contains(&capture)
    }
}
