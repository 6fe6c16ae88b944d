use smallvec::SmallVec;

use crate::identifier;

use super::{graph::CfgId, operation::Operation};

identifier! {
    /// A unique identifier for a basic block.
    struct Block
}

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BlockKind {
    Entry,
    Block,
    Exit,
}

/// How control leaves a block.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Terminator {
    /// Unconditional fall-through or jump.
    Jump(Block),
    /// Two-way branch on the value of `condition`, which must be an
    /// operation of the same block.
    Branch {
        condition: Operation,
        when_true: Block,
        when_false: Block,
    },
    /// Leave the procedure, optionally returning the value of an operation.
    /// Control continues at the graph's exit block.
    Return(Option<Operation>),
    /// Leave the procedure exceptionally. No successor.
    Throw(Option<Operation>),
    /// Terminator of the exit block.
    Exit,
}

#[derive(Clone, Debug)]
pub struct BasicBlock {
    pub(crate) graph: CfgId,
    pub(crate) ordinal: usize,
    pub(crate) kind: BlockKind,
    pub(crate) operations: Vec<Operation>,
    pub(crate) terminator: Option<Terminator>,
    pub(crate) successors: SmallVec<[Block; 2]>,
    pub(crate) predecessors: SmallVec<[Block; 4]>,
}

#[bon::bon]
impl BasicBlock {
    #[builder(finish_fn = new)]
    pub(crate) fn new(
        /// The graph this block belongs to.
        graph: CfgId,
        /// Position of the block in the graph's block order.
        ordinal: usize,
        kind: BlockKind,
        terminator: Option<Terminator>,
    ) -> Self {
        Self {
            graph,
            ordinal,
            kind,
            operations: Vec::new(),
            terminator,
            successors: SmallVec::new(),
            predecessors: SmallVec::new(),
        }
    }
}

impl BasicBlock {
    pub fn graph(&self) -> CfgId {
        self.graph
    }

    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    pub fn kind(&self) -> BlockKind {
        self.kind
    }

    /// Operations in statement order.
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn terminator(&self) -> Option<Terminator> {
        self.terminator
    }

    pub fn successors(&self) -> &[Block] {
        &self.successors
    }

    /// Predecessors, including back-edge sources.
    pub fn predecessors(&self) -> &[Block] {
        &self.predecessors
    }
}
