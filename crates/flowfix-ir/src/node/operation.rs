use crate::identifier;

use super::{block::Block, graph::CfgId};

identifier! {
    /// A unique identifier for an operation node, unique across the whole program.
    struct Operation
}

/// Flow capture number.
///
/// Capture numbers are only unique within the graph that declares them;
/// two nested graphs routinely reuse the same number.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CaptureId(pub u32);

#[derive(Clone, Debug)]
pub struct OperationInfo<L> {
    pub(crate) graph: CfgId,
    pub(crate) block: Block,
    pub(crate) payload: L,
}

impl<L> OperationInfo<L> {
    /// Graph that owns this operation.
    pub fn graph(&self) -> CfgId {
        self.graph
    }

    /// Block whose statement list holds this operation.
    pub fn block(&self) -> Block {
        self.block
    }

    /// Front-end payload describing what the operation does.
    pub fn payload(&self) -> &L {
        &self.payload
    }
}
