mod arena;
mod builder;
mod intern;
mod lattice;
mod node;
mod program;

pub use arena::{Arena, Id, Identifier};
pub use builder::{BuildError, GraphBuilder};
pub use intern::{InternKey, InternTable};
pub use lattice::{HasBottom, HasTop, Lattice};
pub use node::{
    BasicBlock, Block, BlockKind, CaptureId, CfgId, ControlFlowGraph, GraphKind, Operation,
    OperationInfo, Symbol, Terminator,
};
pub use program::{Callable, Program};

#[cfg(test)]
mod tests;
