mod block;
mod graph;
mod operation;
mod symbol;

pub use block::{BasicBlock, Block, BlockKind, Terminator};
pub use graph::{CfgId, ControlFlowGraph, GraphKind};
pub use operation::{CaptureId, Operation, OperationInfo};
pub use symbol::Symbol;
