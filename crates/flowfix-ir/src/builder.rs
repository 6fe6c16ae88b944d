use rustc_hash::FxHashSet;
use smallvec::SmallVec;

use crate::node::{
    BasicBlock, Block, BlockKind, CaptureId, CfgId, ControlFlowGraph, GraphKind, Operation,
    OperationInfo, Symbol, Terminator,
};
use crate::program::Program;

/// Error returned when a graph under construction is malformed in a way
/// the engine cannot tolerate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    #[error("block {0:?} has no terminator")]
    MissingTerminator(Block),
    #[error("block {target:?} targeted from {from:?} belongs to another graph")]
    ForeignBlock { from: Block, target: Block },
    #[error("branch condition {condition:?} is not an operation of block {block:?}")]
    ConditionOutsideBlock { block: Block, condition: Operation },
    #[error("operation {operation:?} returned or thrown from {block:?} belongs to another graph")]
    ForeignOperation { block: Block, operation: Operation },
    #[error("lambda creation operation {0:?} does not exist")]
    UnknownLambdaCreation(Operation),
}

/// Incremental builder for one [`ControlFlowGraph`].
///
/// The entry block exists from the start; the exit block is appended by
/// [`finish`](Self::finish), which also computes successor and predecessor
/// lists and registers the graph in the program's callable lookup tables.
pub struct GraphBuilder<'a, L> {
    program: &'a mut Program<L>,
    id: CfgId,
    owner: Symbol,
    kind: GraphKind,
    parent: Option<CfgId>,
    parameters: Vec<Symbol>,
    returns_value: bool,
    blocks: Vec<Block>,
    lvalue_captures: FxHashSet<CaptureId>,
}

impl<'a, L> GraphBuilder<'a, L> {
    pub(crate) fn from_program(program: &'a mut Program<L>, owner: Symbol) -> Self {
        let id = program.graphs.next_id();
        let entry = program.blocks.alloc(
            BasicBlock::builder()
                .graph(id)
                .ordinal(0)
                .kind(BlockKind::Entry)
                .new(),
        );
        GraphBuilder {
            program,
            id,
            owner,
            kind: GraphKind::Method { is_virtual: false },
            parent: None,
            parameters: Vec::new(),
            returns_value: false,
            blocks: vec![entry],
            lvalue_captures: FxHashSet::default(),
        }
    }

    /// Identifier the graph will have once finished.
    pub fn id(&self) -> CfgId {
        self.id
    }

    pub fn kind(mut self, kind: GraphKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn parent(mut self, parent: CfgId) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn parameter(mut self, parameter: Symbol) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn returns_value(mut self, returns_value: bool) -> Self {
        self.returns_value = returns_value;
        self
    }

    /// Mark a flow capture of this graph as captured by reference.
    pub fn lvalue_capture(mut self, capture: CaptureId) -> Self {
        self.lvalue_captures.insert(capture);
        self
    }

    pub fn entry(&self) -> Block {
        self.blocks[0]
    }

    /// Append a new, empty block.
    pub fn block(&mut self) -> Block {
        let block = self.program.blocks.alloc(
            BasicBlock::builder()
                .graph(self.id)
                .ordinal(self.blocks.len())
                .kind(BlockKind::Block)
                .new(),
        );
        self.blocks.push(block);
        block
    }

    /// Append an operation to the end of `block`.
    pub fn op(&mut self, block: Block, payload: L) -> Operation {
        let operation = self.program.operations.next_id();
        self.block_info_mut(block).operations.push(operation);
        self.program.operations.alloc(OperationInfo {
            graph: self.id,
            block,
            payload,
        })
    }

    pub fn jump(&mut self, from: Block, to: Block) {
        self.block_info_mut(from).terminator = Some(Terminator::Jump(to));
    }

    pub fn branch(
        &mut self,
        from: Block,
        condition: Operation,
        when_true: Block,
        when_false: Block,
    ) {
        self.block_info_mut(from).terminator = Some(Terminator::Branch {
            condition,
            when_true,
            when_false,
        });
    }

    pub fn ret(&mut self, from: Block, value: Option<Operation>) {
        self.block_info_mut(from).terminator = Some(Terminator::Return(value));
    }

    pub fn throw(&mut self, from: Block, value: Option<Operation>) {
        self.block_info_mut(from).terminator = Some(Terminator::Throw(value));
    }

    fn block_info_mut(&mut self, block: Block) -> &mut BasicBlock {
        let id = self.id;
        match self.program.blocks.get_mut(block) {
            Some(info) if info.graph == id => info,
            _ => panic!("block {block:?} does not belong to graph {id:?} under construction"),
        }
    }

    /// Validate the graph, wire up edges and register it with the program.
    pub fn finish(mut self) -> Result<CfgId, BuildError> {
        let exit = self.program.blocks.alloc(
            BasicBlock::builder()
                .graph(self.id)
                .ordinal(self.blocks.len())
                .kind(BlockKind::Exit)
                .terminator(Terminator::Exit)
                .new(),
        );
        self.blocks.push(exit);

        let mut edges: Vec<(Block, Block)> = Vec::new();
        for &block in &self.blocks {
            let info = &self.program.blocks[block];
            let terminator = info.terminator.ok_or(BuildError::MissingTerminator(block))?;
            let successors: SmallVec<[Block; 2]> = match terminator {
                Terminator::Jump(target) => smallvec::smallvec![target],
                Terminator::Branch {
                    condition,
                    when_true,
                    when_false,
                } => {
                    if !info.operations.contains(&condition) {
                        return Err(BuildError::ConditionOutsideBlock { block, condition });
                    }
                    if when_true == when_false {
                        smallvec::smallvec![when_true]
                    } else {
                        smallvec::smallvec![when_true, when_false]
                    }
                }
                Terminator::Return(value) => {
                    self.check_local_operation(block, value)?;
                    smallvec::smallvec![exit]
                }
                Terminator::Throw(value) => {
                    self.check_local_operation(block, value)?;
                    SmallVec::new()
                }
                Terminator::Exit => SmallVec::new(),
            };
            for &target in &successors {
                if self.program.blocks.get(target).map(|t| t.graph) != Some(self.id) {
                    return Err(BuildError::ForeignBlock {
                        from: block,
                        target,
                    });
                }
                edges.push((block, target));
            }
            self.program.blocks[block].successors = successors;
        }
        for (from, to) in edges {
            self.program.blocks[to].predecessors.push(from);
        }
        let back_edges = self.back_edges();

        if let GraphKind::Lambda { creation } = self.kind {
            let creator = self
                .program
                .operations
                .get(creation)
                .ok_or(BuildError::UnknownLambdaCreation(creation))?;
            if self.parent.is_none() {
                self.parent = Some(creator.graph);
            }
        }

        let graph = ControlFlowGraph {
            id: self.id,
            owner: self.owner,
            kind: self.kind,
            parent: self.parent,
            parameters: self.parameters,
            returns_value: self.returns_value,
            blocks: self.blocks,
            lvalue_captures: self.lvalue_captures,
            back_edges,
        };
        let id = self.program.graphs.alloc(graph);
        debug_assert_eq!(id, self.id);

        match self.kind {
            GraphKind::Method { .. } => {
                self.program.methods.insert(self.owner, id);
            }
            GraphKind::LocalFunction => {
                self.program.local_functions.insert(self.owner, id);
            }
            GraphKind::Lambda { creation } => {
                self.program.lambdas.insert(creation, id);
            }
        }
        Ok(id)
    }

    /// Edges into a block that is still on the depth-first stack.
    fn back_edges(&self) -> FxHashSet<(Block, Block)> {
        let mut back_edges = FxHashSet::default();
        let Some(&entry) = self.blocks.first() else {
            return back_edges;
        };
        let mut visited = FxHashSet::default();
        let mut on_stack = FxHashSet::default();
        let mut stack: Vec<(Block, usize)> = vec![(entry, 0)];
        visited.insert(entry);
        on_stack.insert(entry);
        while let Some(&(block, next)) = stack.last() {
            match self.program.blocks[block].successors.get(next).copied() {
                Some(successor) => {
                    if let Some(top) = stack.last_mut() {
                        top.1 += 1;
                    }
                    if on_stack.contains(&successor) {
                        back_edges.insert((block, successor));
                    } else if visited.insert(successor) {
                        on_stack.insert(successor);
                        stack.push((successor, 0));
                    }
                }
                None => {
                    on_stack.remove(&block);
                    stack.pop();
                }
            }
        }
        back_edges
    }

    fn check_local_operation(
        &self,
        block: Block,
        operation: Option<Operation>,
    ) -> Result<(), BuildError> {
        let Some(operation) = operation else {
            return Ok(());
        };
        match self.program.operations.get(operation) {
            Some(info) if info.graph == self.id => Ok(()),
            _ => Err(BuildError::ForeignOperation { block, operation }),
        }
    }
}
