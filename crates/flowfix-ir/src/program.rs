use rustc_hash::FxHashMap;

use crate::arena::Arena;
use crate::builder::GraphBuilder;
use crate::intern::InternTable;
use crate::node::{
    BasicBlock, Block, CfgId, ControlFlowGraph, GraphKind, Operation, OperationInfo, Symbol,
};

/// Something that can be invoked and may own a control-flow graph.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Callable {
    Method(Symbol),
    LocalFunction(Symbol),
    /// Anonymous function, identified by the operation that creates it.
    Lambda(Operation),
}

impl Callable {
    pub fn is_lambda_or_local_function(&self) -> bool {
        !matches!(self, Callable::Method(_))
    }
}

/// Read-only program representation handed to the dataflow engine.
///
/// Owns every graph, block and operation of a compilation unit together with
/// the lookup tables that map callables to their graphs. All identifiers are
/// unique program-wide, so facts keyed by them never collide across graphs.
#[derive(Clone, Debug)]
pub struct Program<L> {
    pub(crate) symbols: InternTable<String, Symbol>,
    pub(crate) graphs: Arena<CfgId, ControlFlowGraph>,
    pub(crate) blocks: Arena<Block, BasicBlock>,
    pub(crate) operations: Arena<Operation, OperationInfo<L>>,
    pub(crate) methods: FxHashMap<Symbol, CfgId>,
    pub(crate) local_functions: FxHashMap<Symbol, CfgId>,
    pub(crate) lambdas: FxHashMap<Operation, CfgId>,
}

impl<L> Default for Program<L> {
    fn default() -> Self {
        Self {
            symbols: InternTable::default(),
            graphs: Arena::default(),
            blocks: Arena::default(),
            operations: Arena::default(),
            methods: FxHashMap::default(),
            local_functions: FxHashMap::default(),
            lambdas: FxHashMap::default(),
        }
    }
}

impl<L> Program<L> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&mut self, name: impl Into<String>) -> Symbol {
        self.symbols.intern(name.into())
    }

    pub fn symbol_name(&self, symbol: Symbol) -> Option<&str> {
        self.symbols.resolve(symbol).map(String::as_str)
    }

    /// Start building a new graph owned by `owner`.
    pub fn build_graph(&mut self, owner: Symbol) -> GraphBuilder<'_, L> {
        GraphBuilder::from_program(self, owner)
    }

    pub fn graph(&self, id: CfgId) -> Option<&ControlFlowGraph> {
        self.graphs.get(id)
    }

    pub fn graphs(&self) -> impl Iterator<Item = &ControlFlowGraph> {
        self.graphs.iter().map(|(_, graph)| graph)
    }

    pub fn block(&self, id: Block) -> Option<&BasicBlock> {
        self.blocks.get(id)
    }

    pub fn operation(&self, id: Operation) -> Option<&OperationInfo<L>> {
        self.operations.get(id)
    }

    pub fn payload(&self, id: Operation) -> Option<&L> {
        self.operations.get(id).map(OperationInfo::payload)
    }

    pub fn method_graph(&self, method: Symbol) -> Option<CfgId> {
        self.methods.get(&method).copied()
    }

    pub fn local_function_graph(&self, function: Symbol) -> Option<CfgId> {
        self.local_functions.get(&function).copied()
    }

    pub fn lambda_graph(&self, creation: Operation) -> Option<CfgId> {
        self.lambdas.get(&creation).copied()
    }

    /// Resolve `callable` to the graph that will run when it is invoked.
    ///
    /// Virtual methods and callables without a registered graph (external
    /// code) do not resolve.
    pub fn resolve(&self, callable: Callable) -> Option<CfgId> {
        let graph = match callable {
            Callable::Method(symbol) => self.method_graph(symbol)?,
            Callable::LocalFunction(symbol) => self.local_function_graph(symbol)?,
            Callable::Lambda(creation) => self.lambda_graph(creation)?,
        };
        match self.graph(graph)?.kind() {
            GraphKind::Method { is_virtual: true } => None,
            _ => Some(graph),
        }
    }
}
