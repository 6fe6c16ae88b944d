use std::fmt;

use flowfix_ir::{Callable, CfgId, ControlFlowGraph, Operation, Program, Symbol};
use smallvec::SmallVec;

use crate::config::InterproceduralAnalysisConfiguration;

/// One interprocedural call entered on the way from the root graph to the
/// graph currently being analyzed.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub struct CallFrame {
    pub call_site: Operation,
    pub callee: CfgId,
    pub callable: Callable,
}

/// Everything an analysis of one graph needs to know about where it runs.
///
/// A fresh context is forked for every interprocedural call; the chain of
/// call frames it carries decides the call-chain limits.
pub struct AnalysisContext<'ir, L> {
    program: &'ir Program<L>,
    graph: &'ir ControlFlowGraph,
    configuration: InterproceduralAnalysisConfiguration,
    root: CfgId,
    call_chain: SmallVec<[CallFrame; 4]>,
}

impl<L> Clone for AnalysisContext<'_, L> {
    fn clone(&self) -> Self {
        Self {
            program: self.program,
            graph: self.graph,
            configuration: self.configuration,
            root: self.root,
            call_chain: self.call_chain.clone(),
        }
    }
}

impl<L> fmt::Debug for AnalysisContext<'_, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalysisContext")
            .field("cfg", &self.graph.id())
            .field("configuration", &self.configuration)
            .field("call_chain", &self.call_chain)
            .finish()
    }
}

impl<'ir, L> AnalysisContext<'ir, L> {
    pub(crate) fn for_root(
        program: &'ir Program<L>,
        graph: &'ir ControlFlowGraph,
        configuration: InterproceduralAnalysisConfiguration,
    ) -> Self {
        Self {
            program,
            graph,
            configuration,
            root: graph.id(),
            call_chain: SmallVec::new(),
        }
    }

    pub(crate) fn fork_for_call(
        &self,
        callee: &'ir ControlFlowGraph,
        callable: Callable,
        call_site: Operation,
    ) -> Self {
        let mut call_chain = self.call_chain.clone();
        call_chain.push(CallFrame {
            call_site,
            callee: callee.id(),
            callable,
        });
        Self {
            program: self.program,
            graph: callee,
            configuration: self.configuration,
            root: self.root,
            call_chain,
        }
    }

    pub fn program(&self) -> &'ir Program<L> {
        self.program
    }

    pub fn graph(&self) -> &'ir ControlFlowGraph {
        self.graph
    }

    pub fn cfg(&self) -> CfgId {
        self.graph.id()
    }

    pub fn owning_symbol(&self) -> Symbol {
        self.graph.owner()
    }

    pub fn configuration(&self) -> &InterproceduralAnalysisConfiguration {
        &self.configuration
    }

    /// Graph enclosing a lambda or local function.
    pub fn parent_graph(&self) -> Option<&'ir ControlFlowGraph> {
        self.graph
            .parent()
            .and_then(|parent| self.program.graph(parent))
    }

    pub fn local_function_graph(&self, function: Symbol) -> Option<&'ir ControlFlowGraph> {
        self.program
            .local_function_graph(function)
            .and_then(|id| self.program.graph(id))
    }

    pub fn lambda_graph(&self, creation: Operation) -> Option<&'ir ControlFlowGraph> {
        self.program
            .lambda_graph(creation)
            .and_then(|id| self.program.graph(id))
    }

    /// Graph the analysis was started on.
    pub fn root(&self) -> CfgId {
        self.root
    }

    /// Calls entered from the root, outermost first.
    pub fn call_chain(&self) -> &[CallFrame] {
        &self.call_chain
    }

    /// True when this graph is analyzed on behalf of a caller.
    pub fn is_interprocedural(&self) -> bool {
        !self.call_chain.is_empty()
    }

    /// Whether `cfg` is the root or any graph entered on the call chain.
    pub fn is_being_analyzed(&self, cfg: CfgId) -> bool {
        self.root == cfg || self.call_chain.iter().any(|frame| frame.callee == cfg)
    }

    /// Methods entered on the call chain below the root.
    pub fn method_call_depth(&self) -> u32 {
        self.count_frames(|frame| !frame.callable.is_lambda_or_local_function())
    }

    /// Lambdas and local functions entered on the call chain below the root.
    pub fn lambda_or_local_function_call_depth(&self) -> u32 {
        self.count_frames(|frame| frame.callable.is_lambda_or_local_function())
    }

    fn count_frames(&self, f: impl Fn(&CallFrame) -> bool) -> u32 {
        self.call_chain.iter().filter(|frame| f(frame)).count() as u32
    }
}
