mod fixpoint;
mod flow;
mod frame;
mod interproc;
mod summary;

use flowfix_ir::{Callable, CfgId, ControlFlowGraph, Program};
use rustc_hash::FxHashMap;

use crate::config::InterproceduralAnalysisConfiguration;
use crate::context::AnalysisContext;
use crate::error::DataflowError;
use crate::result::DataFlowAnalysisResult;
use crate::visitor::OperationVisitor;
use crate::widening::WideningStrategy;

pub use flow::FlowContext;
pub use summary::{SummaryCache, SummaryEntry};

pub(crate) use frame::Frame;

type SkipPredicate<'ir> = Box<dyn Fn(&ControlFlowGraph, Callable) -> bool + 'ir>;

/// Worklist-based forward dataflow analysis over a [`Program`].
///
/// Each control-flow graph is iterated to a fixpoint: block entry data is the
/// merge of the data on every incoming edge, operations are handed to the
/// [`OperationVisitor`] in order, and a successor is revisited whenever the
/// data on its incoming edge changes. Calls the visitor reports are followed
/// into the callee's graph when it can be resolved, with results cached per
/// argument context for the lifetime of the analysis.
pub struct DataFlowAnalysis<'ir, L, T>
where
    T: OperationVisitor<L>,
{
    pub(crate) program: &'ir Program<L>,
    pub(crate) visitor: T,
    pub(crate) configuration: InterproceduralAnalysisConfiguration,
    pub(crate) widening_strategy: WideningStrategy,
    pub(crate) max_iterations: Option<usize>,
    pub(crate) skip: Option<SkipPredicate<'ir>>,
    pub(crate) summaries: FxHashMap<CfgId, SummaryCache<T::Value, T::Data>>,
}

// -- Constructors -----------------------------------------------------------

impl<'ir, L, T> DataFlowAnalysis<'ir, L, T>
where
    T: OperationVisitor<L>,
{
    pub fn new(program: &'ir Program<L>, visitor: T) -> Self {
        Self {
            program,
            visitor,
            configuration: InterproceduralAnalysisConfiguration::default(),
            widening_strategy: WideningStrategy::Never,
            max_iterations: None,
            skip: None,
            summaries: FxHashMap::default(),
        }
    }
}

// -- Builder methods --------------------------------------------------------

impl<'ir, L, T> DataFlowAnalysis<'ir, L, T>
where
    T: OperationVisitor<L>,
{
    pub fn with_configuration(
        mut self,
        configuration: InterproceduralAnalysisConfiguration,
    ) -> Self {
        self.configuration = configuration;
        self
    }

    /// Configure widening behavior at loop headers.
    pub fn with_widening(mut self, strategy: WideningStrategy) -> Self {
        self.widening_strategy = strategy;
        self
    }

    /// Fail with [`DataflowError::IterationLimitExceeded`] once one graph's
    /// fixpoint loop has processed `max` blocks. Unlimited by default.
    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = Some(max);
        self
    }

    /// Veto interprocedural analysis of particular callees. A vetoed call is
    /// handled like an unresolved one, without being recorded as an escape.
    pub fn with_skip(
        mut self,
        skip: impl Fn(&ControlFlowGraph, Callable) -> bool + 'ir,
    ) -> Self {
        self.skip = Some(Box::new(skip));
        self
    }
}

// -- Accessors --------------------------------------------------------------

impl<'ir, L, T> DataFlowAnalysis<'ir, L, T>
where
    T: OperationVisitor<L>,
{
    pub fn program(&self) -> &'ir Program<L> {
        self.program
    }

    pub fn configuration(&self) -> &InterproceduralAnalysisConfiguration {
        &self.configuration
    }

    pub fn visitor(&self) -> &T {
        &self.visitor
    }

    pub fn visitor_mut(&mut self) -> &mut T {
        &mut self.visitor
    }

    pub fn into_visitor(self) -> T {
        self.visitor
    }

    /// Cached interprocedural results for `callee`.
    pub fn summary(&self, callee: CfgId) -> Option<&SummaryCache<T::Value, T::Data>> {
        self.summaries.get(&callee)
    }

    /// Drop every cached interprocedural result.
    pub fn clear_summaries(&mut self) {
        self.summaries.clear();
    }
}

// -- Entry point ------------------------------------------------------------

impl<'ir, L, T> DataFlowAnalysis<'ir, L, T>
where
    T: OperationVisitor<L>,
{
    /// Analyze the graph `cfg` starting from `initial` data at its entry.
    pub fn analyze(
        &mut self,
        cfg: CfgId,
        initial: T::Data,
    ) -> Result<DataFlowAnalysisResult<T::Value, T::Data>, T::Error> {
        let graph = self
            .program
            .graph(cfg)
            .ok_or(DataflowError::UnknownGraph(cfg))?;
        log::debug!(target: "dataflow", "analyzing {cfg:?} ({:?})", graph.kind());
        let ctx = AnalysisContext::for_root(self.program, graph, self.configuration);
        self.run_fixpoint(&ctx, initial)
    }
}
