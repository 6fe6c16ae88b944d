use std::sync::Arc;

use crate::argument::ArgumentInfo;
use crate::data::{AnalysisData, DataGuard};
use crate::result::DataFlowAnalysisResult;

/// A single cached interprocedural result.
#[derive(Debug, Clone)]
pub struct SummaryEntry<V, D: AnalysisData> {
    /// Arguments the callee was analyzed for.
    pub arguments: Vec<ArgumentInfo<V>>,
    /// Data the callee's entry was seeded with.
    pub seed: DataGuard<D>,
    pub result: Arc<DataFlowAnalysisResult<V, D>>,
}

/// Per-callee cache of interprocedural results, one entry per distinct call
/// context.
///
/// Lookup is a linear scan. Callees typically see a handful of contexts.
/// Only results that do not depend on the call chain they were computed
/// under are cached, see [`DataFlowAnalysisResult::is_truncated`].
#[derive(Debug, Clone)]
pub struct SummaryCache<V, D: AnalysisData> {
    entries: Vec<SummaryEntry<V, D>>,
}

impl<V, D: AnalysisData> Default for SummaryCache<V, D> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<V, D: AnalysisData> SummaryCache<V, D> {
    pub fn push_entry(
        &mut self,
        arguments: Vec<ArgumentInfo<V>>,
        seed: DataGuard<D>,
        result: Arc<DataFlowAnalysisResult<V, D>>,
    ) {
        self.entries.push(SummaryEntry {
            arguments,
            seed,
            result,
        });
    }

    pub fn entries(&self) -> impl Iterator<Item = &SummaryEntry<V, D>> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry computed for equal arguments and equal seed data.
    pub fn lookup(
        &self,
        arguments: &[ArgumentInfo<V>],
        seed: &D,
    ) -> Option<&Arc<DataFlowAnalysisResult<V, D>>> {
        self.entries
            .iter()
            .find(|entry| entry.arguments.as_slice() == arguments && *entry.seed == *seed)
            .map(|entry| &entry.result)
    }
}
