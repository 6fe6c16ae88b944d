use flowfix_ir::{CaptureId, CfgId, ControlFlowGraph};

use crate::structural::{HashKey, Structural, structural_eq};

/// A flow capture qualified by the graph that declared it.
///
/// Capture numbers are only unique within one graph. Lambdas and local
/// functions are analyzed inside their parent's analysis, so facts about
/// captures must be keyed by this id to keep them apart. The `is_lvalue`
/// flag does not take part in equality.
#[derive(Clone, Debug)]
pub struct InterproceduralCaptureId {
    capture: CaptureId,
    cfg: CfgId,
    is_lvalue: bool,
    key: HashKey,
}

impl InterproceduralCaptureId {
    pub fn new(capture: CaptureId, cfg: CfgId, is_lvalue: bool) -> Self {
        let key = HashKey::builder().part(&capture).part(&cfg).finish();
        Self {
            capture,
            cfg,
            is_lvalue,
            key,
        }
    }

    /// Qualify `capture` with `graph`, reading the l-value flag from it.
    pub fn in_graph(capture: CaptureId, graph: &ControlFlowGraph) -> Self {
        Self::new(capture, graph.id(), graph.is_lvalue_capture(capture))
    }

    pub fn capture(&self) -> CaptureId {
        self.capture
    }

    pub fn cfg(&self) -> CfgId {
        self.cfg
    }

    pub fn is_lvalue(&self) -> bool {
        self.is_lvalue
    }
}

impl Structural for InterproceduralCaptureId {
    fn structural_key(&self) -> &HashKey {
        &self.key
    }
}

structural_eq!(InterproceduralCaptureId);
