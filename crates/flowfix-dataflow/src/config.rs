/// How calls to other methods are handled.
///
/// Lambdas and local functions are always analyzed context-sensitively
/// regardless of this setting.
#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InterproceduralAnalysisKind {
    /// Never descend into methods.
    None,
    /// Descend, but only keep the callee's return value and reset the
    /// caller's data afterwards.
    ContextInsensitive,
    /// Descend and fold the callee's exit data back into the caller.
    #[default]
    ContextSensitive,
}

/// Knobs for interprocedural analysis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InterproceduralAnalysisConfiguration {
    kind: InterproceduralAnalysisKind,
    max_method_call_chain: u32,
    max_lambda_or_local_function_call_chain: u32,
    pessimistic: bool,
    predicate_analysis: bool,
}

impl InterproceduralAnalysisConfiguration {
    pub const DEFAULT_MAX_METHOD_CALL_CHAIN: u32 = 3;
    pub const DEFAULT_MAX_LAMBDA_OR_LOCAL_FUNCTION_CALL_CHAIN: u32 = 3;
}

#[bon::bon]
impl InterproceduralAnalysisConfiguration {
    #[builder]
    pub fn new(
        kind: Option<InterproceduralAnalysisKind>,
        max_method_call_chain: Option<u32>,
        max_lambda_or_local_function_call_chain: Option<u32>,
        pessimistic: Option<bool>,
        predicate_analysis: Option<bool>,
    ) -> Self {
        Self {
            kind: kind.unwrap_or_default(),
            max_method_call_chain: max_method_call_chain
                .unwrap_or(Self::DEFAULT_MAX_METHOD_CALL_CHAIN),
            max_lambda_or_local_function_call_chain: max_lambda_or_local_function_call_chain
                .unwrap_or(Self::DEFAULT_MAX_LAMBDA_OR_LOCAL_FUNCTION_CALL_CHAIN),
            pessimistic: pessimistic.unwrap_or(true),
            predicate_analysis: predicate_analysis.unwrap_or(true),
        }
    }

    pub fn kind(&self) -> InterproceduralAnalysisKind {
        self.kind
    }

    /// How many methods may be entered interprocedurally below the root.
    pub fn max_method_call_chain(&self) -> u32 {
        self.max_method_call_chain
    }

    /// How many lambdas or local functions may be entered interprocedurally
    /// below the root.
    pub fn max_lambda_or_local_function_call_chain(&self) -> u32 {
        self.max_lambda_or_local_function_call_chain
    }

    /// Reset caller facts that an unanalyzed call may have invalidated.
    pub fn pessimistic(&self) -> bool {
        self.pessimistic
    }

    /// Classify branch conditions and prune infeasible edges.
    pub fn predicate_analysis(&self) -> bool {
        self.predicate_analysis
    }
}

impl Default for InterproceduralAnalysisConfiguration {
    fn default() -> Self {
        Self::builder().build()
    }
}
