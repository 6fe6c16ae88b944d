use crate::data::AnalysisData;

/// Strategy for when to widen at loop headers during fixpoint iteration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WideningStrategy {
    /// Widen every time a loop header is revisited.
    AllJoins,
    /// Only merge, never widen. Suitable for finite-height domains that
    /// guarantee termination without widening.
    #[default]
    Never,
    /// Merge for the first `n` revisits of each loop header, then widen.
    Delayed(usize),
}

impl WideningStrategy {
    /// Widen the previous input of a loop header towards its freshly merged
    /// input. `None` means the merged input is used as is.
    ///
    /// `visit_count` is the number of times the header has already been
    /// visited.
    pub fn apply<D: AnalysisData>(
        &self,
        previous: Option<&D>,
        merged: &D,
        visit_count: usize,
    ) -> Option<D> {
        let previous = previous?;
        match self {
            Self::AllJoins => Some(previous.widen(merged)),
            Self::Never => None,
            Self::Delayed(n) if visit_count <= *n => None,
            Self::Delayed(_) => Some(previous.widen(merged)),
        }
    }
}
