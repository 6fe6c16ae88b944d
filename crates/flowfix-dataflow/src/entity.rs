use flowfix_ir::{Operation, Symbol};
use smallvec::SmallVec;

use crate::capture::InterproceduralCaptureId;
use crate::index::AbstractIndex;

/// Abstract memory location an entity may refer to.
#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AbstractLocation {
    #[default]
    NoLocation,
    Null,
    /// Allocated by the given operation.
    Creation(Operation),
    /// Storage owned by a parameter or local.
    Symbol(Symbol),
    ThisOrMe,
}

impl AbstractLocation {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

/// What an [`AnalysisEntity`] is rooted at.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub enum EntityRoot {
    Symbol(Symbol),
    Capture(InterproceduralCaptureId),
    ThisOrMe,
    Location(AbstractLocation),
}

/// A trackable storage location: a root optionally followed by indices.
///
/// Entities are the keys of analysis data maps. Two entities are equal iff
/// they have the same root and the same index path.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct AnalysisEntity {
    root: EntityRoot,
    indices: SmallVec<[AbstractIndex; 2]>,
}

impl AnalysisEntity {
    pub fn new(root: EntityRoot) -> Self {
        Self {
            root,
            indices: SmallVec::new(),
        }
    }

    pub fn for_symbol(symbol: Symbol) -> Self {
        Self::new(EntityRoot::Symbol(symbol))
    }

    pub fn for_capture(capture: InterproceduralCaptureId) -> Self {
        Self::new(EntityRoot::Capture(capture))
    }

    pub fn this_or_me() -> Self {
        Self::new(EntityRoot::ThisOrMe)
    }

    pub fn for_location(location: AbstractLocation) -> Self {
        Self::new(EntityRoot::Location(location))
    }

    /// The entity for an element of `self` at `index`.
    pub fn with_index(mut self, index: impl Into<AbstractIndex>) -> Self {
        self.indices.push(index.into());
        self
    }

    pub fn root(&self) -> &EntityRoot {
        &self.root
    }

    pub fn indices(&self) -> &[AbstractIndex] {
        &self.indices
    }

    pub fn symbol(&self) -> Option<Symbol> {
        match self.root {
            EntityRoot::Symbol(symbol) => Some(symbol),
            _ => None,
        }
    }

    pub fn is_capture(&self) -> bool {
        matches!(self.root, EntityRoot::Capture(_))
    }

    /// True when the entity names an element rather than a whole root.
    pub fn is_indexed(&self) -> bool {
        !self.indices.is_empty()
    }

    /// The entity without its last index, if any.
    pub fn parent(&self) -> Option<Self> {
        let (_, rest) = self.indices.split_last()?;
        Some(Self {
            root: self.root.clone(),
            indices: rest.iter().cloned().collect(),
        })
    }
}
