use std::hash::Hash;

use flowfix_ir::Operation;

use crate::entity::{AbstractLocation, AnalysisEntity};
use crate::structural::{HashKey, Structural, structural_eq};

/// One argument of an interprocedural call as seen by the caller.
///
/// Arguments are part of the key under which callee results are cached, so
/// they carry a precomputed structural hash. An absent entity hashes to a
/// fixed sentinel; an argument without an entity and one whose entity hashes
/// to that same sentinel compare equal.
#[derive(Clone, Debug)]
pub struct ArgumentInfo<V> {
    operation: Operation,
    entity: Option<AnalysisEntity>,
    location: AbstractLocation,
    value: V,
    key: HashKey,
}

impl<V: Hash> ArgumentInfo<V> {
    pub fn new(
        operation: Operation,
        entity: Option<AnalysisEntity>,
        location: AbstractLocation,
        value: V,
    ) -> Self {
        let key = HashKey::builder()
            .part(&operation)
            .optional(entity.as_ref())
            .part(&location)
            .part(&value)
            .finish();
        Self {
            operation,
            entity,
            location,
            value,
            key,
        }
    }
}

impl<V> ArgumentInfo<V> {
    /// The caller operation producing the argument.
    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn entity(&self) -> Option<&AnalysisEntity> {
        self.entity.as_ref()
    }

    pub fn location(&self) -> AbstractLocation {
        self.location
    }

    pub fn value(&self) -> &V {
        &self.value
    }
}

impl<V> Structural for ArgumentInfo<V> {
    fn structural_key(&self) -> &HashKey {
        &self.key
    }
}

structural_eq!(impl[V] ArgumentInfo<V>);
