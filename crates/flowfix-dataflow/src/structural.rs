//! Structural equality derived from a precomputed list of hash parts.
//!
//! Small value types that are used as map keys throughout an analysis
//! compute their [`HashKey`] once at construction; equality and hashing then
//! compare those parts instead of walking the payload again.

use std::hash::{Hash, Hasher};

use rustc_hash::FxHasher;
use smallvec::SmallVec;

/// Part substituted for an absent optional field.
pub(crate) const ABSENT_PART: u64 = 0x9e37_79b9_7f4a_7c15;

/// Ordered hash parts identifying a value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct HashKey(SmallVec<[u64; 4]>);

impl HashKey {
    pub fn builder() -> HashKeyBuilder {
        HashKeyBuilder(SmallVec::new())
    }

    pub fn parts(&self) -> &[u64] {
        &self.0
    }
}

#[derive(Debug)]
pub struct HashKeyBuilder(SmallVec<[u64; 4]>);

impl HashKeyBuilder {
    pub fn part<T: Hash + ?Sized>(mut self, value: &T) -> Self {
        self.0.push(hash_part(value));
        self
    }

    /// Add an optional part; `None` contributes a fixed sentinel.
    pub fn optional<T: Hash>(mut self, value: Option<&T>) -> Self {
        self.0.push(value.map_or(ABSENT_PART, hash_part));
        self
    }

    pub fn finish(self) -> HashKey {
        HashKey(self.0)
    }
}

fn hash_part<T: Hash + ?Sized>(value: &T) -> u64 {
    let mut hasher = FxHasher::default();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Types with a precomputed [`HashKey`].
pub(crate) trait Structural {
    fn structural_key(&self) -> &HashKey;
}

/// Implement `PartialEq`, `Eq` and `Hash` through [`Structural::structural_key`].
macro_rules! structural_eq {
    (impl[$($generics:tt)*] $ty:ty) => {
        impl<$($generics)*> PartialEq for $ty {
            fn eq(&self, other: &Self) -> bool {
                use $crate::structural::Structural;
                self.structural_key() == other.structural_key()
            }
        }

        impl<$($generics)*> Eq for $ty {}

        impl<$($generics)*> std::hash::Hash for $ty {
            fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
                use $crate::structural::Structural;
                self.structural_key().hash(state);
            }
        }
    };
    ($ty:ty) => {
        structural_eq!(impl[] $ty);
    };
}

pub(crate) use structural_eq;
