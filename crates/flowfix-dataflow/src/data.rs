use std::fmt::Debug;
use std::hash::Hash;
use std::ops::{Deref, DerefMut};

use rustc_hash::FxHashMap;

use crate::domain::ValueDomain;

/// The per-program-point state of an analysis.
///
/// Blocks that were never reached carry no data at all (`None` in the
/// engine), so implementations do not need a separate bottom element.
pub trait AnalysisData: Clone + PartialEq + Debug {
    /// Least upper bound. Must be monotone: both inputs are `is_subseteq` the
    /// result.
    fn merge(&self, other: &Self) -> Self;

    fn is_subseteq(&self, other: &Self) -> bool;

    /// Loop-header extrapolation, see [`WideningStrategy`](crate::WideningStrategy).
    fn widen(&self, next: &Self) -> Self {
        self.merge(next)
    }

    /// Release any non-memory resources held by this data. Called at most once
    /// per [`DataGuard`].
    fn release(&mut self) {}
}

/// Merge two data and check monotonicity in debug builds.
pub(crate) fn merge_checked<D: AnalysisData>(left: &D, right: &D) -> D {
    let merged = left.merge(right);
    debug_assert!(
        left.is_subseteq(&merged) && right.is_subseteq(&merged),
        "non-monotone merge: {left:?} merged with {right:?} gave {merged:?}"
    );
    merged
}

/// Scoped owner of analysis data.
///
/// Every instance the engine creates (edge data, merge results, block
/// inputs, callee seeds, result payloads) lives in a guard so its
/// [`release`](AnalysisData::release) hook runs exactly once on every exit
/// path. Disposing twice is a no-op. Cloning yields a new, live guard.
#[derive(Debug)]
pub struct DataGuard<D: AnalysisData> {
    data: D,
    disposed: bool,
}

impl<D: AnalysisData> DataGuard<D> {
    pub fn new(data: D) -> Self {
        Self {
            data,
            disposed: false,
        }
    }

    pub fn dispose(&mut self) {
        if !self.disposed {
            self.data.release();
            self.disposed = true;
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

impl<D: AnalysisData> Clone for DataGuard<D> {
    fn clone(&self) -> Self {
        Self::new((**self).clone())
    }
}

impl<D: AnalysisData> PartialEq for DataGuard<D> {
    fn eq(&self, other: &Self) -> bool {
        **self == **other
    }
}

impl<D: AnalysisData> Deref for DataGuard<D> {
    type Target = D;

    fn deref(&self) -> &D {
        debug_assert!(!self.disposed, "analysis data used after dispose");
        &self.data
    }
}

impl<D: AnalysisData> DerefMut for DataGuard<D> {
    fn deref_mut(&mut self) -> &mut D {
        debug_assert!(!self.disposed, "analysis data used after dispose");
        &mut self.data
    }
}

impl<D: AnalysisData> Drop for DataGuard<D> {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Map-shaped analysis data from keys to domain values.
///
/// A key without an entry holds [`ValueDomain::unknown_or_may_be`], so
/// merging keeps only keys present on both sides.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MapAnalysisData<K: Eq + Hash, V> {
    entries: FxHashMap<K, V>,
}

impl<K: Eq + Hash, V> Default for MapAnalysisData<K, V> {
    fn default() -> Self {
        Self {
            entries: FxHashMap::default(),
        }
    }
}

impl<K, V> MapAnalysisData<K, V>
where
    K: Clone + Eq + Hash + Debug,
    V: ValueDomain,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.get(key)
    }

    pub fn value_or_unknown(&self, key: &K) -> V {
        self.entries
            .get(key)
            .cloned()
            .unwrap_or_else(V::unknown_or_may_be)
    }

    pub fn set(&mut self, key: K, value: V) -> Option<V> {
        self.entries.insert(key, value)
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.entries.remove(key)
    }

    /// Forget every fact, leaving all keys unknown.
    pub fn reset(&mut self) {
        self.entries.clear();
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn combine(&self, other: &Self, f: impl Fn(&V, &V) -> V) -> Self {
        let entries = self
            .entries
            .iter()
            .filter_map(|(key, left)| {
                let right = other.entries.get(key)?;
                Some((key.clone(), f(left, right)))
            })
            .collect();
        Self { entries }
    }
}

impl<K, V> FromIterator<(K, V)> for MapAnalysisData<K, V>
where
    K: Eq + Hash,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<K, V> AnalysisData for MapAnalysisData<K, V>
where
    K: Clone + Eq + Hash + Debug,
    V: ValueDomain,
{
    fn merge(&self, other: &Self) -> Self {
        self.combine(other, V::merge)
    }

    fn is_subseteq(&self, other: &Self) -> bool {
        other.entries.iter().all(|(key, right)| {
            self.entries
                .get(key)
                .is_some_and(|left| left.is_subseteq(right))
        })
    }

    fn widen(&self, next: &Self) -> Self {
        self.combine(next, V::widen)
    }
}
