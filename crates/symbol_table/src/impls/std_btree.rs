use std::collections::BTreeMap;
use std::ops::Bound;

use crate::OrderedSymbolTable;
use crate::error::{Result, SymbolTableError};

/// Baseline backed by `std::collections::BTreeMap`.
///
/// `BTreeMap` keeps no subtree sizes, so `rank` and `select` walk the map and
/// are linear.
pub struct StdBTreeMap<K: Ord, V> {
    inner: BTreeMap<K, V>,
}

impl<K: Ord, V> OrderedSymbolTable for StdBTreeMap<K, V> {
    type Key = K;
    type Value = V;

    fn new() -> Self {
        Self {
            inner: BTreeMap::new(),
        }
    }

    fn len(&self) -> usize {
        self.inner.len()
    }

    fn get(&self, key: &K) -> Option<&V> {
        self.inner.get(key)
    }

    fn put(&mut self, key: K, value: V) -> Option<V> {
        self.inner.insert(key, value)
    }

    fn delete(&mut self, key: &K) -> Option<V> {
        self.inner.remove(key)
    }

    fn delete_min(&mut self) -> Result<(K, V)> {
        self.inner.pop_first().ok_or(SymbolTableError::EmptyTree)
    }

    fn delete_max(&mut self) -> Result<(K, V)> {
        self.inner.pop_last().ok_or(SymbolTableError::EmptyTree)
    }

    fn min(&self) -> Result<&K> {
        self.inner.keys().next().ok_or(SymbolTableError::EmptyTree)
    }

    fn max(&self) -> Result<&K> {
        self.inner.keys().next_back().ok_or(SymbolTableError::EmptyTree)
    }

    fn floor(&self, key: &K) -> Option<&K> {
        self.inner
            .range((Bound::Unbounded, Bound::Included(key)))
            .next_back()
            .map(|(k, _)| k)
    }

    fn ceiling(&self, key: &K) -> Option<&K> {
        self.inner
            .range((Bound::Included(key), Bound::Unbounded))
            .next()
            .map(|(k, _)| k)
    }

    fn rank(&self, key: &K) -> usize {
        self.inner
            .range((Bound::Unbounded, Bound::Excluded(key)))
            .count()
    }

    fn select(&self, rank: usize) -> Result<&K> {
        let len = self.len();
        self.inner
            .keys()
            .nth(rank)
            .ok_or(SymbolTableError::InvalidArgument { rank, len })
    }

    fn range_len(&self, lo: &K, hi: &K) -> usize {
        self.range_keys(lo, hi).count()
    }

    fn keys(&self) -> impl Iterator<Item = &K> {
        self.inner.keys()
    }

    fn range_keys<'a>(&'a self, lo: &'a K, hi: &'a K) -> impl Iterator<Item = &'a K> {
        // `BTreeMap::range` panics on an inverted range.
        (lo <= hi)
            .then(|| self.inner.range((Bound::Included(lo), Bound::Included(hi))))
            .into_iter()
            .flatten()
            .map(|(k, _)| k)
    }
}
