mod error;
mod node;

pub mod impls;

pub use error::{InvariantViolation, Result, SymbolTableError};
pub use impls::{Bst, RedBlackBst, StdBTreeMap, TreeStats};

/// Ordered symbol table interface.
///
/// - Keys are unique and totally ordered.
/// - `put` overwrites the existing value and returns the old one.
/// - `delete` of an absent key is a no-op returning `None`.
/// - `rank(key)` counts keys strictly less than `key`, present or not.
/// - `select(k)` is 0-indexed: `select(rank(key)) == key` for every stored key.
/// - Range operations cover the closed interval `[lo, hi]` and are empty when
///   `lo > hi`.
pub trait OrderedSymbolTable {
    type Key: Ord;
    type Value;

    fn new() -> Self;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get(&self, key: &Self::Key) -> Option<&Self::Value>;

    fn contains_key(&self, key: &Self::Key) -> bool {
        self.get(key).is_some()
    }

    fn put(&mut self, key: Self::Key, value: Self::Value) -> Option<Self::Value>;

    fn delete(&mut self, key: &Self::Key) -> Option<Self::Value>;

    fn delete_min(&mut self) -> Result<(Self::Key, Self::Value)>;

    fn delete_max(&mut self) -> Result<(Self::Key, Self::Value)>;

    fn min(&self) -> Result<&Self::Key>;

    fn max(&self) -> Result<&Self::Key>;

    /// Largest key `<= key`.
    fn floor(&self, key: &Self::Key) -> Option<&Self::Key>;

    /// Smallest key `>= key`.
    fn ceiling(&self, key: &Self::Key) -> Option<&Self::Key>;

    fn rank(&self, key: &Self::Key) -> usize;

    fn select(&self, rank: usize) -> Result<&Self::Key>;

    /// Number of keys in `[lo, hi]`.
    fn range_len(&self, lo: &Self::Key, hi: &Self::Key) -> usize {
        if lo > hi {
            return 0;
        }
        let upper = self.rank(hi) + usize::from(self.contains_key(hi));
        upper - self.rank(lo)
    }

    /// All keys in ascending order.
    fn keys(&self) -> impl Iterator<Item = &Self::Key>;

    /// Keys in `[lo, hi]` in ascending order.
    fn range_keys<'a>(
        &'a self,
        lo: &'a Self::Key,
        hi: &'a Self::Key,
    ) -> impl Iterator<Item = &'a Self::Key>;
}

#[cfg(test)]
pub(crate) fn init_test_logging() {
    let _ = simplelog::TestLogger::init(simplelog::LevelFilter::Debug, simplelog::Config::default());
}
