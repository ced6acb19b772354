use std::mem;

use log::{debug, trace};

use crate::error::{Result, SymbolTableError};
use crate::node::{self, InOrder, SearchNode};
use crate::OrderedSymbolTable;

/// Unbalanced binary search tree with subtree sizes.
///
/// Same contract as [`RedBlackBst`](crate::RedBlackBst), but the shape depends
/// on insertion order: sorted input degrades every operation to linear time.
/// Updates walk the tree iteratively so degenerate shapes cannot exhaust the
/// stack. Deletion uses Hibbard's successor replacement.
pub struct Bst<K, V> {
    root: Link<K, V>,
}

type Link<K, V> = Option<Box<Node<K, V>>>;

struct Node<K, V> {
    key: K,
    value: V,
    size: usize,
    left: Link<K, V>,
    right: Link<K, V>,
}

impl<K, V> Node<K, V> {
    fn new(key: K, value: V) -> Self {
        Self {
            key,
            value,
            size: 1,
            left: None,
            right: None,
        }
    }
}

impl<K: Ord, V> SearchNode for Node<K, V> {
    type Key = K;
    type Value = V;

    fn key(&self) -> &K {
        &self.key
    }

    fn value(&self) -> &V {
        &self.value
    }

    fn left(&self) -> Option<&Self> {
        self.left.as_deref()
    }

    fn right(&self) -> Option<&Self> {
        self.right.as_deref()
    }

    fn size(&self) -> usize {
        self.size
    }
}

fn size<K, V>(link: &Link<K, V>) -> usize {
    link.as_ref().map(|n| n.size).unwrap_or(0)
}

impl<K: Ord, V> Bst<K, V> {
    /// Number of nodes on the longest root-to-leaf path.
    pub fn height(&self) -> usize {
        node::height(self.root.as_deref())
    }

    fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let mut cur = self.root.as_deref_mut();
        while let Some(node) = cur {
            cur = match key.cmp(&node.key) {
                std::cmp::Ordering::Less => node.left.as_deref_mut(),
                std::cmp::Ordering::Greater => node.right.as_deref_mut(),
                std::cmp::Ordering::Equal => return Some(&mut node.value),
            };
        }
        None
    }

    /// Detaches the minimum of the subtree rooted at `h`.
    fn take_min(mut h: Box<Node<K, V>>) -> (Link<K, V>, Box<Node<K, V>>) {
        if h.left.is_none() {
            let right = h.right.take();
            return (right, h);
        }
        h.size -= 1;
        let mut link = &mut h.left;
        while link.as_ref().is_some_and(|n| n.left.is_some()) {
            let Some(node) = link.as_deref_mut() else {
                unreachable!("loop condition checked the link");
            };
            node.size -= 1;
            link = &mut node.left;
        }
        let Some(mut min) = link.take() else {
            unreachable!("left spine is non-empty");
        };
        *link = min.right.take();
        (Some(h), min)
    }

    /// Detaches the maximum of the subtree rooted at `h`.
    fn take_max(mut h: Box<Node<K, V>>) -> (Link<K, V>, Box<Node<K, V>>) {
        if h.right.is_none() {
            let left = h.left.take();
            return (left, h);
        }
        h.size -= 1;
        let mut link = &mut h.right;
        while link.as_ref().is_some_and(|n| n.right.is_some()) {
            let Some(node) = link.as_deref_mut() else {
                unreachable!("loop condition checked the link");
            };
            node.size -= 1;
            link = &mut node.right;
        }
        let Some(mut max) = link.take() else {
            unreachable!("right spine is non-empty");
        };
        *link = max.left.take();
        (Some(h), max)
    }
}

impl<K, V> Default for Bst<K, V> {
    fn default() -> Self {
        Self { root: None }
    }
}

impl<K, V> Drop for Bst<K, V> {
    fn drop(&mut self) {
        let mut stack: Vec<Box<Node<K, V>>> = self.root.take().into_iter().collect();
        while let Some(mut node) = stack.pop() {
            stack.extend(node.left.take());
            stack.extend(node.right.take());
        }
    }
}

impl<K: Ord, V> OrderedSymbolTable for Bst<K, V> {
    type Key = K;
    type Value = V;

    fn new() -> Self {
        Self::default()
    }

    fn len(&self) -> usize {
        size(&self.root)
    }

    fn get(&self, key: &K) -> Option<&V> {
        node::find(self.root.as_deref(), key).map(|n| &n.value)
    }

    fn put(&mut self, key: K, value: V) -> Option<V> {
        if let Some(slot) = self.get_mut(&key) {
            return Some(mem::replace(slot, value));
        }
        let mut link = &mut self.root;
        while let Some(node) = link {
            node.size += 1;
            link = if key < node.key {
                &mut node.left
            } else {
                &mut node.right
            };
        }
        *link = Some(Box::new(Node::new(key, value)));
        trace!("bst put inserted a new key, len {}", self.len());
        None
    }

    fn delete(&mut self, key: &K) -> Option<V> {
        if !self.contains_key(key) {
            trace!("bst delete of an absent key ignored");
            return None;
        }
        let mut link = &mut self.root;
        while link.as_ref().is_some_and(|n| n.key != *key) {
            let Some(node) = link.as_deref_mut() else {
                unreachable!("loop condition checked the link");
            };
            node.size -= 1;
            link = if *key < node.key {
                &mut node.left
            } else {
                &mut node.right
            };
        }
        let mut target = link.take()?;
        *link = match (target.left.take(), target.right.take()) {
            (None, child) | (child, None) => child,
            (Some(left), Some(right)) => {
                let (right, mut successor) = Self::take_min(right);
                successor.left = Some(left);
                successor.right = right;
                successor.size = target.size - 1;
                Some(successor)
            }
        };
        trace!("bst delete removed a key, len {}", self.len());
        Some(target.value)
    }

    fn delete_min(&mut self) -> Result<(K, V)> {
        let Some(root) = self.root.take() else {
            debug!("delete_min on an empty bst");
            return Err(SymbolTableError::EmptyTree);
        };
        let (root, min) = Self::take_min(root);
        self.root = root;
        trace!("bst delete_min removed a key, len {}", self.len());
        let Node { key, value, .. } = *min;
        Ok((key, value))
    }

    fn delete_max(&mut self) -> Result<(K, V)> {
        let Some(root) = self.root.take() else {
            debug!("delete_max on an empty bst");
            return Err(SymbolTableError::EmptyTree);
        };
        let (root, max) = Self::take_max(root);
        self.root = root;
        trace!("bst delete_max removed a key, len {}", self.len());
        let Node { key, value, .. } = *max;
        Ok((key, value))
    }

    fn min(&self) -> Result<&K> {
        node::first(self.root.as_deref())
            .map(|n| &n.key)
            .ok_or(SymbolTableError::EmptyTree)
    }

    fn max(&self) -> Result<&K> {
        node::last(self.root.as_deref())
            .map(|n| &n.key)
            .ok_or(SymbolTableError::EmptyTree)
    }

    fn floor(&self, key: &K) -> Option<&K> {
        node::floor(self.root.as_deref(), key).map(|n| &n.key)
    }

    fn ceiling(&self, key: &K) -> Option<&K> {
        node::ceiling(self.root.as_deref(), key).map(|n| &n.key)
    }

    fn rank(&self, key: &K) -> usize {
        node::rank(self.root.as_deref(), key)
    }

    fn select(&self, rank: usize) -> Result<&K> {
        let len = self.len();
        let err = SymbolTableError::InvalidArgument { rank, len };
        if rank >= len {
            debug!("bst select({rank}) out of range for {len} keys");
            return Err(err);
        }
        node::select(self.root.as_deref(), rank)
            .map(|n| &n.key)
            .ok_or(err)
    }

    fn keys(&self) -> impl Iterator<Item = &K> {
        InOrder::new(self.root.as_deref()).map(|n| &n.key)
    }

    fn range_keys<'a>(&'a self, lo: &'a K, hi: &'a K) -> impl Iterator<Item = &'a K> {
        InOrder::range(self.root.as_deref(), lo, hi).map(|n| &n.key)
    }
}
