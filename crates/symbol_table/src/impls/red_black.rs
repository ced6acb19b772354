use std::cmp::Ordering;
use std::fmt;
use std::mem;

use log::{debug, trace};

use crate::error::{InvariantViolation, Result, SymbolTableError};
use crate::node::{self, InOrder, SearchNode};
use crate::OrderedSymbolTable;

/// Ordered symbol table backed by a left-leaning red-black tree.
///
/// Every red link leans left and joins two nodes of a 2-3 tree 3-node, so the
/// tree is a 1-1 encoding of a 2-3 tree and its height never exceeds
/// `2 * log2(n + 1)`. Search, insertion, deletion and the order-statistic
/// queries are all logarithmic in the worst case.
///
/// The table has no interior mutability and no internal synchronization.
/// Mutations take `&mut self`, so a writer always has exclusive access; sharing
/// a table between threads requires an external lock around every call.
#[derive(Clone)]
pub struct RedBlackBst<K, V> {
    root: Link<K, V>,
}

type Link<K, V> = Option<Box<Node<K, V>>>;

/// Color of the link from a node's parent down to the node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Color {
    Red,
    Black,
}

impl Color {
    fn flipped(self) -> Self {
        match self {
            Color::Red => Color::Black,
            Color::Black => Color::Red,
        }
    }
}

#[derive(Clone)]
struct Node<K, V> {
    key: K,
    value: V,
    color: Color,
    size: usize,
    left: Link<K, V>,
    right: Link<K, V>,
}

impl<K, V> Node<K, V> {
    fn new(key: K, value: V) -> Self {
        Self {
            key,
            value,
            color: Color::Red,
            size: 1,
            left: None,
            right: None,
        }
    }

    fn is_red(&self) -> bool {
        self.color == Color::Red
    }

    fn update_size(&mut self) {
        self.size = 1 + size(&self.left) + size(&self.right);
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

fn is_red<K, V>(link: &Link<K, V>) -> bool {
    link.as_ref().is_some_and(|n| n.is_red())
}

fn size<K, V>(link: &Link<K, V>) -> usize {
    link.as_ref().map(|n| n.size).unwrap_or(0)
}

/// Shape summary returned by [`RedBlackBst::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeStats {
    pub len: usize,
    /// Nodes on the longest root-to-leaf path.
    pub height: usize,
    /// Black links on every root-to-leaf path.
    pub black_height: usize,
}

impl<K: Ord, V> RedBlackBst<K, V> {
    fn is_left_left_red(h: &Node<K, V>) -> bool {
        h.left.as_ref().is_some_and(|l| is_red(&l.left))
    }

    fn is_right_left_red(h: &Node<K, V>) -> bool {
        h.right.as_ref().is_some_and(|r| is_red(&r.left))
    }

    fn rotate_left(mut h: Box<Node<K, V>>) -> Box<Node<K, V>> {
        debug_assert!(is_red(&h.right), "rotate_left requires a red right link");
        let Some(mut x) = h.right.take() else {
            return h;
        };
        h.right = x.left.take();
        x.color = h.color;
        h.color = Color::Red;
        x.size = h.size;
        h.update_size();
        x.left = Some(h);
        x
    }

    fn rotate_right(mut h: Box<Node<K, V>>) -> Box<Node<K, V>> {
        debug_assert!(is_red(&h.left), "rotate_right requires a red left link");
        let Some(mut x) = h.left.take() else {
            return h;
        };
        h.left = x.right.take();
        x.color = h.color;
        h.color = Color::Red;
        x.size = h.size;
        h.update_size();
        x.right = Some(h);
        x
    }

    /// Splits a temporary 4-node on insertion, combines siblings on deletion.
    fn flip_colors(h: &mut Node<K, V>) {
        debug_assert!(h.left.is_some() && h.right.is_some());
        debug_assert!(h.left.as_ref().map(|l| l.color) == h.right.as_ref().map(|r| r.color));
        h.color = h.color.flipped();
        if let Some(left) = h.left.as_deref_mut() {
            left.color = left.color.flipped();
        }
        if let Some(right) = h.right.as_deref_mut() {
            right.color = right.color.flipped();
        }
    }

    /// Restores the left-leaning invariants at `h` on the way back up.
    fn balance(mut h: Box<Node<K, V>>) -> Box<Node<K, V>> {
        if is_red(&h.right) && !is_red(&h.left) {
            h = Self::rotate_left(h);
        }
        if is_red(&h.left) && Self::is_left_left_red(&h) {
            h = Self::rotate_right(h);
        }
        if is_red(&h.left) && is_red(&h.right) {
            Self::flip_colors(&mut h);
        }
        h.update_size();
        h
    }

    /// Makes `h.left` or one of its children red, borrowing from the right
    /// sibling when it is a 3-node.
    fn move_red_left(mut h: Box<Node<K, V>>) -> Box<Node<K, V>> {
        Self::flip_colors(&mut h);
        if Self::is_right_left_red(&h) {
            h.right = h.right.take().map(Self::rotate_right);
            h = Self::rotate_left(h);
            Self::flip_colors(&mut h);
        }
        h
    }

    /// Makes `h.right` or one of its children red, borrowing from the left
    /// sibling when it is a 3-node.
    fn move_red_right(mut h: Box<Node<K, V>>) -> Box<Node<K, V>> {
        Self::flip_colors(&mut h);
        if Self::is_left_left_red(&h) {
            h = Self::rotate_right(h);
            Self::flip_colors(&mut h);
        }
        h
    }

    fn put_node(h: Link<K, V>, key: K, value: V) -> (Box<Node<K, V>>, Option<V>) {
        let Some(mut h) = h else {
            return (Box::new(Node::new(key, value)), None);
        };

        let old = match key.cmp(&h.key) {
            Ordering::Less => {
                let (left, old) = Self::put_node(h.left.take(), key, value);
                h.left = Some(left);
                old
            }
            Ordering::Greater => {
                let (right, old) = Self::put_node(h.right.take(), key, value);
                h.right = Some(right);
                old
            }
            Ordering::Equal => Some(mem::replace(&mut h.value, value)),
        };

        (Self::balance(h), old)
    }

    /// Unlinks the minimum of the subtree, returning the new subtree and the
    /// detached node.
    fn delete_min_node(mut h: Box<Node<K, V>>) -> (Link<K, V>, Box<Node<K, V>>) {
        if h.left.is_none() {
            let right = h.right.take();
            return (right, h);
        }
        if !is_red(&h.left) && !Self::is_left_left_red(&h) {
            h = Self::move_red_left(h);
        }
        let Some(left) = h.left.take() else {
            unreachable!("move_red_left keeps the left subtree");
        };
        let (left, min) = Self::delete_min_node(left);
        h.left = left;
        (Some(Self::balance(h)), min)
    }

    fn delete_max_node(mut h: Box<Node<K, V>>) -> (Link<K, V>, Box<Node<K, V>>) {
        if is_red(&h.left) {
            h = Self::rotate_right(h);
        }
        if h.right.is_none() {
            let left = h.left.take();
            return (left, h);
        }
        if !is_red(&h.right) && !Self::is_right_left_red(&h) {
            h = Self::move_red_right(h);
        }
        let Some(right) = h.right.take() else {
            unreachable!("move_red_right keeps the right subtree");
        };
        let (right, max) = Self::delete_max_node(right);
        h.right = right;
        (Some(Self::balance(h)), max)
    }

    /// Removes `key`, which must be present in the subtree rooted at `h`.
    fn delete_node(mut h: Box<Node<K, V>>, key: &K) -> (Link<K, V>, V) {
        debug_assert!(node::find(Some(&*h), key).is_some());
        let removed = if *key < h.key {
            if h.left.is_none() {
                unreachable!("delete_node called for an absent key");
            }
            if !is_red(&h.left) && !Self::is_left_left_red(&h) {
                h = Self::move_red_left(h);
            }
            let Some(left) = h.left.take() else {
                unreachable!("move_red_left keeps the left subtree");
            };
            let (left, removed) = Self::delete_node(left, key);
            h.left = left;
            removed
        } else {
            if is_red(&h.left) {
                h = Self::rotate_right(h);
            }
            if h.right.is_none() {
                if *key != h.key {
                    unreachable!("delete_node called for an absent key");
                }
                debug_assert!(h.left.is_none());
                return (None, h.value);
            }
            if !is_red(&h.right) && !Self::is_right_left_red(&h) {
                h = Self::move_red_right(h);
            }
            let Some(right) = h.right.take() else {
                unreachable!("move_red_right keeps the right subtree");
            };
            if *key == h.key {
                let (right, successor) = Self::delete_min_node(right);
                h.right = right;
                let Node {
                    key: successor_key,
                    value: successor_value,
                    ..
                } = *successor;
                h.key = successor_key;
                mem::replace(&mut h.value, successor_value)
            } else {
                let (right, removed) = Self::delete_node(right, key);
                h.right = right;
                removed
            }
        };

        (Some(Self::balance(h)), removed)
    }

    /// Colors the root red when both its children are black, so deletion never
    /// starts its descent at a 2-node.
    fn prepare_root_for_delete(root: &mut Node<K, V>) {
        if !is_red(&root.left) && !is_red(&root.right) {
            root.color = Color::Red;
        }
    }

    fn blacken_root(&mut self) {
        if let Some(root) = self.root.as_deref_mut() {
            root.color = Color::Black;
        }
    }

    /// Number of nodes on the longest root-to-leaf path.
    pub fn height(&self) -> usize {
        node::height(self.root.as_deref())
    }

    /// Entries in ascending key order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: InOrder::new(self.root.as_deref()),
        }
    }

    /// Values in ascending key order.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        InOrder::new(self.root.as_deref()).map(|n| n.value())
    }

    /// Checks every structural invariant of the tree.
    ///
    /// Verifies key order, that red links lean left and never appear twice in
    /// a row, perfect black balance, stored subtree sizes, a black root and
    /// the `2 * log2(n + 1)` height bound.
    pub fn validate(&self) -> std::result::Result<TreeStats, InvariantViolation> {
        let result = self.check_shape();
        if let Err(violation) = &result {
            debug!("red-black tree failed validation: {violation}");
        }
        result
    }

    fn check_shape(&self) -> std::result::Result<TreeStats, InvariantViolation> {
        if is_red(&self.root) {
            return Err(InvariantViolation::RedRoot);
        }
        let mut walk = ShapeWalk {
            prev: None,
            position: 0,
        };
        let (black_height, height) = walk.visit(self.root.as_deref())?;
        let len = self.len();
        if height > 2 * (len + 1).ilog2() as usize {
            return Err(InvariantViolation::TooTall { height, len });
        }
        Ok(TreeStats {
            len,
            height,
            black_height,
        })
    }
}

/// In-order walk collecting black height and height while checking invariants.
struct ShapeWalk<'a, K> {
    prev: Option<&'a K>,
    position: usize,
}

impl<'a, K: Ord> ShapeWalk<'a, K> {
    fn visit<V>(
        &mut self,
        node: Option<&'a Node<K, V>>,
    ) -> std::result::Result<(usize, usize), InvariantViolation> {
        let Some(node) = node else {
            return Ok((0, 0));
        };

        let (left_black, left_height) = self.visit(node.left.as_deref())?;

        let position = self.position;
        if self.prev.is_some_and(|prev| *prev >= node.key) {
            return Err(InvariantViolation::Unordered { position });
        }
        self.prev = Some(&node.key);
        self.position += 1;

        if is_red(&node.right) {
            return Err(InvariantViolation::RightLeaningRed { position });
        }
        if node.is_red() && is_red(&node.left) {
            return Err(InvariantViolation::ConsecutiveReds { position });
        }

        let (right_black, right_height) = self.visit(node.right.as_deref())?;
        if left_black != right_black {
            return Err(InvariantViolation::UnbalancedBlacks {
                position,
                left: left_black,
                right: right_black,
            });
        }
        let actual = 1 + size(&node.left) + size(&node.right);
        if node.size != actual {
            return Err(InvariantViolation::SizeMismatch {
                position,
                stored: node.size,
                actual,
            });
        }

        let black = left_black + usize::from(!node.is_red());
        Ok((black, 1 + left_height.max(right_height)))
    }
}

impl<K, V> Default for RedBlackBst<K, V> {
    fn default() -> Self {
        Self { root: None }
    }
}

impl<K: Ord, V> OrderedSymbolTable for RedBlackBst<K, V> {
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
        let (root, old) = Self::put_node(self.root.take(), key, value);
        self.root = Some(root);
        self.blacken_root();
        if old.is_some() {
            trace!("put overwrote an existing key, len {}", self.len());
        } else {
            trace!("put inserted a new key, len {}", self.len());
        }
        old
    }

    fn delete(&mut self, key: &K) -> Option<V> {
        if !self.contains_key(key) {
            trace!("delete of an absent key ignored");
            return None;
        }
        let mut root = self.root.take()?;
        Self::prepare_root_for_delete(&mut root);
        let (root, removed) = Self::delete_node(root, key);
        self.root = root;
        self.blacken_root();
        trace!("delete removed a key, len {}", self.len());
        Some(removed)
    }

    fn delete_min(&mut self) -> Result<(K, V)> {
        let Some(mut root) = self.root.take() else {
            debug!("delete_min on an empty table");
            return Err(SymbolTableError::EmptyTree);
        };
        Self::prepare_root_for_delete(&mut root);
        let (root, min) = Self::delete_min_node(root);
        self.root = root;
        self.blacken_root();
        trace!("delete_min removed a key, len {}", self.len());
        let Node { key, value, .. } = *min;
        Ok((key, value))
    }

    fn delete_max(&mut self) -> Result<(K, V)> {
        let Some(mut root) = self.root.take() else {
            debug!("delete_max on an empty table");
            return Err(SymbolTableError::EmptyTree);
        };
        Self::prepare_root_for_delete(&mut root);
        let (root, max) = Self::delete_max_node(root);
        self.root = root;
        self.blacken_root();
        trace!("delete_max removed a key, len {}", self.len());
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
            debug!("select({rank}) out of range for {len} keys");
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

impl<K: Ord, V> FromIterator<(K, V)> for RedBlackBst<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut st = Self::new();
        st.extend(iter);
        st
    }
}

impl<K: Ord, V> Extend<(K, V)> for RedBlackBst<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.put(key, value);
        }
    }
}

/// Borrowing iterator over the entries of a [`RedBlackBst`] in key order.
pub struct Iter<'a, K: Ord, V> {
    inner: InOrder<'a, Node<K, V>>,
}

impl<'a, K: Ord, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|n| (&n.key, &n.value))
    }
}

impl<'a, K: Ord, V> IntoIterator for &'a RedBlackBst<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: Ord + fmt::Debug, V: fmt::Debug> fmt::Debug for RedBlackBst<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
