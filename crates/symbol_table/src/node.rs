use std::cmp::Ordering;

/// Read-only view of a size-augmented binary search tree node.
pub(crate) trait SearchNode {
    type Key: Ord;
    type Value;

    fn key(&self) -> &Self::Key;
    fn value(&self) -> &Self::Value;
    fn left(&self) -> Option<&Self>;
    fn right(&self) -> Option<&Self>;

    /// Number of nodes in the subtree rooted here.
    fn size(&self) -> usize;
}

pub(crate) fn size<N: SearchNode>(node: Option<&N>) -> usize {
    node.map(N::size).unwrap_or(0)
}

pub(crate) fn find<'a, N: SearchNode>(mut cur: Option<&'a N>, key: &N::Key) -> Option<&'a N> {
    while let Some(node) = cur {
        match key.cmp(node.key()) {
            Ordering::Less => cur = node.left(),
            Ordering::Greater => cur = node.right(),
            Ordering::Equal => return Some(node),
        }
    }
    None
}

pub(crate) fn first<N: SearchNode>(root: Option<&N>) -> Option<&N> {
    let mut node = root?;
    while let Some(left) = node.left() {
        node = left;
    }
    Some(node)
}

pub(crate) fn last<N: SearchNode>(root: Option<&N>) -> Option<&N> {
    let mut node = root?;
    while let Some(right) = node.right() {
        node = right;
    }
    Some(node)
}

/// Largest node with key `<= key`.
pub(crate) fn floor<'a, N: SearchNode>(mut cur: Option<&'a N>, key: &N::Key) -> Option<&'a N> {
    let mut candidate = None;
    while let Some(node) = cur {
        match key.cmp(node.key()) {
            Ordering::Less => cur = node.left(),
            Ordering::Equal => return Some(node),
            Ordering::Greater => {
                candidate = Some(node);
                cur = node.right();
            }
        }
    }
    candidate
}

/// Smallest node with key `>= key`.
pub(crate) fn ceiling<'a, N: SearchNode>(mut cur: Option<&'a N>, key: &N::Key) -> Option<&'a N> {
    let mut candidate = None;
    while let Some(node) = cur {
        match key.cmp(node.key()) {
            Ordering::Greater => cur = node.right(),
            Ordering::Equal => return Some(node),
            Ordering::Less => {
                candidate = Some(node);
                cur = node.left();
            }
        }
    }
    candidate
}

/// Number of keys strictly less than `key`. `key` need not be present.
pub(crate) fn rank<N: SearchNode>(mut cur: Option<&N>, key: &N::Key) -> usize {
    let mut rank = 0;
    while let Some(node) = cur {
        match key.cmp(node.key()) {
            Ordering::Less => cur = node.left(),
            Ordering::Greater => {
                rank += 1 + size(node.left());
                cur = node.right();
            }
            Ordering::Equal => return rank + size(node.left()),
        }
    }
    rank
}

pub(crate) fn select<N: SearchNode>(mut cur: Option<&N>, mut rank: usize) -> Option<&N> {
    while let Some(node) = cur {
        let left = size(node.left());
        match rank.cmp(&left) {
            Ordering::Less => cur = node.left(),
            Ordering::Greater => {
                rank -= left + 1;
                cur = node.right();
            }
            Ordering::Equal => return Some(node),
        }
    }
    None
}

/// Number of nodes on the longest root-to-leaf path.
pub(crate) fn height<N: SearchNode>(root: Option<&N>) -> usize {
    let mut stack: Vec<(&N, usize)> = root.map(|node| (node, 1)).into_iter().collect();
    let mut height = 0;
    while let Some((node, depth)) = stack.pop() {
        height = height.max(depth);
        stack.extend(node.left().map(|left| (left, depth + 1)));
        stack.extend(node.right().map(|right| (right, depth + 1)));
    }
    height
}

/// In-order traversal with an explicit stack, optionally bounded to `[lo, hi]`.
pub(crate) struct InOrder<'a, N: SearchNode> {
    stack: Vec<&'a N>,
    hi: Option<&'a N::Key>,
}

impl<'a, N: SearchNode> InOrder<'a, N> {
    pub(crate) fn new(root: Option<&'a N>) -> Self {
        let mut iter = Self {
            stack: Vec::new(),
            hi: None,
        };
        iter.push_left_spine(root);
        iter
    }

    pub(crate) fn range(root: Option<&'a N>, lo: &N::Key, hi: &'a N::Key) -> Self {
        let mut stack = Vec::new();
        if lo <= hi {
            let mut cur = root;
            while let Some(node) = cur {
                if node.key() < lo {
                    cur = node.right();
                } else {
                    stack.push(node);
                    cur = node.left();
                }
            }
        }
        Self {
            stack,
            hi: Some(hi),
        }
    }

    fn push_left_spine(&mut self, mut cur: Option<&'a N>) {
        while let Some(node) = cur {
            self.stack.push(node);
            cur = node.left();
        }
    }
}

impl<'a, N: SearchNode> Iterator for InOrder<'a, N> {
    type Item = &'a N;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        if self.hi.is_some_and(|hi| node.key() > hi) {
            self.stack.clear();
            return None;
        }
        self.push_left_spine(node.right());
        Some(node)
    }
}
