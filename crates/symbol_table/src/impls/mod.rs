mod bst;
mod red_black;
mod std_btree;

pub use bst::Bst;
pub use red_black::{Iter, RedBlackBst, TreeStats};
pub use std_btree::StdBTreeMap;
