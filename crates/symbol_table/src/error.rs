use thiserror::Error;

pub type Result<T> = std::result::Result<T, SymbolTableError>;

/// Rejected operations on a symbol table.
///
/// Absence (`get`, `floor`, `ceiling` misses) is not an error and is reported
/// as `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SymbolTableError {
    #[error("symbol table is empty")]
    EmptyTree,
    #[error("rank {rank} is out of range for a table of {len} keys")]
    InvalidArgument { rank: usize, len: usize },
}

/// A broken structural invariant found by [`RedBlackBst::validate`].
///
/// Positions are in-order ranks of the offending node.
///
/// [`RedBlackBst::validate`]: crate::RedBlackBst::validate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("root link is red")]
    RedRoot,
    #[error("keys out of order at position {position}")]
    Unordered { position: usize },
    #[error("right-leaning red link at position {position}")]
    RightLeaningRed { position: usize },
    #[error("two consecutive red links at position {position}")]
    ConsecutiveReds { position: usize },
    #[error("unbalanced black links at position {position}: left {left}, right {right}")]
    UnbalancedBlacks {
        position: usize,
        left: usize,
        right: usize,
    },
    #[error("subtree size at position {position} is {stored}, expected {actual}")]
    SizeMismatch {
        position: usize,
        stored: usize,
        actual: usize,
    },
    #[error("height {height} exceeds the bound for {len} keys")]
    TooTall { height: usize, len: usize },
}
