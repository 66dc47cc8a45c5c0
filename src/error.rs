use core::fmt;

use thiserror::Error;

/// Which of the two cursors an error refers to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CursorKind {
    Reader,
    Writer,
}

impl fmt::Display for CursorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Reader => "reader",
            Self::Writer => "writer",
        })
    }
}

/// Rejected queue construction. Nothing is built when one of these is returned.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
pub enum BuildError {
    /// `N` was zero.
    #[error("capacity must be at least one slot")]
    ZeroCapacity,
    /// The storage does not hold exactly `N` slots. `actual == 0` means no storage was supplied.
    #[error("storage holds {actual} slots, expected {expected}")]
    StorageLength { expected: usize, actual: usize },
    /// A configured start node lies outside the chain.
    #[error("{cursor} start {start} is outside a ring of {capacity} slots")]
    StartOutOfRange {
        cursor: CursorKind,
        start: usize,
        capacity: usize,
    },
    /// The bounded layer needs both cursors on the same node.
    #[error("reader at node {reader} and writer at node {writer} must start together")]
    CursorsApart { reader: usize, writer: usize },
}

#[cfg(test)]
mod tests {
    use super::{BuildError, CursorKind};
    use std::string::ToString;

    #[test]
    fn messages_name_the_problem() {
        assert_eq!(
            BuildError::StorageLength {
                expected: 4,
                actual: 0
            }
            .to_string(),
            "storage holds 0 slots, expected 4"
        );
        assert_eq!(
            BuildError::StartOutOfRange {
                cursor: CursorKind::Writer,
                start: 9,
                capacity: 4
            }
            .to_string(),
            "writer start 9 is outside a ring of 4 slots"
        );
    }
}
