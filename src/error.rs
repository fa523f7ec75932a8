//! Error types for bulk loading and for the textual command surface.
//!
//! Tree operations themselves never fail: an absent id is an ordinary
//! result (`0` or `None`), not an error.

use thiserror::Error;

use crate::tree::{Id, Weight};

/// Input rejected by [`BulkLoader::build`](crate::tree::BulkLoader::build).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// Ids must be strictly ascending, which also rules out duplicates.
    #[error("entry {index}: id {id} does not follow id {prev}")]
    Unsorted { index: usize, prev: Id, id: Id },

    /// Every loaded id needs a positive weight.
    #[error("id {id} has non-positive weight {weight}")]
    NonPositiveWeight { id: Id, weight: Weight },

    /// More entries than the node arena can index.
    #[error("{len} entries exceed the tree's capacity")]
    TooLarge { len: usize },
}

/// Malformed input file or command line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unknown command `{0}`")]
    UnknownCommand(String),

    #[error("`{command}` expects {expected} argument(s), got {found}")]
    Arity {
        command: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("invalid integer `{0}`")]
    InvalidInteger(String),

    #[error("input ended after {found} of {expected} entries")]
    Truncated { expected: usize, found: usize },

    #[error("input is missing the entry count")]
    MissingCount,

    #[error("unexpected trailing token `{0}`")]
    Trailing(String),

    #[error(transparent)]
    Load(#[from] LoadError),
}
