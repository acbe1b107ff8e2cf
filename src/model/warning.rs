//! Recoverable problems found while reading or assembling a file.
//!
//! None of these stop the parse; they are collected in order and handed
//! back inside the `Summary`.

use serde::Serialize;
use thiserror::Error;

use super::BlockId;

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// A run of lines that belong to no block.
    #[error("line {line}: {count} line(s) outside any block")]
    OrphanLines { line: usize, count: usize },

    /// A header that had to be skipped, body included.
    #[error("line {line}: malformed {keyword} header: {reason}")]
    MalformedHeader {
        line: usize,
        keyword: String,
        reason: String,
    },

    /// A body line that is neither a property nor a payload row.
    #[error("line {line}: cannot parse `{text}`")]
    UnparsableLine { line: usize, text: String },

    /// A block that was read but is missing something it needs.
    #[error("line {line}: {block}: {reason}")]
    MalformedBlock {
        line: usize,
        block: String,
        reason: String,
    },

    #[error("line {line}: step {index} follows step {previous}")]
    StepOutOfOrder {
        line: usize,
        index: u32,
        previous: u32,
    },

    #[error("line {line}: step {index} declared more than once")]
    DuplicateStep { line: usize, index: u32 },

    #[error("line {line}: {block} declared more than once")]
    DuplicateBlock { line: usize, block: String },

    #[error("line {line}: {block} refers to unknown {expected} {target}")]
    UnresolvedReference {
        line: usize,
        block: String,
        expected: String,
        target: BlockId,
    },

    /// The target of an earlier unresolved reference showed up later on.
    #[error("line {line}: {block} declared after it was referenced")]
    ForwardReference { line: usize, block: String },

    #[error("line {line}: repeated format header")]
    RepeatedHeader { line: usize },

    #[error("line {line}: {block} has {found} rows but {target} has {expected}")]
    SizeMismatch {
        line: usize,
        block: String,
        target: String,
        expected: usize,
        found: usize,
    },

    /// Payload rows of a results block disagree on their number of values.
    #[error("line {line}: {block} has rows of {found} value(s), expected {expected}")]
    InconsistentDimension {
        line: usize,
        block: String,
        expected: usize,
        found: usize,
    },

    /// One per distinct unknown tag, however often it occurs.
    #[error("ignored {count} `{tag}` block(s)")]
    UnknownBlockKind { tag: String, count: usize },
}
