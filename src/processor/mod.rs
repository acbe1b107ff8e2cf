//! The structural assembler.
//!
//! Takes the blocks coming out of the reader, in order and exactly once,
//! and turns them into steps, geometry blocks and fields.
pub mod assembler;
pub mod diagnostics;
pub mod index;

pub use assembler::Assembler;

use crate::model::{RawBlock, Summary, Warning};

/// Runs the assembler over a block stream and returns the finished summary.
pub fn assemble<I>(items: I) -> Summary
where
    I: IntoIterator<Item = Result<RawBlock, Warning>>,
{
    let mut assembler = Assembler::new();
    for item in items {
        assembler.feed(item);
    }
    assembler.finish()
}
