//! Errors that stop a file from being summarised at all.
//!
//! Problems inside the file are never errors; they become `Warning`s in the
//! `Summary`.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The bytes are not UTF-8, so this is not an ASCII VTF file.
    #[error("{} is not a text file", .path.display())]
    NotText { path: PathBuf },

    /// Nothing in the file looked like a VTF block.
    #[error("no VTF blocks found in {}", .path.display())]
    NoBlocks { path: PathBuf },
}

pub type Result<T> = std::result::Result<T, Error>;
