//! Reading VTF text: the line lexer, the keyword vocabulary and the block
//! reader that turns a file into a stream of `RawBlock`s.

pub mod block_reader;
pub mod lexer;

pub use block_reader::BlockReader;

use std::fs;
use std::path::Path;

use log::debug;

use crate::error::{Error, Result};
use crate::model::{BlockKind, FieldKind};

/// Read a file as text. Anything that isn't UTF-8 is not a VTF file we can read.
pub fn read_source(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(size = bytes.len(); "File loaded");

    String::from_utf8(bytes).map_err(|_| Error::NotText {
        path: path.to_path_buf(),
    })
}

/// Block kind named by a keyword (without its `*`), case-insensitive.
pub fn keyword(tag: &str) -> Option<BlockKind> {
    let upper = tag.to_ascii_uppercase();
    let kind = match upper.as_str() {
        "STEP" => BlockKind::Step,
        "NODES" => BlockKind::Nodes,
        "ELEMENTS" => BlockKind::Elements,
        "GEOMETRY" | "GLVIEWGEOMETRY" => BlockKind::Geometry,
        "RESULTS" => BlockKind::Results,
        "FIELD" => BlockKind::Field(None),
        "GLVIEWSCALAR" => BlockKind::Field(Some(FieldKind::Scalar)),
        "GLVIEWVECTOR" => BlockKind::Field(Some(FieldKind::Vector)),
        "GLVIEWTENSOR" => BlockKind::Field(Some(FieldKind::Tensor)),
        "GLVIEWDISPLACEMENT" => BlockKind::Field(Some(FieldKind::Displacement)),
        "INTERNALSTRING" => BlockKind::Text,
        "GLVIEWSTATEINFO" => BlockKind::StateInfo,
        s if s.starts_with("VTF-") => BlockKind::Header,
        _ => return None,
    };
    Some(kind)
}
