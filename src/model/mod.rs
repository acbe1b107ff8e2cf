//! Data model shared by the block reader, the assembler and the writers.
//!
//! `RawBlock` is what the reader hands to the assembler; everything else
//! ends up inside the `Summary` returned to the caller.

mod warning;

pub use warning::Warning;

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

/// Numeric id of a block (`*NODES 1`, `GEOMETRY 10`, ...).
pub type BlockId = u32;

/// Kind of a top-level block, taken from its keyword.
///
/// Any `*TAG` the reader does not know ends up as `Unknown(tag)` so the
/// assembler can tally it instead of guessing what it means.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BlockKind {
    /// `*VTF-1.00` format marker.
    Header,
    Step,
    Nodes,
    Elements,
    Geometry,
    Results,
    /// `FIELD` leaves the kind open, `*GLVIEWSCALAR` and friends fix it.
    Field(Option<FieldKind>),
    /// `*INTERNALSTRING`
    Text,
    /// `*GLVIEWSTATEINFO`
    StateInfo,
    Unknown(String),
}

impl BlockKind {
    /// `STEP` is the only block whose id can't be made up.
    pub fn requires_id(&self) -> bool {
        matches!(self, BlockKind::Step)
    }

    /// The header is a single line; whatever follows it is not its body.
    pub fn has_body(&self) -> bool {
        !matches!(self, BlockKind::Header)
    }

    pub fn geometry_kind(&self) -> Option<GeometryKind> {
        match self {
            BlockKind::Nodes => Some(GeometryKind::Nodes),
            BlockKind::Elements => Some(GeometryKind::Elements),
            BlockKind::Geometry => Some(GeometryKind::Composite),
            _ => None,
        }
    }

    /// Human readable name of one block, e.g. `elements block 2`.
    pub fn describe(&self, id: BlockId) -> String {
        format!("{self} block {id}")
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockKind::Header => f.write_str("header"),
            BlockKind::Step => f.write_str("step"),
            BlockKind::Nodes => f.write_str("nodes"),
            BlockKind::Elements => f.write_str("elements"),
            BlockKind::Geometry => f.write_str("geometry"),
            BlockKind::Results => f.write_str("results"),
            BlockKind::Field(Some(kind)) => write!(f, "{kind} field"),
            BlockKind::Field(None) => f.write_str("field"),
            BlockKind::Text => f.write_str("string"),
            BlockKind::StateInfo => f.write_str("state info"),
            BlockKind::Unknown(tag) => f.write_str(tag),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GeometryKind {
    /// Node coordinates.
    Nodes,
    /// Element definitions.
    Elements,
    /// A geometry block gluing element blocks together.
    Composite,
}

impl fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            GeometryKind::Nodes => "Nodes",
            GeometryKind::Elements => "Elements",
            GeometryKind::Composite => "Geometry",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Scalar,
    Vector,
    Tensor,
    Displacement,
}

impl FieldKind {
    pub fn from_name(name: &str) -> Option<FieldKind> {
        match name.to_ascii_lowercase().as_str() {
            "scalar" => Some(FieldKind::Scalar),
            "vector" => Some(FieldKind::Vector),
            "tensor" => Some(FieldKind::Tensor),
            "displacement" => Some(FieldKind::Displacement),
            _ => None,
        }
    }

    /// Guess the kind from the number of components per result row.
    pub fn from_dimension(dimension: u32) -> Option<FieldKind> {
        match dimension {
            1 => Some(FieldKind::Scalar),
            3 => Some(FieldKind::Vector),
            6 | 9 => Some(FieldKind::Tensor),
            _ => None,
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FieldKind::Scalar => "Scalar",
            FieldKind::Vector => "Vector",
            FieldKind::Tensor => "Tensor",
            FieldKind::Displacement => "Displacement",
        })
    }
}

/// One `key value...` line from a block body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    /// Lowercased, without the `%` prefix.
    pub key: String,
    /// Everything after the key, trimmed. Empty for flag lines like `%QUADS`.
    pub value: String,
}

/// A block exactly as the reader found it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawBlock {
    pub kind: BlockKind,
    pub id: BlockId,
    /// 1-based line number of the header.
    pub line: usize,
    /// Header tokens after the id.
    pub args: Vec<String>,
    pub properties: Vec<Property>,
    /// Every body line, verbatim.
    pub raw_lines: Vec<String>,
}

impl RawBlock {
    /// Value of the first property called `key`.
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|p| p.key == key)
            .map(|p| p.value.as_str())
    }

    /// Numeric payload rows (coordinates, connectivity, result values, id lists).
    pub fn payload_rows(&self) -> impl Iterator<Item = &str> {
        self.raw_lines
            .iter()
            .map(|line| line.trim())
            .filter(|line| is_payload_row(line))
    }
}

/// Payload rows start like a number: `0.5 1 2`, `-1e3`, `1, 2, 3`.
pub fn is_payload_row(line: &str) -> bool {
    line.starts_with(|c: char| c.is_ascii_digit() || matches!(c, '-' | '+' | '.'))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Step {
    pub index: u32,
    pub description: Option<String>,
    pub geometry_blocks: Vec<GeometryBlock>,
    pub fields: Vec<Field>,
}

impl Step {
    pub fn new(index: u32, description: Option<String>) -> Self {
        Self {
            index,
            description,
            geometry_blocks: Vec::new(),
            fields: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeometryBlock {
    pub id: BlockId,
    pub kind: GeometryKind,
    pub node_count: Option<usize>,
    pub element_count: Option<usize>,
    /// Ids this block depends on; dangling ids are kept.
    pub referenced_ids: BTreeSet<BlockId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    pub id: BlockId,
    pub name: String,
    pub kind: FieldKind,
    pub geometry_ref: BlockId,
    pub result_ref: BlockId,
    pub step_ref: Option<u32>,
}

/// Structural summary of one VTF file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Version from the `*VTF-x.y` header, if there was one.
    pub version: Option<String>,
    /// Blocks of a known kind that were read.
    pub block_count: usize,
    pub steps: Vec<Step>,
    pub unresolved_references: BTreeSet<BlockId>,
    pub warnings: Vec<Warning>,
}

impl Summary {
    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.steps.iter().flat_map(|step| step.fields.iter())
    }

    pub fn geometry_blocks(&self) -> impl Iterator<Item = &GeometryBlock> {
        self.steps.iter().flat_map(|step| step.geometry_blocks.iter())
    }
}
