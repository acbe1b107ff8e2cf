//! Everything the assembler remembers about blocks it has already seen.
//!
//! VTF ids are only unique per kind (`*NODES 1` and `*ELEMENTS 1` happily
//! coexist), so one id maps to every entry declared with it and lookups say
//! which kinds they accept.

use std::collections::HashMap;

use crate::model::{BlockId, BlockKind, GeometryKind};

/// What a reference is allowed to point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expect {
    Nodes,
    Elements,
    /// Nodes, elements or a geometry composite.
    Geometry,
    Results,
    Step,
}

impl Expect {
    pub fn accepts(self, kind: &BlockKind) -> bool {
        match self {
            Expect::Nodes => *kind == BlockKind::Nodes,
            Expect::Elements => *kind == BlockKind::Elements,
            Expect::Geometry => kind.geometry_kind().is_some(),
            Expect::Results => *kind == BlockKind::Results,
            Expect::Step => *kind == BlockKind::Step,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Expect::Nodes => "nodes block",
            Expect::Elements => "elements block",
            Expect::Geometry => "geometry block",
            Expect::Results => "results block",
            Expect::Step => "step",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub kind: BlockKind,
    pub line: usize,
    pub node_count: Option<usize>,
    pub element_count: Option<usize>,
    /// Payload rows of a results block.
    pub rows: Option<usize>,
    /// Components per row of a results block.
    pub dimension: Option<u32>,
    /// `per_node` / `per_element` target of a results block.
    pub target: Option<(BlockId, GeometryKind)>,
    /// Position of the owning step in the summary.
    pub step: Option<usize>,
}

impl Entry {
    pub fn new(kind: BlockKind, line: usize) -> Self {
        Self {
            kind,
            line,
            node_count: None,
            element_count: None,
            rows: None,
            dimension: None,
            target: None,
            step: None,
        }
    }
}

#[derive(Debug, Default)]
pub struct BlockIndex {
    entries: HashMap<BlockId, Vec<Entry>>,
}

impl BlockIndex {
    /// Record a block. Returns the entry it replaces when the same kind and
    /// id were already taken.
    pub fn insert(&mut self, id: BlockId, entry: Entry) -> Option<Entry> {
        let slot = self.entries.entry(id).or_default();
        let previous = slot
            .iter()
            .position(|e| e.kind == entry.kind)
            .map(|pos| slot.remove(pos));
        slot.push(entry);
        previous
    }

    /// Most recently declared entry for `id` accepted by `expect`.
    pub fn find(&self, id: BlockId, expect: Expect) -> Option<&Entry> {
        self.entries
            .get(&id)?
            .iter()
            .rev()
            .find(|e| expect.accepts(&e.kind))
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_shared_across_kinds() {
        let mut index = BlockIndex::default();
        assert!(index.insert(1, Entry::new(BlockKind::Nodes, 2)).is_none());
        assert!(index.insert(1, Entry::new(BlockKind::Elements, 8)).is_none());

        assert_eq!(index.len(), 2);
        assert_eq!(index.find(1, Expect::Nodes).map(|e| e.line), Some(2));
        assert_eq!(index.find(1, Expect::Elements).map(|e| e.line), Some(8));
        // the latest geometry-like block wins
        assert_eq!(index.find(1, Expect::Geometry).map(|e| e.line), Some(8));
        assert!(index.find(1, Expect::Results).is_none());
        assert!(index.find(2, Expect::Nodes).is_none());
    }

    #[test]
    fn test_redeclaring_replaces() {
        let mut index = BlockIndex::default();
        index.insert(4, Entry::new(BlockKind::Results, 1));
        let previous = index.insert(4, Entry::new(BlockKind::Results, 9));

        assert_eq!(previous.map(|e| e.line), Some(1));
        assert_eq!(index.len(), 1);
        assert_eq!(index.find(4, Expect::Results).map(|e| e.line), Some(9));
    }
}
