//! Builds the `Summary` from the block stream in one forward pass.
//!
//! References are checked against the blocks seen so far and nothing else:
//! a block that points at something declared further down the file gets an
//! unresolved reference, and when the target finally shows up that is
//! reported as a forward reference rather than patched up.

use std::collections::BTreeSet;

use log::{debug, trace};

use super::diagnostics::Diagnostics;
use super::index::{BlockIndex, Entry, Expect};
use crate::model::{
    BlockId, BlockKind, Field, FieldKind, GeometryBlock, GeometryKind, RawBlock, Step, Summary,
    Warning,
};
use crate::parser::lexer::{self, Lexer, parse_id, unquote};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    NoStepOpen,
    /// The last entry of `steps` is the open one.
    StepOpen,
}

pub struct Assembler {
    state: State,
    steps: Vec<Step>,
    index: BlockIndex,
    diagnostics: Diagnostics,
    /// References that missed, so late targets can be reported.
    dangling: Vec<(BlockId, Expect)>,
    /// Step indices named by `%STEP` lines of GLView geometry blocks.
    mapped_steps: BTreeSet<u32>,
    version: Option<String>,
    block_count: usize,
}

impl Default for Assembler {
    fn default() -> Self {
        Self::new()
    }
}

impl Assembler {
    pub fn new() -> Self {
        Self {
            state: State::NoStepOpen,
            steps: Vec::new(),
            index: BlockIndex::default(),
            diagnostics: Diagnostics::default(),
            dangling: Vec::new(),
            mapped_steps: BTreeSet::new(),
            version: None,
            block_count: 0,
        }
    }

    /// Take one item from the block reader.
    pub fn feed(&mut self, item: Result<RawBlock, Warning>) {
        match item {
            Ok(block) => self.block(&block),
            Err(warning) => self.diagnostics.warn(warning),
        }
    }

    pub fn block(&mut self, block: &RawBlock) {
        trace!(kind = block.kind.to_string(), id = block.id; "Assembling block");
        if !matches!(block.kind, BlockKind::Unknown(_)) {
            self.block_count += 1;
        }

        match &block.kind {
            BlockKind::Header => self.header(block),
            BlockKind::Step => self.step(block),
            BlockKind::Nodes | BlockKind::Elements | BlockKind::Geometry => self.geometry(block),
            BlockKind::Results => self.results(block),
            BlockKind::Field(declared) => self.field(block, *declared),
            BlockKind::Text | BlockKind::StateInfo => {
                self.register(block, Entry::new(block.kind.clone(), block.line))
            }
            BlockKind::Unknown(tag) => self.diagnostics.unknown_kind(tag),
        }
    }

    /// Close the open step and hand over the summary.
    pub fn finish(self) -> Summary {
        let (warnings, unresolved_references) = self.diagnostics.finish();
        debug!(
            steps = self.steps.len(),
            blocks = self.block_count,
            indexed = self.index.len(),
            warnings = warnings.len();
            "Assembled summary"
        );

        Summary {
            version: self.version,
            block_count: self.block_count,
            steps: self.steps,
            unresolved_references,
            warnings,
        }
    }

    fn header(&mut self, block: &RawBlock) {
        if self.version.is_some() {
            self.diagnostics
                .warn(Warning::RepeatedHeader { line: block.line });
            return;
        }
        self.version = block.args.first().cloned();
    }

    fn step(&mut self, block: &RawBlock) {
        let index = block.id;
        let previous = self.steps.last().map(|step| step.index);

        if self.steps.iter().any(|step| step.index == index) {
            self.diagnostics.warn(Warning::DuplicateStep {
                line: block.line,
                index,
            });
        } else if let Some(previous) = previous.filter(|&previous| index < previous) {
            self.diagnostics.warn(Warning::StepOutOfOrder {
                line: block.line,
                index,
                previous,
            });
        }

        let description = if block.args.is_empty() {
            block
                .property("description")
                .or_else(|| block.property("name"))
                .map(|value| unquote(value).to_string())
        } else {
            Some(block.args.join(" "))
        };
        let description = description.filter(|description| !description.is_empty());

        debug!(index = index, line = block.line; "Opening step");
        self.steps.push(Step::new(index, description));
        self.state = State::StepOpen;

        let mut entry = Entry::new(BlockKind::Step, block.line);
        entry.step = Some(self.steps.len() - 1);
        self.register(block, entry);
    }

    fn geometry(&mut self, block: &RawBlock) {
        let Some(kind) = block.kind.geometry_kind() else {
            return;
        };
        let source = block.kind.describe(block.id);
        let mut geometry = GeometryBlock {
            id: block.id,
            kind,
            node_count: None,
            element_count: None,
            referenced_ids: BTreeSet::new(),
        };

        match kind {
            GeometryKind::Nodes => geometry.node_count = Some(row_count(block)),
            GeometryKind::Elements => {
                geometry.element_count = Some(row_count(block));
                for id in property_ids(block, "nodes") {
                    if !geometry.referenced_ids.insert(id) {
                        continue;
                    }
                    if let Some(nodes) = self.resolve(&source, block.line, id, Expect::Nodes) {
                        geometry.node_count = add(geometry.node_count, nodes.node_count);
                    }
                }
            }
            GeometryKind::Composite => {
                self.mapped_steps.extend(property_ids(block, "step"));
                let mut parts: Vec<(BlockId, Expect)> = Vec::new();
                parts.extend(
                    property_ids(block, "nodes")
                        .into_iter()
                        .map(|id| (id, Expect::Nodes)),
                );
                parts.extend(
                    property_ids(block, "elements")
                        .into_iter()
                        .map(|id| (id, Expect::Elements)),
                );
                parts.extend(
                    block
                        .payload_rows()
                        .flat_map(lexer::ids)
                        .chain(property_ids(block, "refs"))
                        .map(|id| (id, Expect::Geometry)),
                );

                for (id, expect) in parts {
                    if !geometry.referenced_ids.insert(id) {
                        continue;
                    }
                    // bare ids in a geometry block normally name element blocks
                    let preferred = match expect {
                        Expect::Geometry => self.index.find(id, Expect::Elements).cloned(),
                        _ => None,
                    };
                    let found =
                        preferred.or_else(|| self.resolve(&source, block.line, id, expect));
                    if let Some(part) = found {
                        geometry.node_count = add(geometry.node_count, part.node_count);
                        geometry.element_count = add(geometry.element_count, part.element_count);
                    }
                }
            }
        }

        let position = self.open_step();
        let mut entry = Entry::new(block.kind.clone(), block.line);
        entry.node_count = geometry.node_count;
        entry.element_count = geometry.element_count;
        entry.step = Some(position);
        self.register(block, entry);

        self.steps[position].geometry_blocks.push(geometry);
    }

    fn results(&mut self, block: &RawBlock) {
        let source = block.kind.describe(block.id);
        let rows = block.payload_rows().count();
        let dimension = block.property("dimension").and_then(parse_id);

        if let Some((expected, found)) = inconsistent_width(block, dimension) {
            self.diagnostics.warn(Warning::InconsistentDimension {
                line: block.line,
                block: source.clone(),
                expected,
                found,
            });
        }

        let target = first_id(block, "per_node")
            .map(|id| (id, GeometryKind::Nodes))
            .or_else(|| first_id(block, "per_element").map(|id| (id, GeometryKind::Elements)));

        match target {
            None => self.diagnostics.warn(Warning::MalformedBlock {
                line: block.line,
                block: source,
                reason: "no per_node or per_element target".to_string(),
            }),
            Some((id, kind)) => {
                let expect = match kind {
                    GeometryKind::Nodes => Expect::Nodes,
                    _ => Expect::Elements,
                };
                if let Some(found) = self.resolve(&source, block.line, id, expect) {
                    let expected = match kind {
                        GeometryKind::Nodes => found.node_count,
                        _ => found.element_count,
                    };
                    if let Some(expected) = expected.filter(|&n| rows > 0 && n != rows) {
                        self.diagnostics.warn(Warning::SizeMismatch {
                            line: block.line,
                            block: source,
                            target: found.kind.describe(id),
                            expected,
                            found: rows,
                        });
                    }
                }
            }
        }

        let mut entry = Entry::new(BlockKind::Results, block.line);
        entry.rows = Some(rows);
        entry.dimension = dimension;
        entry.target = target;
        self.register(block, entry);
    }

    fn field(&mut self, block: &RawBlock, declared: Option<FieldKind>) {
        let source = block.kind.describe(block.id);
        let line = block.line;

        let positional: Vec<BlockId> = block.args.iter().filter_map(|arg| parse_id(arg)).collect();
        let name = block
            .args
            .iter()
            .find(|arg| parse_id(arg).is_none())
            .cloned()
            .or_else(|| block.property("name").map(|value| unquote(value).to_string()))
            .unwrap_or_else(|| "<unnamed>".to_string());

        // GLView fields list one results block per `%STEP` section
        let mapped: Vec<BlockId> = block.payload_rows().flat_map(lexer::ids).collect();
        let result_ref = first_id(block, "results")
            .or_else(|| first_id(block, "result"))
            .or_else(|| positional.get(1).copied())
            .or_else(|| mapped.first().copied());
        let Some(result_ref) = result_ref else {
            self.diagnostics.warn(Warning::MalformedBlock {
                line,
                block: source,
                reason: "no result reference".to_string(),
            });
            return;
        };
        let result = self.resolve(&source, line, result_ref, Expect::Results);
        let mut checked = BTreeSet::from([result_ref]);
        for id in mapped {
            if checked.insert(id) {
                self.resolve(&source, line, id, Expect::Results);
            }
        }

        let explicit = first_id(block, "geometry").or_else(|| positional.first().copied());
        let target = result.as_ref().and_then(|r| r.target);
        let (geometry_ref, expect, derived) = match (explicit, target) {
            (Some(id), _) => (id, Expect::Geometry, false),
            (None, Some((id, GeometryKind::Nodes))) => (id, Expect::Nodes, true),
            (None, Some((id, _))) => (id, Expect::Elements, true),
            (None, None) => {
                self.diagnostics.warn(Warning::MalformedBlock {
                    line,
                    block: source,
                    reason: "no geometry reference".to_string(),
                });
                return;
            }
        };
        // a target taken from the results block was already checked there
        let geometry = if derived {
            self.index.find(geometry_ref, expect).cloned()
        } else {
            self.resolve(&source, line, geometry_ref, expect)
        };

        let named = match block.property("kind").or_else(|| block.property("type")) {
            Some(value) => {
                let parsed = FieldKind::from_name(unquote(value));
                if parsed.is_none() {
                    self.diagnostics.warn(Warning::MalformedBlock {
                        line,
                        block: source.clone(),
                        reason: format!("unknown field kind `{value}`"),
                    });
                }
                parsed
            }
            None => None,
        };
        let kind = named
            .or(declared)
            .or_else(|| {
                result
                    .as_ref()
                    .and_then(|r| r.dimension)
                    .and_then(FieldKind::from_dimension)
            })
            .unwrap_or(FieldKind::Scalar);

        let step_refs = property_ids(block, "step");
        let step_ref = step_refs.first().copied();
        let mut referenced_step = None;
        let mut seen = BTreeSet::new();
        for index in step_refs {
            if !seen.insert(index) {
                continue;
            }
            let position = self.find_step(&source, line, index);
            if Some(index) == step_ref {
                referenced_step = position;
            }
        }

        let position = match geometry.and_then(|g| g.step).or(referenced_step) {
            Some(position) => position,
            None => self.open_step(),
        };
        let mut entry = Entry::new(block.kind.clone(), line);
        entry.step = Some(position);
        self.register(block, entry);

        self.steps[position].fields.push(Field {
            id: block.id,
            name,
            kind,
            geometry_ref,
            result_ref,
            step_ref,
        });
    }

    /// Position of the open step, opening `Step 0` if there is none yet.
    fn open_step(&mut self) -> usize {
        if self.state == State::NoStepOpen {
            debug!("Opening implicit step 0");
            self.steps.push(Step::new(0, None));
            self.state = State::StepOpen;
        }
        self.steps.len() - 1
    }

    fn find_step(&mut self, source: &str, line: usize, index: u32) -> Option<usize> {
        let position = self.steps.iter().position(|step| step.index == index);
        if position.is_none() && !self.mapped_steps.contains(&index) {
            self.miss(source, line, index, Expect::Step);
        }
        position
    }

    fn resolve(
        &mut self,
        source: &str,
        line: usize,
        target: BlockId,
        expect: Expect,
    ) -> Option<Entry> {
        if let Some(entry) = self.index.find(target, expect) {
            return Some(entry.clone());
        }
        self.miss(source, line, target, expect);
        None
    }

    fn miss(&mut self, source: &str, line: usize, target: BlockId, expect: Expect) {
        trace!(source = source, target = target; "Unresolved reference");
        self.diagnostics.unresolved(
            target,
            Warning::UnresolvedReference {
                line,
                block: source.to_string(),
                expected: expect.name().to_string(),
                target,
            },
        );
        self.dangling.push((target, expect));
    }

    fn register(&mut self, block: &RawBlock, entry: Entry) {
        let kind = entry.kind.clone();
        let replaced = self.index.insert(block.id, entry);
        if replaced.is_some() && kind != BlockKind::Step {
            self.diagnostics.warn(Warning::DuplicateBlock {
                line: block.line,
                block: kind.describe(block.id),
            });
        }

        let before = self.dangling.len();
        self.dangling
            .retain(|&(id, expect)| !(id == block.id && expect.accepts(&kind)));
        if self.dangling.len() != before {
            self.diagnostics.warn(Warning::ForwardReference {
                line: block.line,
                block: kind.describe(block.id),
            });
        }
    }
}

/// `count` property if there is one, otherwise the payload rows.
fn row_count(block: &RawBlock) -> usize {
    block
        .property("count")
        .and_then(parse_id)
        .map(|n| n as usize)
        .unwrap_or_else(|| block.payload_rows().count())
}

fn property_ids(block: &RawBlock, key: &str) -> Vec<BlockId> {
    block
        .properties
        .iter()
        .filter(|p| p.key == key)
        .flat_map(|p| lexer::ids(&p.value))
        .collect()
}

fn first_id(block: &RawBlock, key: &str) -> Option<BlockId> {
    property_ids(block, key).first().copied()
}

/// First payload row whose number of values differs from `%DIMENSION`, or
/// from the first row when there is no dimension, as `(expected, found)`.
fn inconsistent_width(block: &RawBlock, dimension: Option<u32>) -> Option<(usize, usize)> {
    let mut widths = block.payload_rows().map(|row| Lexer::new(row).count());
    let expected = match dimension {
        Some(dimension) => dimension as usize,
        None => widths.next()?,
    };
    widths
        .find(|&width| width != expected)
        .map(|found| (expected, found))
}

/// Sum of the counts that are known.
fn add(total: Option<usize>, part: Option<usize>) -> Option<usize> {
    match (total, part) {
        (Some(a), Some(b)) => Some(a + b),
        (a, b) => a.or(b),
    }
}

#[cfg(test)]
mod tests {
    use crate::model::{FieldKind, GeometryKind, Warning};
    use crate::parse;

    #[test]
    fn test_step_geometry_and_field() {
        let summary = parse("STEP 1\nGEOMETRY 10\nNODES 11\nEND\nFIELD velocity 10 20\n");

        assert_eq!(summary.steps.len(), 1);
        let step = &summary.steps[0];
        assert_eq!(step.index, 1);

        let ids: Vec<_> = step.geometry_blocks.iter().map(|g| (g.id, g.kind)).collect();
        assert_eq!(
            ids,
            vec![(10, GeometryKind::Composite), (11, GeometryKind::Nodes)]
        );

        assert_eq!(step.fields.len(), 1);
        let field = &step.fields[0];
        assert_eq!(field.name, "velocity");
        assert_eq!(field.geometry_ref, 10);
        assert_eq!(field.result_ref, 20);
        assert_eq!(field.kind, FieldKind::Scalar);

        assert_eq!(
            summary.unresolved_references.iter().copied().collect::<Vec<_>>(),
            vec![20]
        );
    }

    #[test]
    fn test_implicit_step_zero() {
        let summary = parse("NODES 1\n0 0 0\nSTEP 1\nNODES 2\n0 0 0\n");

        let indices: Vec<_> = summary.steps.iter().map(|s| s.index).collect();
        assert_eq!(indices, vec![0, 1]);
        assert_eq!(summary.steps[0].geometry_blocks[0].id, 1);
        assert_eq!(summary.steps[1].geometry_blocks[0].id, 2);
    }

    #[test]
    fn test_step_order_warnings() {
        let summary = parse("STEP 2\nSTEP 1\nSTEP 1\n");

        let indices: Vec<_> = summary.steps.iter().map(|s| s.index).collect();
        assert_eq!(indices, vec![2, 1, 1]);
        assert_eq!(
            summary.warnings,
            vec![
                Warning::StepOutOfOrder {
                    line: 2,
                    index: 1,
                    previous: 2,
                },
                Warning::DuplicateStep { line: 3, index: 1 },
            ]
        );
    }

    #[test]
    fn test_step_description() {
        let test_cases = vec![
            ("STEP 1 \"Time 0.5\"\n", Some("Time 0.5")),
            ("STEP 1\n%DESCRIPTION \"Load case A\"\n", Some("Load case A")),
            ("STEP 1\nname first\n", Some("first")),
            ("STEP 1\n", None),
        ];

        for (text, expected) in test_cases {
            let summary = parse(text);
            assert_eq!(
                summary.steps[0].description.as_deref(),
                expected,
                "input {text:?}"
            );
        }
    }

    #[test]
    fn test_malformed_step_keeps_previous_open() {
        let summary = parse("STEP 1\nNODES 1\nSTEP x\nNODES 2\nSTEP 2\nNODES 3\n");

        assert_eq!(summary.steps.len(), 2);
        let first: Vec<_> = summary.steps[0].geometry_blocks.iter().map(|g| g.id).collect();
        assert_eq!(first, vec![1, 2]);
        assert_eq!(summary.steps[1].geometry_blocks[0].id, 3);
        assert!(matches!(
            summary.warnings[0],
            Warning::MalformedHeader { line: 3, .. }
        ));
    }

    #[test]
    fn test_element_and_geometry_counts() {
        let text = "\
*NODES 1
0 0 0
1 0 0
1 1 0
0 1 0
*ELEMENTS 1
%NODES #1
%QUADS
1 2 3 4
*GLVIEWGEOMETRY 1
%ELEMENTS
1
";
        let summary = parse(text);
        let blocks: Vec<_> = summary.geometry_blocks().collect();
        assert_eq!(blocks.len(), 3);

        assert_eq!(blocks[0].node_count, Some(4));
        assert_eq!(blocks[1].element_count, Some(1));
        assert_eq!(blocks[1].node_count, Some(4));
        assert_eq!(blocks[1].referenced_ids.iter().copied().collect::<Vec<_>>(), vec![1]);
        assert_eq!(blocks[2].kind, GeometryKind::Composite);
        assert_eq!(blocks[2].element_count, Some(1));
        assert_eq!(blocks[2].node_count, Some(4));
        assert!(summary.warnings.is_empty(), "{:?}", summary.warnings);
    }

    #[test]
    fn test_dangling_geometry_reference_is_kept() {
        let summary = parse("ELEMENTS 2\n%NODES #7\n1 2 3\n");

        let block = &summary.steps[0].geometry_blocks[0];
        assert_eq!(block.referenced_ids.iter().copied().collect::<Vec<_>>(), vec![7]);
        assert_eq!(block.node_count, None);
        assert!(summary.unresolved_references.contains(&7));
    }

    #[test]
    fn test_forward_reference_stays_unresolved() {
        let summary = parse("STEP 1\nFIELD p 10 20\nGEOMETRY 10\n");

        assert!(summary.unresolved_references.contains(&10));
        assert!(summary.unresolved_references.contains(&20));
        assert!(summary.warnings.contains(&Warning::ForwardReference {
            line: 3,
            block: "geometry block 10".into(),
        }));
        // the field is still listed
        assert_eq!(summary.steps[0].fields[0].name, "p");
    }

    #[test]
    fn test_glview_field_takes_geometry_from_results() {
        let text = "\
*NODES 1
0 0 0
1 0 0
*RESULTS 2
%DIMENSION 3
%PER_NODE #1
0 0 0
1 1 1
*GLVIEWVECTOR 1
%NAME \"Displacement\"
%STEP 1
2
";
        let summary = parse(text);
        let field = summary.fields().next().expect("one field");

        assert_eq!(field.name, "Displacement");
        assert_eq!(field.kind, FieldKind::Vector);
        assert_eq!(field.result_ref, 2);
        assert_eq!(field.geometry_ref, 1);
        assert_eq!(field.step_ref, Some(1));
        // no `STEP 1` block and no geometry mapping step 1
        assert!(summary.unresolved_references.contains(&1));
    }

    #[test]
    fn test_geometry_step_mapping_resolves_field_steps() {
        let text = "\
*NODES 1
0 0 0
*ELEMENTS 1
%NODES #1
%POINTS
1
*GLVIEWGEOMETRY 1
%STEP 1
%ELEMENTS
1
%STEP 2
%ELEMENTS
1
*RESULTS 2
%PER_NODE #1
0.5
*GLVIEWSCALAR 1
%NAME \"Pressure\"
%STEP 2
2
";
        let summary = parse(text);

        assert_eq!(summary.fields().next().map(|f| f.step_ref), Some(Some(2)));
        assert!(summary.unresolved_references.is_empty());
        assert!(summary.warnings.is_empty(), "{:?}", summary.warnings);
        // the repeated element id is only counted once
        let composite = summary.geometry_blocks().last().expect("geometry block");
        assert_eq!(composite.element_count, Some(1));
    }

    #[test]
    fn test_every_step_section_of_a_field_is_checked() {
        let text = "\
*NODES 1
0 0 0
*RESULTS 2
%PER_NODE #1
0.5
*GLVIEWSCALAR 1
%NAME \"Pressure\"
%STEP 1
2
%STEP 2
99
";
        let summary = parse(text);

        let field = summary.fields().next().expect("one field");
        assert_eq!(field.result_ref, 2);
        assert_eq!(field.step_ref, Some(1));
        assert_eq!(
            summary.unresolved_references.iter().copied().collect::<Vec<_>>(),
            vec![1, 2, 99]
        );
        let misses: Vec<_> = summary
            .warnings
            .iter()
            .filter_map(|w| match w {
                Warning::UnresolvedReference {
                    expected, target, ..
                } => Some((expected.as_str(), *target)),
                _ => None,
            })
            .collect();
        assert_eq!(misses, vec![("results block", 99), ("step", 1), ("step", 2)]);
    }

    #[test]
    fn test_mapped_field_steps_resolve() {
        let text = "\
*NODES 1
0 0 0
*RESULTS 2
%PER_NODE #1
0.5
*RESULTS 3
%PER_NODE #1
0.7
*GLVIEWGEOMETRY 1
%STEP 1
%NODES #1
%STEP 2
%NODES #1
*GLVIEWSCALAR 1
%STEP 1
2
%STEP 2
3
";
        let summary = parse(text);

        assert!(summary.warnings.is_empty(), "{:?}", summary.warnings);
        assert!(summary.unresolved_references.is_empty());
        assert_eq!(summary.fields().next().map(|f| f.result_ref), Some(2));
    }

    #[test]
    fn test_unresolved_results_target_is_reported_once() {
        let summary = parse("*RESULTS 2\n%PER_NODE #7\n0.5\n*GLVIEWSCALAR 1\n2\n");

        let field = summary.fields().next().expect("one field");
        assert_eq!(field.geometry_ref, 7);
        assert_eq!(
            summary.warnings,
            vec![Warning::UnresolvedReference {
                line: 1,
                block: "results block 2".into(),
                expected: "nodes block".into(),
                target: 7,
            }]
        );
    }

    #[test]
    fn test_field_kind_sources() {
        let test_cases = vec![
            ("RESULTS 5\n%DIMENSION 9\n%PER_NODE 1\nFIELD s 1 5\n", FieldKind::Tensor),
            ("RESULTS 5\n%PER_NODE 1\nFIELD s 1 5\n%KIND vector\n", FieldKind::Vector),
            ("*GLVIEWDISPLACEMENT 1\n%RESULTS #5\n%GEOMETRY #1\n", FieldKind::Displacement),
            ("FIELD s 1 5\n", FieldKind::Scalar),
        ];

        for (text, expected) in test_cases {
            let summary = parse(text);
            let field = summary.fields().next().expect("one field");
            assert_eq!(field.kind, expected, "input {text:?}");
        }
    }

    #[test]
    fn test_field_without_references_is_skipped() {
        let summary = parse("FIELD lonely\n");

        assert_eq!(summary.fields().count(), 0);
        assert!(matches!(
            &summary.warnings[..],
            [Warning::MalformedBlock { reason, .. }] if reason == "no result reference"
        ));
    }

    #[test]
    fn test_results_size_mismatch() {
        let text = "NODES 1\n0 0 0\n1 1 1\nRESULTS 1\n%PER_NODE #1\n0.5\n";
        let summary = parse(text);

        assert_eq!(
            summary.warnings,
            vec![Warning::SizeMismatch {
                line: 4,
                block: "results block 1".into(),
                target: "nodes block 1".into(),
                expected: 2,
                found: 1,
            }]
        );
    }

    #[test]
    fn test_results_dimension() {
        let test_cases = vec![
            // %DIMENSION disagrees with the rows
            (
                "NODES 1\n0 0 0\nRESULTS 2\n%DIMENSION 3\n%PER_NODE #1\n0.5\n",
                vec![(3, 3, 1)],
            ),
            // rows disagree with each other
            (
                "NODES 1\n0\n0\nRESULTS 2\n%PER_NODE #1\n1 2\n1 2 3\n",
                vec![(4, 2, 3)],
            ),
            (
                "NODES 1\n0\n0\nRESULTS 2\n%DIMENSION 3\n%PER_NODE #1\n1 2 3\n4, 5, 6\n",
                vec![],
            ),
        ];

        for (text, expected) in test_cases {
            let summary = parse(text);
            let found: Vec<_> = summary
                .warnings
                .iter()
                .filter_map(|w| match w {
                    Warning::InconsistentDimension {
                        line,
                        expected,
                        found,
                        ..
                    } => Some((*line, *expected, *found)),
                    _ => None,
                })
                .collect();
            assert_eq!(found, expected, "input {text:?}");
        }
    }

    #[test]
    fn test_results_without_target() {
        let summary = parse("RESULTS 3\n1.0\n");
        assert!(matches!(
            &summary.warnings[..],
            [Warning::MalformedBlock { line: 1, .. }]
        ));
    }

    #[test]
    fn test_unknown_kinds_are_aggregated() {
        let summary = parse("STEP 1\n*FOO 1\n*FOO 2\n*BAR\n*FOO 3\n");

        assert!(summary.steps[0].geometry_blocks.is_empty());
        assert_eq!(summary.block_count, 1);
        assert_eq!(
            summary.warnings,
            vec![
                Warning::UnknownBlockKind {
                    tag: "foo".into(),
                    count: 3,
                },
                Warning::UnknownBlockKind {
                    tag: "bar".into(),
                    count: 1,
                },
            ]
        );
    }

    #[test]
    fn test_duplicate_block_and_header() {
        let summary = parse("*VTF-1.00\n*VTF-2.00\nNODES 1\nNODES 1\n");

        assert_eq!(summary.version.as_deref(), Some("1.00"));
        assert_eq!(
            summary.warnings,
            vec![
                Warning::RepeatedHeader { line: 2 },
                Warning::DuplicateBlock {
                    line: 4,
                    block: "nodes block 1".into(),
                },
            ]
        );
    }
}
