//! Accumulator for warnings and dangling ids, threaded through assembly and
//! moved into the `Summary` at the end.

use std::collections::BTreeSet;

use log::debug;

use crate::model::{BlockId, Warning};

#[derive(Debug, Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
    unresolved: BTreeSet<BlockId>,
    /// Unknown tags in order of first appearance, with their counts.
    unknown: Vec<(String, usize)>,
}

impl Diagnostics {
    pub fn warn(&mut self, warning: Warning) {
        debug!(warning = warning.to_string(); "Warning");
        self.warnings.push(warning);
    }

    /// Record a reference that could not be resolved.
    pub fn unresolved(&mut self, target: BlockId, warning: Warning) {
        self.unresolved.insert(target);
        self.warn(warning);
    }

    pub fn unknown_kind(&mut self, tag: &str) {
        match self.unknown.iter_mut().find(|(t, _)| t == tag) {
            Some((_, count)) => *count += 1,
            None => self.unknown.push((tag.to_string(), 1)),
        }
    }

    /// Append one warning per unknown tag and hand everything over.
    pub fn finish(mut self) -> (Vec<Warning>, BTreeSet<BlockId>) {
        for (tag, count) in std::mem::take(&mut self.unknown) {
            self.warn(Warning::UnknownBlockKind { tag, count });
        }
        (self.warnings, self.unresolved)
    }
}
