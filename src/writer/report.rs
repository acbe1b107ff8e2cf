//! Plain-text report of a summary, one step at a time.

use std::fmt;

use crate::model::{GeometryBlock, Step, Summary};

/// Display wrapper that lays a summary out as the text report.
pub struct Report<'a>(pub &'a Summary);

pub fn render(summary: &Summary) -> String {
    Report(summary).to_string()
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let summary = self.0;

        match &summary.version {
            Some(version) => writeln!(f, "Format VTF-{version}")?,
            None => writeln!(f, "Format unknown")?,
        }
        writeln!(
            f,
            "{} step(s), {} block(s)",
            summary.steps.len(),
            summary.block_count
        )?;

        for step in &summary.steps {
            write_step(f, step)?;
        }

        if !summary.unresolved_references.is_empty() {
            let ids: Vec<String> = summary
                .unresolved_references
                .iter()
                .map(|id| id.to_string())
                .collect();
            writeln!(f, "Unresolved references: {}", ids.join(", "))?;
        }

        if !summary.warnings.is_empty() {
            writeln!(f, "Warnings:")?;
            for warning in &summary.warnings {
                writeln!(f, "  {warning}")?;
            }
        }

        Ok(())
    }
}

fn write_step(f: &mut fmt::Formatter<'_>, step: &Step) -> fmt::Result {
    match &step.description {
        Some(description) => writeln!(f, "Step {}: {description}", step.index)?,
        None => writeln!(f, "Step {}", step.index)?,
    }

    for block in &step.geometry_blocks {
        write_geometry(f, block)?;
    }

    for field in &step.fields {
        write!(f, "  {} '{}'", field.kind, field.name)?;
        write!(
            f,
            " (block {}, geometry {}, results {}",
            field.id, field.geometry_ref, field.result_ref
        )?;
        if let Some(step_ref) = field.step_ref {
            write!(f, ", step {step_ref}")?;
        }
        writeln!(f, ")")?;
    }

    Ok(())
}

fn write_geometry(f: &mut fmt::Formatter<'_>, block: &GeometryBlock) -> fmt::Result {
    writeln!(f, "  {} block {}", block.kind, block.id)?;
    if let Some(nodes) = block.node_count {
        writeln!(f, "    {nodes} nodes")?;
    }
    if let Some(elements) = block.element_count {
        writeln!(f, "    {elements} elements")?;
    }
    if !block.referenced_ids.is_empty() {
        let ids: Vec<String> = block.referenced_ids.iter().map(|id| id.to_string()).collect();
        writeln!(f, "    uses {}", ids.join(", "))?;
    }
    Ok(())
}
