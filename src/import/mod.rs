//! Batch document import: hierarchy building, prerequisite linking and
//! subject enrichment.
//!
//! All importers share one failure policy: a bad line never aborts the run.
//! The whole document is processed, per-line problems accumulate as
//! diagnostics, and the caller gets a summary report at the end.

pub mod additions;
pub mod hierarchy;
pub mod pairs;
pub mod properties;

use serde::Serialize;

pub use additions::{link_additions, parse_arrow_line};
pub use hierarchy::{HierarchyFormat, ImportReport, import_hierarchy};
pub use pairs::link_pairs;
pub use properties::enrich_subjects;

/// Summary of a linking or enrichment run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LinkReport {
    /// Candidate records seen (lines or pairs that parsed as input).
    pub processed: usize,
    /// Edges (or attribute sets) actually applied.
    pub added: usize,
    /// Records skipped because they were already present.
    pub skipped: usize,
    /// Records dropped because a label resolved to no node.
    pub unresolved: usize,
    /// Human-readable per-record problems, in document order.
    pub diagnostics: Vec<String>,
}

impl LinkReport {
    pub(crate) fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!("{message}");
        self.diagnostics.push(message);
    }
}

impl std::fmt::Display for LinkReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "processed {}, added {}, skipped {}, unresolved {}",
            self.processed, self.added, self.skipped, self.unresolved
        )
    }
}
