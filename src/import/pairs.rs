//! Curated prerequisite pairs: a fixed, ordered list of (parent, child)
//! labels scoped to one node kind.
//!
//! This is the hand-maintained backbone of the prerequisite relation — in the
//! observed curriculum it links Sections (`"지수" -> "로그"` and so on). Each
//! pair resolves independently; an unresolved side drops the whole pair with
//! a warning (no partial edge), and re-running the same list is idempotent.

use tracing::{info, warn};

use crate::graph::{CurriculumGraph, EdgeOutcome, Relation};
use crate::node::NodeKind;

use super::LinkReport;

/// Add a `prerequisiteOf` edge for each resolvable (parent, child) pair.
pub fn link_pairs<S: AsRef<str>>(
    graph: &mut CurriculumGraph,
    pairs: &[(S, S)],
    kind: NodeKind,
) -> LinkReport {
    let mut report = LinkReport::default();

    for (parent, child) in pairs {
        let parent = parent.as_ref();
        let child = child.as_ref();
        report.processed += 1;

        let parent_id = graph.resolve_label(parent, Some(kind)).into_iter().next();
        let child_id = graph.resolve_label(child, Some(kind)).into_iter().next();

        let (Some(parent_id), Some(child_id)) = (parent_id, child_id) else {
            if parent_id.is_none() {
                report.warn(format!("parent {kind} '{parent}' not found"));
            }
            if child_id.is_none() {
                report.warn(format!("child {kind} '{child}' not found"));
            }
            report.unresolved += 1;
            continue;
        };

        match graph
            .add_edge(parent_id, Relation::PrerequisiteOf, child_id)
            .expect("both endpoints resolved")
        {
            EdgeOutcome::Added => {
                info!("linked {parent} -> {child}");
                report.added += 1;
            }
            EdgeOutcome::Existing => report.skipped += 1,
        }
    }

    if report.unresolved > 0 {
        warn!(unresolved = report.unresolved, "some curated pairs did not resolve");
    }
    info!(%report, "curated pair linking finished");
    report
}
