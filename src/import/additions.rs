//! Freeform prerequisite additions: `- [ ] A -> B (comment)` documents.
//!
//! Review documents come back from curriculum editors as markdown checklists.
//! Each arrow line is parsed by stripping the list/checkbox marker, splitting
//! once on the arrow (comments may contain arrows of their own), and removing
//! parenthetical comments from both sides independently. Labels resolve
//! against Concept nodes; a line that fails to resolve is reported and
//! skipped, never fatal.

use std::sync::OnceLock;

use regex::Regex;
use tracing::info;

use crate::graph::{CurriculumGraph, EdgeOutcome, Relation};
use crate::node::NodeKind;

use super::LinkReport;

fn list_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*-\s*(\[.*?\])?\s*").expect("valid list marker regex"))
}

fn parenthetical() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\(.*?\)").expect("valid parenthetical regex"))
}

/// Parse one arrow line into `(pre, post)` labels, or `None` if the line
/// carries no arrow. Marker and parenthetical comments are stripped.
pub fn parse_arrow_line(line: &str) -> Option<(String, String)> {
    if !line.contains("->") {
        return None;
    }
    let cleaned = list_marker().replace(line, "");
    let (pre, post) = cleaned.split_once("->")?;
    let pre = parenthetical().replace_all(pre, "").trim().to_owned();
    let post = parenthetical().replace_all(post, "").trim().to_owned();
    Some((pre, post))
}

/// Link prerequisite concepts from a freeform additions document.
pub fn link_additions(graph: &mut CurriculumGraph, text: &str) -> LinkReport {
    let mut report = LinkReport::default();

    for line in text.lines() {
        let Some((pre, post)) = parse_arrow_line(line) else {
            continue;
        };
        report.processed += 1;

        let pre_id = graph.resolve_label(&pre, Some(NodeKind::Concept)).into_iter().next();
        let post_id = graph.resolve_label(&post, Some(NodeKind::Concept)).into_iter().next();

        let (Some(pre_id), Some(post_id)) = (pre_id, post_id) else {
            if pre_id.is_none() {
                report.warn(format!("pre-concept '{pre}' not found"));
            }
            if post_id.is_none() {
                report.warn(format!("post-concept '{post}' not found"));
            }
            report.unresolved += 1;
            continue;
        };

        match graph
            .add_edge(pre_id, Relation::PrerequisiteOf, post_id)
            .expect("both endpoints resolved")
        {
            EdgeOutcome::Added => {
                info!("linked {pre} -> {post}");
                report.added += 1;
            }
            EdgeOutcome::Existing => report.skipped += 1,
        }
    }

    info!(%report, "additions import finished");
    report
}
