//! Markdown report generation.
//!
//! The hierarchy report is the editable half of the review loop: it is
//! written label-sorted at every level, sent to curriculum editors, and the
//! corrected file comes back through the Indented importer. The prerequisite
//! report and the per-label connection summary are read-only views.

use std::fmt::Write as _;

use crate::graph::{CurriculumGraph, Relation};
use crate::node::{NodeId, NodeKind};

fn sorted_by_label(graph: &CurriculumGraph, ids: impl IntoIterator<Item = NodeId>) -> Vec<(NodeId, String)> {
    let mut out: Vec<(NodeId, String)> = ids
        .into_iter()
        .map(|id| (id, graph.label_of(id).unwrap_or_default().to_owned()))
        .collect();
    out.sort_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(&b.0)));
    out
}

/// Render the editable hierarchy report. Children are sorted by label at
/// every level, so the report is stable under re-export.
pub fn hierarchy_report(graph: &CurriculumGraph) -> String {
    let mut out = String::new();
    // The format example is '#'-prefixed so the importer treats it as
    // comments rather than as a literal "Subject" tree.
    out.push_str("# Ontology Hierarchy Report\n");
    out.push_str("Please edit this file to correct any structure errors.\n");
    out.push_str("# Format:\n# - Subject\n#   - Chapter\n#     - Section\n#       - #Concept\n\n");

    for (subject, label) in sorted_by_label(graph, graph.nodes_of_kind(NodeKind::Subject).iter().copied()) {
        let _ = writeln!(out, "- {label}");
        for (chapter, label) in sorted_by_label(graph, graph.objects_of(subject, Relation::HasChapter)) {
            let _ = writeln!(out, "  - {label}");
            for (section, label) in sorted_by_label(graph, graph.objects_of(chapter, Relation::HasSection)) {
                let _ = writeln!(out, "    - {label}");
                for (_, label) in sorted_by_label(graph, graph.objects_of(section, Relation::HasConcept)) {
                    let _ = writeln!(out, "      - #{label}");
                }
            }
        }
    }
    out
}

/// Render the prerequisite report: one sorted `- A -> B` line per edge.
pub fn prerequisites_report(graph: &CurriculumGraph) -> String {
    let mut out = String::new();
    out.push_str("# Prerequisite Relationships\n");
    out.push_str("Format: Preconcept -> Postconcept\n\n");

    let mut lines: Vec<String> = graph
        .edges_of(Relation::PrerequisiteOf)
        .iter()
        .filter_map(|&(pre, post)| {
            let pre = graph.label_of(pre)?;
            let post = graph.label_of(post)?;
            Some(format!("{pre} -> {post}"))
        })
        .collect();
    lines.sort_unstable();

    for line in lines {
        let _ = writeln!(out, "- {line}");
    }
    out
}

/// Describe every node carrying `label` and its prerequisite connections in
/// both directions. Used by the CLI `inspect` command.
pub fn connection_summary(graph: &CurriculumGraph, label: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Target Label: {label}");

    let nodes = graph.resolve_label(label, None);
    if nodes.is_empty() {
        let _ = writeln!(out, "  no node found for label '{label}'");
        return out;
    }

    for id in nodes {
        let _ = writeln!(out, "  Node: {id} (Type: {})", id.kind());

        let describe = |other: NodeId| {
            let label = graph.label_of(other).unwrap_or("?");
            format!("{label} ({})", other.kind())
        };

        let incoming = graph.subjects_of(Relation::PrerequisiteOf, id);
        let outgoing = graph.objects_of(id, Relation::PrerequisiteOf);
        for pre in &incoming {
            let _ = writeln!(out, "    <- prereq: {}", describe(*pre));
        }
        for next in &outgoing {
            let _ = writeln!(out, "    -> next:   {}", describe(*next));
        }
        if incoming.is_empty() && outgoing.is_empty() {
            let _ = writeln!(out, "    (no prerequisite connections)");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::hierarchy::{HierarchyFormat, import_hierarchy};
    use crate::import::pairs::link_pairs;

    fn sample_graph() -> CurriculumGraph {
        let mut g = CurriculumGraph::new();
        let doc = "\
미적분1
수열의 극한 (1단원)
급수 # 급수의 합 # 등비급수
수열의 극한 # 수열의 수렴과 발산
";
        import_hierarchy(&mut g, doc, HierarchyFormat::Marker);
        g
    }

    #[test]
    fn hierarchy_report_sorts_children_by_label() {
        let g = sample_graph();
        let report = hierarchy_report(&g);

        assert!(report.starts_with("# Ontology Hierarchy Report\n"));

        // "급수" sorts before "수열의 극한" even though it was imported later.
        let body = report.split_once("\n\n").map(|(_, b)| b).unwrap_or_default();
        let expected = "\
- 미적분1
  - 수열의 극한
    - 급수
      - #급수의 합
      - #등비급수
    - 수열의 극한
      - #수열의 수렴과 발산
";
        assert_eq!(body, expected);
    }

    #[test]
    fn hierarchy_report_round_trips_through_the_indented_importer() {
        let g = sample_graph();
        let report = hierarchy_report(&g);

        let mut rebuilt = CurriculumGraph::new();
        let import = import_hierarchy(&mut rebuilt, &report, HierarchyFormat::Indented);

        assert_eq!(import.skipped, 0);
        assert_eq!(rebuilt.node_count(), g.node_count());
        assert_eq!(rebuilt.edge_count(), g.edge_count());
        // Re-exporting the rebuilt graph reproduces the report.
        assert_eq!(hierarchy_report(&rebuilt), report);
    }

    #[test]
    fn prerequisites_report_is_sorted() {
        let mut g = sample_graph();
        let pairs = [("등비급수", "급수의 합"), ("급수의 합", "수열의 수렴과 발산")];
        link_pairs(&mut g, &pairs, NodeKind::Concept);

        let report = prerequisites_report(&g);
        let lines: Vec<&str> = report.lines().skip(3).collect();
        assert_eq!(
            lines,
            vec![
                "- 급수의 합 -> 수열의 수렴과 발산",
                "- 등비급수 -> 급수의 합",
            ]
        );
    }

    #[test]
    fn connection_summary_covers_both_directions() {
        let mut g = sample_graph();
        let pairs = [("급수의 합", "등비급수"), ("등비급수", "수열의 수렴과 발산")];
        link_pairs(&mut g, &pairs, NodeKind::Concept);

        let summary = connection_summary(&g, "등비급수");
        assert!(summary.contains("<- prereq: 급수의 합 (Concept)"));
        assert!(summary.contains("-> next:   수열의 수렴과 발산 (Concept)"));

        let lonely = connection_summary(&g, "급수");
        assert!(lonely.contains("(no prerequisite connections)"));

        let missing = connection_summary(&g, "없는라벨");
        assert!(missing.contains("no node found"));
    }
}
