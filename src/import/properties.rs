//! Subject enrichment: attach grade and classification attributes.
//!
//! The properties document carries one line per subject:
//! `공통수학1 -> 1학년 1학기, 공통`. Subjects present in the graph but
//! missing from the document are reported, as are document entries that
//! match no subject.

use tracing::info;

use crate::graph::CurriculumGraph;
use crate::node::NodeKind;

use super::LinkReport;

/// Apply `grade` and `classification` attributes to Subject nodes.
pub fn enrich_subjects(graph: &mut CurriculumGraph, text: &str) -> LinkReport {
    let mut report = LinkReport::default();
    let mut entries: Vec<(String, String, String)> = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        let Some((label, props)) = line.split_once("->") else {
            continue;
        };
        let mut values = props.split(',').map(str::trim);
        let (Some(grade), Some(classification)) = (values.next(), values.next()) else {
            report.warn(format!("malformed properties line: '{line}'"));
            continue;
        };
        entries.push((label.trim().to_owned(), grade.to_owned(), classification.to_owned()));
    }
    info!(subjects = entries.len(), "parsed subject properties");

    for (label, grade, classification) in &entries {
        report.processed += 1;
        let Some(id) = graph
            .resolve_label(label, Some(NodeKind::Subject))
            .into_iter()
            .next()
        else {
            report.warn(format!("subject '{label}' not found in graph"));
            report.unresolved += 1;
            continue;
        };
        graph.set_attr(id, "grade", grade).expect("subject resolved");
        graph
            .set_attr(id, "classification", classification)
            .expect("subject resolved");
        report.added += 1;
    }

    // Surface subjects the document forgot, so the operator can extend it.
    for &id in graph.nodes_of_kind(NodeKind::Subject) {
        let Some(label) = graph.label_of(id) else { continue };
        if !entries.iter().any(|(l, _, _)| l == label) {
            report.warn(format!("subject '{label}' has no properties entry"));
        }
    }

    info!(%report, "subject enrichment finished");
    report
}
