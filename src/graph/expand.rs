//! Ancestor expansion: upward closure over structural edges for a label set.
//!
//! The visualization front end highlights a set of labels; to show how those
//! nodes hang together, every structural ancestor (Section → Chapter →
//! Subject) is pulled into the highlighted set as well. BFS over reverse
//! structural edges; the forest invariant guarantees termination within
//! three hops.

use std::collections::{BTreeSet, VecDeque};

use super::CurriculumGraph;

/// Expand a label set with the labels of every structural ancestor.
///
/// Each input label is resolved to all nodes carrying it (any kind); labels
/// that resolve to nothing are ignored. The input labels are always part of
/// the result.
pub fn expand_ancestors<I, S>(graph: &CurriculumGraph, labels: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut expanded: BTreeSet<String> = labels.into_iter().map(Into::into).collect();
    let mut queue: VecDeque<String> = expanded.iter().cloned().collect();

    while let Some(label) = queue.pop_front() {
        for id in graph.resolve_label(&label, None) {
            for parent in graph.structural_parents(id) {
                let Some(parent_label) = graph.label_of(parent) else {
                    continue;
                };
                if expanded.insert(parent_label.to_owned()) {
                    queue.push_back(parent_label.to_owned());
                }
            }
        }
    }

    expanded
}
