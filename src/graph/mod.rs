//! Curriculum knowledge graph: typed store, schema text, queries, traversal.
//!
//! The graph stores curriculum nodes (Subject/Chapter/Section/Concept) and a
//! closed set of relations between them:
//!
//! - **Structural** relations (`hasChapter`, `hasSection`, `hasConcept`)
//!   form a strict forest rooted at Subjects.
//! - **`prerequisiteOf`** is a cross-cutting ordering relation between any
//!   compatible nodes; insertion is idempotent and no acyclicity is enforced
//!   by the store.
//!
//! Mutation is single-threaded and batch-shaped; serving-time readers share
//! an immutable [`Snapshot`].

pub mod expand;
pub mod query;
pub mod schema;
pub mod store;

use std::str::FromStr;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use crate::error::NodeError;
use crate::node::{NodeId, NodeKind};

pub use store::{CurriculumGraph, EdgeOutcome};

/// A relation between two nodes. Closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Relation {
    HasChapter,
    HasSection,
    HasConcept,
    PrerequisiteOf,
}

impl Relation {
    /// All relations, structural first.
    pub const ALL: [Relation; 4] = [
        Relation::HasChapter,
        Relation::HasSection,
        Relation::HasConcept,
        Relation::PrerequisiteOf,
    ];

    /// Whether this relation is part of the hierarchy forest.
    pub fn is_structural(self) -> bool {
        !matches!(self, Relation::PrerequisiteOf)
    }

    /// Required source kind, if the relation constrains it.
    pub fn domain(self) -> Option<NodeKind> {
        match self {
            Relation::HasChapter => Some(NodeKind::Subject),
            Relation::HasSection => Some(NodeKind::Chapter),
            Relation::HasConcept => Some(NodeKind::Section),
            Relation::PrerequisiteOf => None,
        }
    }

    /// Required target kind, if the relation constrains it.
    pub fn range(self) -> Option<NodeKind> {
        match self {
            Relation::HasChapter => Some(NodeKind::Chapter),
            Relation::HasSection => Some(NodeKind::Section),
            Relation::HasConcept => Some(NodeKind::Concept),
            Relation::PrerequisiteOf => None,
        }
    }

    /// The property name used in schema text and the persisted graph.
    pub fn local_name(self) -> &'static str {
        match self {
            Relation::HasChapter => "hasChapter",
            Relation::HasSection => "hasSection",
            Relation::HasConcept => "hasConcept",
            Relation::PrerequisiteOf => "prerequisiteOf",
        }
    }

    /// One-line description rendered in schema text.
    pub fn comment(self) -> &'static str {
        match self {
            Relation::HasChapter => "A subject contains this chapter",
            Relation::HasSection => "A chapter contains this section",
            Relation::HasConcept => "A section teaches this concept",
            Relation::PrerequisiteOf => "The subject node should be learned before the object node",
        }
    }
}

impl std::fmt::Display for Relation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.local_name())
    }
}

impl FromStr for Relation {
    type Err = NodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hasChapter" => Ok(Relation::HasChapter),
            "hasSection" => Ok(Relation::HasSection),
            "hasConcept" => Ok(Relation::HasConcept),
            "prerequisiteOf" => Ok(Relation::PrerequisiteOf),
            other => Err(NodeError::UnknownRelation {
                relation: other.into(),
            }),
        }
    }
}

/// An edge as an ordered (source, relation, target) triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub source: NodeId,
    pub relation: Relation,
    pub target: NodeId,
}

impl Edge {
    pub fn new(source: NodeId, relation: Relation, target: NodeId) -> Self {
        Self {
            source,
            relation,
            target,
        }
    }
}

/// An immutable, fully built graph safe for concurrent reads.
pub type Snapshot = Arc<CurriculumGraph>;

/// Holder for the currently served snapshot.
///
/// Readers clone the `Arc` and keep it for the duration of a request;
/// replacing the snapshot is a single handle swap and never blocks reads
/// already in flight. The graph itself needs no internal locking because it
/// is never mutated after publication.
pub struct SnapshotCell {
    current: RwLock<Snapshot>,
}

impl SnapshotCell {
    pub fn new(graph: CurriculumGraph) -> Self {
        Self {
            current: RwLock::new(Arc::new(graph)),
        }
    }

    /// Get the current snapshot.
    pub fn load(&self) -> Snapshot {
        Arc::clone(&self.current.read().expect("snapshot lock poisoned"))
    }

    /// Publish a freshly rebuilt graph, returning the previous snapshot.
    pub fn replace(&self, graph: CurriculumGraph) -> Snapshot {
        let mut slot = self.current.write().expect("snapshot lock poisoned");
        std::mem::replace(&mut *slot, Arc::new(graph))
    }
}

impl std::fmt::Debug for SnapshotCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let snap = self.load();
        f.debug_struct("SnapshotCell")
            .field("nodes", &snap.node_count())
            .field("edges", &snap.edge_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structural_relations_have_domain_and_range() {
        for rel in Relation::ALL {
            if rel.is_structural() {
                assert!(rel.domain().is_some());
                assert!(rel.range().is_some());
            } else {
                assert_eq!(rel.domain(), None);
                assert_eq!(rel.range(), None);
            }
        }
    }

    #[test]
    fn relation_round_trips_through_text() {
        for rel in Relation::ALL {
            assert_eq!(rel.local_name().parse::<Relation>().unwrap(), rel);
        }
        assert!("partOf".parse::<Relation>().is_err());
    }

    #[test]
    fn snapshot_replace_leaves_old_readers_intact() {
        let mut g = CurriculumGraph::new();
        g.add_node(NodeKind::Subject, Some("대수"));
        let cell = SnapshotCell::new(g);

        let before = cell.load();
        assert_eq!(before.node_count(), 1);

        let mut rebuilt = CurriculumGraph::new();
        rebuilt.add_node(NodeKind::Subject, Some("대수"));
        rebuilt.add_node(NodeKind::Subject, Some("기하"));
        cell.replace(rebuilt);

        // The old snapshot is unchanged; new loads see the rebuild.
        assert_eq!(before.node_count(), 1);
        assert_eq!(cell.load().node_count(), 2);
    }
}
