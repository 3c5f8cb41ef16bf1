//! In-memory curriculum graph with explicit secondary indices.
//!
//! `petgraph` provides the adjacency structure; three maintained indices keep
//! every lookup cheap: a node-id map (id → petgraph index), a per-relation
//! scan index (insertion-order `(source, target)` pairs, used by query
//! patterns with two unbound variables), and a label index (NFC-normalized
//! label → all ids carrying it, insertion order).
//!
//! Mutation is single-threaded and batch-shaped; once built, a graph is
//! shared read-only (see [`SnapshotCell`](super::SnapshotCell)). Node removal
//! is deliberately unsupported: the observed workflow rebuilds the whole
//! graph instead, and ids are never reused.

use std::collections::{BTreeMap, HashMap};

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use unicode_normalization::UnicodeNormalization;

use crate::error::GraphError;
use crate::node::{NodeData, NodeId, NodeKind};

use super::{Edge, Relation};

/// Result type for graph mutations.
pub type GraphResult<T> = std::result::Result<T, GraphError>;

/// Outcome of an edge insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeOutcome {
    /// The edge was added.
    Added,
    /// The exact triple was already present; the store is unchanged.
    Existing,
}

/// Normalized key for the label index. Korean labels in particular can arrive
/// in mixed normalization forms from hand-edited documents.
fn label_key(label: &str) -> String {
    label.nfc().collect()
}

/// The typed curriculum knowledge graph.
///
/// Cloning is a deep copy; the snapshot layer clones the current graph,
/// mutates the copy, and swaps it in.
#[derive(Clone)]
pub struct CurriculumGraph {
    /// Adjacency backbone: nodes carry their id, edges their relation.
    graph: DiGraph<NodeId, Relation>,
    /// NodeId → petgraph index.
    node_index: HashMap<NodeId, NodeIndex>,
    /// NodeId → label/comment/attributes.
    data: HashMap<NodeId, NodeData>,
    /// Per-kind node roster in insertion order.
    rosters: BTreeMap<NodeKind, Vec<NodeId>>,
    /// Next id index to assign, per kind.
    next_index: BTreeMap<NodeKind, u32>,
    /// Relation → (source, target) pairs in insertion order.
    relation_index: BTreeMap<Relation, Vec<(NodeId, NodeId)>>,
    /// Normalized label → ids carrying it, insertion order.
    labels: HashMap<String, Vec<NodeId>>,
    edge_count: usize,
}

impl CurriculumGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            node_index: HashMap::new(),
            data: HashMap::new(),
            rosters: BTreeMap::new(),
            next_index: BTreeMap::new(),
            relation_index: BTreeMap::new(),
            labels: HashMap::new(),
            edge_count: 0,
        }
    }

    // -----------------------------------------------------------------------
    // Nodes
    // -----------------------------------------------------------------------

    /// Create a node of the given kind, assigning the next per-kind id.
    pub fn add_node(&mut self, kind: NodeKind, label: Option<&str>) -> NodeId {
        let data = match label {
            Some(l) => NodeData::labeled(l),
            None => NodeData::default(),
        };
        self.add_node_data(kind, data)
    }

    /// Create a node with full data, assigning the next per-kind id.
    pub fn add_node_data(&mut self, kind: NodeKind, data: NodeData) -> NodeId {
        let index = self.next_index.entry(kind).or_insert(1);
        let id = NodeId::new(kind, *index);
        *index += 1;
        self.insert_node(id, data);
        id
    }

    /// Insert a node under an explicit id, as read from a persisted graph.
    ///
    /// Keeps the per-kind counter ahead of the largest restored index so
    /// later `add_node` calls never reuse an id.
    pub(crate) fn restore_node(&mut self, id: NodeId, data: NodeData) -> GraphResult<()> {
        if self.node_index.contains_key(&id) {
            return Err(GraphError::DuplicateId { id: id.to_string() });
        }
        let next = self.next_index.entry(id.kind()).or_insert(1);
        *next = (*next).max(id.index() + 1);
        self.insert_node(id, data);
        Ok(())
    }

    fn insert_node(&mut self, id: NodeId, data: NodeData) {
        let idx = self.graph.add_node(id);
        self.node_index.insert(id, idx);
        if let Some(label) = &data.label {
            self.labels.entry(label_key(label)).or_default().push(id);
        }
        self.data.insert(id, data);
        self.rosters.entry(id.kind()).or_default().push(id);
    }

    /// Whether the node exists.
    pub fn has_node(&self, id: NodeId) -> bool {
        self.node_index.contains_key(&id)
    }

    /// Nodes of one kind, in insertion order.
    pub fn nodes_of_kind(&self, kind: NodeKind) -> &[NodeId] {
        self.rosters.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All nodes, kinds in hierarchy order, insertion order within a kind.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        NodeKind::ALL
            .into_iter()
            .flat_map(|kind| self.nodes_of_kind(kind).iter().copied())
    }

    /// Full data for a node.
    pub fn data_of(&self, id: NodeId) -> Option<&NodeData> {
        self.data.get(&id)
    }

    /// The node's label, if it has one.
    pub fn label_of(&self, id: NodeId) -> Option<&str> {
        self.data.get(&id)?.label.as_deref()
    }

    /// The node's comment, if it has one.
    pub fn comment_of(&self, id: NodeId) -> Option<&str> {
        self.data.get(&id)?.comment.as_deref()
    }

    /// The node's scalar attributes (empty map if none).
    pub fn attrs_of(&self, id: NodeId) -> &BTreeMap<String, String> {
        static EMPTY: BTreeMap<String, String> = BTreeMap::new();
        self.data.get(&id).map(|d| &d.attrs).unwrap_or(&EMPTY)
    }

    /// Set a scalar attribute on an existing node.
    pub fn set_attr(&mut self, id: NodeId, key: &str, value: &str) -> GraphResult<()> {
        let data = self.data.get_mut(&id).ok_or_else(|| GraphError::DanglingReference {
            role: "source",
            id: id.to_string(),
        })?;
        data.attrs.insert(key.into(), value.into());
        Ok(())
    }

    /// Set the comment on an existing node.
    pub fn set_comment(&mut self, id: NodeId, comment: &str) -> GraphResult<()> {
        let data = self.data.get_mut(&id).ok_or_else(|| GraphError::DanglingReference {
            role: "source",
            id: id.to_string(),
        })?;
        data.comment = Some(comment.into());
        Ok(())
    }

    /// Resolve a label to every node carrying it, optionally restricted to a
    /// kind. Identity is by id only — colliding labels all come back, in
    /// insertion order, and the caller decides.
    pub fn resolve_label(&self, label: &str, kind: Option<NodeKind>) -> Vec<NodeId> {
        let Some(ids) = self.labels.get(&label_key(label)) else {
            return Vec::new();
        };
        match kind {
            Some(k) => ids.iter().copied().filter(|id| id.kind() == k).collect(),
            None => ids.clone(),
        }
    }

    // -----------------------------------------------------------------------
    // Edges
    // -----------------------------------------------------------------------

    /// Insert an edge.
    ///
    /// Fails with `DanglingReference` if either endpoint is missing, with
    /// `KindMismatch` if the endpoint kinds violate the relation's domain or
    /// range, and with `StructuralConflict` if a structural edge would give
    /// the target a second parent. Re-inserting an existing triple is an
    /// idempotent no-op. On any failure the store is left unchanged.
    pub fn add_edge(
        &mut self,
        source: NodeId,
        relation: Relation,
        target: NodeId,
    ) -> GraphResult<EdgeOutcome> {
        let src_idx = *self.node_index.get(&source).ok_or_else(|| {
            GraphError::DanglingReference {
                role: "source",
                id: source.to_string(),
            }
        })?;
        let dst_idx = *self.node_index.get(&target).ok_or_else(|| {
            GraphError::DanglingReference {
                role: "target",
                id: target.to_string(),
            }
        })?;

        if let Some(domain) = relation.domain()
            && source.kind() != domain
        {
            return Err(GraphError::KindMismatch {
                relation: relation.to_string(),
                role: "source",
                expected: domain.to_string(),
                actual: source.kind().to_string(),
            });
        }
        if let Some(range) = relation.range()
            && target.kind() != range
        {
            return Err(GraphError::KindMismatch {
                relation: relation.to_string(),
                role: "target",
                expected: range.to_string(),
                actual: target.kind().to_string(),
            });
        }

        if self.has_edge(source, relation, target) {
            return Ok(EdgeOutcome::Existing);
        }

        if relation.is_structural()
            && let Some(existing) = self.subjects_of(relation, target).first()
        {
            return Err(GraphError::StructuralConflict {
                child: target.to_string(),
                existing: existing.to_string(),
                relation: relation.to_string(),
            });
        }

        self.graph.add_edge(src_idx, dst_idx, relation);
        self.relation_index
            .entry(relation)
            .or_default()
            .push((source, target));
        self.edge_count += 1;
        Ok(EdgeOutcome::Added)
    }

    /// Whether the exact triple is present.
    pub fn has_edge(&self, source: NodeId, relation: Relation, target: NodeId) -> bool {
        let Some(&src_idx) = self.node_index.get(&source) else {
            return false;
        };
        self.graph
            .edges_directed(src_idx, Direction::Outgoing)
            .any(|e| *e.weight() == relation && self.graph[e.target()] == target)
    }

    /// All objects of `(source, relation, ?)`, sorted by id.
    pub fn objects_of(&self, source: NodeId, relation: Relation) -> Vec<NodeId> {
        let Some(&src_idx) = self.node_index.get(&source) else {
            return Vec::new();
        };
        let mut out: Vec<NodeId> = self
            .graph
            .edges_directed(src_idx, Direction::Outgoing)
            .filter(|e| *e.weight() == relation)
            .map(|e| self.graph[e.target()])
            .collect();
        out.sort_unstable();
        out
    }

    /// All subjects of `(?, relation, target)`, sorted by id.
    pub fn subjects_of(&self, relation: Relation, target: NodeId) -> Vec<NodeId> {
        let Some(&dst_idx) = self.node_index.get(&target) else {
            return Vec::new();
        };
        let mut out: Vec<NodeId> = self
            .graph
            .edges_directed(dst_idx, Direction::Incoming)
            .filter(|e| *e.weight() == relation)
            .map(|e| self.graph[e.source()])
            .collect();
        out.sort_unstable();
        out
    }

    /// Structural parents of a node (across all structural relations),
    /// sorted by id. At most one per relation by the forest invariant.
    pub fn structural_parents(&self, id: NodeId) -> Vec<NodeId> {
        let Some(&idx) = self.node_index.get(&id) else {
            return Vec::new();
        };
        let mut out: Vec<NodeId> = self
            .graph
            .edges_directed(idx, Direction::Incoming)
            .filter(|e| e.weight().is_structural())
            .map(|e| self.graph[e.source()])
            .collect();
        out.sort_unstable();
        out
    }

    /// Every `(source, target)` pair of one relation, in insertion order.
    /// This is the scan index for query patterns with two unbound variables.
    pub fn edges_of(&self, relation: Relation) -> &[(NodeId, NodeId)] {
        self.relation_index
            .get(&relation)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// All edges, relations in declaration order, insertion order within one.
    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        Relation::ALL.into_iter().flat_map(|rel| {
            self.edges_of(rel)
                .iter()
                .map(move |&(s, t)| Edge::new(s, rel, t))
        })
    }

    /// Total node count.
    pub fn node_count(&self) -> usize {
        self.node_index.len()
    }

    /// Total edge count.
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }
}

impl Default for CurriculumGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CurriculumGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CurriculumGraph")
            .field("nodes", &self.node_count())
            .field("edges", &self.edge_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_graph() -> (CurriculumGraph, NodeId, NodeId, NodeId, NodeId) {
        let mut g = CurriculumGraph::new();
        let sub = g.add_node(NodeKind::Subject, Some("미적분"));
        let chap = g.add_node(NodeKind::Chapter, Some("수열의 극한"));
        let sec = g.add_node(NodeKind::Section, Some("급수"));
        let con = g.add_node(NodeKind::Concept, Some("등비급수"));
        g.add_edge(sub, Relation::HasChapter, chap).unwrap();
        g.add_edge(chap, Relation::HasSection, sec).unwrap();
        g.add_edge(sec, Relation::HasConcept, con).unwrap();
        (g, sub, chap, sec, con)
    }

    #[test]
    fn ids_are_sequential_per_kind() {
        let mut g = CurriculumGraph::new();
        let a = g.add_node(NodeKind::Concept, Some("가"));
        let b = g.add_node(NodeKind::Concept, Some("나"));
        let s = g.add_node(NodeKind::Subject, Some("다"));
        assert_eq!(a.to_string(), "Con_0001");
        assert_eq!(b.to_string(), "Con_0002");
        assert_eq!(s.to_string(), "Sub_01");
    }

    #[test]
    fn forward_and_reverse_lookup() {
        let (g, sub, chap, sec, _) = small_graph();
        assert_eq!(g.objects_of(sub, Relation::HasChapter), vec![chap]);
        assert_eq!(g.subjects_of(Relation::HasSection, sec), vec![chap]);
        assert_eq!(g.structural_parents(sec), vec![chap]);
        assert!(g.objects_of(sub, Relation::HasSection).is_empty());
    }

    #[test]
    fn dangling_reference_rejected() {
        let mut g = CurriculumGraph::new();
        let sub = g.add_node(NodeKind::Subject, Some("기하"));
        let ghost = NodeId::new(NodeKind::Chapter, 9);
        let err = g.add_edge(sub, Relation::HasChapter, ghost).unwrap_err();
        assert!(matches!(err, GraphError::DanglingReference { role: "target", .. }));
        assert_eq!(g.edge_count(), 0);
    }

    #[test]
    fn second_structural_parent_rejected_without_mutation() {
        let (mut g, _, _, sec, _) = small_graph();
        let other_chap = g.add_node(NodeKind::Chapter, Some("함수의 극한"));
        let edges_before = g.edge_count();

        let err = g.add_edge(other_chap, Relation::HasSection, sec).unwrap_err();
        assert!(matches!(err, GraphError::StructuralConflict { .. }));
        assert_eq!(g.edge_count(), edges_before);
        // Original parent is intact.
        assert_eq!(g.subjects_of(Relation::HasSection, sec).len(), 1);
    }

    #[test]
    fn structural_reinsert_is_a_noop() {
        let (mut g, sub, chap, _, _) = small_graph();
        let outcome = g.add_edge(sub, Relation::HasChapter, chap).unwrap();
        assert_eq!(outcome, EdgeOutcome::Existing);
        assert_eq!(g.edge_count(), 3);
    }

    #[test]
    fn duplicate_prerequisite_is_a_noop() {
        let mut g = CurriculumGraph::new();
        let a = g.add_node(NodeKind::Concept, Some("급수"));
        let b = g.add_node(NodeKind::Concept, Some("이계도함수"));

        assert_eq!(g.add_edge(a, Relation::PrerequisiteOf, b).unwrap(), EdgeOutcome::Added);
        assert_eq!(
            g.add_edge(a, Relation::PrerequisiteOf, b).unwrap(),
            EdgeOutcome::Existing
        );
        assert_eq!(g.edge_count(), 1);
    }

    #[test]
    fn kind_mismatch_rejected() {
        let mut g = CurriculumGraph::new();
        let sub = g.add_node(NodeKind::Subject, Some("대수"));
        let sec = g.add_node(NodeKind::Section, Some("지수"));
        let err = g.add_edge(sub, Relation::HasSection, sec).unwrap_err();
        assert!(matches!(err, GraphError::KindMismatch { role: "source", .. }));
    }

    #[test]
    fn prerequisite_crosses_kinds_and_lineage() {
        let mut g = CurriculumGraph::new();
        let sec = g.add_node(NodeKind::Section, Some("정적분"));
        let con = g.add_node(NodeKind::Concept, Some("확률분포"));
        // No shared lineage required, and mixed granularity is allowed.
        assert_eq!(g.add_edge(sec, Relation::PrerequisiteOf, con).unwrap(), EdgeOutcome::Added);
    }

    #[test]
    fn label_collisions_return_all_candidates() {
        let mut g = CurriculumGraph::new();
        let sec = g.add_node(NodeKind::Section, Some("함수"));
        let con = g.add_node(NodeKind::Concept, Some("함수"));

        assert_eq!(g.resolve_label("함수", None), vec![sec, con]);
        assert_eq!(g.resolve_label("함수", Some(NodeKind::Concept)), vec![con]);
        assert!(g.resolve_label("없는말", None).is_empty());
    }

    #[test]
    fn label_lookup_is_nfc_normalized() {
        let mut g = CurriculumGraph::new();
        // "가" precomposed vs. decomposed jamo sequence.
        let id = g.add_node(NodeKind::Concept, Some("\u{AC00}"));
        assert_eq!(g.resolve_label("\u{1100}\u{1161}", None), vec![id]);
    }

    #[test]
    fn unlabeled_node_is_unresolvable_but_queryable_by_id() {
        let mut g = CurriculumGraph::new();
        let id = g.add_node(NodeKind::Concept, None);
        assert!(g.label_of(id).is_none());
        assert!(g.has_node(id));
        assert!(g.resolve_label("", None).is_empty());
    }

    #[test]
    fn restore_keeps_counters_ahead() {
        let mut g = CurriculumGraph::new();
        g.restore_node(NodeId::new(NodeKind::Concept, 7), NodeData::labeled("미분계수"))
            .unwrap();
        let fresh = g.add_node(NodeKind::Concept, Some("도함수"));
        assert_eq!(fresh.index(), 8);

        let err = g
            .restore_node(NodeId::new(NodeKind::Concept, 7), NodeData::default())
            .unwrap_err();
        assert!(matches!(err, GraphError::DuplicateId { .. }));
    }

    #[test]
    fn edge_scan_index_preserves_insertion_order() {
        let mut g = CurriculumGraph::new();
        let a = g.add_node(NodeKind::Concept, Some("가"));
        let b = g.add_node(NodeKind::Concept, Some("나"));
        let c = g.add_node(NodeKind::Concept, Some("다"));
        g.add_edge(b, Relation::PrerequisiteOf, c).unwrap();
        g.add_edge(a, Relation::PrerequisiteOf, b).unwrap();

        assert_eq!(g.edges_of(Relation::PrerequisiteOf), &[(b, c), (a, b)]);
        assert_eq!(g.edges().count(), 2);
    }

    #[test]
    fn attrs_and_comment() {
        let mut g = CurriculumGraph::new();
        let sub = g.add_node(NodeKind::Subject, Some("공통수학1"));
        g.set_attr(sub, "grade", "1학년 1학기").unwrap();
        g.set_attr(sub, "classification", "공통").unwrap();
        g.set_comment(sub, "2022 개정 교육과정").unwrap();

        assert_eq!(g.attrs_of(sub).get("grade").map(String::as_str), Some("1학년 1학기"));
        assert_eq!(g.comment_of(sub), Some("2022 개정 교육과정"));

        let ghost = NodeId::new(NodeKind::Subject, 99);
        assert!(g.set_attr(ghost, "grade", "x").is_err());
    }
}
