//! Node identity and per-node data.
//!
//! Every entity in the curriculum graph is identified by a [`NodeId`]: a
//! closed [`NodeKind`] plus a monotonically assigned per-kind index. The
//! index is never reused, and the zero-padded text form (`Sub_01`,
//! `Chap_001`, `Sec_001`, `Con_0001`) is the stable external representation
//! used in the persisted graph and in reports.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::NodeError;

/// Classification of a node in the curriculum hierarchy.
///
/// This is a closed set: documents naming any other kind are rejected, not
/// silently accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NodeKind {
    Subject,
    Chapter,
    Section,
    Concept,
}

impl NodeKind {
    /// All kinds, in hierarchy order.
    pub const ALL: [NodeKind; 4] = [
        NodeKind::Subject,
        NodeKind::Chapter,
        NodeKind::Section,
        NodeKind::Concept,
    ];

    /// The class name used in schema text and the persisted graph.
    pub fn local_name(self) -> &'static str {
        match self {
            NodeKind::Subject => "Subject",
            NodeKind::Chapter => "Chapter",
            NodeKind::Section => "Section",
            NodeKind::Concept => "Concept",
        }
    }

    /// Id prefix and zero-pad width of the external id form.
    fn id_shape(self) -> (&'static str, usize) {
        match self {
            NodeKind::Subject => ("Sub", 2),
            NodeKind::Chapter => ("Chap", 3),
            NodeKind::Section => ("Sec", 3),
            NodeKind::Concept => ("Con", 4),
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.local_name())
    }
}

impl FromStr for NodeKind {
    type Err = NodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Subject" => Ok(NodeKind::Subject),
            "Chapter" => Ok(NodeKind::Chapter),
            "Section" => Ok(NodeKind::Section),
            "Concept" => Ok(NodeKind::Concept),
            other => Err(NodeError::UnknownKind { kind: other.into() }),
        }
    }
}

/// Unique identifier for a node: kind plus per-kind index (starting at 1).
///
/// Ids are assigned only by the store, in encounter order, and are never
/// reused even if a node were later removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId {
    kind: NodeKind,
    index: u32,
}

impl NodeId {
    pub(crate) fn new(kind: NodeKind, index: u32) -> Self {
        debug_assert!(index > 0, "node indices start at 1");
        Self { kind, index }
    }

    pub fn kind(self) -> NodeKind {
        self.kind
    }

    pub fn index(self) -> u32 {
        self.index
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (prefix, width) = self.kind.id_shape();
        write!(f, "{prefix}_{:0width$}", self.index)
    }
}

impl FromStr for NodeId {
    type Err = NodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || NodeError::InvalidId { id: s.into() };
        let (prefix, digits) = s.split_once('_').ok_or_else(invalid)?;
        let kind = match prefix {
            "Sub" => NodeKind::Subject,
            "Chap" => NodeKind::Chapter,
            "Sec" => NodeKind::Section,
            "Con" => NodeKind::Concept,
            _ => return Err(invalid()),
        };
        let index: u32 = digits.parse().map_err(|_| invalid())?;
        if index == 0 {
            return Err(invalid());
        }
        Ok(NodeId::new(kind, index))
    }
}

/// Data carried by a node: human-readable label, optional comment, and
/// kind-specific scalar attributes (`grade`, `classification` on Subjects).
///
/// Labels are not guaranteed unique, and a node without a label cannot be
/// resolved by the linkers — only reached by id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeData {
    pub label: Option<String>,
    pub comment: Option<String>,
    pub attrs: BTreeMap<String, String>,
}

impl NodeData {
    /// Node data with just a label.
    pub fn labeled(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_display_is_zero_padded() {
        assert_eq!(NodeId::new(NodeKind::Subject, 1).to_string(), "Sub_01");
        assert_eq!(NodeId::new(NodeKind::Chapter, 12).to_string(), "Chap_012");
        assert_eq!(NodeId::new(NodeKind::Section, 3).to_string(), "Sec_003");
        assert_eq!(NodeId::new(NodeKind::Concept, 42).to_string(), "Con_0042");
    }

    #[test]
    fn id_round_trips_through_text() {
        for id in [
            NodeId::new(NodeKind::Subject, 7),
            NodeId::new(NodeKind::Chapter, 101),
            NodeId::new(NodeKind::Section, 55),
            NodeId::new(NodeKind::Concept, 1234),
        ] {
            let parsed: NodeId = id.to_string().parse().unwrap();
            assert_eq!(parsed, id);
        }
    }

    #[test]
    fn id_parse_rejects_garbage() {
        assert!("Sub01".parse::<NodeId>().is_err());
        assert!("Foo_01".parse::<NodeId>().is_err());
        assert!("Con_".parse::<NodeId>().is_err());
        assert!("Con_0000".parse::<NodeId>().is_err());
        assert!("Con_-1".parse::<NodeId>().is_err());
    }

    #[test]
    fn kind_is_a_closed_set() {
        assert_eq!("Section".parse::<NodeKind>().unwrap(), NodeKind::Section);
        assert!("Topic".parse::<NodeKind>().is_err());
        assert!("subject".parse::<NodeKind>().is_err());
    }

    #[test]
    fn kind_ordering_follows_hierarchy() {
        assert!(NodeKind::Subject < NodeKind::Chapter);
        assert!(NodeKind::Section < NodeKind::Concept);
    }
}
