//! # curricle
//!
//! A typed curriculum knowledge graph for Korean high-school mathematics:
//! Subjects contain Chapters, Chapters contain Sections, Sections contain
//! Concepts, and a `prerequisiteOf` relation cuts across the tree.
//!
//! ## Architecture
//!
//! - **Graph store** (`graph`): petgraph-backed typed store with label,
//!   roster, and relation indices
//! - **Importers** (`import`): hierarchy documents, curated prerequisite
//!   pairs, freeform arrow additions, subject properties
//! - **Query** (`graph::query`): triple patterns with OPTIONAL groups,
//!   regex filters, DISTINCT and ORDER BY
//! - **Expansion** (`graph::expand`): label set → structural ancestor closure
//! - **Persistence** (`turtle`): deterministic Turtle subset, strict reader
//! - **Reports** (`export`): editable hierarchy report, prerequisite listing
//!
//! ## Library usage
//!
//! ```no_run
//! use curricle::graph::CurriculumGraph;
//! use curricle::import::hierarchy::{HierarchyFormat, import_hierarchy};
//! use curricle::import::additions::link_additions;
//!
//! let mut graph = CurriculumGraph::new();
//! let text = std::fs::read_to_string("curriculum.txt").unwrap();
//! import_hierarchy(&mut graph, &text, HierarchyFormat::Marker);
//! link_additions(&mut graph, "- 급수 -> 이계도함수\n");
//! println!("{}", curricle::export::hierarchy_report(&graph));
//! ```

pub mod error;
pub mod export;
pub mod graph;
pub mod import;
pub mod node;
pub mod turtle;
