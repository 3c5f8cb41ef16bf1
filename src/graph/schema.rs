//! Schema introspection: render the store's classes and properties as text.
//!
//! The output is consumed verbatim as prompt context by the external
//! reasoning collaborator, whose behavior is tuned against this exact shape
//! (prefix block, `Classes:` block, `Properties (with Domain & Range):`
//! block). Everything is sorted, never insertion-ordered, so the text is
//! byte-identical across runs on the same store.

use std::collections::{BTreeMap, BTreeSet};

use crate::node::NodeKind;

use super::{CurriculumGraph, Relation};

/// IRI namespace for curriculum nodes and properties.
pub const NAMESPACE: &str = "http://curricle.dev/curriculum/";

/// Describe the graph's schema as deterministic plain text.
pub fn describe_schema(graph: &CurriculumGraph) -> String {
    let mut out = String::from("### Ontology Schema Information ###\n\n");

    out.push_str("Prefixes:\n");
    out.push_str(&format!("@prefix : <{NAMESPACE}> .\n"));
    out.push_str("@prefix owl: <http://www.w3.org/2002/07/owl#> .\n");
    out.push_str("@prefix rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#> .\n");
    out.push_str("@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .\n");
    out.push_str("@prefix xsd: <http://www.w3.org/2001/XMLSchema#> .\n\n");

    out.push_str("Classes:\n");
    let mut classes: Vec<&str> = NodeKind::ALL.iter().map(|k| k.local_name()).collect();
    classes.sort_unstable();
    for class in classes {
        out.push_str(&format!("- :{class}\n"));
    }
    out.push('\n');

    out.push_str("Properties (with Domain & Range):\n");

    // Object properties: the closed relation set, name-sorted.
    let mut relations: Vec<Relation> = Relation::ALL.to_vec();
    relations.sort_by_key(|r| r.local_name());
    for rel in relations {
        let domain = rel
            .domain()
            .map(|k| format!(":{}", k.local_name()))
            .unwrap_or_else(|| ":Unknown".into());
        let range = rel
            .range()
            .map(|k| format!(":{}", k.local_name()))
            .unwrap_or_else(|| ":Unknown".into());
        out.push_str(&format!("- :{} (ObjectProperty)\n", rel.local_name()));
        out.push_str(&format!(
            "  Domain: {domain} -> Range: {range}  # {}\n",
            rel.comment()
        ));
    }

    // Datatype properties: the scalar attribute keys actually present,
    // name-sorted, with the domain resolved from the carrying nodes.
    for (key, kinds) in attribute_domains(graph) {
        let domain = if kinds.len() == 1 {
            format!(":{}", kinds.iter().next().expect("non-empty").local_name())
        } else {
            ":Unknown".into()
        };
        out.push_str(&format!("- :{key} (DatatypeProperty)\n"));
        out.push_str(&format!("  Domain: {domain} -> Range: xsd:string\n"));
    }

    out
}

/// Attribute key → set of node kinds carrying it.
fn attribute_domains(graph: &CurriculumGraph) -> BTreeMap<String, BTreeSet<NodeKind>> {
    let mut domains: BTreeMap<String, BTreeSet<NodeKind>> = BTreeMap::new();
    for id in graph.nodes() {
        for key in graph.attrs_of(id).keys() {
            domains.entry(key.clone()).or_default().insert(id.kind());
        }
    }
    domains
}
