//! Pattern-matching query evaluation over the curriculum graph.
//!
//! A [`Query`] is the structured equivalent of the SPARQL subset the external
//! reasoning collaborator emits: a conjunction of triple patterns, zero or
//! more OPTIONAL pattern groups, case-insensitive regex FILTERs, DISTINCT
//! projection and ORDER BY. Queries arrive as data (typically JSON), are
//! validated and compiled once — filter regexes included — and can then be
//! evaluated against any snapshot.
//!
//! Evaluation is an incremental join: each mandatory pattern extends the
//! current partial bindings through whichever store index matches its bound
//! terms, filters prune as soon as their variable is bound, and OPTIONAL
//! groups extend rows without ever eliminating them. Malformed queries fail
//! at compile time with a reason; evaluation itself cannot panic, because
//! query text ultimately originates from an unreliable generator.

use std::collections::{BTreeMap, HashMap, HashSet};

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::error::QueryError;
use crate::node::{NodeId, NodeKind};

use super::{CurriculumGraph, Relation};

/// A subject or object position in a triple pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Term {
    /// A variable, named without the leading `?`.
    Var(String),
    /// A bound node id.
    Node(NodeId),
    /// A literal string (label text, attribute value, or a class name when
    /// used as the object of a `kind` pattern).
    Text(String),
}

impl Term {
    pub fn var(name: impl Into<String>) -> Self {
        Term::Var(name.into())
    }

    pub fn text(value: impl Into<String>) -> Self {
        Term::Text(value.into())
    }
}

/// The predicate position of a triple pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternRel {
    /// `rdf:type` — the object is a class (kind).
    Kind,
    /// `rdfs:label`.
    Label,
    /// `rdfs:comment`.
    Comment,
    /// A scalar attribute such as `grade` or `classification`.
    Attr(String),
    /// A graph relation.
    Rel(Relation),
}

/// One triple pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriplePattern {
    pub subject: Term,
    pub rel: PatternRel,
    pub object: Term,
}

impl TriplePattern {
    pub fn new(subject: Term, rel: PatternRel, object: Term) -> Self {
        Self { subject, rel, object }
    }

    fn vars(&self) -> impl Iterator<Item = &str> {
        [&self.subject, &self.object]
            .into_iter()
            .filter_map(|t| match t {
                Term::Var(name) => Some(name.as_str()),
                _ => None,
            })
    }
}

/// A regex filter over one variable's stringified value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    /// Variable name, without the leading `?`.
    pub var: String,
    /// Case-insensitive pattern, typically an alternation of literal terms
    /// such as `"미분|적분"`.
    pub regex: String,
}

/// A pattern query: the structured form of the supported SPARQL subset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    /// Mandatory patterns, joined in order.
    pub patterns: Vec<TriplePattern>,
    /// OPTIONAL groups: each inner vector is one OPTIONAL block, matched as a
    /// conjunction. A group that fails to match leaves its variables unbound
    /// instead of eliminating the row.
    #[serde(default)]
    pub optional: Vec<Vec<TriplePattern>>,
    #[serde(default)]
    pub filters: Vec<Filter>,
    /// Projected variable names.
    pub select: Vec<String>,
    #[serde(default)]
    pub distinct: bool,
    #[serde(default)]
    pub order_by: Vec<String>,
}

/// One result row: projected variable name → stringified value, or `None`
/// for variables left unbound by a failed OPTIONAL.
pub type Row = BTreeMap<String, Option<String>>;

/// Result of lenient evaluation: rows, or nothing plus the reason.
#[derive(Debug, Clone, Serialize)]
pub struct QueryOutcome {
    pub rows: Vec<Row>,
    /// Present when the query was rejected; the rows are then empty.
    pub reason: Option<String>,
}

impl Query {
    /// Validate the query and precompile its filters.
    ///
    /// Every variable referenced by SELECT, ORDER BY or a FILTER must occur
    /// in at least one pattern, and ORDER BY keys must also be projected
    /// (rows carry only SELECT variables, so an unprojected sort key would
    /// silently not sort). Anything else is a [`QueryError::Malformed`].
    pub fn compile(&self) -> Result<CompiledQuery, QueryError> {
        if self.select.is_empty() {
            return Err(QueryError::Malformed {
                message: "SELECT projects no variables".into(),
            });
        }
        if self.patterns.is_empty() && self.optional.is_empty() {
            return Err(QueryError::Malformed {
                message: "query has no triple patterns".into(),
            });
        }

        let mut known: HashSet<&str> = HashSet::new();
        for pattern in self.patterns.iter().chain(self.optional.iter().flatten()) {
            known.extend(pattern.vars());
        }

        for var in self
            .select
            .iter()
            .chain(self.order_by.iter())
            .chain(self.filters.iter().map(|f| &f.var))
        {
            if !known.contains(var.as_str()) {
                return Err(QueryError::Malformed {
                    message: format!("?{var} does not occur in any pattern"),
                });
            }
        }

        for var in &self.order_by {
            if !self.select.contains(var) {
                return Err(QueryError::Malformed {
                    message: format!("ORDER BY ?{var} is not in SELECT"),
                });
            }
        }

        let mut filters = Vec::with_capacity(self.filters.len());
        for filter in &self.filters {
            let regex = RegexBuilder::new(&filter.regex)
                .case_insensitive(true)
                .build()
                .map_err(|e| QueryError::BadRegex {
                    var: filter.var.clone(),
                    message: e.to_string(),
                })?;
            filters.push(CompiledFilter {
                var: filter.var.clone(),
                regex,
            });
        }

        Ok(CompiledQuery {
            query: self.clone(),
            filters,
        })
    }
}

/// Evaluate a query, surfacing rejection as an empty result plus a reason
/// string instead of an error. This is the serving-time entry point: the
/// query author is a text generator, so a bad query must never crash the
/// store or abort the request.
pub fn evaluate_lenient(graph: &CurriculumGraph, query: &Query) -> QueryOutcome {
    match query.compile() {
        Ok(compiled) => QueryOutcome {
            rows: compiled.evaluate(graph),
            reason: None,
        },
        Err(err) => QueryOutcome {
            rows: Vec::new(),
            reason: Some(err.to_string()),
        },
    }
}

#[derive(Debug)]
struct CompiledFilter {
    var: String,
    regex: Regex,
}

/// A validated query with precompiled filter predicates.
#[derive(Debug)]
pub struct CompiledQuery {
    query: Query,
    filters: Vec<CompiledFilter>,
}

/// A value a variable can be bound to during evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Value {
    Node(NodeId),
    Kind(NodeKind),
    Text(String),
}

type Binding = HashMap<String, Value>;

impl CompiledQuery {
    /// Run the query against a graph, producing projected, deduplicated,
    /// ordered rows.
    pub fn evaluate(&self, graph: &CurriculumGraph) -> Vec<Row> {
        let mut bindings: Vec<Binding> = vec![Binding::new()];

        for pattern in &self.query.patterns {
            let mut extended = Vec::new();
            for binding in &bindings {
                extended.extend(match_pattern(graph, pattern, binding));
            }
            // Prune as soon as a filter's variable is bound.
            extended.retain(|b| self.filters_pass(graph, b));
            bindings = extended;
            if bindings.is_empty() {
                return Vec::new();
            }
        }

        for group in &self.query.optional {
            let mut extended = Vec::new();
            for binding in &bindings {
                let mut matches = vec![binding.clone()];
                for pattern in group {
                    let mut next = Vec::new();
                    for b in &matches {
                        next.extend(match_pattern(graph, pattern, b));
                    }
                    matches = next;
                    if matches.is_empty() {
                        break;
                    }
                }
                matches.retain(|b| self.filters_pass(graph, b));
                if matches.is_empty() {
                    // No match: the row survives with the group's variables
                    // left unbound.
                    extended.push(binding.clone());
                } else {
                    extended.extend(matches);
                }
            }
            bindings = extended;
        }

        let mut rows: Vec<Row> = bindings
            .iter()
            .map(|binding| {
                self.query
                    .select
                    .iter()
                    .map(|var| {
                        let value = binding.get(var).map(|v| value_string(graph, v));
                        (var.clone(), value)
                    })
                    .collect()
            })
            .collect();

        if self.query.distinct {
            rows.sort_unstable();
            rows.dedup();
        }

        if !self.query.order_by.is_empty() {
            rows.sort_by(|a, b| {
                for var in &self.query.order_by {
                    let ord = a.get(var).cmp(&b.get(var));
                    if ord != std::cmp::Ordering::Equal {
                        return ord;
                    }
                }
                a.cmp(b)
            });
        }

        rows
    }

    /// Check every filter whose variable is bound in this binding. A filter
    /// over a still-unbound variable passes: either its pattern has not been
    /// joined yet, or its OPTIONAL failed, which must not eliminate the row.
    fn filters_pass(&self, graph: &CurriculumGraph, binding: &Binding) -> bool {
        self.filters.iter().all(|filter| match binding.get(&filter.var) {
            Some(value) => filter.regex.is_match(&value_string(graph, value)),
            None => true,
        })
    }
}

/// Stringify a bound value for filters, projection and ordering. Nodes render
/// as their label when they have one, falling back to the stable external id.
fn value_string(graph: &CurriculumGraph, value: &Value) -> String {
    match value {
        Value::Node(id) => graph
            .label_of(*id)
            .map(str::to_owned)
            .unwrap_or_else(|| id.to_string()),
        Value::Kind(kind) => kind.local_name().to_owned(),
        Value::Text(text) => text.clone(),
    }
}

/// Resolve a term under a binding: either an already-fixed value or the name
/// of a still-unbound variable.
enum Resolved<'a> {
    Bound(Value),
    Unbound(&'a str),
}

fn resolve<'a>(term: &'a Term, binding: &Binding) -> Resolved<'a> {
    match term {
        Term::Var(name) => match binding.get(name) {
            Some(value) => Resolved::Bound(value.clone()),
            None => Resolved::Unbound(name),
        },
        Term::Node(id) => Resolved::Bound(Value::Node(*id)),
        Term::Text(text) => Resolved::Bound(Value::Text(text.clone())),
    }
}

/// Attempt to extend `binding` so that `term` takes `value`. `None` means the
/// candidate conflicts with an existing binding or a bound term.
fn unify(binding: &Binding, term: &Term, value: Value) -> Option<Binding> {
    match resolve(term, binding) {
        Resolved::Unbound(name) => {
            let mut next = binding.clone();
            next.insert(name.to_owned(), value);
            Some(next)
        }
        Resolved::Bound(existing) => values_match(&existing, &value).then(|| binding.clone()),
    }
}

/// Value equality, with one widening: a literal class name matches the
/// corresponding kind, so `(?x, kind, "Concept")` works as written.
fn values_match(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Text(text), Value::Kind(kind)) | (Value::Kind(kind), Value::Text(text)) => {
            text == kind.local_name()
        }
        _ => a == b,
    }
}

/// All consistent extensions of `binding` through one pattern, using the
/// store index that matches the pattern's bound terms.
fn match_pattern(graph: &CurriculumGraph, pattern: &TriplePattern, binding: &Binding) -> Vec<Binding> {
    match &pattern.rel {
        PatternRel::Rel(relation) => match_relation(graph, pattern, *relation, binding),
        PatternRel::Kind => match_kind(graph, pattern, binding),
        PatternRel::Label => {
            match_scalar(graph, pattern, binding, |g, id| g.label_of(id), true)
        }
        PatternRel::Comment => {
            match_scalar(graph, pattern, binding, |g, id| g.comment_of(id), false)
        }
        PatternRel::Attr(key) => match_scalar(
            graph,
            pattern,
            binding,
            |g, id| g.attrs_of(id).get(key.as_str()).map(String::as_str),
            false,
        ),
    }
}

fn match_relation(
    graph: &CurriculumGraph,
    pattern: &TriplePattern,
    relation: Relation,
    binding: &Binding,
) -> Vec<Binding> {
    let subject = resolve(&pattern.subject, binding);
    let object = resolve(&pattern.object, binding);

    match (&subject, &object) {
        (Resolved::Bound(Value::Node(s)), _) => graph
            .objects_of(*s, relation)
            .into_iter()
            .filter_map(|t| unify(binding, &pattern.object, Value::Node(t)))
            .collect(),
        (Resolved::Unbound(_), Resolved::Bound(Value::Node(t))) => graph
            .subjects_of(relation, *t)
            .into_iter()
            .filter_map(|s| unify(binding, &pattern.subject, Value::Node(s)))
            .collect(),
        (Resolved::Unbound(_), Resolved::Unbound(_)) => {
            // Both ends open: walk the relation's scan index, not the node
            // roster.
            graph
                .edges_of(relation)
                .iter()
                .filter_map(|&(s, t)| {
                    let next = unify(binding, &pattern.subject, Value::Node(s))?;
                    unify(&next, &pattern.object, Value::Node(t))
                })
                .collect()
        }
        // A non-node value in a node position can never match.
        _ => Vec::new(),
    }
}

fn match_kind(graph: &CurriculumGraph, pattern: &TriplePattern, binding: &Binding) -> Vec<Binding> {
    match resolve(&pattern.subject, binding) {
        Resolved::Bound(Value::Node(id)) => {
            unify(binding, &pattern.object, Value::Kind(id.kind()))
                .into_iter()
                .collect()
        }
        Resolved::Bound(_) => Vec::new(),
        Resolved::Unbound(_) => {
            // Restrict the roster scan when the object already names a kind.
            let kinds: Vec<NodeKind> = match resolve(&pattern.object, binding) {
                Resolved::Bound(Value::Kind(kind)) => vec![kind],
                Resolved::Bound(Value::Text(name)) => match name.parse::<NodeKind>() {
                    Ok(kind) => vec![kind],
                    Err(_) => return Vec::new(),
                },
                Resolved::Bound(Value::Node(_)) => return Vec::new(),
                Resolved::Unbound(_) => NodeKind::ALL.to_vec(),
            };
            kinds
                .into_iter()
                .flat_map(|kind| {
                    graph.nodes_of_kind(kind).iter().filter_map(move |&id| {
                        let next = unify(binding, &pattern.subject, Value::Node(id))?;
                        unify(&next, &pattern.object, Value::Kind(kind))
                    })
                })
                .collect()
        }
    }
}

/// Match a pattern whose predicate is a node-scalar (label, comment or
/// attribute). `indexed` marks label, where an unbound subject with a literal
/// object goes through the label index instead of a node scan.
fn match_scalar<'g>(
    graph: &'g CurriculumGraph,
    pattern: &TriplePattern,
    binding: &Binding,
    scalar: impl Fn(&'g CurriculumGraph, NodeId) -> Option<&'g str>,
    indexed: bool,
) -> Vec<Binding> {
    match resolve(&pattern.subject, binding) {
        Resolved::Bound(Value::Node(id)) => match scalar(graph, id) {
            Some(text) => unify(binding, &pattern.object, Value::Text(text.to_owned()))
                .into_iter()
                .collect(),
            // A node without the scalar simply fails the pattern.
            None => Vec::new(),
        },
        Resolved::Bound(_) => Vec::new(),
        Resolved::Unbound(_) => {
            if indexed && let Resolved::Bound(Value::Text(wanted)) = resolve(&pattern.object, binding)
            {
                return graph
                    .resolve_label(&wanted, None)
                    .into_iter()
                    .filter_map(|id| unify(binding, &pattern.subject, Value::Node(id)))
                    .collect();
            }
            graph
                .nodes()
                .filter_map(|id| {
                    let text = scalar(graph, id)?;
                    let next = unify(binding, &pattern.subject, Value::Node(id))?;
                    unify(&next, &pattern.object, Value::Text(text.to_owned()))
                })
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 미적분 ─hasChapter→ 수열의 극한 ─hasSection→ 급수 ─hasConcept→ {급수의 합, 등비급수}
    /// plus a free-floating concept "행렬" with no structural parent.
    fn sample_graph() -> CurriculumGraph {
        let mut g = CurriculumGraph::new();
        let sub = g.add_node(NodeKind::Subject, Some("미적분"));
        let chap = g.add_node(NodeKind::Chapter, Some("수열의 극한"));
        let sec = g.add_node(NodeKind::Section, Some("급수"));
        let a = g.add_node(NodeKind::Concept, Some("급수의 합"));
        let b = g.add_node(NodeKind::Concept, Some("등비급수"));
        g.add_node(NodeKind::Concept, Some("행렬"));
        g.add_edge(sub, Relation::HasChapter, chap).unwrap();
        g.add_edge(chap, Relation::HasSection, sec).unwrap();
        g.add_edge(sec, Relation::HasConcept, a).unwrap();
        g.add_edge(sec, Relation::HasConcept, b).unwrap();
        g
    }

    fn concept_label_query() -> Query {
        Query {
            patterns: vec![
                TriplePattern::new(Term::var("x"), PatternRel::Kind, Term::text("Concept")),
                TriplePattern::new(Term::var("x"), PatternRel::Label, Term::var("label")),
            ],
            optional: vec![],
            filters: vec![],
            select: vec!["label".into()],
            distinct: true,
            order_by: vec!["label".into()],
        }
    }

    fn cell(row: &Row, var: &str) -> Option<String> {
        row.get(var).cloned().flatten()
    }

    #[test]
    fn kind_and_label_patterns_join() {
        let g = sample_graph();
        let rows = concept_label_query().compile().unwrap().evaluate(&g);
        let labels: Vec<_> = rows.iter().map(|r| cell(r, "label").unwrap()).collect();
        assert_eq!(labels, vec!["급수의 합", "등비급수", "행렬"]);
    }

    #[test]
    fn regex_filter_prunes_candidates() {
        let g = sample_graph();
        let mut query = concept_label_query();
        query.filters.push(Filter {
            var: "label".into(),
            regex: "급수|행렬".into(),
        });
        let rows = query.compile().unwrap().evaluate(&g);
        let labels: Vec<_> = rows.iter().map(|r| cell(r, "label").unwrap()).collect();
        assert_eq!(labels, vec!["급수의 합", "등비급수", "행렬"]);

        query.filters[0].regex = "행렬".into();
        let rows = query.compile().unwrap().evaluate(&g);
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn optional_failure_keeps_row_with_unbound_vars() {
        // The hierarchy lookup is OPTIONAL, as in the generated query shape:
        // "행렬" has no section, so its row keeps ?subject unbound.
        let g = sample_graph();
        let query = Query {
            patterns: vec![
                TriplePattern::new(Term::var("x"), PatternRel::Kind, Term::text("Concept")),
                TriplePattern::new(Term::var("x"), PatternRel::Label, Term::var("label")),
            ],
            optional: vec![vec![
                TriplePattern::new(Term::var("sec"), PatternRel::Rel(Relation::HasConcept), Term::var("x")),
                TriplePattern::new(Term::var("chap"), PatternRel::Rel(Relation::HasSection), Term::var("sec")),
                TriplePattern::new(Term::var("sub"), PatternRel::Rel(Relation::HasChapter), Term::var("chap")),
                TriplePattern::new(Term::var("sub"), PatternRel::Label, Term::var("subject")),
            ]],
            filters: vec![],
            select: vec!["label".into(), "subject".into()],
            distinct: true,
            order_by: vec!["label".into()],
        };
        let rows = query.compile().unwrap().evaluate(&g);
        assert_eq!(rows.len(), 3);

        let matrix = rows.iter().find(|r| cell(r, "label").as_deref() == Some("행렬")).unwrap();
        assert_eq!(cell(matrix, "subject"), None);

        let series = rows.iter().find(|r| cell(r, "label").as_deref() == Some("등비급수")).unwrap();
        assert_eq!(cell(series, "subject").as_deref(), Some("미적분"));
    }

    #[test]
    fn filter_is_case_insensitive() {
        let mut g = CurriculumGraph::new();
        g.add_node(NodeKind::Concept, Some("Taylor Series"));
        let mut query = concept_label_query();
        query.filters.push(Filter {
            var: "label".into(),
            regex: "taylor|매클로린".into(),
        });
        let rows = query.compile().unwrap().evaluate(&g);
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn two_unbound_variables_scan_the_relation_index() {
        let g = sample_graph();
        let query = Query {
            patterns: vec![TriplePattern::new(
                Term::var("sec"),
                PatternRel::Rel(Relation::HasConcept),
                Term::var("con"),
            )],
            optional: vec![],
            filters: vec![],
            select: vec!["sec".into(), "con".into()],
            distinct: true,
            order_by: vec!["con".into()],
        };
        let rows = query.compile().unwrap().evaluate(&g);
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| cell(r, "sec").as_deref() == Some("급수")));
    }

    #[test]
    fn bound_node_subject_uses_forward_index() {
        let g = sample_graph();
        let sec = g.resolve_label("급수", Some(NodeKind::Section))[0];
        let query = Query {
            patterns: vec![
                TriplePattern::new(Term::Node(sec), PatternRel::Rel(Relation::HasConcept), Term::var("con")),
                TriplePattern::new(Term::var("con"), PatternRel::Label, Term::var("label")),
            ],
            optional: vec![],
            filters: vec![],
            select: vec!["label".into()],
            distinct: false,
            order_by: vec!["label".into()],
        };
        let rows = query.compile().unwrap().evaluate(&g);
        let labels: Vec<_> = rows.iter().map(|r| cell(r, "label").unwrap()).collect();
        assert_eq!(labels, vec!["급수의 합", "등비급수"]);
    }

    #[test]
    fn distinct_dedups_full_rows() {
        let mut g = CurriculumGraph::new();
        let sec = g.add_node(NodeKind::Section, Some("함수"));
        let a = g.add_node(NodeKind::Concept, Some("일대일대응"));
        let b = g.add_node(NodeKind::Concept, Some("일대일대응"));
        g.add_edge(sec, Relation::HasConcept, a).unwrap();
        g.add_edge(sec, Relation::HasConcept, b).unwrap();

        let mut query = Query {
            patterns: vec![
                TriplePattern::new(Term::var("s"), PatternRel::Rel(Relation::HasConcept), Term::var("c")),
                TriplePattern::new(Term::var("c"), PatternRel::Label, Term::var("label")),
            ],
            optional: vec![],
            filters: vec![],
            select: vec!["label".into()],
            distinct: false,
            order_by: vec![],
        };
        assert_eq!(query.compile().unwrap().evaluate(&g).len(), 2);
        query.distinct = true;
        assert_eq!(query.compile().unwrap().evaluate(&g).len(), 1);
    }

    #[test]
    fn undeclared_projection_variable_is_malformed() {
        let mut query = concept_label_query();
        query.select.push("ghost".into());
        let err = query.compile().unwrap_err();
        assert!(matches!(err, QueryError::Malformed { .. }));
        assert!(err.to_string().contains("ghost"));
    }

    #[test]
    fn unprojected_order_key_is_malformed() {
        // ?x occurs in a pattern, but rows only carry SELECT variables, so
        // sorting on it could never do anything.
        let mut query = concept_label_query();
        query.order_by = vec!["x".into()];
        let err = query.compile().unwrap_err();
        assert!(err.to_string().contains("ORDER BY"));
    }

    #[test]
    fn lenient_evaluation_reports_reason_instead_of_failing() {
        let g = sample_graph();
        let mut query = concept_label_query();
        query.select = vec!["ghost".into()];
        let outcome = evaluate_lenient(&g, &query);
        assert!(outcome.rows.is_empty());
        assert!(outcome.reason.unwrap().contains("ghost"));
    }

    #[test]
    fn bad_filter_regex_is_rejected_at_compile() {
        let mut query = concept_label_query();
        query.filters.push(Filter {
            var: "label".into(),
            regex: "(unclosed".into(),
        });
        assert!(matches!(query.compile().unwrap_err(), QueryError::BadRegex { .. }));
    }

    #[test]
    fn attr_pattern_reads_subject_properties() {
        let mut g = CurriculumGraph::new();
        let sub = g.add_node(NodeKind::Subject, Some("공통수학1"));
        g.add_node(NodeKind::Subject, Some("미적분"));
        g.set_attr(sub, "grade", "1학년 1학기").unwrap();

        let query = Query {
            patterns: vec![
                TriplePattern::new(Term::var("s"), PatternRel::Attr("grade".into()), Term::var("g")),
                TriplePattern::new(Term::var("s"), PatternRel::Label, Term::var("label")),
            ],
            optional: vec![],
            filters: vec![],
            select: vec!["label".into(), "g".into()],
            distinct: false,
            order_by: vec![],
        };
        let rows = query.compile().unwrap().evaluate(&g);
        assert_eq!(rows.len(), 1);
        assert_eq!(cell(&rows[0], "label").as_deref(), Some("공통수학1"));
        assert_eq!(cell(&rows[0], "g").as_deref(), Some("1학년 1학기"));
    }

    #[test]
    fn query_round_trips_through_json() {
        let query = Query {
            patterns: vec![TriplePattern::new(
                Term::var("x"),
                PatternRel::Rel(Relation::PrerequisiteOf),
                Term::var("y"),
            )],
            optional: vec![],
            filters: vec![Filter {
                var: "x".into(),
                regex: "미분|적분".into(),
            }],
            select: vec!["x".into(), "y".into()],
            distinct: true,
            order_by: vec!["x".into()],
        };
        let json = serde_json::to_string(&query).unwrap();
        let back: Query = serde_json::from_str(&json).unwrap();
        assert_eq!(back, query);
    }
}
