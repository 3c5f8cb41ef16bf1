//! Whole-graph persistence in a Turtle subset.
//!
//! The persisted form is the same shape the curriculum has always lived in:
//! one block per node (`:Con_0001 a :Concept ; rdfs:label "…" .`) followed by
//! one statement per edge. The writer is deterministic (nodes in id order,
//! edges sorted), so an unchanged graph saves byte-identically.
//!
//! The reader accepts exactly that subset — prefix directives, `a` type
//! declarations, `rdfs:label`/`rdfs:comment`, namespace-local attribute and
//! relation predicates, and quoted literals with `\"`, `\\`, `\n`, `\t`
//! escapes. Anything else is a [`StoreError::Parse`] with a line number, and
//! a parse failure rejects the whole document: loading never yields a
//! partially filled graph.

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::StoreError;
use crate::graph::schema::NAMESPACE;
use crate::graph::{CurriculumGraph, Relation};
use crate::node::{NodeData, NodeId, NodeKind};

/// Result type for persistence operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out
}

/// Serialize the graph to Turtle text.
pub fn save(graph: &CurriculumGraph) -> String {
    let mut out = String::new();
    out.push_str(&format!("@prefix : <{NAMESPACE}> .\n"));
    out.push_str("@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .\n\n");

    for kind in NodeKind::ALL {
        let mut ids: Vec<NodeId> = graph.nodes_of_kind(kind).to_vec();
        ids.sort_unstable();
        for id in ids {
            out.push_str(&format!(":{id} a :{}", kind.local_name()));
            if let Some(label) = graph.label_of(id) {
                out.push_str(&format!(" ;\n    rdfs:label \"{}\"", escape(label)));
            }
            if let Some(comment) = graph.comment_of(id) {
                out.push_str(&format!(" ;\n    rdfs:comment \"{}\"", escape(comment)));
            }
            for (key, value) in graph.attrs_of(id) {
                out.push_str(&format!(" ;\n    :{key} \"{}\"", escape(value)));
            }
            out.push_str(" .\n");
        }
    }
    out.push('\n');

    for relation in Relation::ALL {
        let mut pairs = graph.edges_of(relation).to_vec();
        pairs.sort_unstable();
        for (source, target) in pairs {
            out.push_str(&format!(":{source} :{} :{target} .\n", relation.local_name()));
        }
    }

    out
}

/// Serialize the graph to a file.
pub fn save_to(graph: &CurriculumGraph, path: &Path) -> StoreResult<()> {
    std::fs::write(path, save(graph)).map_err(|source| StoreError::Io { source })
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    /// A prefixed name (`:Sub_01`, `rdfs:label`) or the keyword `a`.
    Name(String),
    /// A quoted literal, unescaped.
    Literal(String),
    Semi,
    Dot,
}

fn parse_err(line: usize, message: impl Into<String>) -> StoreError {
    StoreError::Parse {
        line,
        message: message.into(),
    }
}

/// Tokenize Turtle text, tracking line numbers. Prefix directives are
/// validated and consumed here.
fn tokenize(text: &str) -> StoreResult<Vec<(usize, Token)>> {
    let mut tokens = Vec::new();
    let mut chars = text.chars().peekable();
    let mut line = 1usize;

    while let Some(&ch) = chars.peek() {
        match ch {
            '\n' => {
                line += 1;
                chars.next();
            }
            c if c.is_whitespace() => {
                chars.next();
            }
            '#' => {
                // Comment to end of line.
                for c in chars.by_ref() {
                    if c == '\n' {
                        line += 1;
                        break;
                    }
                }
            }
            '@' => {
                // @prefix pfx: <iri> . — the IRI itself contains dots, so
                // the terminating '.' only counts after the closing '>'.
                let start = line;
                let mut directive = String::new();
                let mut iri_closed = false;
                let mut terminated = false;
                for c in chars.by_ref() {
                    if c == '\n' {
                        line += 1;
                    }
                    if c == '.' && iri_closed {
                        terminated = true;
                        break;
                    }
                    if c == '>' {
                        iri_closed = true;
                    }
                    directive.push(c);
                }
                if !terminated || !directive.starts_with("@prefix") {
                    return Err(parse_err(start, format!("unsupported directive: {}", directive.trim())));
                }
            }
            '"' => {
                chars.next();
                let start = line;
                let mut literal = String::new();
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            Some('"') => literal.push('"'),
                            Some('\\') => literal.push('\\'),
                            Some('n') => literal.push('\n'),
                            Some('t') => literal.push('\t'),
                            other => {
                                return Err(parse_err(
                                    line,
                                    format!("unsupported escape: \\{}", other.map(String::from).unwrap_or_default()),
                                ));
                            }
                        },
                        Some('\n') => return Err(parse_err(start, "unterminated string literal")),
                        Some(c) => literal.push(c),
                        None => return Err(parse_err(start, "unterminated string literal")),
                    }
                }
                tokens.push((start, Token::Literal(literal)));
            }
            ';' => {
                chars.next();
                tokens.push((line, Token::Semi));
            }
            '.' => {
                chars.next();
                tokens.push((line, Token::Dot));
            }
            _ => {
                let mut word = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_whitespace() || c == ';' || c == '.' || c == '"' || c == '#' {
                        break;
                    }
                    word.push(c);
                    chars.next();
                }
                tokens.push((line, Token::Name(word)));
            }
        }
    }

    Ok(tokens)
}

/// One parsed statement: subject plus `;`-chained (predicate, object) pairs.
struct Statement {
    line: usize,
    subject: String,
    clauses: Vec<(String, Token)>,
}

fn parse_statements(tokens: &[(usize, Token)]) -> StoreResult<Vec<Statement>> {
    let mut statements = Vec::new();
    let mut iter = tokens.iter().peekable();

    while let Some((line, token)) = iter.next() {
        let Token::Name(subject) = token else {
            return Err(parse_err(*line, "expected a subject name"));
        };
        let mut statement = Statement {
            line: *line,
            subject: subject.clone(),
            clauses: Vec::new(),
        };

        loop {
            let Some((pline, ptoken)) = iter.next() else {
                return Err(parse_err(*line, "statement not terminated by '.'"));
            };
            let Token::Name(predicate) = ptoken else {
                return Err(parse_err(*pline, "expected a predicate name"));
            };
            let Some((oline, otoken)) = iter.next() else {
                return Err(parse_err(*pline, "predicate without object"));
            };
            let object = match otoken {
                Token::Name(_) | Token::Literal(_) => otoken.clone(),
                _ => return Err(parse_err(*oline, "expected an object term")),
            };
            statement.clauses.push((predicate.clone(), object));

            match iter.next() {
                Some((_, Token::Semi)) => continue,
                Some((_, Token::Dot)) => break,
                Some((eline, _)) => return Err(parse_err(*eline, "expected ';' or '.'")),
                None => return Err(parse_err(*line, "statement not terminated by '.'")),
            }
        }

        statements.push(statement);
    }

    Ok(statements)
}

fn local_name<'a>(name: &'a str, line: usize) -> StoreResult<&'a str> {
    name.strip_prefix(':')
        .ok_or_else(|| parse_err(line, format!("expected a ':'-prefixed name, got '{name}'")))
}

fn node_id(name: &str, line: usize) -> StoreResult<NodeId> {
    local_name(name, line)?
        .parse::<NodeId>()
        .map_err(|e| parse_err(line, e.to_string()))
}

/// Parse Turtle text into a fresh graph.
pub fn load(text: &str) -> StoreResult<CurriculumGraph> {
    let tokens = tokenize(text)?;
    let statements = parse_statements(&tokens)?;

    // First pass: collect node declarations and scalars.
    let mut nodes: BTreeMap<NodeId, (usize, NodeData)> = BTreeMap::new();
    let mut declared: BTreeMap<NodeId, NodeKind> = BTreeMap::new();
    let mut edges: Vec<(usize, NodeId, Relation, NodeId)> = Vec::new();

    for statement in &statements {
        let id = node_id(&statement.subject, statement.line)?;
        let entry = &mut nodes.entry(id).or_insert_with(|| (statement.line, NodeData::default())).1;

        for (predicate, object) in &statement.clauses {
            match (predicate.as_str(), object) {
                ("a", Token::Name(class)) => {
                    let kind: NodeKind = local_name(class, statement.line)?
                        .parse()
                        .map_err(|e: crate::error::NodeError| parse_err(statement.line, e.to_string()))?;
                    if kind != id.kind() {
                        return Err(parse_err(
                            statement.line,
                            format!("{id} declared as {kind}, but its id prefix says {}", id.kind()),
                        ));
                    }
                    if declared.insert(id, kind).is_some() {
                        return Err(parse_err(statement.line, format!("{id} is declared twice")));
                    }
                }
                ("rdfs:label", Token::Literal(value)) => entry.label = Some(value.clone()),
                ("rdfs:comment", Token::Literal(value)) => entry.comment = Some(value.clone()),
                (_, Token::Name(target)) => {
                    let relation: Relation = local_name(predicate, statement.line)?
                        .parse()
                        .map_err(|e: crate::error::NodeError| parse_err(statement.line, e.to_string()))?;
                    edges.push((statement.line, id, relation, node_id(target, statement.line)?));
                }
                (_, Token::Literal(value)) => {
                    let key = local_name(predicate, statement.line)?;
                    entry.attrs.insert(key.to_owned(), value.clone());
                }
                (_, _) => return Err(parse_err(statement.line, "unsupported clause")),
            }
        }
    }

    // Every referenced node needs a type declaration.
    let mut graph = CurriculumGraph::new();
    for (id, (line, data)) in nodes {
        if !declared.contains_key(&id) {
            return Err(parse_err(line, format!("{id} is used but never declared with 'a'")));
        }
        graph
            .restore_node(id, data)
            .map_err(|e| parse_err(line, e.to_string()))?;
    }

    for (line, source, relation, target) in edges {
        graph
            .add_edge(source, relation, target)
            .map_err(|e| parse_err(line, e.to_string()))?;
    }

    Ok(graph)
}

/// Load a graph from a file.
pub fn load_from(path: &Path) -> StoreResult<CurriculumGraph> {
    let text = std::fs::read_to_string(path).map_err(|source| StoreError::Io { source })?;
    load(&text)
}
