//! Diagnostic error types for the curricle engine.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]`
//! derives, providing error codes and help text so operators know exactly
//! what went wrong and how to fix it. Batch tools (importer, linkers) do not
//! use these for per-line problems — those are recoverable and accumulate as
//! report diagnostics instead.

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for the curricle engine.
///
/// Each variant wraps a subsystem-specific error, preserving the full
/// diagnostic chain (error codes, help text) through to the user.
#[derive(Debug, Error, Diagnostic)]
pub enum CurricleError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Node(#[from] NodeError),
}

// ---------------------------------------------------------------------------
// Graph errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum GraphError {
    #[error("dangling reference: {role} node {id} does not exist")]
    #[diagnostic(
        code(curricle::graph::dangling),
        help(
            "Both endpoints of an edge must already exist in the store. \
             Create the node first (importer) or check the id."
        )
    )]
    DanglingReference {
        /// Which endpoint was missing: "source" or "target".
        role: &'static str,
        id: String,
    },

    #[error("structural conflict: {child} already has parent {existing} via {relation}")]
    #[diagnostic(
        code(curricle::graph::structural_conflict),
        help(
            "Structural edges form a strict forest: every chapter, section and \
             concept has exactly one parent. Remove the line that re-parents \
             this node from the source document."
        )
    )]
    StructuralConflict {
        child: String,
        existing: String,
        relation: String,
    },

    #[error("kind mismatch: {relation} expects {expected} {role}, got {actual}")]
    #[diagnostic(
        code(curricle::graph::kind_mismatch),
        help(
            "Structural relations have a fixed domain and range \
             (Subject-hasChapter-Chapter, Chapter-hasSection-Section, \
             Section-hasConcept-Concept)."
        )
    )]
    KindMismatch {
        relation: String,
        role: &'static str,
        expected: String,
        actual: String,
    },

    #[error("duplicate node id: {id} is already present in the store")]
    #[diagnostic(
        code(curricle::graph::duplicate_id),
        help("Node ids are unique and never reused. The loaded document declares this id twice.")
    )]
    DuplicateId { id: String },
}

// ---------------------------------------------------------------------------
// Node / identifier errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum NodeError {
    #[error("unknown node kind: {kind}")]
    #[diagnostic(
        code(curricle::node::unknown_kind),
        help("Valid node kinds are: Subject, Chapter, Section, Concept.")
    )]
    UnknownKind { kind: String },

    #[error("invalid node id: {id}")]
    #[diagnostic(
        code(curricle::node::invalid_id),
        help(
            "Node ids look like Sub_01, Chap_001, Sec_001 or Con_0001: \
             a kind prefix, an underscore and a positive index."
        )
    )]
    InvalidId { id: String },

    #[error("unknown relation: {relation}")]
    #[diagnostic(
        code(curricle::node::unknown_relation),
        help("Valid relations are: hasChapter, hasSection, hasConcept, prerequisiteOf.")
    )]
    UnknownRelation { relation: String },
}

// ---------------------------------------------------------------------------
// Store (persistence) errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum StoreError {
    #[error("I/O error: {source}")]
    #[diagnostic(
        code(curricle::store::io),
        help(
            "A filesystem operation failed. Check that the graph file path \
             exists, has correct permissions, and that the disk is not full."
        )
    )]
    Io {
        #[source]
        source: std::io::Error,
    },

    #[error("parse error at line {line}: {message}")]
    #[diagnostic(
        code(curricle::store::parse),
        help(
            "The graph file is not valid curricle Turtle. Loading rejects the \
             whole document rather than keeping a partial graph; fix the \
             reported line and reload."
        )
    )]
    Parse { line: usize, message: String },
}

// ---------------------------------------------------------------------------
// Query errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum QueryError {
    #[error("malformed query: {message}")]
    #[diagnostic(
        code(curricle::query::malformed),
        help(
            "Every variable used in SELECT, ORDER BY or a FILTER must appear \
             in at least one triple pattern. Query text ultimately comes from \
             an unreliable generator, so this is surfaced as an empty result \
             with a reason, never a crash."
        )
    )]
    Malformed { message: String },

    #[error("invalid filter regex for ?{var}: {message}")]
    #[diagnostic(
        code(curricle::query::bad_regex),
        help(
            "Filters are case-insensitive regular expressions, typically an \
             alternation of literal terms."
        )
    )]
    BadRegex { var: String, message: String },
}

/// Convenience alias for functions returning curricle results.
pub type CurricleResult<T> = std::result::Result<T, CurricleError>;
