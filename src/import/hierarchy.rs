//! Hierarchy importer: semi-structured text → curriculum graph.
//!
//! Two line formats are supported, matching the two document shapes the
//! curriculum arrives in:
//!
//! - [`HierarchyFormat::Marker`]: raw curriculum dumps where a chapter is
//!   marked `이름 (N단원)` and a section line carries its concepts after `#`
//!   delimiters.
//! - [`HierarchyFormat::Indented`]: the editable markdown report
//!   (`- Subject` / `  - Chapter` / `    - Section` / `      - #Concept`),
//!   classified by leading-whitespace width, with `#` marking concepts.
//!
//! Both formats run through a three-slot context (current subject, chapter,
//! section); entering a node at level L resets every slot below L. A child
//! line with no parent context is skipped with a diagnostic, never a fatal
//! error — the importer always finishes the document and reports counts.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use tracing::{debug, info};

use crate::graph::{CurriculumGraph, Relation};
use crate::node::{NodeId, NodeKind};

/// Which line grammar to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum HierarchyFormat {
    /// Explicit markers: `이름 (N단원)` chapters, `#`-delimited concepts.
    Marker,
    /// Indentation levels with `#`-prefixed concepts.
    Indented,
}

/// Summary of a hierarchy import run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub subjects: usize,
    pub chapters: usize,
    pub sections: usize,
    pub concepts: usize,
    pub edges: usize,
    /// Lines dropped for missing parent context.
    pub skipped: usize,
    pub diagnostics: Vec<String>,
}

impl ImportReport {
    fn count(&mut self, kind: NodeKind) {
        match kind {
            NodeKind::Subject => self.subjects += 1,
            NodeKind::Chapter => self.chapters += 1,
            NodeKind::Section => self.sections += 1,
            NodeKind::Concept => self.concepts += 1,
        }
    }

    fn skip(&mut self, message: String) {
        tracing::warn!("{message}");
        self.diagnostics.push(message);
        self.skipped += 1;
    }

    pub fn nodes_created(&self) -> usize {
        self.subjects + self.chapters + self.sections + self.concepts
    }
}

impl std::fmt::Display for ImportReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "subjects {}, chapters {}, sections {}, concepts {}, edges {}, skipped lines {}",
            self.subjects, self.chapters, self.sections, self.concepts, self.edges, self.skipped
        )
    }
}

/// Three-slot parser context. Entering a level resets everything below it.
#[derive(Debug, Default)]
struct Context {
    subject: Option<NodeId>,
    chapter: Option<NodeId>,
    section: Option<NodeId>,
}

impl Context {
    fn enter_subject(&mut self, id: NodeId) {
        self.subject = Some(id);
        self.chapter = None;
        self.section = None;
    }

    fn enter_chapter(&mut self, id: NodeId) {
        self.chapter = Some(id);
        self.section = None;
    }
}

fn chapter_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(.*)\s*\((\d+)단원\)").expect("valid chapter marker regex"))
}

/// Import a hierarchy document into the graph.
///
/// Node ids are assigned sequentially per kind in encounter order. This is
/// the only bulk entry point for structural data.
pub fn import_hierarchy(
    graph: &mut CurriculumGraph,
    text: &str,
    format: HierarchyFormat,
) -> ImportReport {
    let mut report = ImportReport::default();
    let mut ctx = Context::default();

    for line in text.lines() {
        match format {
            HierarchyFormat::Marker => marker_line(graph, line, &mut ctx, &mut report),
            HierarchyFormat::Indented => indented_line(graph, line, &mut ctx, &mut report),
        }
    }

    info!(
        nodes = report.nodes_created(),
        edges = report.edges,
        skipped = report.skipped,
        "hierarchy import finished"
    );
    report
}

/// Create a node and its structural edge to the parent. The parent is always
/// freshly created by this importer, so the edge cannot conflict or dangle.
fn attach(
    graph: &mut CurriculumGraph,
    kind: NodeKind,
    label: &str,
    parent: Option<(NodeId, Relation)>,
    report: &mut ImportReport,
) -> NodeId {
    let id = graph.add_node(kind, Some(label));
    report.count(kind);
    if let Some((parent_id, relation)) = parent {
        graph
            .add_edge(parent_id, relation, id)
            .expect("parent created by this import");
        report.edges += 1;
    }
    id
}

fn marker_line(graph: &mut CurriculumGraph, line: &str, ctx: &mut Context, report: &mut ImportReport) {
    let line = line.trim();
    if line.is_empty() {
        return;
    }
    // Grouping headers; the explicit subject lines follow them.
    if line.starts_with('-') {
        return;
    }

    if line.contains('#') {
        // Section line: everything before the first '#' names the section,
        // the rest are its concepts.
        let mut parts = line.split('#');
        let section_name = parts.next().unwrap_or_default().trim();
        let Some(chapter) = ctx.chapter else {
            report.skip(format!("skipping section '{section_name}': no chapter is set"));
            return;
        };
        let section = attach(
            graph,
            NodeKind::Section,
            section_name,
            Some((chapter, Relation::HasSection)),
            report,
        );
        ctx.section = Some(section);

        for concept in parts.map(str::trim).filter(|c| !c.is_empty()) {
            attach(
                graph,
                NodeKind::Concept,
                concept,
                Some((section, Relation::HasConcept)),
                report,
            );
        }
    } else if let Some(caps) = chapter_marker().captures(line) {
        let chapter_name = caps[1].trim();
        let Some(subject) = ctx.subject else {
            report.skip(format!("skipping chapter '{chapter_name}': no subject is set"));
            return;
        };
        let chapter = attach(
            graph,
            NodeKind::Chapter,
            chapter_name,
            Some((subject, Relation::HasChapter)),
            report,
        );
        ctx.enter_chapter(chapter);
    } else {
        if line.eq_ignore_ascii_case("contents") {
            return;
        }
        let subject = attach(graph, NodeKind::Subject, line, None, report);
        ctx.enter_subject(subject);
        debug!(label = line, "found subject");
    }
}

fn indented_line(graph: &mut CurriculumGraph, line: &str, ctx: &mut Context, report: &mut ImportReport) {
    let stripped = line.trim();
    if stripped.is_empty()
        || stripped.starts_with('#')
        || stripped.starts_with("Please")
        || stripped.starts_with("Format")
    {
        return;
    }

    let indent = line.len() - line.trim_start().len();
    let content = stripped.trim_start_matches(['-', ' ']);

    if let Some(concept_name) = content.strip_prefix('#') {
        let concept_name = concept_name.trim_start_matches('#').trim();
        let Some(section) = ctx.section else {
            report.skip(format!("skipping concept '{concept_name}': no parent section"));
            return;
        };
        attach(
            graph,
            NodeKind::Concept,
            concept_name,
            Some((section, Relation::HasConcept)),
            report,
        );
    } else if indent < 2 {
        let subject = attach(graph, NodeKind::Subject, content, None, report);
        ctx.enter_subject(subject);
    } else if indent < 4 {
        let Some(subject) = ctx.subject else {
            report.skip(format!("skipping chapter '{content}': no parent subject"));
            return;
        };
        let chapter = attach(
            graph,
            NodeKind::Chapter,
            content,
            Some((subject, Relation::HasChapter)),
            report,
        );
        ctx.enter_chapter(chapter);
    } else {
        let Some(chapter) = ctx.chapter else {
            report.skip(format!("skipping section '{content}': no parent chapter"));
            return;
        };
        let section = attach(
            graph,
            NodeKind::Section,
            content,
            Some((chapter, Relation::HasSection)),
            report,
        );
        ctx.section = Some(section);
    }
}
