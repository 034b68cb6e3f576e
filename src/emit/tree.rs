//! Output document tree.
//!
//! The tree is built fresh from the layout model and holds no references
//! back into it.

use serde::{Deserialize, Serialize};

/// The converted book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentTree {
    pub identifier: String,
    pub page_count: u32,
    pub root: Vec<Node>,
}

impl DocumentTree {
    /// Visit every node depth-first, parents before children.
    pub fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a Node, usize)) {
        fn walk_nodes<'a>(nodes: &'a [Node], depth: usize, visit: &mut dyn FnMut(&'a Node, usize)) {
            for node in nodes {
                visit(node, depth);
                if let Node::Section(section) = node {
                    walk_nodes(&section.children, depth + 1, visit);
                }
            }
        }
        walk_nodes(&self.root, 0, visit);
    }

    /// Every piece of running text in document order: section titles,
    /// paragraphs, list items, figure and table titles, table cells and
    /// equations. Diagnostics are left out.
    pub fn text_content(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.walk(&mut |node, _| match node {
            Node::Section(s) => out.push(s.title.clone()),
            Node::Paragraph(p) => out.push(p.text.clone()),
            Node::List(l) => out.extend(l.items.iter().cloned()),
            Node::Figure(f) => out.push(f.title.clone()),
            Node::Table(t) => {
                out.push(t.title.clone());
                for row in t.header.iter().chain(&t.body) {
                    out.extend(row.iter().filter(|c| !c.is_empty()).cloned());
                }
            }
            Node::Equation(e) => out.push(e.text.clone()),
            Node::Diagnostic(_) => {}
        });
        out
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Node {
    Section(Section),
    Paragraph(Paragraph),
    List(List),
    Figure(Figure),
    Table(TableNode),
    Equation(Equation),
    Diagnostic(DiagnosticNode),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub level: u8,
    pub title: String,
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct List {
    pub ordered: bool,
    pub items: Vec<String>,
}

/// Source of a figure image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FigureKind {
    Media,
    /// Whole-page render of a form page
    Form,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Figure {
    pub id: String,
    pub kind: FigureKind,
    pub title: String,
    /// Path relative to the output document
    pub fileref: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableNode {
    pub id: String,
    pub title: String,
    /// `has_structure`, `text_validated` or `text_only`
    pub validation: String,
    pub method: String,
    pub cols: usize,
    pub header: Vec<Vec<String>>,
    pub body: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Equation {
    pub text: String,
}

/// Low-confidence annotation; category is a machine-readable string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticNode {
    pub category: String,
    pub reason: String,
}
