//! Section nesting driven by heading levels.

use super::tree::{Node, Section};

/// Explicit stack of open sections.
///
/// Nodes go to the innermost open section, or to the document root
/// before the first heading.
#[derive(Debug, Default)]
pub struct SectionStack {
    root: Vec<Node>,
    open: Vec<Section>,
}

impl SectionStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Level of the innermost open section, 0 at the root.
    pub fn depth(&self) -> u8 {
        self.open.last().map_or(0, |s| s.level)
    }

    /// Close sections at `level` or deeper, then open a new one.
    pub fn open(&mut self, level: u8, title: impl Into<String>) {
        self.close_to(level.saturating_sub(1));
        self.open.push(Section {
            level,
            title: title.into(),
            children: Vec::new(),
        });
    }

    /// Close every open section deeper than `level`.
    pub fn close_to(&mut self, level: u8) {
        while self.open.last().map_or(false, |s| s.level > level) {
            if let Some(section) = self.open.pop() {
                self.push(Node::Section(section));
            }
        }
    }

    pub fn push(&mut self, node: Node) {
        match self.open.last_mut() {
            Some(section) => section.children.push(node),
            None => self.root.push(node),
        }
    }

    /// Close everything and return the root nodes.
    pub fn finish(mut self) -> Vec<Node> {
        self.close_to(0);
        self.root
    }
}
