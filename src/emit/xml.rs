//! XML serialization of the document tree.

use std::fmt::Write;

use super::tree::{DocumentTree, Figure, FigureKind, Node, TableNode};

/// Characters XML 1.0 allows in a document.
fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r') || (c >= '\u{20}' && c != '\u{FFFE}' && c != '\u{FFFF}')
}

/// Escape text for element content and attribute values.
///
/// Characters XML 1.0 forbids (C0 controls other than tab, newline and
/// carriage return, U+FFFE, U+FFFF) are dropped.
pub fn xml_escape(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars().filter(|c| is_xml_char(*c)) {
        match c {
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Indenting element writer. Attributes are written in the order given.
struct XmlWriter {
    out: String,
    depth: usize,
    indent: usize,
}

impl XmlWriter {
    fn new(indent: usize) -> Self {
        let mut out = String::new();
        out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        Self { out, depth: 0, indent }
    }

    fn pad(&mut self) {
        for _ in 0..self.depth * self.indent {
            self.out.push(' ');
        }
    }

    fn tag(&mut self, name: &str, attrs: &[(&str, &str)]) {
        self.out.push('<');
        self.out.push_str(name);
        for (key, value) in attrs {
            let _ = write!(self.out, " {}=\"{}\"", key, xml_escape(value));
        }
    }

    fn open(&mut self, name: &str, attrs: &[(&str, &str)]) {
        self.pad();
        self.tag(name, attrs);
        self.out.push_str(">\n");
        self.depth += 1;
    }

    fn close(&mut self, name: &str) {
        self.depth = self.depth.saturating_sub(1);
        self.pad();
        let _ = writeln!(self.out, "</{}>", name);
    }

    fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) {
        self.pad();
        self.tag(name, attrs);
        self.out.push_str("/>\n");
    }

    fn text_element(&mut self, name: &str, attrs: &[(&str, &str)], text: &str) {
        self.pad();
        self.tag(name, attrs);
        let _ = writeln!(self.out, ">{}</{}>", xml_escape(text), name);
    }

    fn finish(self) -> String {
        self.out
    }
}

/// Serialize the tree. Output depends only on the tree.
pub fn to_xml(tree: &DocumentTree, indent: usize) -> String {
    let mut w = XmlWriter::new(indent);
    let pages = tree.page_count.to_string();
    w.open("book", &[("id", tree.identifier.as_str()), ("pages", pages.as_str())]);
    for node in &tree.root {
        write_node(&mut w, node);
    }
    w.close("book");
    w.finish()
}

fn write_node(w: &mut XmlWriter, node: &Node) {
    match node {
        Node::Section(section) => {
            let level = section.level.to_string();
            w.open("section", &[("level", level.as_str())]);
            w.text_element("title", &[], &section.title);
            for child in &section.children {
                write_node(w, child);
            }
            w.close("section");
        }
        Node::Paragraph(p) => w.text_element("para", &[], &p.text),
        Node::List(list) => {
            let name = if list.ordered { "orderedlist" } else { "itemizedlist" };
            w.open(name, &[]);
            for item in &list.items {
                w.open("listitem", &[]);
                w.text_element("para", &[], item);
                w.close("listitem");
            }
            w.close(name);
        }
        Node::Figure(figure) => write_figure(w, figure),
        Node::Table(table) => write_table(w, table),
        Node::Equation(eq) => {
            w.open("equation", &[]);
            w.text_element("mathphrase", &[], &eq.text);
            w.close("equation");
        }
        Node::Diagnostic(d) => w.text_element("remark", &[("role", d.category.as_str())], &d.reason),
    }
}

fn write_figure(w: &mut XmlWriter, figure: &Figure) {
    match figure.kind {
        FigureKind::Media => w.open("figure", &[("id", figure.id.as_str())]),
        FigureKind::Form => w.open("figure", &[("id", figure.id.as_str()), ("role", "form")]),
    }
    w.text_element("title", &[], &figure.title);
    w.open("mediaobject", &[]);
    w.open("imageobject", &[]);
    w.empty("imagedata", &[("fileref", figure.fileref.as_str())]);
    w.close("imageobject");
    w.close("mediaobject");
    w.close("figure");
}

fn write_table(w: &mut XmlWriter, table: &TableNode) {
    w.open(
        "table",
        &[
            ("id", table.id.as_str()),
            ("validation", table.validation.as_str()),
            ("method", table.method.as_str()),
        ],
    );
    w.text_element("title", &[], &table.title);
    let cols = table.cols.to_string();
    w.open("tgroup", &[("cols", cols.as_str())]);
    for (section, rows) in [("thead", &table.header), ("tbody", &table.body)] {
        if rows.is_empty() {
            continue;
        }
        w.open(section, &[]);
        for row in rows {
            w.open("row", &[]);
            for cell in row {
                w.text_element("entry", &[], cell);
            }
            w.close("row");
        }
        w.close(section);
    }
    w.close("tgroup");
    w.close("table");
}
