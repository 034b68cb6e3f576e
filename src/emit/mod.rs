//! Document emission.
//!
//! The [`DocumentEmitter`] walks the page flows and builds a
//! [`DocumentTree`]; [`to_xml`] serializes it and [`to_json`] writes the
//! diagnostics report.

mod emitter;
mod options;
mod report;
mod result;
mod sections;
mod tree;
mod xml;

pub use emitter::{DocumentEmitter, EmitOutput};
pub use options::EmitOptions;
pub use report::{to_json, DiagnosticsReport, JsonFormat};
pub use result::{ConversionStats, DiagnosticRecord};
pub use sections::SectionStack;
pub use tree::{
    DiagnosticNode, DocumentTree, Equation, Figure, FigureKind, List, Node, Paragraph, Section, TableNode,
};
pub use xml::{to_xml, xml_escape};
