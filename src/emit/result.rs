//! Conversion statistics and diagnostic records.

use serde::{Deserialize, Serialize};

use crate::model::ValidationStatus;

/// Counts collected while emitting a document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionStats {
    pub page_count: u32,
    pub paragraph_count: u32,
    pub heading_count: u32,
    pub list_count: u32,
    pub list_item_count: u32,
    pub figure_count: u32,
    pub form_count: u32,
    pub tables_has_structure: u32,
    pub tables_text_validated: u32,
    pub tables_text_only: u32,
    pub equation_count: u32,
    pub continuation_count: u32,
    pub diagnostic_count: u32,
    /// Whitespace-separated tokens of emitted text
    pub word_count: u32,
}

impl ConversionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table_count(&self) -> u32 {
        self.tables_has_structure + self.tables_text_validated + self.tables_text_only
    }

    pub fn add_table(&mut self, status: ValidationStatus) {
        match status {
            ValidationStatus::HasStructure => self.tables_has_structure += 1,
            ValidationStatus::TextValidated => self.tables_text_validated += 1,
            ValidationStatus::TextOnly => self.tables_text_only += 1,
        }
    }

    pub fn count_text(&mut self, text: &str) {
        self.word_count += text.split_whitespace().count() as u32;
    }

    /// Merge another document's counts into this one.
    pub fn merge(&mut self, other: &ConversionStats) {
        self.page_count += other.page_count;
        self.paragraph_count += other.paragraph_count;
        self.heading_count += other.heading_count;
        self.list_count += other.list_count;
        self.list_item_count += other.list_item_count;
        self.figure_count += other.figure_count;
        self.form_count += other.form_count;
        self.tables_has_structure += other.tables_has_structure;
        self.tables_text_validated += other.tables_text_validated;
        self.tables_text_only += other.tables_text_only;
        self.equation_count += other.equation_count;
        self.continuation_count += other.continuation_count;
        self.diagnostic_count += other.diagnostic_count;
        self.word_count += other.word_count;
    }
}

/// One diagnostic as listed in the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticRecord {
    /// 1-based page number
    pub page: u32,
    pub category: String,
    pub reason: String,
}
