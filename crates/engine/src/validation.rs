// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Diagnostics
//!
//! Checks `FROM`/`JOIN` table references against the catalog cache.
//!
//! ## Overview
//!
//! The collector:
//! - Skips everything until tables have been loaded, so an empty or failed
//!   catalog never floods the editor with warnings
//! - Skips references to CTEs declared in the same text
//! - Accepts tables and views under any spelling the cache resolves
//!   (bare, `SCHEMA.NAME`, `DB.SCHEMA.NAME`)
//! - Reports an unknown schema instead of an unknown table when the
//!   qualifier itself does not exist
//!
//! ## Usage
//!
//! ```rust,ignore
//! let collector = DiagnosticCollector::new(catalog.clone());
//! let lsp_diagnostics: Vec<Diagnostic> = collector
//!     .collect_diagnostics(text)
//!     .into_iter()
//!     .map(|d| d.to_lsp())
//!     .collect();
//! ```

use std::ops::Range;

use lsp_types::{Diagnostic, DiagnosticSeverity, NumberOrString};
use tracing::debug;
use warehouse_sql_lsp_catalog::SharedCatalog;
use warehouse_sql_lsp_context::{extract_cte_names, extract_table_references, offset_range_to_lsp};

/// Value of the diagnostic `source` field
pub const DIAGNOSTIC_SOURCE: &str = "warehouse-sql-lsp";

/// Diagnostic code identifying the type of diagnostic
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DiagnosticCode {
    /// Table or view reference not found in the catalog
    UndefinedTable,

    /// Schema qualifier not found in the catalog
    UndefinedSchema,
}

impl DiagnosticCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticCode::UndefinedTable => "CATALOG-001",
            DiagnosticCode::UndefinedSchema => "CATALOG-002",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            DiagnosticCode::UndefinedTable => "Undefined table reference",
            DiagnosticCode::UndefinedSchema => "Undefined schema reference",
        }
    }
}

impl From<DiagnosticCode> for NumberOrString {
    fn from(code: DiagnosticCode) -> Self {
        NumberOrString::String(code.as_str().to_string())
    }
}

/// SQL diagnostic
///
/// Internal representation before conversion to LSP format.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlDiagnostic {
    pub message: String,

    pub severity: DiagnosticSeverity,

    /// Character range in the source text
    pub span: Range<usize>,

    /// Same range as an LSP line/character range
    pub range: lsp_types::Range,

    pub code: Option<DiagnosticCode>,

    /// Always [`DIAGNOSTIC_SOURCE`]
    pub source: String,
}

impl SqlDiagnostic {
    /// Create a new SQL diagnostic
    ///
    /// # Arguments
    ///
    /// - `message`: The diagnostic message
    /// - `severity`: The severity level
    /// - `text`: Source text, used to map `span` to line/character
    /// - `span`: Character range in `text`
    pub fn new(
        message: String,
        severity: DiagnosticSeverity,
        text: &str,
        span: Range<usize>,
    ) -> Self {
        Self {
            message,
            severity,
            range: offset_range_to_lsp(text, &span),
            span,
            code: None,
            source: DIAGNOSTIC_SOURCE.to_string(),
        }
    }

    /// Set the diagnostic code
    pub fn with_code(mut self, code: DiagnosticCode) -> Self {
        self.code = Some(code);
        self
    }

    /// Create a warning diagnostic
    pub fn warning(message: String, text: &str, span: Range<usize>) -> Self {
        Self::new(message, DiagnosticSeverity::WARNING, text, span)
    }

    /// Convert to LSP diagnostic format
    pub fn to_lsp(self) -> Diagnostic {
        Diagnostic {
            range: self.range,
            severity: Some(self.severity),
            code: self.code.map(Into::into),
            code_description: None,
            source: Some(self.source),
            message: self.message,
            related_information: None,
            tags: None,
            data: None,
        }
    }
}

/// Diagnostic collector
///
/// Reads the shared catalog only; never fetches.
#[derive(Debug, Clone)]
pub struct DiagnosticCollector {
    catalog: SharedCatalog,
}

impl DiagnosticCollector {
    pub fn new(catalog: SharedCatalog) -> Self {
        Self { catalog }
    }

    /// Collect diagnostics for a document
    ///
    /// # Returns
    ///
    /// One warning per unresolvable table reference, in text order. Empty
    /// while the catalog holds no tables.
    pub fn collect_diagnostics(&self, text: &str) -> Vec<SqlDiagnostic> {
        let catalog = self.catalog.read();
        if !catalog.has_tables() {
            debug!("Catalog has no tables, skipping validation");
            return Vec::new();
        }

        let ctes = extract_cte_names(text);
        let check_schemas = !catalog.schemas().is_empty();

        let mut diagnostics = Vec::new();
        for reference in extract_table_references(text) {
            if ctes.contains(&reference.table.to_lowercase()) {
                continue;
            }
            if catalog.table_exists(&reference.table) || catalog.view_exists(&reference.table) {
                continue;
            }

            let diagnostic = match reference.table.rsplit_once('.') {
                Some((schema, _)) if check_schemas && !catalog.schema_exists(schema) => {
                    SqlDiagnostic::warning(
                        format!("Schema '{schema}' does not exist"),
                        text,
                        reference.range,
                    )
                    .with_code(DiagnosticCode::UndefinedSchema)
                }
                _ => SqlDiagnostic::warning(
                    format!("Table '{}' does not exist", reference.table),
                    text,
                    reference.range,
                )
                .with_code(DiagnosticCode::UndefinedTable),
            };
            diagnostics.push(diagnostic);
        }

        debug!(count = diagnostics.len(), "Collected diagnostics");
        diagnostics
    }
}
