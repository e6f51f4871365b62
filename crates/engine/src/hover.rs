// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Hover Information Provider
//!
//! Resolves the identifier under the cursor against the catalog cache and
//! renders markdown for it.
//!
//! ## Resolution order
//!
//! 1. `alias.column` or `table.column` when the part before the cursor's
//!    segment names an alias or a cached table
//! 2. A table (bare, partially or fully qualified, or an alias), with its
//!    columns and DDL
//! 3. A view
//! 4. A bare column of one of the tables in scope
//! 5. A warehouse, role or database name
//!
//! ## Example
//!
//! ```sql
//! SELECT o.|AMOUNT| FROM PROD.ANALYTICS.ORDERS o
//! ```
//!
//! Hovering `AMOUNT` resolves alias `o` to `PROD.ANALYTICS.ORDERS`, loads
//! its columns if needed and shows the column's type.

use std::ops::Range;
use std::sync::Arc;

use lsp_types::{Hover, HoverContents, MarkupContent, MarkupKind};
use tracing::{debug, instrument, warn};
use warehouse_sql_lsp_catalog::{
    CatalogSource, ColumnMetadata, SharedCatalog, TableMetadata, ViewMetadata,
};
use warehouse_sql_lsp_context::cursor::{byte_to_char, char_to_byte, word_bounds};
use warehouse_sql_lsp_context::{ContextDescriptor, classify_context, offset_range_to_lsp};

/// Rendered hover for an identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoverInfo {
    /// Markdown body
    pub contents: String,
    /// Character range of the hovered identifier
    pub range: Range<usize>,
}

impl HoverInfo {
    /// Convert to an LSP hover, mapping the range against `text`
    pub fn to_lsp(&self, text: &str) -> Hover {
        Hover {
            contents: HoverContents::Markup(MarkupContent {
                kind: MarkupKind::Markdown,
                value: self.contents.clone(),
            }),
            range: Some(offset_range_to_lsp(text, &self.range)),
        }
    }
}

/// Identifier under the cursor, cut at the end of the segment it sits in
///
/// For `PROD.ANALYTICS.ORDERS` with the cursor inside `ANALYTICS` the target
/// is `PROD.ANALYTICS`.
///
/// # Returns
///
/// The target text and its character range, or `None` off any identifier.
pub fn hover_target(text: &str, offset: usize) -> Option<(String, Range<usize>)> {
    let byte_offset = char_to_byte(text, offset);
    let bounds = word_bounds(text, byte_offset);
    let end = text[byte_offset..bounds.end]
        .find('.')
        .map(|i| byte_offset + i)
        .unwrap_or(bounds.end);

    let target = text[bounds.start..end].trim_matches('.');
    if target.is_empty() {
        return None;
    }
    let start = bounds.start + text[bounds.start..end].find(target).unwrap_or(0);
    let range = byte_to_char(text, start)..byte_to_char(text, start + target.len());
    Some((target.to_string(), range))
}

/// Markdown for a table, its columns and optional DDL
pub fn format_table(table: &TableMetadata, ddl: Option<&str>) -> String {
    let mut out = format!(
        "**{}** `{}`\n",
        table.table_type.as_str(),
        table.qualified_name()
    );
    if let Some(comment) = &table.comment {
        out.push_str(&format!("\n{comment}\n"));
    }
    if let Some(rows) = table.row_count {
        out.push_str(&format!("\nRows: {rows}\n"));
    }

    if !table.columns.is_empty() {
        out.push_str("\n| Column | Type | Nullable |\n|---|---|---|\n");
        for column in &table.columns {
            let nullable = if column.nullable { "yes" } else { "no" };
            out.push_str(&format!(
                "| {} | {} | {nullable} |\n",
                column.name, column.data_type
            ));
        }
    }

    if let Some(ddl) = ddl {
        out.push_str(&format!("\n```sql\n{}\n```\n", ddl.trim_end()));
    }
    out
}

/// Markdown for a single column
pub fn format_column(column: &ColumnMetadata) -> String {
    let mut out = format!(
        "**COLUMN** `{}`\n\nType: `{}`{}\n",
        column.qualified_name(),
        column.data_type,
        if column.nullable { "" } else { " NOT NULL" }
    );
    if let Some(default) = &column.default_value {
        out.push_str(&format!("\nDefault: `{default}`\n"));
    }
    if let Some(comment) = &column.comment {
        out.push_str(&format!("\n{comment}\n"));
    }
    out
}

fn format_view(view: &ViewMetadata) -> String {
    let kind = if view.is_materialized {
        "MATERIALIZED VIEW"
    } else {
        "VIEW"
    };
    let mut out = format!("**{kind}** `{}`\n", view.qualified_name());
    if let Some(comment) = &view.comment {
        out.push_str(&format!("\n{comment}\n"));
    }
    if let Some(body) = &view.text {
        out.push_str(&format!("\n```sql\n{}\n```\n", body.trim_end()));
    }
    out
}

/// Hover engine
#[derive(Clone)]
pub struct HoverEngine {
    catalog: SharedCatalog,
    source: Arc<dyn CatalogSource>,
}

impl HoverEngine {
    /// Create a new hover engine
    pub fn new(catalog: SharedCatalog, source: Arc<dyn CatalogSource>) -> Self {
        Self { catalog, source }
    }

    /// Hover information at a character offset
    ///
    /// # Arguments
    ///
    /// * `text` - Full document text
    /// * `offset` - Zero-based character offset
    ///
    /// # Returns
    ///
    /// Markdown hover, or `None` when the identifier resolves to nothing in
    /// the cache. Fetch failures are logged and degrade the result.
    #[instrument(skip(self, text))]
    pub async fn hover(&self, text: &str, offset: usize) -> Option<HoverInfo> {
        let (target, range) = hover_target(text, offset)?;
        let ctx = classify_context(text, offset);
        debug!(target = %target, "Resolving hover target");

        let contents = self.resolve(&target, &ctx).await?;
        Some(HoverInfo { contents, range })
    }

    async fn resolve(&self, target: &str, ctx: &ContextDescriptor) -> Option<String> {
        if let Some((head, member)) = target.rsplit_once('.') {
            let head_is_alias = ctx.alias_map.contains_key(&head.to_lowercase());
            if head_is_alias {
                return self.column_of(ctx.resolve_alias(head), member).await;
            }
            if let Some(hover) = self.table(target).await {
                return Some(hover);
            }
            if let Some(hover) = self.view(target) {
                return Some(hover);
            }
            return self.column_of(head, member).await;
        }

        let table = ctx.resolve_alias(target);
        if let Some(hover) = self.table(table).await {
            return Some(hover);
        }
        if let Some(hover) = self.view(target) {
            return Some(hover);
        }
        if let Some(hover) = self.scope_column(target, ctx).await {
            return Some(hover);
        }
        self.named_object(target)
    }

    /// Qualified name of a cached table
    fn resolve_table(&self, name: &str) -> Option<String> {
        self.catalog.read().get_table(name).map(|t| t.qualified_name())
    }

    async fn load_columns(&self, qualified: &str) {
        if let Err(e) = self
            .catalog
            .ensure_columns_loaded(self.source.as_ref(), qualified)
            .await
        {
            warn!(table = %qualified, error = %e, "Failed to load columns for hover");
        }
    }

    async fn table(&self, name: &str) -> Option<String> {
        let qualified = self.resolve_table(name)?;
        self.load_columns(&qualified).await;

        let ddl = match self.catalog.ensure_ddl(self.source.as_ref(), &qualified).await {
            Ok(ddl) => Some(ddl),
            Err(e) => {
                warn!(table = %qualified, error = %e, "Failed to fetch DDL for hover");
                None
            }
        };

        let catalog = self.catalog.read();
        catalog
            .get_table(&qualified)
            .map(|table| format_table(table, ddl.as_deref()))
    }

    fn view(&self, name: &str) -> Option<String> {
        self.catalog.read().get_view(name).map(format_view)
    }

    async fn column_of(&self, table: &str, column: &str) -> Option<String> {
        let qualified = self.resolve_table(table)?;
        self.load_columns(&qualified).await;
        self.catalog
            .read()
            .get_column(&qualified, column)
            .map(format_column)
    }

    async fn scope_column(&self, column: &str, ctx: &ContextDescriptor) -> Option<String> {
        for table in ctx.tables() {
            if let Some(hover) = self.column_of(table, column).await {
                return Some(hover);
            }
        }
        None
    }

    fn named_object(&self, name: &str) -> Option<String> {
        let catalog = self.catalog.read();
        if let Some(w) = catalog
            .warehouses()
            .iter()
            .find(|w| w.name.eq_ignore_ascii_case(name))
        {
            let mut out = format!("**WAREHOUSE** `{}`\n", w.name);
            if let Some(size) = &w.size {
                out.push_str(&format!("\nSize: {size}\n"));
            }
            if let Some(state) = &w.state {
                out.push_str(&format!("\nState: {state}\n"));
            }
            return Some(out);
        }
        if let Some(r) = catalog
            .roles()
            .iter()
            .find(|r| r.name.eq_ignore_ascii_case(name))
        {
            let mut out = format!("**ROLE** `{}`\n", r.name);
            if let Some(comment) = &r.comment {
                out.push_str(&format!("\n{comment}\n"));
            }
            return Some(out);
        }
        catalog
            .databases()
            .iter()
            .find(|d| d.name.eq_ignore_ascii_case(name))
            .map(|d| match &d.comment {
                Some(comment) => format!("**DATABASE** `{}`\n\n{comment}\n", d.name),
                None => format!("**DATABASE** `{}`\n", d.name),
            })
    }
}
