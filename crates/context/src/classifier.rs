// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Lexical context classification
//!
//! Infers, from raw text and a cursor offset, what kind of SQL construct
//! surrounds the cursor and which tables and aliases are in scope. The
//! classifier is a set of independent pattern matchers with a fixed
//! precedence; it never fails and degrades to [`ContextKind::General`] on
//! text it cannot make sense of.
//!
//! ## Precedence
//!
//! 1. `<identifier>.<partial>` under the cursor: table-dot when the qualifier
//!    is a known alias or a substring of an in-scope table, else schema-dot
//! 2. `FROM`/`JOIN` (or a `FROM` comma list) followed by a partial identifier
//! 3. `USE WAREHOUSE|ROLE|DATABASE|SCHEMA <partial>`, bare `USE <partial>`,
//!    `GRANT ... TO ROLE|USER <partial>`
//! 4. `WHERE` not yet followed by `GROUP BY`/`ORDER BY`/`HAVING`
//! 5. `SELECT` not yet followed by `FROM`
//! 6. general
//!
//! Steps 2 to 5 look only at the current statement (text after the last `;`
//! before the cursor). Tables and aliases in scope come from the whole
//! `;`-delimited statement holding the cursor, so an alias declared after
//! the cursor still resolves. The table-dot versus schema-dot decision is a
//! heuristic and can pick the wrong one when a schema name is a substring of
//! an in-scope table name.
//!
//! ## Examples
//!
//! ```
//! use warehouse_sql_lsp_context::{ContextKind, classify_context};
//!
//! let text = "SELECT o. FROM orders o";
//! let ctx = classify_context(text, 9);
//! assert_eq!(ctx.kind, ContextKind::TableDot);
//! assert_eq!(ctx.resolved_table.as_deref(), Some("orders"));
//! ```

use std::collections::HashMap;
use std::fmt;
use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::cursor::{byte_to_char, char_to_byte, word_bounds};
use crate::keywords::is_keyword;

/// Tokens never accepted as a table alias
const RESERVED_ALIASES: &[&str] = &[
    "WHERE", "ON", "JOIN", "LEFT", "RIGHT", "INNER", "OUTER", "AS", "GROUP", "ORDER", "HAVING",
    "LIMIT", "FULL", "CROSS", "UNION", "USING", "NATURAL", "QUALIFY", "LATERAL", "MINUS",
    "EXCEPT", "INTERSECT", "WINDOW", "SAMPLE", "TABLESAMPLE", "PIVOT", "UNPIVOT", "MATCH_RECOGNIZE",
];

static TABLE_REF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:FROM|JOIN)\s+([A-Za-z_$][\w$]*(?:\.[A-Za-z_$][\w$]*)*)(?:\s+(?:AS\s+)?([A-Za-z_][\w$]*))?",
    )
    .expect("table reference regex")
});

static TABLE_LIST_ITEM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*,\s*([A-Za-z_$][\w$]*(?:\.[A-Za-z_$][\w$]*)*)(?:\s+(?:AS\s+)?([A-Za-z_][\w$]*))?",
    )
    .expect("table list regex")
});

static CTE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:\bWITH\s+(?:RECURSIVE\s+)?|,\s*)([A-Za-z_][\w$]*)\s+AS\s*\(")
        .expect("cte regex")
});

static FROM_TRAILING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:FROM|JOIN)\s+[\w$]*$").expect("from regex"));

static FROM_LIST_TRAILING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\bFROM\s+[\w$.]+(?:\s+(?:AS\s+)?[\w$]+)?(?:\s*,\s*[\w$.]+(?:\s+(?:AS\s+)?[\w$]+)?)*\s*,\s*[\w$]*$",
    )
    .expect("from list regex")
});

static USE_WAREHOUSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)\bUSE\s+WAREHOUSE\s+[\w$"]*$"#).expect("use regex"));
static USE_ROLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)\bUSE\s+ROLE\s+[\w$"]*$"#).expect("use regex"));
static USE_DATABASE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)\bUSE\s+DATABASE\s+[\w$"]*$"#).expect("use regex"));
static USE_SCHEMA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)\bUSE\s+SCHEMA\s+[\w$"]*$"#).expect("use regex"));
static USE_BARE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)\bUSE\s+[\w$"]*$"#).expect("use regex"));
static GRANT_ROLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bGRANT\b[^;]*\bTO\s+ROLE\s+[\w$]*$").expect("grant regex"));
static GRANT_USER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bGRANT\b[^;]*\bTO\s+USER\s+[\w$]*$").expect("grant regex"));

static WHERE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bWHERE\b").expect("where regex"));
static AFTER_WHERE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:GROUP\s+BY|ORDER\s+BY|HAVING)\b").expect("clause regex")
});
static SELECT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bSELECT\b").expect("select regex"));
static FROM_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bFROM\b").expect("from regex"));

static WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z_][A-Za-z0-9_]*").expect("word regex"));

/// Kind of SQL construct surrounding the cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContextKind {
    /// `SELECT a, |`
    SelectList,
    /// `FROM |`, `JOIN |`, `FROM a, |`
    FromClause,
    /// `WHERE |`
    WhereClause,
    /// `alias.|` or `table.|`
    TableDot,
    /// `schema.|` or `db.schema.|`
    SchemaDot,
    UseWarehouse,
    UseRole,
    UseDatabase,
    UseSchema,
    GrantToRole,
    GrantToUser,
    General,
}

impl ContextKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContextKind::SelectList => "select-list",
            ContextKind::FromClause => "from-clause",
            ContextKind::WhereClause => "where-clause",
            ContextKind::TableDot => "table-dot",
            ContextKind::SchemaDot => "schema-dot",
            ContextKind::UseWarehouse => "use-warehouse",
            ContextKind::UseRole => "use-role",
            ContextKind::UseDatabase => "use-database",
            ContextKind::UseSchema => "use-schema",
            ContextKind::GrantToRole => "grant-to-role",
            ContextKind::GrantToUser => "grant-to-user",
            ContextKind::General => "general",
        }
    }

    /// Whether completions in this context are column names
    pub fn expects_columns(&self) -> bool {
        matches!(
            self,
            ContextKind::SelectList | ContextKind::WhereClause | ContextKind::TableDot
        )
    }
}

impl fmt::Display for ContextKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the classifier found around the cursor
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContextDescriptor {
    pub kind: ContextKind,
    /// Word under the cursor, dots included; possibly empty
    pub current_word: String,
    /// Character range of `current_word`
    pub word_range: Range<usize>,
    /// Table identifiers and aliases, each at most once, in text order
    pub tables_in_scope: Vec<String>,
    /// Lower-cased alias → table identifier as written
    pub alias_map: HashMap<String, String>,
    /// Nearest keyword before the current word, upper-cased
    pub previous_keyword: Option<String>,
    /// Identifier before the trailing dot (table-dot and schema-dot)
    pub qualifier: Option<String>,
    /// Table the qualifier resolves to (table-dot only)
    pub resolved_table: Option<String>,
}

impl ContextDescriptor {
    /// Part of the current word after its last dot
    pub fn member(&self) -> &str {
        self.current_word
            .rsplit('.')
            .next()
            .unwrap_or(&self.current_word)
    }

    /// Table identifiers in scope, aliases excluded
    pub fn tables(&self) -> Vec<&str> {
        self.tables_in_scope
            .iter()
            .filter(|t| !self.alias_map.contains_key(&t.to_lowercase()))
            .map(String::as_str)
            .collect()
    }

    /// Resolve an alias (case-insensitive) to its table, or return the input
    pub fn resolve_alias<'a>(&'a self, name: &'a str) -> &'a str {
        self.alias_map
            .get(&name.to_lowercase())
            .map(String::as_str)
            .unwrap_or(name)
    }
}

/// A `FROM`/`JOIN` table reference found in the text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableReference {
    /// Table identifier as written
    pub table: String,
    pub alias: Option<String>,
    /// Character range of the table identifier
    pub range: Range<usize>,
}

#[derive(Debug)]
struct RawReference {
    table: String,
    alias: Option<String>,
    span: Range<usize>,
}

fn is_reserved_alias(word: &str) -> bool {
    let upper = word.to_ascii_uppercase();
    RESERVED_ALIASES.contains(&upper.as_str())
}

fn is_followed_by_paren(text: &str, byte_offset: usize) -> bool {
    text[byte_offset..].trim_start().starts_with('(')
}

/// Build a reference from an identifier capture and an optional alias
/// capture, returning it with the byte offset scanning resumes from.
fn reference_from_captures(
    text: &str,
    base: usize,
    caps: &regex::Captures<'_>,
) -> Option<(Option<RawReference>, usize)> {
    let ident = caps.get(1)?;
    let ident_end = base + ident.end();
    let alias = caps
        .get(2)
        .filter(|a| !is_reserved_alias(a.as_str()) && !is_followed_by_paren(text, base + a.end()));
    let resume = alias.map(|a| base + a.end()).unwrap_or(ident_end);

    if is_keyword(ident.as_str()) || is_followed_by_paren(text, ident_end) {
        return Some((None, resume));
    }

    Some((
        Some(RawReference {
            table: ident.as_str().to_string(),
            alias: alias.map(|a| a.as_str().to_string()),
            span: base + ident.start()..ident_end,
        }),
        resume,
    ))
}

fn scan_table_references(text: &str) -> Vec<RawReference> {
    let mut refs = Vec::new();
    let mut pos = 0;

    while let Some(caps) = TABLE_REF_RE.captures_at(text, pos) {
        let Some((reference, mut resume)) = reference_from_captures(text, 0, &caps) else {
            break;
        };
        let continues_list = reference.is_some();
        refs.extend(reference);

        // Comma-separated tables after FROM a
        while continues_list {
            let Some(item) = TABLE_LIST_ITEM_RE.captures(&text[resume..]) else {
                break;
            };
            match reference_from_captures(text, resume, &item) {
                Some((Some(next), next_resume)) => {
                    refs.push(next);
                    resume = next_resume;
                }
                _ => break,
            }
        }

        pos = resume;
    }
    refs
}

/// All `FROM`/`JOIN` table references in `text`
///
/// Identifiers followed by `(` (table functions) and keyword-only
/// identifiers are skipped.
pub fn extract_table_references(text: &str) -> Vec<TableReference> {
    scan_table_references(text)
        .into_iter()
        .map(|r| TableReference {
            range: byte_to_char(text, r.span.start)..byte_to_char(text, r.span.end),
            table: r.table,
            alias: r.alias,
        })
        .collect()
}

/// Names introduced by `WITH name AS (...)`, lower-cased
pub fn extract_cte_names(text: &str) -> Vec<String> {
    let has_with = WORD_RE
        .find_iter(text)
        .any(|w| w.as_str().eq_ignore_ascii_case("WITH"));
    if !has_with {
        return Vec::new();
    }
    CTE_RE
        .captures_iter(text)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().to_lowercase())
        .collect()
}

#[derive(Debug, Default)]
struct Scope {
    tables: Vec<String>,
    tables_in_scope: Vec<String>,
    alias_map: HashMap<String, String>,
}

impl Scope {
    /// Only references in the statement holding the cursor count; those
    /// overlapping the word under the cursor are still being typed and are
    /// left out.
    fn collect(text: &str, cursor: usize, word: &Range<usize>) -> Self {
        let mut scope = Scope::default();
        let statement = statement_bounds(text, cursor);
        for mut reference in scan_table_references(&text[statement.clone()]) {
            reference.span =
                statement.start + reference.span.start..statement.start + reference.span.end;
            if reference.span.start <= word.end && word.start <= reference.span.end {
                continue;
            }
            if !scope.tables.contains(&reference.table) {
                scope.tables.push(reference.table.clone());
            }
            if !scope.tables_in_scope.contains(&reference.table) {
                scope.tables_in_scope.push(reference.table.clone());
            }
            if let Some(alias) = reference.alias {
                scope
                    .alias_map
                    .insert(alias.to_lowercase(), reference.table.clone());
                if !scope.tables_in_scope.contains(&alias) {
                    scope.tables_in_scope.push(alias);
                }
            }
        }
        scope
    }

    fn is_table_qualifier(&self, qualifier: &str) -> bool {
        let lower = qualifier.to_lowercase();
        self.alias_map.contains_key(&lower)
            || self
                .tables_in_scope
                .iter()
                .any(|t| t.to_lowercase().contains(&lower))
    }

    fn resolve_table(&self, qualifier: &str) -> Option<String> {
        let lower = qualifier.to_lowercase();
        if let Some(table) = self.alias_map.get(&lower) {
            return Some(table.clone());
        }
        let suffix = format!(".{lower}");
        self.tables
            .iter()
            .find(|t| t.to_lowercase() == lower)
            .or_else(|| self.tables.iter().find(|t| t.to_lowercase().ends_with(&suffix)))
            .or_else(|| self.tables.iter().find(|t| t.to_lowercase().contains(&lower)))
            .cloned()
    }
}

fn is_identifier_path(qualifier: &str) -> bool {
    !qualifier.is_empty()
        && qualifier.split('.').all(|segment| {
            segment
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        })
}

/// Byte range of the `;`-delimited statement containing `cursor`
fn statement_bounds(text: &str, cursor: usize) -> Range<usize> {
    let start = text[..cursor].rfind(';').map_or(0, |i| i + 1);
    let end = text[cursor..].find(';').map_or(text.len(), |i| cursor + i);
    start..end
}

fn current_statement(prefix: &str) -> &str {
    prefix.rsplit(';').next().unwrap_or(prefix)
}

fn specialized_kind(statement: &str) -> Option<ContextKind> {
    let patterns: [(&LazyLock<Regex>, ContextKind); 7] = [
        (&USE_WAREHOUSE_RE, ContextKind::UseWarehouse),
        (&USE_ROLE_RE, ContextKind::UseRole),
        (&USE_DATABASE_RE, ContextKind::UseDatabase),
        (&USE_SCHEMA_RE, ContextKind::UseSchema),
        (&GRANT_ROLE_RE, ContextKind::GrantToRole),
        (&GRANT_USER_RE, ContextKind::GrantToUser),
        (&USE_BARE_RE, ContextKind::UseDatabase),
    ];
    patterns
        .iter()
        .find(|(re, _)| re.is_match(statement))
        .map(|(_, kind)| *kind)
}

fn in_where_clause(statement: &str) -> bool {
    WHERE_RE
        .find_iter(statement)
        .last()
        .is_some_and(|m| !AFTER_WHERE_RE.is_match(&statement[m.end()..]))
}

fn in_select_list(statement: &str) -> bool {
    SELECT_RE
        .find_iter(statement)
        .last()
        .is_some_and(|m| !FROM_RE.is_match(&statement[m.end()..]))
}

fn previous_keyword(before_word: &str) -> Option<String> {
    WORD_RE
        .find_iter(before_word)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .find(|w| is_keyword(w.as_str()))
        .map(|w| w.as_str().to_ascii_uppercase())
}

/// Classify the SQL context at a character offset
///
/// # Arguments
///
/// * `text` - Full document text
/// * `offset` - Zero-based character offset of the cursor; clamped to the
///   text length
///
/// # Returns
///
/// A [`ContextDescriptor`]. Never fails.
pub fn classify_context(text: &str, offset: usize) -> ContextDescriptor {
    let cursor = char_to_byte(text, offset);
    let bounds = word_bounds(text, cursor);
    let current_word = text[bounds.clone()].to_string();
    let word_range = byte_to_char(text, bounds.start)..byte_to_char(text, bounds.end);

    let prefix = &text[..cursor];
    let typed = &text[bounds.start..cursor];
    let scope = Scope::collect(text, cursor, &bounds);
    let previous_keyword = previous_keyword(&text[..bounds.start]);

    let mut qualifier = None;
    let mut resolved_table = None;

    let dotted = typed
        .rfind('.')
        .map(|dot| &typed[..dot])
        .filter(|q| is_identifier_path(q));

    let kind = if let Some(q) = dotted {
        qualifier = Some(q.to_string());
        if scope.is_table_qualifier(q) {
            resolved_table = scope.resolve_table(q);
            ContextKind::TableDot
        } else {
            ContextKind::SchemaDot
        }
    } else {
        let statement = current_statement(prefix);
        if FROM_TRAILING_RE.is_match(statement) || FROM_LIST_TRAILING_RE.is_match(statement) {
            ContextKind::FromClause
        } else if let Some(kind) = specialized_kind(statement) {
            kind
        } else if in_where_clause(statement) {
            ContextKind::WhereClause
        } else if in_select_list(statement) {
            ContextKind::SelectList
        } else {
            ContextKind::General
        }
    };

    ContextDescriptor {
        kind,
        current_word,
        word_range,
        tables_in_scope: scope.tables_in_scope,
        alias_map: scope.alias_map,
        previous_keyword,
        qualifier,
        resolved_table,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify_at_marker(marked: &str) -> ContextDescriptor {
        let offset = marked.chars().position(|c| c == '|').unwrap();
        let text = marked.replacen('|', "", 1);
        classify_context(&text, offset)
    }

    #[test]
    fn test_from_clause_empty_word() {
        let ctx = classify_at_marker("SELECT * FROM |");
        assert_eq!(ctx.kind, ContextKind::FromClause);
        assert_eq!(ctx.current_word, "");
        assert_eq!(ctx.previous_keyword.as_deref(), Some("FROM"));
    }

    #[test]
    fn test_from_clause_partial_word() {
        let ctx = classify_at_marker("select * from ord|");
        assert_eq!(ctx.kind, ContextKind::FromClause);
        assert_eq!(ctx.current_word, "ord");
        assert!(ctx.tables_in_scope.is_empty());
    }

    #[test]
    fn test_from_comma_list() {
        let ctx = classify_at_marker("SELECT * FROM orders o, |");
        assert_eq!(ctx.kind, ContextKind::FromClause);
        assert_eq!(ctx.alias_map.get("o").map(String::as_str), Some("orders"));
    }

    #[test]
    fn test_join_clause() {
        let ctx = classify_at_marker("SELECT * FROM orders o JOIN cu|");
        assert_eq!(ctx.kind, ContextKind::FromClause);
        assert_eq!(ctx.tables_in_scope, vec!["orders", "o"]);
    }

    #[test]
    fn test_alias_map_and_scope() {
        let text = "SELECT * FROM orders o WHERE o.id = 1";
        let ctx = classify_context(text, text.len());
        assert!(ctx.tables_in_scope.contains(&"orders".to_string()));
        assert!(ctx.tables_in_scope.contains(&"o".to_string()));
        assert_eq!(ctx.alias_map.get("o").map(String::as_str), Some("orders"));
    }

    #[test]
    fn test_alias_with_as_keyword() {
        let text = "SELECT * FROM Sales.Orders AS Ord";
        let ctx = classify_context(text, 0);
        assert_eq!(ctx.alias_map.get("ord").map(String::as_str), Some("Sales.Orders"));
    }

    #[test]
    fn test_reserved_word_not_alias() {
        let text = "SELECT * FROM orders WHERE status = 'x'";
        let ctx = classify_context(text, text.len());
        assert!(ctx.alias_map.is_empty());
        assert_eq!(ctx.tables_in_scope, vec!["orders"]);
    }

    #[test]
    fn test_reserved_alias_does_not_swallow_join() {
        let text = "SELECT * FROM orders JOIN customers c ON c.id = orders.customer_id";
        let refs = extract_table_references(text);
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[1].table, "customers");
        assert_eq!(refs[1].alias.as_deref(), Some("c"));
    }

    #[test]
    fn test_table_dot_with_alias_after_cursor() {
        let ctx = classify_at_marker("SELECT o.| FROM orders o");
        assert_eq!(ctx.kind, ContextKind::TableDot);
        assert_eq!(ctx.qualifier.as_deref(), Some("o"));
        assert_eq!(ctx.resolved_table.as_deref(), Some("orders"));
        assert_eq!(ctx.member(), "");
    }

    #[test]
    fn test_table_dot_partial_member() {
        let ctx = classify_at_marker("SELECT o.sta| FROM orders o");
        assert_eq!(ctx.kind, ContextKind::TableDot);
        assert_eq!(ctx.current_word, "o.sta");
        assert_eq!(ctx.member(), "sta");
    }

    #[test]
    fn test_table_dot_by_substring() {
        let ctx = classify_at_marker("SELECT ord.| FROM analytics.orders");
        assert_eq!(ctx.kind, ContextKind::TableDot);
        assert_eq!(ctx.resolved_table.as_deref(), Some("analytics.orders"));
    }

    #[test]
    fn test_schema_dot_fallback() {
        let ctx = classify_at_marker("SELECT * FROM analytics.|");
        assert_eq!(ctx.kind, ContextKind::SchemaDot);
        assert_eq!(ctx.qualifier.as_deref(), Some("analytics"));
        assert!(ctx.resolved_table.is_none());
    }

    #[test]
    fn test_numeric_literal_is_not_qualifier() {
        let ctx = classify_at_marker("SELECT 3.|");
        assert_eq!(ctx.kind, ContextKind::SelectList);
    }

    #[test]
    fn test_where_clause() {
        let ctx = classify_at_marker("SELECT * FROM orders WHERE sta|");
        assert_eq!(ctx.kind, ContextKind::WhereClause);
        assert_eq!(ctx.previous_keyword.as_deref(), Some("WHERE"));
    }

    #[test]
    fn test_where_closed_by_order_by() {
        let ctx = classify_at_marker("SELECT * FROM orders WHERE a = 1 ORDER BY |");
        assert_eq!(ctx.kind, ContextKind::General);
        assert_eq!(ctx.previous_keyword.as_deref(), Some("BY"));
    }

    #[test]
    fn test_select_list() {
        let ctx = classify_at_marker("SELECT id, | FROM orders");
        assert_eq!(ctx.kind, ContextKind::SelectList);
        assert_eq!(ctx.tables_in_scope, vec!["orders"]);
    }

    #[test]
    fn test_previous_statement_does_not_leak() {
        let ctx = classify_at_marker("SELECT * FROM a WHERE x = 1;\nSELECT |");
        assert_eq!(ctx.kind, ContextKind::SelectList);
    }

    #[test]
    fn test_alias_resolved_within_own_statement() {
        let ctx = classify_context("SELECT o. FROM orders o;\nSELECT * FROM customers o;", 9);
        assert_eq!(ctx.kind, ContextKind::TableDot);
        assert_eq!(ctx.resolved_table.as_deref(), Some("orders"));
        assert_eq!(ctx.alias_map.len(), 1);
    }

    #[test]
    fn test_scope_limited_to_current_statement() {
        let ctx =
            classify_at_marker("SELECT * FROM big_a;\nSELECT * FROM big_b;\nSELECT | FROM orders");
        assert_eq!(ctx.kind, ContextKind::SelectList);
        assert_eq!(ctx.tables_in_scope, vec!["orders"]);
        assert_eq!(ctx.tables(), vec!["orders"]);
    }

    #[test]
    fn test_use_contexts() {
        assert_eq!(classify_at_marker("USE WAREHOUSE |").kind, ContextKind::UseWarehouse);
        assert_eq!(classify_at_marker("use role sys|").kind, ContextKind::UseRole);
        assert_eq!(classify_at_marker("USE DATABASE pr|").kind, ContextKind::UseDatabase);
        assert_eq!(classify_at_marker("USE SCHEMA |").kind, ContextKind::UseSchema);
        assert_eq!(classify_at_marker("USE pr|").kind, ContextKind::UseDatabase);
    }

    #[test]
    fn test_grant_contexts() {
        assert_eq!(
            classify_at_marker("GRANT SELECT ON TABLE t TO ROLE ana|").kind,
            ContextKind::GrantToRole
        );
        assert_eq!(
            classify_at_marker("GRANT ROLE analyst TO USER |").kind,
            ContextKind::GrantToUser
        );
    }

    #[test]
    fn test_general_fallback() {
        assert_eq!(classify_at_marker("|").kind, ContextKind::General);
        assert_eq!(classify_at_marker("((( |").kind, ContextKind::General);
    }

    #[test]
    fn test_offset_clamped() {
        let ctx = classify_context("SELECT * FROM ", 999);
        assert_eq!(ctx.kind, ContextKind::FromClause);
    }

    #[test]
    fn test_table_function_skipped() {
        let text = "SELECT * FROM TABLE(FLATTEN(input => x)) f JOIN orders o ON true";
        let refs = extract_table_references(text);
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].table, "orders");
    }

    #[test]
    fn test_reference_ranges_are_char_offsets() {
        let text = "-- é\nSELECT * FROM orders";
        let refs = extract_table_references(text);
        let start = refs[0].range.start;
        let table: String = text.chars().skip(start).take(6).collect();
        assert_eq!(table, "orders");
    }

    #[test]
    fn test_extract_cte_names() {
        let text = "WITH recent AS (SELECT 1), Totals AS (SELECT 2) SELECT * FROM recent";
        assert_eq!(extract_cte_names(text), vec!["recent", "totals"]);
        assert!(extract_cte_names("SELECT a, b AS (x)").is_empty());
    }
}
