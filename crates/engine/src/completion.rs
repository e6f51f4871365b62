// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Completion
//!
//! Turns a classified cursor context into ranked completion candidates.
//!
//! ## Pipeline
//!
//! 1. Classify the text around the cursor
//! 2. Pick catalog sources by [`ContextKind`]
//! 3. Lazy-load the columns of the tables involved
//! 4. Rank by session locality and truncate to the configured limit
//!
//! ## Ranking
//!
//! `sort_priority = base + tier * 10`, lower is better. The tier of a
//! catalog object is 0 in the session's current database and schema, 1 in
//! the current database, 2 elsewhere. The current warehouse, role, database
//! and schema are tagged `is_current` and placed in tier 0. Keywords sit in
//! tier 3. Sorting is stable, so candidates keep catalog insertion order
//! within a tier.

use std::collections::HashMap;
use std::sync::Arc;

use lsp_types::{CompletionItem, CompletionItemKind, Documentation, Url};
use parking_lot::RwLock;
use serde::Serialize;
use tracing::{debug, instrument, warn};
use warehouse_sql_lsp_catalog::{
    CatalogSource, ColumnMetadata, DatabaseMetadata, RoleMetadata, SchemaMetadata, SharedCatalog,
    TableMetadata, UserMetadata, ViewMetadata, WarehouseMetadata,
};
use warehouse_sql_lsp_context::{
    ContextDescriptor, ContextKind, KeywordProvider, KeywordSet, SessionContext,
    SessionContextManager, SqlKeyword, classify_context,
};

use crate::error::EngineResult;

/// Priority step between locality tiers
pub const TIER_WEIGHT: u32 = 10;

const KEYWORD_TIER: u32 = 3;

/// What a candidate names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateKind {
    Keyword,
    Database,
    Schema,
    Table,
    View,
    Column,
    Warehouse,
    Role,
    User,
}

impl CandidateKind {
    pub fn lsp_kind(&self) -> CompletionItemKind {
        match self {
            CandidateKind::Keyword => CompletionItemKind::KEYWORD,
            CandidateKind::Database | CandidateKind::Schema => CompletionItemKind::MODULE,
            CandidateKind::Table => CompletionItemKind::CLASS,
            CandidateKind::View => CompletionItemKind::INTERFACE,
            CandidateKind::Column => CompletionItemKind::FIELD,
            CandidateKind::Warehouse => CompletionItemKind::CONSTANT,
            CandidateKind::Role => CompletionItemKind::ENUM_MEMBER,
            CandidateKind::User => CompletionItemKind::VALUE,
        }
    }

    /// Base priority before the locality tier is added
    fn base_priority(&self) -> u32 {
        match self {
            CandidateKind::Column | CandidateKind::Keyword => 0,
            CandidateKind::Warehouse | CandidateKind::Role | CandidateKind::User => 0,
            CandidateKind::Table => 1,
            CandidateKind::View => 2,
            CandidateKind::Schema => 3,
            CandidateKind::Database => 4,
        }
    }
}

/// A single completion suggestion before rendering
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionCandidate {
    pub label: String,
    pub kind: CandidateKind,
    pub detail: Option<String>,
    pub documentation: Option<String>,
    /// Text to insert when it differs from the label
    pub insert_text: Option<String>,
    /// Owning database, for locality ranking
    pub database: Option<String>,
    /// Owning schema, for locality ranking
    pub schema: Option<String>,
    /// Lower ranks first
    pub sort_priority: u32,
    /// Names the session's current warehouse, role, database or schema
    pub is_current: bool,
}

impl CompletionCandidate {
    pub fn new(label: impl Into<String>, kind: CandidateKind) -> Self {
        Self {
            label: label.into(),
            kind,
            detail: None,
            documentation: None,
            insert_text: None,
            database: None,
            schema: None,
            sort_priority: kind.base_priority(),
            is_current: false,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_documentation(mut self, documentation: Option<String>) -> Self {
        self.documentation = documentation;
        self
    }

    pub fn with_insert_text(mut self, text: impl Into<String>) -> Self {
        self.insert_text = Some(text.into());
        self
    }

    fn located(mut self, database: &str, schema: Option<&str>) -> Self {
        self.database = Some(database.to_string());
        self.schema = schema.map(str::to_string);
        self
    }

    pub fn keyword(keyword: &SqlKeyword) -> Self {
        Self::new(&keyword.label, CandidateKind::Keyword)
            .with_detail("keyword")
            .with_documentation(keyword.description.clone())
    }

    pub fn table(table: &TableMetadata) -> Self {
        let documentation = match (&table.comment, table.row_count) {
            (Some(comment), Some(rows)) => Some(format!("{comment}\n\n~{rows} rows")),
            (Some(comment), None) => Some(comment.clone()),
            (None, Some(rows)) => Some(format!("~{rows} rows")),
            (None, None) => None,
        };
        Self::new(&table.name, CandidateKind::Table)
            .with_detail(format!(
                "{} {}",
                table.table_type.as_str(),
                table.qualified_name()
            ))
            .with_documentation(documentation)
            .located(&table.database, Some(&table.schema))
    }

    pub fn view(view: &ViewMetadata) -> Self {
        let kind = if view.is_materialized {
            "MATERIALIZED VIEW"
        } else {
            "VIEW"
        };
        Self::new(&view.name, CandidateKind::View)
            .with_detail(format!("{kind} {}", view.qualified_name()))
            .with_documentation(view.comment.clone())
            .located(&view.database, Some(&view.schema))
    }

    pub fn column(column: &ColumnMetadata) -> Self {
        let nullability = if column.nullable { "" } else { " NOT NULL" };
        Self::new(&column.name, CandidateKind::Column)
            .with_detail(format!("{}{nullability} · {}", column.data_type, column.table))
            .with_documentation(column.comment.clone())
            .located(&column.database, Some(&column.schema))
    }

    pub fn schema(schema: &SchemaMetadata) -> Self {
        Self::new(&schema.name, CandidateKind::Schema)
            .with_detail(format!("SCHEMA {}", schema.qualified_name()))
            .located(&schema.database, Some(&schema.name))
    }

    pub fn database(database: &DatabaseMetadata) -> Self {
        Self::new(&database.name, CandidateKind::Database)
            .with_detail("DATABASE")
            .with_documentation(database.comment.clone())
            .located(&database.name, None)
    }

    pub fn warehouse(warehouse: &WarehouseMetadata) -> Self {
        let detail = match (&warehouse.size, &warehouse.state) {
            (Some(size), Some(state)) => format!("WAREHOUSE {size} ({state})"),
            (Some(size), None) => format!("WAREHOUSE {size}"),
            (None, Some(state)) => format!("WAREHOUSE ({state})"),
            (None, None) => "WAREHOUSE".to_string(),
        };
        Self::new(&warehouse.name, CandidateKind::Warehouse)
            .with_detail(detail)
            .with_documentation(warehouse.comment.clone())
    }

    pub fn role(role: &RoleMetadata) -> Self {
        Self::new(&role.name, CandidateKind::Role)
            .with_detail("ROLE")
            .with_documentation(role.comment.clone())
    }

    pub fn user(user: &UserMetadata) -> Self {
        let detail = match &user.default_role {
            Some(role) => format!("USER (default role {role})"),
            None => "USER".to_string(),
        };
        Self::new(&user.name, CandidateKind::User)
            .with_detail(detail)
            .with_documentation(user.comment.clone())
    }

    /// Render as an LSP completion item
    ///
    /// # Arguments
    ///
    /// * `rank` - Position in the ranked list, encoded into `sort_text` so
    ///   clients keep the engine's order
    pub fn to_completion_item(&self, rank: usize) -> CompletionItem {
        CompletionItem {
            label: self.label.clone(),
            kind: Some(self.kind.lsp_kind()),
            detail: self.detail.clone(),
            documentation: self.documentation.clone().map(Documentation::String),
            deprecated: Some(false),
            preselect: Some(self.is_current),
            sort_text: Some(format!("{:02}_{:05}", self.sort_priority, rank)),
            filter_text: Some(self.label.clone()),
            insert_text: self.insert_text.clone(),
            ..Default::default()
        }
    }
}

/// Render ranked candidates as LSP completion items, preserving order
pub fn to_completion_items(candidates: &[CompletionCandidate]) -> Vec<CompletionItem> {
    candidates
        .iter()
        .enumerate()
        .map(|(rank, c)| c.to_completion_item(rank))
        .collect()
}

fn same_name(a: Option<&str>, b: Option<&str>) -> bool {
    matches!((a, b), (Some(a), Some(b)) if a.eq_ignore_ascii_case(b))
}

/// Whether a candidate names the session's current object of its kind
pub fn is_current(candidate: &CompletionCandidate, session: &SessionContext) -> bool {
    let label = Some(candidate.label.as_str());
    match candidate.kind {
        CandidateKind::Warehouse => same_name(label, session.warehouse.as_deref()),
        CandidateKind::Role => same_name(label, session.role.as_deref()),
        CandidateKind::Database => same_name(label, session.database.as_deref()),
        CandidateKind::Schema => {
            same_name(candidate.database.as_deref(), session.database.as_deref())
                && same_name(label, session.schema.as_deref())
        }
        _ => false,
    }
}

/// Locality tier of a candidate relative to the session
pub fn locality_tier(candidate: &CompletionCandidate, session: &SessionContext) -> u32 {
    match candidate.kind {
        CandidateKind::Keyword => KEYWORD_TIER,
        CandidateKind::Warehouse | CandidateKind::Role | CandidateKind::User => {
            if candidate.is_current { 0 } else { 1 }
        }
        CandidateKind::Database => {
            if candidate.is_current { 0 } else { 1 }
        }
        CandidateKind::Schema | CandidateKind::Table | CandidateKind::View | CandidateKind::Column => {
            let same_db = same_name(candidate.database.as_deref(), session.database.as_deref());
            let same_schema = same_name(candidate.schema.as_deref(), session.schema.as_deref());
            match (same_db, same_schema) {
                (true, true) => 0,
                (true, false) => 1,
                _ => 2,
            }
        }
    }
}

/// Tag current objects, add locality tiers and sort
///
/// The sort is stable: equal priorities keep their input order.
pub fn rank_candidates(
    mut candidates: Vec<CompletionCandidate>,
    session: &SessionContext,
) -> Vec<CompletionCandidate> {
    for candidate in &mut candidates {
        candidate.is_current = is_current(candidate, session);
        candidate.sort_priority += locality_tier(candidate, session) * TIER_WEIGHT;
    }
    candidates.sort_by_key(|c| c.sort_priority);
    candidates
}

/// Shortest name that resolves to the object from the session
///
/// `NAME` inside the current schema, `SCHEMA.NAME` inside the current
/// database, `DB.SCHEMA.NAME` otherwise.
pub fn session_relative_name(
    database: &str,
    schema: &str,
    name: &str,
    session: &SessionContext,
) -> String {
    let same_db = same_name(Some(database), session.database.as_deref());
    let same_schema = same_name(Some(schema), session.schema.as_deref());
    match (same_db, same_schema) {
        (true, true) => name.to_string(),
        (true, false) => format!("{schema}.{name}"),
        _ => format!("{database}.{schema}.{name}"),
    }
}

/// Schemas outside the current database insert as `DB.SCHEMA`
fn schema_candidate(schema: &SchemaMetadata, session: &SessionContext) -> CompletionCandidate {
    let candidate = CompletionCandidate::schema(schema);
    if same_name(Some(schema.database.as_str()), session.database.as_deref()) {
        candidate
    } else {
        candidate.with_insert_text(schema.qualified_name())
    }
}

fn keyword_candidates(keywords: Vec<SqlKeyword>, prefix: &str) -> Vec<CompletionCandidate> {
    KeywordSet::new(keywords)
        .matching(prefix)
        .iter()
        .map(CompletionCandidate::keyword)
        .collect()
}

/// Completion engine
///
/// Shares the catalog and the session registry with the rest of the
/// engine; all lookups are lock-scoped and no lock is held across a fetch.
#[derive(Clone)]
pub struct CompletionEngine {
    catalog: SharedCatalog,
    source: Arc<dyn CatalogSource>,
    sessions: Arc<RwLock<SessionContextManager>>,
    keywords: KeywordProvider,
    limit: usize,
}

impl CompletionEngine {
    /// Create a new completion engine
    pub fn new(
        catalog: SharedCatalog,
        source: Arc<dyn CatalogSource>,
        sessions: Arc<RwLock<SessionContextManager>>,
    ) -> Self {
        Self {
            catalog,
            source,
            sessions,
            keywords: KeywordProvider::new(),
            limit: 100,
        }
    }

    /// Builder method: maximum number of candidates per request
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Complete at a character offset of a document
    ///
    /// # Arguments
    ///
    /// * `uri` - Document whose session context drives ranking
    /// * `text` - Full document text
    /// * `offset` - Zero-based character offset of the cursor
    ///
    /// # Returns
    ///
    /// Ranked candidates, at most the configured limit.
    ///
    /// # Errors
    ///
    /// Only a failed column load for the table named before a `.`
    /// propagates; other lazy-load failures are logged and skipped.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let candidates = engine.complete(&uri, "SELECT * FROM ord", 17).await?;
    /// assert!(candidates.iter().any(|c| c.label == "ORDERS"));
    /// ```
    #[instrument(skip(self, text))]
    pub async fn complete(
        &self,
        uri: &Url,
        text: &str,
        offset: usize,
    ) -> EngineResult<Vec<CompletionCandidate>> {
        let ctx = classify_context(text, offset);
        let session = self.sessions.write().get_context(uri).clone();
        debug!(kind = %ctx.kind, word = %ctx.current_word, "Completion context");

        let candidates = self.candidates(&ctx, &session).await?;
        let mut ranked = rank_candidates(candidates, &session);
        ranked.truncate(self.limit);
        debug!(count = ranked.len(), "Completion candidates ranked");
        Ok(ranked)
    }

    /// Unranked candidates for a classified context
    pub async fn candidates(
        &self,
        ctx: &ContextDescriptor,
        session: &SessionContext,
    ) -> EngineResult<Vec<CompletionCandidate>> {
        let prefix = ctx.current_word.as_str();
        let candidates = match ctx.kind {
            ContextKind::FromClause => self.object_candidates(prefix, session),
            ContextKind::SchemaDot => self.schema_member_candidates(ctx),
            ContextKind::TableDot => self.table_member_candidates(ctx).await?,
            ContextKind::SelectList => {
                let mut candidates = self.scope_column_candidates(ctx).await;
                candidates.extend(keyword_candidates(
                    self.keywords.select_clause_keywords().keywords,
                    prefix,
                ));
                candidates
            }
            ContextKind::WhereClause => {
                let mut candidates = self.scope_column_candidates(ctx).await;
                candidates.extend(keyword_candidates(
                    self.keywords.expression_keywords().keywords,
                    prefix,
                ));
                candidates.extend(keyword_candidates(
                    self.keywords.keywords_after_clause("WHERE"),
                    prefix,
                ));
                candidates
            }
            ContextKind::UseWarehouse => {
                let catalog = self.catalog.read();
                catalog
                    .search_warehouses(prefix, self.limit)
                    .into_iter()
                    .map(CompletionCandidate::warehouse)
                    .collect()
            }
            ContextKind::UseRole | ContextKind::GrantToRole => {
                let catalog = self.catalog.read();
                catalog
                    .search_roles(prefix, self.limit)
                    .into_iter()
                    .map(CompletionCandidate::role)
                    .collect()
            }
            ContextKind::GrantToUser => {
                let catalog = self.catalog.read();
                catalog
                    .search_users(prefix, self.limit)
                    .into_iter()
                    .map(CompletionCandidate::user)
                    .collect()
            }
            ContextKind::UseDatabase => {
                let mut candidates = self.database_candidates(prefix);
                // Bare `USE |` may still become `USE WAREHOUSE ...`
                if ctx.previous_keyword.as_deref() == Some("USE") {
                    candidates.extend(keyword_candidates(
                        self.keywords.use_keywords().keywords,
                        prefix,
                    ));
                }
                candidates
            }
            ContextKind::UseSchema => {
                let catalog = self.catalog.read();
                catalog
                    .search_schemas(prefix, self.limit)
                    .into_iter()
                    .map(|s| schema_candidate(s, session))
                    .collect()
            }
            ContextKind::General => {
                let keywords = match ctx.previous_keyword.as_deref() {
                    Some(previous) => self.keywords.keywords_after_clause(previous),
                    None => Vec::new(),
                };
                let keywords = if keywords.is_empty() {
                    self.keywords.statement_keywords().keywords
                } else {
                    keywords
                };
                let mut candidates = keyword_candidates(keywords, prefix);
                candidates.extend(self.object_candidates(prefix, session));
                candidates
            }
        };
        Ok(candidates)
    }

    /// Tables, views and schemas, with session-relative insert text
    fn object_candidates(&self, prefix: &str, session: &SessionContext) -> Vec<CompletionCandidate> {
        let catalog = self.catalog.read();
        let tables = catalog.search_tables(prefix, self.limit).into_iter().map(|t| {
            CompletionCandidate::table(t)
                .with_insert_text(session_relative_name(&t.database, &t.schema, &t.name, session))
        });
        let views = catalog.search_views(prefix, self.limit).into_iter().map(|v| {
            CompletionCandidate::view(v)
                .with_insert_text(session_relative_name(&v.database, &v.schema, &v.name, session))
        });
        let schemas = catalog
            .search_schemas(prefix, self.limit)
            .into_iter()
            .map(|s| schema_candidate(s, session));
        tables.chain(views).chain(schemas).collect()
    }

    /// Members of `SCHEMA.` / `DB.SCHEMA.` / `DB.`
    fn schema_member_candidates(&self, ctx: &ContextDescriptor) -> Vec<CompletionCandidate> {
        let Some(qualifier) = ctx.qualifier.as_deref() else {
            return Vec::new();
        };
        let member = ctx.member();
        let catalog = self.catalog.read();

        let mut candidates = Vec::new();
        if !qualifier.contains('.') {
            candidates.extend(
                catalog
                    .schemas_in_database(qualifier, member, self.limit)
                    .into_iter()
                    .map(CompletionCandidate::schema),
            );
        }
        candidates.extend(
            catalog
                .tables_in_schema(qualifier, member, self.limit)
                .into_iter()
                .map(CompletionCandidate::table),
        );
        candidates.extend(
            catalog
                .views_in_schema(qualifier, member, self.limit)
                .into_iter()
                .map(CompletionCandidate::view),
        );
        candidates
    }

    fn database_candidates(&self, prefix: &str) -> Vec<CompletionCandidate> {
        let catalog = self.catalog.read();
        if !catalog.databases().is_empty() {
            return catalog
                .search_databases(prefix, self.limit)
                .into_iter()
                .map(CompletionCandidate::database)
                .collect();
        }

        // No database listing; fall back to databases seen through schemas
        let needle = prefix.to_lowercase();
        let mut names: Vec<&str> = Vec::new();
        for schema in catalog.schemas() {
            if schema.database.to_lowercase().starts_with(&needle)
                && !names.contains(&schema.database.as_str())
            {
                names.push(&schema.database);
            }
        }
        names
            .into_iter()
            .take(self.limit)
            .map(|name| CompletionCandidate::database(&DatabaseMetadata::new(name)))
            .collect()
    }

    /// Catalog qualified name of a table identifier as written
    fn resolve_table(&self, table: &str) -> Option<String> {
        self.catalog.read().get_table(table).map(|t| t.qualified_name())
    }

    /// Columns of the table named before the dot
    async fn table_member_candidates(
        &self,
        ctx: &ContextDescriptor,
    ) -> EngineResult<Vec<CompletionCandidate>> {
        let Some(target) = ctx.resolved_table.as_deref().or(ctx.qualifier.as_deref()) else {
            return Ok(Vec::new());
        };
        let Some(qualified) = self.resolve_table(target) else {
            debug!(table = target, "Qualifier does not name a cached table");
            return Ok(Vec::new());
        };

        self.catalog
            .ensure_columns_loaded(self.source.as_ref(), &qualified)
            .await?;

        let scope = [qualified];
        let catalog = self.catalog.read();
        Ok(catalog
            .search_columns(ctx.member(), Some(&scope[..]), self.limit)
            .into_iter()
            .map(CompletionCandidate::column)
            .collect())
    }

    /// Columns of every table in scope
    ///
    /// Columns whose name occurs in more than one table insert as
    /// `qualifier.COLUMN`, using the table's alias when it has one.
    async fn scope_column_candidates(&self, ctx: &ContextDescriptor) -> Vec<CompletionCandidate> {
        let mut tables: Vec<String> = Vec::new();
        for table in ctx.tables() {
            match self.resolve_table(table) {
                Some(qualified) if !tables.contains(&qualified) => tables.push(qualified),
                Some(_) => {}
                None => debug!(table, "Table in scope is not in the catalog"),
            }
        }
        if tables.is_empty() {
            return Vec::new();
        }

        for qualified in &tables {
            if let Err(e) = self
                .catalog
                .ensure_columns_loaded(self.source.as_ref(), qualified)
                .await
            {
                warn!(table = %qualified, error = %e, "Failed to load columns, skipping table");
            }
        }

        let catalog = self.catalog.read();
        let columns = catalog.search_columns(&ctx.current_word, Some(tables.as_slice()), self.limit);

        let mut occurrences: HashMap<&str, usize> = HashMap::new();
        for column in &columns {
            *occurrences.entry(column.name.as_str()).or_default() += 1;
        }

        // Alias per catalog table; the smallest alias wins on self-joins
        let mut aliases: HashMap<String, &str> = HashMap::new();
        for (alias, table) in &ctx.alias_map {
            if let Some(meta) = catalog.get_table(table) {
                let entry = aliases.entry(meta.qualified_name()).or_insert(alias.as_str());
                if alias.as_str() < *entry {
                    *entry = alias.as_str();
                }
            }
        }

        columns
            .into_iter()
            .map(|column| {
                let candidate = CompletionCandidate::column(column);
                if occurrences.get(column.name.as_str()).copied().unwrap_or(0) > 1 {
                    let qualifier = aliases
                        .get(&column.table_qualified_name())
                        .copied()
                        .unwrap_or(column.table.as_str());
                    candidate.with_insert_text(format!("{qualifier}.{}", column.name))
                } else {
                    candidate
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::SystemTime;
    use warehouse_sql_lsp_catalog::TableType;

    fn session(database: Option<&str>, schema: Option<&str>) -> SessionContext {
        SessionContext {
            database: database.map(str::to_string),
            schema: schema.map(str::to_string),
            warehouse: Some("COMPUTE_WH".to_string()),
            role: Some("ANALYST".to_string()),
            last_updated: SystemTime::now(),
        }
    }

    fn table(db: &str, schema: &str, name: &str) -> CompletionCandidate {
        CompletionCandidate::table(&TableMetadata::new(db, schema, name))
    }

    #[test]
    fn test_locality_tiers() {
        let s = session(Some("PROD"), Some("ANALYTICS"));
        assert_eq!(locality_tier(&table("PROD", "ANALYTICS", "A"), &s), 0);
        assert_eq!(locality_tier(&table("prod", "sales", "A"), &s), 1);
        assert_eq!(locality_tier(&table("DEV", "ANALYTICS", "A"), &s), 2);
    }

    #[test]
    fn test_rank_prefers_current_schema_and_is_stable() {
        let s = session(Some("PROD"), Some("ANALYTICS"));
        let ranked = rank_candidates(
            vec![
                table("DEV", "PUBLIC", "ORDERS"),
                table("PROD", "SALES", "ORDERS"),
                table("PROD", "ANALYTICS", "ORDERS"),
                table("PROD", "ANALYTICS", "ORDER_ITEMS"),
            ],
            &s,
        );
        let order: Vec<_> = ranked
            .iter()
            .map(|c| format!("{}.{}", c.schema.as_deref().unwrap(), c.label))
            .collect();
        assert_eq!(
            order,
            vec![
                "ANALYTICS.ORDERS",
                "ANALYTICS.ORDER_ITEMS",
                "SALES.ORDERS",
                "PUBLIC.ORDERS"
            ]
        );
        assert_eq!(ranked[0].sort_priority, 1);
        assert_eq!(ranked[3].sort_priority, 1 + 2 * TIER_WEIGHT);
    }

    #[test]
    fn test_current_warehouse_tagged_and_first() {
        let s = session(None, None);
        let ranked = rank_candidates(
            vec![
                CompletionCandidate::warehouse(&WarehouseMetadata::new("ETL_WH")),
                CompletionCandidate::warehouse(&WarehouseMetadata::new("COMPUTE_WH")),
            ],
            &s,
        );
        assert_eq!(ranked[0].label, "COMPUTE_WH");
        assert!(ranked[0].is_current);
        assert!(!ranked[1].is_current);
    }

    #[test]
    fn test_keywords_rank_after_objects() {
        let s = session(None, None);
        let ranked = rank_candidates(
            vec![
                CompletionCandidate::keyword(&SqlKeyword::simple("ORDER BY", 1)),
                table("DEV", "PUBLIC", "ORDERS"),
            ],
            &s,
        );
        assert_eq!(ranked[0].kind, CandidateKind::Table);
        assert_eq!(ranked[1].kind, CandidateKind::Keyword);
    }

    #[test]
    fn test_session_relative_name() {
        let s = session(Some("PROD"), Some("ANALYTICS"));
        assert_eq!(session_relative_name("PROD", "ANALYTICS", "ORDERS", &s), "ORDERS");
        assert_eq!(session_relative_name("PROD", "SALES", "ORDERS", &s), "SALES.ORDERS");
        assert_eq!(
            session_relative_name("DEV", "PUBLIC", "T", &s),
            "DEV.PUBLIC.T"
        );
    }

    #[test]
    fn test_completion_item_rendering() {
        let candidate = CompletionCandidate::column(
            &ColumnMetadata::new("ID", "NUMBER(38,0)")
                .with_nullable(false)
                .attach("PROD", "ANALYTICS", "ORDERS"),
        );
        let items = to_completion_items(&[candidate]);
        assert_eq!(items[0].label, "ID");
        assert_eq!(items[0].kind, Some(CompletionItemKind::FIELD));
        assert_eq!(items[0].detail.as_deref(), Some("NUMBER(38,0) NOT NULL · ORDERS"));
        assert_eq!(items[0].sort_text.as_deref(), Some("00_00000"));
    }

    #[test]
    fn test_table_detail_includes_type() {
        let candidate = CompletionCandidate::table(
            &TableMetadata::new("DEMO", "RAW", "EVENTS").with_type(TableType::Transient),
        );
        assert_eq!(candidate.detail.as_deref(), Some("TRANSIENT TABLE DEMO.RAW.EVENTS"));
    }
}
