// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Catalog cache
//!
//! In-memory store of warehouse catalog entities with bulk-replace loads per
//! category, lookup indices, prefix search, lazy column loading and a
//! TTL-bound DDL cache.
//!
//! ## Indices
//!
//! - qualified table name → table slot
//! - lower-cased bare table name → qualified names (insertion order)
//! - qualified column name → column slot
//! - distinct `DB.SCHEMA` pairs observed while loading tables
//!
//! Searches walk the category in insertion order and stop at the caller's
//! limit; there is no relevance scoring beyond prefix matching.
//!
//! ## Known limitations
//!
//! - Bare-name lookups that match several qualified tables return the first
//!   one loaded.
//! - [`CatalogCache::ensure_columns_loaded`] does not join concurrent calls for
//!   the same table; two callers may both fetch. The final write is
//!   idempotent per table.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::time::{Duration, SystemTime};

use serde::Serialize;
use tracing::{debug, info};

use crate::ddl::DdlCache;
use crate::error::{CatalogError, CatalogResult};
use crate::metadata::{
    ColumnMetadata, DatabaseMetadata, QueryHistoryEntry, RoleMetadata, SchemaMetadata,
    TableMetadata, UserMetadata, ViewMetadata, WarehouseMetadata,
};
use crate::qualified::{TableName, normalize, qualify};
use crate::populate::CatalogSnapshot;

#[derive(Debug, Clone)]
struct CachedTable {
    qualified_name: String,
    table: TableMetadata,
    columns_loaded: bool,
}

/// Per-category entry counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub databases: usize,
    pub schemas: usize,
    pub tables: usize,
    pub tables_with_columns: usize,
    pub columns: usize,
    pub views: usize,
    pub warehouses: usize,
    pub roles: usize,
    pub users: usize,
    pub query_history: usize,
    pub ddl_entries: usize,
}

/// In-memory catalog cache
///
/// Owned by the process. Load operations replace a whole category; column
/// lists and DDL entries are filled in incrementally per table.
#[derive(Debug, Clone, Default)]
pub struct CatalogCache {
    tables: Vec<CachedTable>,
    table_index: HashMap<String, usize>,
    table_name_index: HashMap<String, Vec<String>>,

    columns: Vec<ColumnMetadata>,
    column_index: HashMap<String, usize>,

    schemas: Vec<SchemaMetadata>,
    schema_index: HashSet<String>,

    views: Vec<ViewMetadata>,
    view_index: HashMap<String, usize>,

    warehouses: Vec<WarehouseMetadata>,
    roles: Vec<RoleMetadata>,
    users: Vec<UserMetadata>,
    databases: Vec<DatabaseMetadata>,
    query_history: Vec<QueryHistoryEntry>,

    ddl: DdlCache,
}

fn matches_prefix(bare: &str, qualified: &str, needle: &str) -> bool {
    needle.is_empty()
        || bare.to_lowercase().starts_with(needle)
        || qualified.to_lowercase().contains(needle)
}

fn name_starts_with(name: &str, needle: &str) -> bool {
    needle.is_empty() || name.to_lowercase().starts_with(needle)
}

impl CatalogCache {
    /// Create an empty cache with the default DDL TTL
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty cache with a custom DDL TTL
    pub fn with_ddl_ttl(ttl: Duration) -> Self {
        Self {
            ddl: DdlCache::new(ttl),
            ..Self::default()
        }
    }

    // ===== Bulk loads =====

    /// Replace all tables, their columns and the derived schema set
    ///
    /// A table supplied with a non-empty column list counts as loaded; the
    /// others are filled in by [`CatalogCache::ensure_columns_loaded`].
    pub fn load_tables(&mut self, tables: Vec<TableMetadata>) {
        self.tables.clear();
        self.table_index.clear();
        self.table_name_index.clear();
        self.columns.clear();
        self.column_index.clear();
        self.schemas.clear();
        self.schema_index.clear();

        for mut table in tables {
            let qualified_name = table.qualified_name();
            let columns = std::mem::take(&mut table.columns);
            table.columns = table.attach_columns(columns);

            let schema_key = table.schema_qualified_name();
            if self.schema_index.insert(schema_key) {
                self.schemas.push(SchemaMetadata::new(
                    normalize(&table.database),
                    normalize(&table.schema),
                ));
            }

            // A repeated table replaces the earlier entry and its columns
            if self.table_index.contains_key(&qualified_name) {
                self.remove_columns_of(&qualified_name);
            }
            for column in &table.columns {
                self.index_column(column.clone());
            }

            let entry = CachedTable {
                qualified_name: qualified_name.clone(),
                columns_loaded: !table.columns.is_empty(),
                table,
            };

            match self.table_index.get(&qualified_name) {
                Some(&slot) => self.tables[slot] = entry,
                None => {
                    self.table_name_index
                        .entry(entry.table.name.to_lowercase())
                        .or_default()
                        .push(qualified_name.clone());
                    self.table_index.insert(qualified_name, self.tables.len());
                    self.tables.push(entry);
                }
            }
        }

        info!(
            tables = self.tables.len(),
            schemas = self.schemas.len(),
            columns = self.columns.len(),
            "Loaded tables into catalog cache"
        );
    }

    /// Replace all views
    pub fn load_views(&mut self, views: Vec<ViewMetadata>) {
        self.views.clear();
        self.view_index.clear();
        for view in views {
            let key = view.qualified_name();
            match self.view_index.get(&key) {
                Some(&slot) => self.views[slot] = view,
                None => {
                    self.view_index.insert(key, self.views.len());
                    self.views.push(view);
                }
            }
        }
        debug!(views = self.views.len(), "Loaded views");
    }

    pub fn load_warehouses(&mut self, warehouses: Vec<WarehouseMetadata>) {
        self.warehouses = warehouses;
        debug!(warehouses = self.warehouses.len(), "Loaded warehouses");
    }

    pub fn load_roles(&mut self, roles: Vec<RoleMetadata>) {
        self.roles = roles;
        debug!(roles = self.roles.len(), "Loaded roles");
    }

    pub fn load_users(&mut self, users: Vec<UserMetadata>) {
        self.users = users;
        debug!(users = self.users.len(), "Loaded users");
    }

    pub fn load_databases(&mut self, databases: Vec<DatabaseMetadata>) {
        self.databases = databases;
        debug!(databases = self.databases.len(), "Loaded databases");
    }

    pub fn load_query_history(&mut self, entries: Vec<QueryHistoryEntry>) {
        self.query_history = entries;
        debug!(entries = self.query_history.len(), "Loaded query history");
    }

    /// Replace every category from a snapshot
    ///
    /// Categories missing from the snapshot (e.g. because their fetch
    /// failed) become empty.
    pub fn apply_snapshot(&mut self, snapshot: CatalogSnapshot) {
        self.load_tables(snapshot.tables);
        self.load_views(snapshot.views);
        self.load_warehouses(snapshot.warehouses);
        self.load_roles(snapshot.roles);
        self.load_users(snapshot.users);
        self.load_databases(snapshot.databases);
        self.load_query_history(snapshot.query_history);
    }

    /// Drop every category and all DDL entries
    pub fn clear(&mut self) {
        let ttl = self.ddl.ttl();
        *self = Self::with_ddl_ttl(ttl);
    }

    // ===== Lookups =====

    fn resolve_table_slot(&self, name: &str) -> Option<usize> {
        let upper = normalize(name);
        if upper.is_empty() {
            return None;
        }

        if let Some(&slot) = self.table_index.get(&upper) {
            return Some(slot);
        }

        let suffix = format!(".{upper}");
        if let Some(slot) = self
            .tables
            .iter()
            .position(|t| t.qualified_name.ends_with(&suffix))
        {
            return Some(slot);
        }

        // First match wins on ambiguity
        self.table_name_index
            .get(&name.trim().to_lowercase())
            .and_then(|names| names.first())
            .and_then(|q| self.table_index.get(q).copied())
    }

    /// Look up a table by qualified, partially qualified or bare name
    ///
    /// Tries an exact qualified match, then a `.NAME` suffix match, then the
    /// case-insensitive bare-name index.
    pub fn get_table(&self, name: &str) -> Option<&TableMetadata> {
        self.resolve_table_slot(name).map(|slot| &self.tables[slot].table)
    }

    /// Look up a view with the same rules as [`CatalogCache::get_table`]
    pub fn get_view(&self, name: &str) -> Option<&ViewMetadata> {
        let upper = normalize(name);
        if upper.is_empty() {
            return None;
        }
        if let Some(&slot) = self.view_index.get(&upper) {
            return Some(&self.views[slot]);
        }
        let suffix = format!(".{upper}");
        self.views
            .iter()
            .find(|v| v.qualified_name().ends_with(&suffix))
            .or_else(|| {
                self.views
                    .iter()
                    .find(|v| v.name.eq_ignore_ascii_case(name.trim()))
            })
    }

    /// Column by owning table (any accepted table spelling) and column name
    pub fn get_column(&self, table: &str, column: &str) -> Option<&ColumnMetadata> {
        let slot = self.resolve_table_slot(table)?;
        let key = format!("{}.{}", self.tables[slot].qualified_name, normalize(column));
        self.column_index
            .get(&key)
            .map(|&i| &self.columns[i])
            .or_else(|| self.tables[slot].table.get_column(column))
    }

    /// Exact qualified-name membership, without suffix or bare-name fallback
    pub fn contains_table(&self, qualified_name: &str) -> bool {
        self.table_index.contains_key(&normalize(qualified_name))
    }

    pub fn table_exists(&self, name: &str) -> bool {
        self.get_table(name).is_some()
    }

    pub fn view_exists(&self, name: &str) -> bool {
        self.get_view(name).is_some()
    }

    pub fn column_exists(&self, table: &str, column: &str) -> bool {
        self.get_column(table, column).is_some()
    }

    /// Accepts `SCHEMA` or `DB.SCHEMA`
    pub fn schema_exists(&self, name: &str) -> bool {
        let upper = normalize(name);
        self.schema_index.contains(&upper) || self.schemas.iter().any(|s| s.name == upper)
    }

    pub fn database_exists(&self, name: &str) -> bool {
        self.databases
            .iter()
            .any(|d| d.name.eq_ignore_ascii_case(name.trim()))
            || self
                .schemas
                .iter()
                .any(|s| s.database.eq_ignore_ascii_case(name.trim()))
    }

    /// Whether any tables have been loaded
    pub fn has_tables(&self) -> bool {
        !self.tables.is_empty()
    }

    // ===== Lazy column loading =====

    /// Whether the table's columns have been loaded
    pub fn columns_loaded(&self, qualified_name: &str) -> bool {
        self.table_index
            .get(&normalize(qualified_name))
            .map(|&slot| self.tables[slot].columns_loaded)
            .unwrap_or(false)
    }

    /// Store fetched columns for a cached table and mark it loaded
    ///
    /// Replaces any columns previously indexed for the table.
    ///
    /// # Returns
    ///
    /// The number of columns stored.
    pub fn store_columns(
        &mut self,
        name: &TableName,
        columns: Vec<ColumnMetadata>,
    ) -> CatalogResult<usize> {
        let key = name.to_string();
        let slot = *self
            .table_index
            .get(&key)
            .ok_or_else(|| CatalogError::TableNotFound(key.clone()))?;

        let attached = self.tables[slot].table.attach_columns(columns);
        self.remove_columns_of(&key);
        for column in &attached {
            self.index_column(column.clone());
        }

        let count = attached.len();
        let entry = &mut self.tables[slot];
        entry.table.columns = attached;
        entry.columns_loaded = true;

        debug!(table = %key, columns = count, "Stored table columns");
        Ok(count)
    }

    /// Load a table's columns through `fetch` unless already loaded
    ///
    /// # Arguments
    ///
    /// * `qualified_name` - `DB.SCHEMA.TABLE`
    /// * `fetch` - Callback receiving the parsed name
    ///
    /// # Errors
    ///
    /// - `CatalogError::InvalidQualifiedName` if the name does not have three
    ///   segments (checked before any fetch)
    /// - `CatalogError::TableNotFound` if the table is not cached
    /// - any error returned by `fetch`; the table then stays unloaded so a
    ///   later call retries
    ///
    /// # Examples
    ///
    /// ```ignore
    /// cache
    ///     .ensure_columns_loaded("PROD.ANALYTICS.ORDERS", |name| async move {
    ///         source
    ///             .fetch_columns_for_table(&name.database, &name.schema, &name.table)
    ///             .await
    ///     })
    ///     .await?;
    /// ```
    pub async fn ensure_columns_loaded<F, Fut>(
        &mut self,
        qualified_name: &str,
        fetch: F,
    ) -> CatalogResult<()>
    where
        F: FnOnce(TableName) -> Fut,
        Fut: Future<Output = CatalogResult<Vec<ColumnMetadata>>>,
    {
        if self.columns_loaded(qualified_name) {
            return Ok(());
        }

        let name = TableName::parse(qualified_name)?;
        if !self.contains_table(&name.to_string()) {
            return Err(CatalogError::TableNotFound(name.to_string()));
        }

        debug!(table = %name, "Fetching columns for table");
        let columns = fetch(name.clone()).await?;
        self.store_columns(&name, columns)?;
        Ok(())
    }

    fn index_column(&mut self, column: ColumnMetadata) {
        let key = column.qualified_name();
        match self.column_index.get(&key) {
            Some(&slot) => self.columns[slot] = column,
            None => {
                self.column_index.insert(key, self.columns.len());
                self.columns.push(column);
            }
        }
    }

    fn remove_columns_of(&mut self, table_qualified_name: &str) {
        let before = self.columns.len();
        self.columns
            .retain(|c| c.table_qualified_name() != table_qualified_name);
        if self.columns.len() != before {
            self.column_index = self
                .columns
                .iter()
                .enumerate()
                .map(|(i, c)| (c.qualified_name(), i))
                .collect();
        }
    }

    // ===== Prefix search =====

    /// Tables whose bare name starts with, or qualified name contains, `prefix`
    pub fn search_tables(&self, prefix: &str, limit: usize) -> Vec<&TableMetadata> {
        let needle = prefix.trim().to_lowercase();
        self.tables
            .iter()
            .filter(|t| matches_prefix(&t.table.name, &t.qualified_name, &needle))
            .take(limit)
            .map(|t| &t.table)
            .collect()
    }

    pub fn search_views(&self, prefix: &str, limit: usize) -> Vec<&ViewMetadata> {
        let needle = prefix.trim().to_lowercase();
        self.views
            .iter()
            .filter(|v| matches_prefix(&v.name, &v.qualified_name(), &needle))
            .take(limit)
            .collect()
    }

    /// Columns matching `prefix`, optionally restricted to a set of tables
    ///
    /// # Arguments
    ///
    /// * `prefix` - Partial column name
    /// * `tables` - Table identifiers in scope; each is compared
    ///   case-insensitively with the column's `DB.SCHEMA.TABLE`,
    ///   `SCHEMA.TABLE` and bare table name
    /// * `limit` - Maximum number of results
    pub fn search_columns(
        &self,
        prefix: &str,
        tables: Option<&[String]>,
        limit: usize,
    ) -> Vec<&ColumnMetadata> {
        let needle = prefix.trim().to_lowercase();
        let scope: Option<HashSet<String>> =
            tables.map(|ts| ts.iter().map(|t| t.trim().to_lowercase()).collect());

        self.columns
            .iter()
            .filter(|c| match &scope {
                None => true,
                Some(scope) => {
                    scope.contains(&c.table_qualified_name().to_lowercase())
                        || scope.contains(&format!("{}.{}", c.schema, c.table).to_lowercase())
                        || scope.contains(&c.table.to_lowercase())
                }
            })
            .filter(|c| matches_prefix(&c.name, &c.qualified_name(), &needle))
            .take(limit)
            .collect()
    }

    pub fn search_schemas(&self, prefix: &str, limit: usize) -> Vec<&SchemaMetadata> {
        let needle = prefix.trim().to_lowercase();
        self.schemas
            .iter()
            .filter(|s| matches_prefix(&s.name, &s.qualified_name(), &needle))
            .take(limit)
            .collect()
    }

    pub fn search_warehouses(&self, prefix: &str, limit: usize) -> Vec<&WarehouseMetadata> {
        let needle = prefix.trim().to_lowercase();
        self.warehouses
            .iter()
            .filter(|w| name_starts_with(&w.name, &needle))
            .take(limit)
            .collect()
    }

    pub fn search_roles(&self, prefix: &str, limit: usize) -> Vec<&RoleMetadata> {
        let needle = prefix.trim().to_lowercase();
        self.roles
            .iter()
            .filter(|r| name_starts_with(&r.name, &needle))
            .take(limit)
            .collect()
    }

    pub fn search_users(&self, prefix: &str, limit: usize) -> Vec<&UserMetadata> {
        let needle = prefix.trim().to_lowercase();
        self.users
            .iter()
            .filter(|u| name_starts_with(&u.name, &needle))
            .take(limit)
            .collect()
    }

    pub fn search_databases(&self, prefix: &str, limit: usize) -> Vec<&DatabaseMetadata> {
        let needle = prefix.trim().to_lowercase();
        self.databases
            .iter()
            .filter(|d| name_starts_with(&d.name, &needle))
            .take(limit)
            .collect()
    }

    /// Tables inside `SCHEMA` or `DB.SCHEMA` whose name starts with `prefix`
    pub fn tables_in_schema(
        &self,
        schema: &str,
        prefix: &str,
        limit: usize,
    ) -> Vec<&TableMetadata> {
        let upper = normalize(schema);
        let needle = prefix.trim().to_lowercase();
        self.tables
            .iter()
            .map(|t| &t.table)
            .filter(|t| normalize(&t.schema) == upper || t.schema_qualified_name() == upper)
            .filter(|t| name_starts_with(&t.name, &needle))
            .take(limit)
            .collect()
    }

    pub fn views_in_schema(&self, schema: &str, prefix: &str, limit: usize) -> Vec<&ViewMetadata> {
        let upper = normalize(schema);
        let needle = prefix.trim().to_lowercase();
        self.views
            .iter()
            .filter(|v| {
                normalize(&v.schema) == upper || qualify(&[&v.database, &v.schema]) == upper
            })
            .filter(|v| name_starts_with(&v.name, &needle))
            .take(limit)
            .collect()
    }

    pub fn schemas_in_database(
        &self,
        database: &str,
        prefix: &str,
        limit: usize,
    ) -> Vec<&SchemaMetadata> {
        let upper = normalize(database);
        let needle = prefix.trim().to_lowercase();
        self.schemas
            .iter()
            .filter(|s| s.database == upper)
            .filter(|s| name_starts_with(&s.name, &needle))
            .take(limit)
            .collect()
    }

    // ===== Category accessors =====

    pub fn warehouses(&self) -> &[WarehouseMetadata] {
        &self.warehouses
    }

    pub fn roles(&self) -> &[RoleMetadata] {
        &self.roles
    }

    pub fn users(&self) -> &[UserMetadata] {
        &self.users
    }

    pub fn databases(&self) -> &[DatabaseMetadata] {
        &self.databases
    }

    pub fn schemas(&self) -> &[SchemaMetadata] {
        &self.schemas
    }

    /// Most recent `limit` history entries, newest last as loaded
    pub fn recent_queries(&self, limit: usize) -> &[QueryHistoryEntry] {
        let start = self.query_history.len().saturating_sub(limit);
        &self.query_history[start..]
    }

    // ===== DDL =====

    pub fn cache_ddl(&mut self, qualified_name: &str, ddl_text: impl Into<String>) {
        self.ddl.insert(qualified_name, ddl_text);
    }

    /// Cache DDL with an explicit fetch time
    pub fn cache_ddl_at(
        &mut self,
        qualified_name: &str,
        ddl_text: impl Into<String>,
        fetched_at: SystemTime,
    ) {
        self.ddl.insert_at(qualified_name, ddl_text, fetched_at);
    }

    /// Cached DDL, `None` if absent or expired
    pub fn get_ddl(&self, qualified_name: &str) -> Option<&str> {
        self.ddl.get(qualified_name)
    }

    /// Whether fresh DDL is cached; evicts an expired entry
    pub fn has_ddl(&mut self, qualified_name: &str) -> bool {
        self.ddl.contains(qualified_name)
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            databases: self.databases.len(),
            schemas: self.schemas.len(),
            tables: self.tables.len(),
            tables_with_columns: self.tables.iter().filter(|t| t.columns_loaded).count(),
            columns: self.columns.len(),
            views: self.views.len(),
            warehouses: self.warehouses.len(),
            roles: self.roles.len(),
            users: self.users.len(),
            query_history: self.query_history.len(),
            ddl_entries: self.ddl.len(),
        }
    }
}
