// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Catalog source trait
//!
//! This module defines the async [`CatalogSource`] trait: the boundary to the
//! warehouse connection that feeds the in-memory cache. Implementations talk
//! to a live warehouse, replay a static snapshot, or mock upstream behaviour
//! in tests. Timeouts and retries belong to the implementation, not the cache.

use crate::error::CatalogResult;
use crate::metadata::{
    ColumnMetadata, DatabaseMetadata, QueryHistoryEntry, RoleMetadata, SessionDefaults,
    TableMetadata, UserMetadata, ViewMetadata, WarehouseMetadata,
};

/// Upstream provider of catalog metadata
///
/// Every operation may fail; the cache decides how failures propagate
/// (bulk population isolates them per category, lazy loads surface them).
///
/// # Examples
///
/// ```rust,ignore
/// use warehouse_sql_lsp_catalog::{CatalogError, CatalogSource};
///
/// async fn table_names(source: &dyn CatalogSource) -> Result<Vec<String>, CatalogError> {
///     let tables = source.fetch_tables().await?;
///     Ok(tables.into_iter().map(|t| t.qualified_name()).collect())
/// }
/// ```
#[async_trait::async_trait]
pub trait CatalogSource: Send + Sync {
    /// List all tables visible to the session
    ///
    /// Tables may be returned without columns; those are fetched lazily
    /// through [`CatalogSource::fetch_columns_for_table`].
    async fn fetch_tables(&self) -> CatalogResult<Vec<TableMetadata>>;

    /// Get column metadata for a single table
    ///
    /// # Arguments
    ///
    /// * `database` - Database name (upper-cased)
    /// * `schema` - Schema name (upper-cased)
    /// * `table` - Table name (upper-cased)
    async fn fetch_columns_for_table(
        &self,
        database: &str,
        schema: &str,
        table: &str,
    ) -> CatalogResult<Vec<ColumnMetadata>>;

    async fn fetch_views(&self) -> CatalogResult<Vec<ViewMetadata>>;

    async fn fetch_warehouses(&self) -> CatalogResult<Vec<WarehouseMetadata>>;

    async fn fetch_roles(&self) -> CatalogResult<Vec<RoleMetadata>>;

    async fn fetch_users(&self) -> CatalogResult<Vec<UserMetadata>>;

    async fn fetch_databases(&self) -> CatalogResult<Vec<DatabaseMetadata>>;

    async fn fetch_query_history(&self) -> CatalogResult<Vec<QueryHistoryEntry>>;

    /// Get the DDL text of a table
    async fn fetch_ddl(&self, database: &str, schema: &str, table: &str) -> CatalogResult<String>;

    /// Ambient database/schema/warehouse/role of the connection
    ///
    /// Used once at startup to seed the global session context.
    async fn fetch_current_session_defaults(&self) -> CatalogResult<SessionDefaults>;
}
