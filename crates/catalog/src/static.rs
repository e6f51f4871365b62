// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Static Catalog
//!
//! This module provides a [`CatalogSource`] that replays predefined catalog
//! data instead of querying a warehouse.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use warehouse_sql_lsp_catalog::StaticCatalogSource;
//!
//! let source = StaticCatalogSource::from_yaml_str(include_str!("catalog.yaml"))?;
//! let tables = source.fetch_tables().await?;
//! ```

use std::collections::HashMap;

use async_trait::async_trait;

use crate::metadata::{
    ColumnMetadata, DatabaseMetadata, QueryHistoryEntry, RoleMetadata, SessionDefaults,
    TableMetadata, TableType, UserMetadata, ViewMetadata, WarehouseMetadata,
};
use crate::populate::CatalogSnapshot;
use crate::qualified::qualify;
use crate::{CatalogError, CatalogResult, CatalogSource};

/// Static catalog source with predefined data
///
/// Tables are served without columns from [`CatalogSource::fetch_tables`];
/// columns are served per table so the cache's lazy path is exercised the
/// same way as against a live warehouse. Used for the playground and for
/// offline testing.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalogSource {
    snapshot: CatalogSnapshot,
    ddl: HashMap<String, String>,
    defaults: SessionDefaults,
}

impl StaticCatalogSource {
    /// Create an empty static source
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a source replaying a snapshot
    pub fn from_snapshot(snapshot: CatalogSnapshot) -> Self {
        Self {
            snapshot,
            ..Self::default()
        }
    }

    /// Load a snapshot from JSON
    pub fn from_json_str(json: &str) -> CatalogResult<Self> {
        CatalogSnapshot::from_json_str(json).map(Self::from_snapshot)
    }

    /// Load a snapshot from YAML
    pub fn from_yaml_str(yaml: &str) -> CatalogResult<Self> {
        CatalogSnapshot::from_yaml_str(yaml).map(Self::from_snapshot)
    }

    /// Builder method: add a table (with its columns)
    pub fn with_table(mut self, table: TableMetadata) -> Self {
        self.snapshot.tables.push(table);
        self
    }

    pub fn with_view(mut self, view: ViewMetadata) -> Self {
        self.snapshot.views.push(view);
        self
    }

    pub fn with_warehouse(mut self, warehouse: WarehouseMetadata) -> Self {
        self.snapshot.warehouses.push(warehouse);
        self
    }

    pub fn with_role(mut self, role: RoleMetadata) -> Self {
        self.snapshot.roles.push(role);
        self
    }

    pub fn with_user(mut self, user: UserMetadata) -> Self {
        self.snapshot.users.push(user);
        self
    }

    pub fn with_database(mut self, database: DatabaseMetadata) -> Self {
        self.snapshot.databases.push(database);
        self
    }

    pub fn with_query(mut self, entry: QueryHistoryEntry) -> Self {
        self.snapshot.query_history.push(entry);
        self
    }

    /// Builder method: set DDL text returned for a table
    pub fn with_ddl(mut self, qualified_name: &str, ddl: impl Into<String>) -> Self {
        self.ddl.insert(qualify(&[qualified_name]), ddl.into());
        self
    }

    /// Builder method: set the ambient session defaults
    pub fn with_session_defaults(mut self, defaults: SessionDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn snapshot(&self) -> &CatalogSnapshot {
        &self.snapshot
    }

    fn find_table(&self, database: &str, schema: &str, table: &str) -> Option<&TableMetadata> {
        let key = qualify(&[database, schema, table]);
        self.snapshot
            .tables
            .iter()
            .find(|t| t.qualified_name() == key)
    }

    /// Small demo warehouse used by the playground
    pub fn playground() -> Self {
        let orders = TableMetadata::new("DEMO", "PUBLIC", "ORDERS")
            .with_comment("Customer orders")
            .with_row_count(3)
            .with_columns(vec![
                ColumnMetadata::new("ID", "NUMBER(38,0)").with_nullable(false),
                ColumnMetadata::new("CUSTOMER_ID", "NUMBER(38,0)")
                    .with_nullable(false)
                    .with_comment("References CUSTOMERS.ID"),
                ColumnMetadata::new("TOTAL", "NUMBER(12,2)"),
                ColumnMetadata::new("STATUS", "VARCHAR(20)").with_default("'pending'"),
                ColumnMetadata::new("CREATED_AT", "TIMESTAMP_NTZ")
                    .with_default("CURRENT_TIMESTAMP()"),
            ]);

        let customers = TableMetadata::new("DEMO", "PUBLIC", "CUSTOMERS")
            .with_comment("Customer accounts")
            .with_columns(vec![
                ColumnMetadata::new("ID", "NUMBER(38,0)").with_nullable(false),
                ColumnMetadata::new("NAME", "VARCHAR(100)").with_nullable(false),
                ColumnMetadata::new("EMAIL", "VARCHAR(255)"),
            ]);

        let events = TableMetadata::new("DEMO", "RAW", "EVENTS")
            .with_type(TableType::Transient)
            .with_columns(vec![
                ColumnMetadata::new("EVENT_ID", "VARCHAR"),
                ColumnMetadata::new("PAYLOAD", "VARIANT"),
            ]);

        Self::new()
            .with_database(DatabaseMetadata::new("DEMO"))
            .with_table(orders)
            .with_table(customers)
            .with_table(events)
            .with_view(ViewMetadata::new("DEMO", "PUBLIC", "ORDER_TOTALS"))
            .with_warehouse(WarehouseMetadata::new("COMPUTE_WH").with_size("X-SMALL"))
            .with_role(RoleMetadata::new("PUBLIC"))
            .with_role(RoleMetadata::new("SYSADMIN"))
            .with_user(UserMetadata::new("PLAYGROUND").with_default_role("PUBLIC"))
            .with_ddl(
                "DEMO.PUBLIC.ORDERS",
                "create or replace TABLE ORDERS (\n\tID NUMBER(38,0) NOT NULL,\n\tCUSTOMER_ID NUMBER(38,0) NOT NULL,\n\tTOTAL NUMBER(12,2),\n\tSTATUS VARCHAR(20) DEFAULT 'pending',\n\tCREATED_AT TIMESTAMP_NTZ DEFAULT CURRENT_TIMESTAMP()\n);",
            )
            .with_session_defaults(SessionDefaults {
                database: Some("DEMO".to_string()),
                schema: Some("PUBLIC".to_string()),
                warehouse: Some("COMPUTE_WH".to_string()),
                role: Some("PUBLIC".to_string()),
            })
    }
}

#[async_trait]
impl CatalogSource for StaticCatalogSource {
    async fn fetch_tables(&self) -> CatalogResult<Vec<TableMetadata>> {
        Ok(self
            .snapshot
            .tables
            .iter()
            .map(|t| TableMetadata {
                columns: Vec::new(),
                ..t.clone()
            })
            .collect())
    }

    async fn fetch_columns_for_table(
        &self,
        database: &str,
        schema: &str,
        table: &str,
    ) -> CatalogResult<Vec<ColumnMetadata>> {
        self.find_table(database, schema, table)
            .map(|t| t.columns.clone())
            .ok_or_else(|| CatalogError::TableNotFound(qualify(&[database, schema, table])))
    }

    async fn fetch_views(&self) -> CatalogResult<Vec<ViewMetadata>> {
        Ok(self.snapshot.views.clone())
    }

    async fn fetch_warehouses(&self) -> CatalogResult<Vec<WarehouseMetadata>> {
        Ok(self.snapshot.warehouses.clone())
    }

    async fn fetch_roles(&self) -> CatalogResult<Vec<RoleMetadata>> {
        Ok(self.snapshot.roles.clone())
    }

    async fn fetch_users(&self) -> CatalogResult<Vec<UserMetadata>> {
        Ok(self.snapshot.users.clone())
    }

    async fn fetch_databases(&self) -> CatalogResult<Vec<DatabaseMetadata>> {
        Ok(self.snapshot.databases.clone())
    }

    async fn fetch_query_history(&self) -> CatalogResult<Vec<QueryHistoryEntry>> {
        Ok(self.snapshot.query_history.clone())
    }

    async fn fetch_ddl(&self, database: &str, schema: &str, table: &str) -> CatalogResult<String> {
        let key = qualify(&[database, schema, table]);
        self.ddl
            .get(&key)
            .cloned()
            .ok_or_else(|| CatalogError::TableNotFound(key))
    }

    async fn fetch_current_session_defaults(&self) -> CatalogResult<SessionDefaults> {
        Ok(self.defaults.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_playground_tables_without_columns() {
        let source = StaticCatalogSource::playground();
        let tables = source.fetch_tables().await.unwrap();
        assert_eq!(tables.len(), 3);
        assert!(tables.iter().all(|t| t.columns.is_empty()));
    }

    #[tokio::test]
    async fn test_fetch_columns_for_table() {
        let source = StaticCatalogSource::playground();
        let columns = source
            .fetch_columns_for_table("demo", "public", "orders")
            .await
            .unwrap();
        assert_eq!(columns.len(), 5);
        assert_eq!(columns[0].name, "ID");
        assert_eq!(columns[0].table, "ORDERS");
    }

    #[tokio::test]
    async fn test_fetch_columns_table_not_found() {
        let source = StaticCatalogSource::playground();
        let result = source.fetch_columns_for_table("DEMO", "PUBLIC", "NOPE").await;
        assert!(matches!(result, Err(CatalogError::TableNotFound(_))));
    }

    #[tokio::test]
    async fn test_fetch_ddl() {
        let source = StaticCatalogSource::playground();
        let ddl = source.fetch_ddl("DEMO", "PUBLIC", "ORDERS").await.unwrap();
        assert!(ddl.starts_with("create or replace TABLE ORDERS"));
        assert!(source.fetch_ddl("DEMO", "PUBLIC", "CUSTOMERS").await.is_err());
    }

    #[tokio::test]
    async fn test_from_json_str() {
        let json = r#"{"roles": [{"name": "ANALYST"}], "users": [{"name": "BOB"}]}"#;
        let source = StaticCatalogSource::from_json_str(json).unwrap();
        assert_eq!(source.fetch_roles().await.unwrap()[0].name, "ANALYST");
        assert_eq!(source.fetch_users().await.unwrap().len(), 1);
        assert!(source.fetch_tables().await.unwrap().is_empty());
    }
}
