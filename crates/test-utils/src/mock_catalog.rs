// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Mock catalog source for testing
//!
//! Wraps a [`StaticCatalogSource`] with fetch counters and failure switches,
//! so tests can observe how often the cache goes upstream and how it reacts
//! when a category or a lazy load fails.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use warehouse_sql_lsp_catalog::{
    CatalogCategory, CatalogError, CatalogResult, CatalogSource, ColumnMetadata,
    DatabaseMetadata, QueryHistoryEntry, RoleMetadata, SessionDefaults, StaticCatalogSource,
    TableMetadata, UserMetadata, ViewMetadata, WarehouseMetadata,
};

/// In-memory catalog source with call accounting
#[derive(Debug, Default)]
pub struct MockCatalogSource {
    inner: StaticCatalogSource,
    failing: HashSet<CatalogCategory>,
    fail_columns: AtomicBool,
    fail_ddl: AtomicBool,
    fail_session_defaults: AtomicBool,
    table_fetches: AtomicUsize,
    column_fetches: AtomicUsize,
    ddl_fetches: AtomicUsize,
}

impl MockCatalogSource {
    /// Create a mock over an existing static source
    pub fn new(inner: StaticCatalogSource) -> Self {
        Self {
            inner,
            ..Self::default()
        }
    }

    /// Number of `fetch_tables` calls so far
    pub fn table_fetches(&self) -> usize {
        self.table_fetches.load(Ordering::SeqCst)
    }

    /// Number of `fetch_columns_for_table` calls so far
    pub fn column_fetches(&self) -> usize {
        self.column_fetches.load(Ordering::SeqCst)
    }

    /// Number of `fetch_ddl` calls so far
    pub fn ddl_fetches(&self) -> usize {
        self.ddl_fetches.load(Ordering::SeqCst)
    }

    /// Toggle failure of lazy column loads
    pub fn set_fail_columns(&self, fail: bool) {
        self.fail_columns.store(fail, Ordering::SeqCst);
    }

    /// Toggle failure of DDL fetches
    pub fn set_fail_ddl(&self, fail: bool) {
        self.fail_ddl.store(fail, Ordering::SeqCst);
    }

    pub fn inner(&self) -> &StaticCatalogSource {
        &self.inner
    }

    fn check(&self, category: CatalogCategory) -> CatalogResult<()> {
        if self.failing.contains(&category) {
            return Err(CatalogError::QueryFailed(format!(
                "mock failure fetching {category}"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogSource for MockCatalogSource {
    async fn fetch_tables(&self) -> CatalogResult<Vec<TableMetadata>> {
        self.table_fetches.fetch_add(1, Ordering::SeqCst);
        self.check(CatalogCategory::Tables)?;
        self.inner.fetch_tables().await
    }

    async fn fetch_columns_for_table(
        &self,
        database: &str,
        schema: &str,
        table: &str,
    ) -> CatalogResult<Vec<ColumnMetadata>> {
        self.column_fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail_columns.load(Ordering::SeqCst) {
            return Err(CatalogError::ConnectionFailed(
                "mock connection dropped".to_string(),
            ));
        }
        self.inner
            .fetch_columns_for_table(database, schema, table)
            .await
    }

    async fn fetch_views(&self) -> CatalogResult<Vec<ViewMetadata>> {
        self.check(CatalogCategory::Views)?;
        self.inner.fetch_views().await
    }

    async fn fetch_warehouses(&self) -> CatalogResult<Vec<WarehouseMetadata>> {
        self.check(CatalogCategory::Warehouses)?;
        self.inner.fetch_warehouses().await
    }

    async fn fetch_roles(&self) -> CatalogResult<Vec<RoleMetadata>> {
        self.check(CatalogCategory::Roles)?;
        self.inner.fetch_roles().await
    }

    async fn fetch_users(&self) -> CatalogResult<Vec<UserMetadata>> {
        self.check(CatalogCategory::Users)?;
        self.inner.fetch_users().await
    }

    async fn fetch_databases(&self) -> CatalogResult<Vec<DatabaseMetadata>> {
        self.check(CatalogCategory::Databases)?;
        self.inner.fetch_databases().await
    }

    async fn fetch_query_history(&self) -> CatalogResult<Vec<QueryHistoryEntry>> {
        self.check(CatalogCategory::QueryHistory)?;
        self.inner.fetch_query_history().await
    }

    async fn fetch_ddl(&self, database: &str, schema: &str, table: &str) -> CatalogResult<String> {
        self.ddl_fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail_ddl.load(Ordering::SeqCst) {
            return Err(CatalogError::QueryFailed("mock GET_DDL failure".to_string()));
        }
        self.inner.fetch_ddl(database, schema, table).await
    }

    async fn fetch_current_session_defaults(&self) -> CatalogResult<SessionDefaults> {
        if self.fail_session_defaults.load(Ordering::SeqCst) {
            return Err(CatalogError::ConnectionFailed(
                "mock session unavailable".to_string(),
            ));
        }
        self.inner.fetch_current_session_defaults().await
    }
}

/// Builder for creating mock catalog sources with a fluent API
#[derive(Debug, Default)]
pub struct MockCatalogBuilder {
    source: StaticCatalogSource,
    failing: HashSet<CatalogCategory>,
    fail_columns: bool,
    fail_session_defaults: bool,
}

impl MockCatalogBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a standard warehouse for testing
    ///
    /// Database `PROD` with schemas `ANALYTICS` (`ORDERS`, `ORDER_ITEMS`,
    /// view `DAILY_REVENUE`) and `SALES` (`CUSTOMERS`, `ORDERS`), database
    /// `DEV`, two warehouses, three roles and two users. Session defaults
    /// point at `PROD.ANALYTICS`.
    pub fn with_standard_schema(mut self) -> Self {
        let orders = TableMetadata::new("PROD", "ANALYTICS", "ORDERS")
            .with_comment("Fact table of placed orders")
            .with_row_count(1_250_000)
            .with_columns(vec![
                ColumnMetadata::new("ORDER_ID", "NUMBER(38,0)").with_nullable(false),
                ColumnMetadata::new("CUSTOMER_ID", "NUMBER(38,0)").with_nullable(false),
                ColumnMetadata::new("ORDER_DATE", "DATE"),
                ColumnMetadata::new("STATUS", "VARCHAR(16)"),
                ColumnMetadata::new("AMOUNT", "NUMBER(12,2)"),
            ]);

        let order_items = TableMetadata::new("PROD", "ANALYTICS", "ORDER_ITEMS").with_columns(vec![
            ColumnMetadata::new("ORDER_ID", "NUMBER(38,0)").with_nullable(false),
            ColumnMetadata::new("SKU", "VARCHAR(32)"),
            ColumnMetadata::new("QUANTITY", "NUMBER(9,0)"),
        ]);

        let customers = TableMetadata::new("PROD", "SALES", "CUSTOMERS").with_columns(vec![
            ColumnMetadata::new("CUSTOMER_ID", "NUMBER(38,0)").with_nullable(false),
            ColumnMetadata::new("NAME", "VARCHAR(100)"),
            ColumnMetadata::new("REGION", "VARCHAR(8)"),
        ]);

        let sales_orders = TableMetadata::new("PROD", "SALES", "ORDERS").with_columns(vec![
            ColumnMetadata::new("ID", "NUMBER(38,0)"),
            ColumnMetadata::new("REP", "VARCHAR(50)"),
        ]);

        let scratch = TableMetadata::new("DEV", "PUBLIC", "SCRATCH")
            .with_columns(vec![ColumnMetadata::new("PAYLOAD", "VARIANT")]);

        self.source = self
            .source
            .with_database(DatabaseMetadata::new("PROD").with_comment("Production"))
            .with_database(DatabaseMetadata::new("DEV"))
            .with_table(orders)
            .with_table(order_items)
            .with_table(customers)
            .with_table(sales_orders)
            .with_table(scratch)
            .with_view(ViewMetadata::new("PROD", "ANALYTICS", "DAILY_REVENUE"))
            .with_warehouse(
                WarehouseMetadata::new("COMPUTE_WH")
                    .with_size("X-SMALL")
                    .with_state("STARTED"),
            )
            .with_warehouse(WarehouseMetadata::new("ETL_WH").with_size("LARGE"))
            .with_role(RoleMetadata::new("ANALYST"))
            .with_role(RoleMetadata::new("PUBLIC"))
            .with_role(RoleMetadata::new("SYSADMIN"))
            .with_user(UserMetadata::new("ALICE").with_default_role("ANALYST"))
            .with_user(UserMetadata::new("BOB"))
            .with_query(QueryHistoryEntry::new(
                "01b2-0001",
                "SELECT COUNT(*) FROM PROD.ANALYTICS.ORDERS",
            ))
            .with_ddl(
                "PROD.ANALYTICS.ORDERS",
                "create or replace TABLE ORDERS (\n\tORDER_ID NUMBER(38,0) NOT NULL,\n\tCUSTOMER_ID NUMBER(38,0) NOT NULL,\n\tORDER_DATE DATE,\n\tSTATUS VARCHAR(16),\n\tAMOUNT NUMBER(12,2)\n);",
            )
            .with_session_defaults(SessionDefaults {
                database: Some("PROD".to_string()),
                schema: Some("ANALYTICS".to_string()),
                warehouse: Some("COMPUTE_WH".to_string()),
                role: Some("ANALYST".to_string()),
            });
        self
    }

    /// Add a custom table
    pub fn with_table(mut self, table: TableMetadata) -> Self {
        self.source = self.source.with_table(table);
        self
    }

    /// Add DDL text for a table
    pub fn with_ddl(mut self, qualified_name: &str, ddl: impl Into<String>) -> Self {
        self.source = self.source.with_ddl(qualified_name, ddl);
        self
    }

    /// Make bulk fetches of `category` fail
    pub fn failing(mut self, category: CatalogCategory) -> Self {
        self.failing.insert(category);
        self
    }

    /// Make lazy column loads fail until switched back
    pub fn failing_columns(mut self) -> Self {
        self.fail_columns = true;
        self
    }

    /// Make the session defaults fetch fail
    pub fn failing_session_defaults(mut self) -> Self {
        self.fail_session_defaults = true;
        self
    }

    /// Build the mock source
    pub fn build(self) -> MockCatalogSource {
        MockCatalogSource {
            inner: self.source,
            failing: self.failing,
            fail_columns: AtomicBool::new(self.fail_columns),
            fail_session_defaults: AtomicBool::new(self.fail_session_defaults),
            ..MockCatalogSource::default()
        }
    }
}
