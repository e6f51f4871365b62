// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Warehouse SQL LSP - Catalog Layer
//!
//! This crate holds the in-memory warehouse catalog behind completion, hover
//! and validation. It defines the `CatalogSource` trait and the cache fed by it:
//!
//! - **Catalog sources**: live warehouse connections (provided by the embedding
//!   server) or static snapshots from JSON/YAML
//! - **Catalog cache**: bulk-replaced categories with prefix search, lazy
//!   per-table column loading and a TTL-bound DDL cache
//! - **Shared catalog**: `Arc<RwLock<_>>` handle for concurrent requests
//!
//! ## Metadata Types
//!
//! - [`TableMetadata`]: Table information including columns, row count, type
//! - [`ColumnMetadata`]: Column details including type, nullability, default
//! - [`ViewMetadata`], [`WarehouseMetadata`], [`RoleMetadata`],
//!   [`UserMetadata`], [`DatabaseMetadata`], [`QueryHistoryEntry`]
//!
//! ## Usage
//!
//! ```rust,ignore
//! use warehouse_sql_lsp_catalog::{CatalogCache, StaticCatalogSource, populate_cache};
//!
//! let source = StaticCatalogSource::playground();
//! let mut cache = CatalogCache::new();
//! let report = populate_cache(&mut cache, &source).await;
//! assert!(report.is_complete());
//!
//! for table in cache.search_tables("ord", 10) {
//!     println!("{}", table.qualified_name());
//! }
//! ```
//!
//! ## Implementing the CatalogSource Trait
//!
//! ```rust,ignore
//! use warehouse_sql_lsp_catalog::{CatalogSource, CatalogResult, TableMetadata};
//! use async_trait::async_trait;
//!
//! struct MyWarehouse;
//!
//! #[async_trait]
//! impl CatalogSource for MyWarehouse {
//!     async fn fetch_tables(&self) -> CatalogResult<Vec<TableMetadata>> {
//!         // SHOW TABLES IN ACCOUNT
//!     }
//!
//!     // ...
//! }
//! ```

pub mod cache;
pub mod ddl;
pub mod error;
pub mod metadata;
pub mod populate;
pub mod qualified;
pub mod shared;
pub mod r#static;
pub mod r#trait;

// Re-exports
pub use cache::{CacheStats, CatalogCache};
pub use ddl::{DEFAULT_DDL_TTL, DdlCache, DdlEntry};
pub use error::{CatalogError, CatalogResult};
pub use metadata::{
    ColumnMetadata, DatabaseMetadata, QueryHistoryEntry, RoleMetadata, SchemaMetadata,
    SessionDefaults, TableMetadata, TableType, UserMetadata, ViewMetadata, WarehouseMetadata,
};
pub use populate::{
    CatalogCategory, CatalogSnapshot, PopulateReport, fetch_catalog_snapshot, populate_cache,
};
pub use qualified::TableName;
pub use shared::SharedCatalog;
pub use r#static::StaticCatalogSource;
pub use r#trait::CatalogSource;
