// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Shared catalog handle
//!
//! [`SharedCatalog`] wraps the cache in `Arc<parking_lot::RwLock<_>>` so
//! concurrent editor requests can read it while lazy loads write to it.
//!
//! # Thread Safety
//!
//! - Searches and lookups take the read lock
//! - Fetches run with no lock held; only the final store takes the write lock
//! - Two requests loading the same table concurrently may both fetch; the
//!   second store overwrites the first with the same columns

use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, instrument};

use crate::cache::CatalogCache;
use crate::error::{CatalogError, CatalogResult};
use crate::populate::{PopulateReport, fetch_catalog_snapshot};
use crate::qualified::TableName;
use crate::r#trait::CatalogSource;

/// Cloneable, thread-safe handle to a [`CatalogCache`]
#[derive(Debug, Clone, Default)]
pub struct SharedCatalog {
    inner: Arc<RwLock<CatalogCache>>,
}

impl SharedCatalog {
    pub fn new(cache: CatalogCache) -> Self {
        Self {
            inner: Arc::new(RwLock::new(cache)),
        }
    }

    /// Acquire the read lock
    ///
    /// Do not hold the guard across an `.await`.
    pub fn read(&self) -> RwLockReadGuard<'_, CatalogCache> {
        self.inner.read()
    }

    /// Acquire the write lock
    pub fn write(&self) -> RwLockWriteGuard<'_, CatalogCache> {
        self.inner.write()
    }

    /// Fetch every category from `source` and replace the cache contents
    pub async fn refresh(&self, source: &dyn CatalogSource) -> PopulateReport {
        let (snapshot, report) = fetch_catalog_snapshot(source).await;
        self.inner.write().apply_snapshot(snapshot);
        report
    }

    /// Lazily load a table's columns through `source`
    ///
    /// Same contract as [`CatalogCache::ensure_columns_loaded`], with the
    /// fetch running outside the lock.
    #[instrument(skip(self, source))]
    pub async fn ensure_columns_loaded(
        &self,
        source: &dyn CatalogSource,
        qualified_name: &str,
    ) -> CatalogResult<()> {
        let loaded = self.inner.read().columns_loaded(qualified_name);
        if loaded {
            return Ok(());
        }

        let name = TableName::parse(qualified_name)?;
        let known = self.inner.read().contains_table(&name.to_string());
        if !known {
            return Err(CatalogError::TableNotFound(name.to_string()));
        }

        let columns = source
            .fetch_columns_for_table(&name.database, &name.schema, &name.table)
            .await?;
        self.inner.write().store_columns(&name, columns)?;
        Ok(())
    }

    /// DDL text for a table, fetched through `source` when absent or expired
    #[instrument(skip(self, source))]
    pub async fn ensure_ddl(
        &self,
        source: &dyn CatalogSource,
        qualified_name: &str,
    ) -> CatalogResult<String> {
        let cached = self.inner.read().get_ddl(qualified_name).map(str::to_string);
        if let Some(ddl) = cached {
            return Ok(ddl);
        }

        let name = TableName::parse(qualified_name)?;
        debug!(table = %name, "Fetching DDL");
        let ddl = source
            .fetch_ddl(&name.database, &name.schema, &name.table)
            .await?;
        self.inner.write().cache_ddl(&name.to_string(), ddl.clone());
        Ok(ddl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{ColumnMetadata, TableMetadata};
    use crate::r#static::StaticCatalogSource;

    fn source() -> StaticCatalogSource {
        StaticCatalogSource::new()
            .with_table(
                TableMetadata::new("DB", "S", "ORDERS")
                    .with_columns(vec![ColumnMetadata::new("ID", "NUMBER")]),
            )
            .with_ddl("DB.S.ORDERS", "create table orders (id number)")
    }

    #[tokio::test]
    async fn test_refresh_then_lazy_columns() {
        let source = source();
        let catalog = SharedCatalog::default();
        let report = catalog.refresh(&source).await;
        assert!(report.is_complete());
        assert!(!catalog.read().columns_loaded("DB.S.ORDERS"));

        catalog
            .ensure_columns_loaded(&source, "DB.S.ORDERS")
            .await
            .unwrap();
        assert!(catalog.read().column_exists("orders", "id"));
    }

    #[tokio::test]
    async fn test_ensure_columns_unknown_table() {
        let source = source();
        let catalog = SharedCatalog::default();
        catalog.refresh(&source).await;
        let err = catalog
            .ensure_columns_loaded(&source, "DB.S.MISSING")
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::TableNotFound(_)));
    }

    #[tokio::test]
    async fn test_ensure_ddl_caches() {
        let source = source();
        let catalog = SharedCatalog::default();
        let ddl = catalog.ensure_ddl(&source, "db.s.orders").await.unwrap();
        assert_eq!(ddl, "create table orders (id number)");
        assert!(catalog.write().has_ddl("DB.S.ORDERS"));
    }
}
