// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Bulk catalog population
//!
//! Fetches every catalog category from a [`CatalogSource`] concurrently and
//! loads the results into a [`CatalogCache`]. A failing category degrades to
//! empty and is recorded in the [`PopulateReport`]; it never blocks the
//! other categories.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::cache::CatalogCache;
use crate::error::{CatalogError, CatalogResult};
use crate::metadata::{
    DatabaseMetadata, QueryHistoryEntry, RoleMetadata, TableMetadata, UserMetadata, ViewMetadata,
    WarehouseMetadata,
};
use crate::r#trait::CatalogSource;

/// Bulk-loadable catalog category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CatalogCategory {
    Tables,
    Views,
    Warehouses,
    Roles,
    Users,
    Databases,
    QueryHistory,
}

impl CatalogCategory {
    pub const ALL: [CatalogCategory; 7] = [
        CatalogCategory::Tables,
        CatalogCategory::Views,
        CatalogCategory::Warehouses,
        CatalogCategory::Roles,
        CatalogCategory::Users,
        CatalogCategory::Databases,
        CatalogCategory::QueryHistory,
    ];
}

impl fmt::Display for CatalogCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CatalogCategory::Tables => "tables",
            CatalogCategory::Views => "views",
            CatalogCategory::Warehouses => "warehouses",
            CatalogCategory::Roles => "roles",
            CatalogCategory::Users => "users",
            CatalogCategory::Databases => "databases",
            CatalogCategory::QueryHistory => "query_history",
        };
        f.write_str(name)
    }
}

/// Every bulk category of a catalog, as fetched or as stored on disk
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    #[serde(default)]
    pub databases: Vec<DatabaseMetadata>,
    #[serde(default)]
    pub tables: Vec<TableMetadata>,
    #[serde(default)]
    pub views: Vec<ViewMetadata>,
    #[serde(default)]
    pub warehouses: Vec<WarehouseMetadata>,
    #[serde(default)]
    pub roles: Vec<RoleMetadata>,
    #[serde(default)]
    pub users: Vec<UserMetadata>,
    #[serde(default)]
    pub query_history: Vec<QueryHistoryEntry>,
}

impl CatalogSnapshot {
    /// Parse a snapshot from JSON
    pub fn from_json_str(json: &str) -> CatalogResult<Self> {
        serde_json::from_str(json).map_err(|e| CatalogError::SerializationError(e.to_string()))
    }

    /// Parse a snapshot from YAML
    pub fn from_yaml_str(yaml: &str) -> CatalogResult<Self> {
        serde_yaml::from_str(yaml).map_err(|e| CatalogError::SerializationError(e.to_string()))
    }

    pub fn to_json_string(&self) -> CatalogResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| CatalogError::SerializationError(e.to_string()))
    }
}

/// Outcome of a bulk population
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PopulateReport {
    /// Categories loaded, with their entry counts
    pub loaded: Vec<(CatalogCategory, usize)>,
    /// Categories whose fetch failed and were left empty
    pub failed: Vec<(CatalogCategory, CatalogError)>,
}

impl PopulateReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn has_failed(&self, category: CatalogCategory) -> bool {
        self.failed.iter().any(|(c, _)| *c == category)
    }

    fn record<T>(&mut self, category: CatalogCategory, result: CatalogResult<Vec<T>>) -> Vec<T> {
        match result {
            Ok(items) => {
                self.loaded.push((category, items.len()));
                items
            }
            Err(e) => {
                warn!(category = %category, error = %e, "Catalog category failed to load");
                self.failed.push((category, e));
                Vec::new()
            }
        }
    }
}

/// Fetch every category concurrently, isolating per-category failures
///
/// # Returns
///
/// The snapshot (failed categories empty) and a report of what loaded.
#[instrument(skip(source))]
pub async fn fetch_catalog_snapshot(source: &dyn CatalogSource) -> (CatalogSnapshot, PopulateReport) {
    let (tables, views, warehouses, roles, users, databases, query_history) = tokio::join!(
        source.fetch_tables(),
        source.fetch_views(),
        source.fetch_warehouses(),
        source.fetch_roles(),
        source.fetch_users(),
        source.fetch_databases(),
        source.fetch_query_history(),
    );

    let mut report = PopulateReport::default();
    let snapshot = CatalogSnapshot {
        tables: report.record(CatalogCategory::Tables, tables),
        views: report.record(CatalogCategory::Views, views),
        warehouses: report.record(CatalogCategory::Warehouses, warehouses),
        roles: report.record(CatalogCategory::Roles, roles),
        users: report.record(CatalogCategory::Users, users),
        databases: report.record(CatalogCategory::Databases, databases),
        query_history: report.record(CatalogCategory::QueryHistory, query_history),
    };

    info!(
        loaded = report.loaded.len(),
        failed = report.failed.len(),
        "Fetched catalog snapshot"
    );
    (snapshot, report)
}

/// Fetch every category and replace the cache contents
pub async fn populate_cache(cache: &mut CatalogCache, source: &dyn CatalogSource) -> PopulateReport {
    let (snapshot, report) = fetch_catalog_snapshot(source).await;
    cache.apply_snapshot(snapshot);
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_from_yaml() {
        let yaml = r#"
databases:
  - name: PROD
tables:
  - database: PROD
    schema: SALES
    name: ORDERS
    columns:
      - name: ID
        data_type: NUMBER
warehouses:
  - name: COMPUTE_WH
    size: X-SMALL
"#;
        let snapshot = CatalogSnapshot::from_yaml_str(yaml).unwrap();
        assert_eq!(snapshot.tables.len(), 1);
        assert_eq!(snapshot.tables[0].columns[0].name, "ID");
        assert_eq!(snapshot.warehouses[0].size.as_deref(), Some("X-SMALL"));
        assert!(snapshot.roles.is_empty());
    }

    #[test]
    fn test_snapshot_json_roundtrip_preserves_tables() {
        let snapshot = CatalogSnapshot {
            tables: vec![TableMetadata::new("A", "B", "C")],
            ..Default::default()
        };
        let json = snapshot.to_json_string().unwrap();
        assert_eq!(CatalogSnapshot::from_json_str(&json).unwrap(), snapshot);
    }

    #[test]
    fn test_snapshot_invalid_json() {
        let err = CatalogSnapshot::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, CatalogError::SerializationError(_)));
    }

    #[test]
    fn test_report_records_failures() {
        let mut report = PopulateReport::default();
        let roles: Vec<RoleMetadata> = report.record(
            CatalogCategory::Roles,
            Err(CatalogError::QueryFailed("denied".into())),
        );
        assert!(roles.is_empty());
        assert!(report.has_failed(CatalogCategory::Roles));
        assert!(!report.is_complete());
    }
}
