// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Metadata types for warehouse catalog information
//!
//! This module defines the catalog entities held by the cache: databases,
//! schemas, tables with their columns, views, warehouses, roles, users and
//! query history. Each entity exposes its qualified name.

use serde::{Deserialize, Serialize};

use crate::qualified::qualify;

/// Table type classification
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TableType {
    #[default]
    Table,
    Transient,
    Temporary,
    External,
    Dynamic,
    Other(String),
}

impl TableType {
    /// Display label, e.g. `TRANSIENT TABLE`
    pub fn as_str(&self) -> &str {
        match self {
            TableType::Table => "TABLE",
            TableType::Transient => "TRANSIENT TABLE",
            TableType::Temporary => "TEMPORARY TABLE",
            TableType::External => "EXTERNAL TABLE",
            TableType::Dynamic => "DYNAMIC TABLE",
            TableType::Other(other) => other.as_str(),
        }
    }
}

/// Metadata for a warehouse database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseMetadata {
    pub name: String,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
}

impl DatabaseMetadata {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            owner: None,
            comment: None,
        }
    }

    /// Builder method: set comment
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn qualified_name(&self) -> String {
        qualify(&[&self.name])
    }
}

/// A schema observed while loading tables
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SchemaMetadata {
    pub database: String,
    pub name: String,
}

impl SchemaMetadata {
    pub fn new(database: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            name: name.into(),
        }
    }

    pub fn qualified_name(&self) -> String {
        qualify(&[&self.database, &self.name])
    }
}

/// Metadata for a table column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMetadata {
    /// Owning database (filled in when attached to a table)
    #[serde(default)]
    pub database: String,
    /// Owning schema (filled in when attached to a table)
    #[serde(default)]
    pub schema: String,
    /// Owning table (filled in when attached to a table)
    #[serde(default)]
    pub table: String,
    /// Column name
    pub name: String,
    /// Warehouse type as reported upstream, e.g. `NUMBER(38,0)`
    pub data_type: String,
    #[serde(default = "default_nullable")]
    pub nullable: bool,
    #[serde(default)]
    pub default_value: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
    /// 1-based position within the table
    #[serde(default)]
    pub ordinal_position: u32,
}

fn default_nullable() -> bool {
    true
}

impl ColumnMetadata {
    /// Create a new column metadata with builder pattern
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            database: String::new(),
            schema: String::new(),
            table: String::new(),
            name: name.into(),
            data_type: data_type.into(),
            nullable: true,
            default_value: None,
            comment: None,
            ordinal_position: 0,
        }
    }

    /// Builder method: set nullable
    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Builder method: set default value
    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default_value = Some(default.into());
        self
    }

    /// Builder method: set comment
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Set the owning table ancestry.
    pub fn attach(
        mut self,
        database: impl Into<String>,
        schema: impl Into<String>,
        table: impl Into<String>,
    ) -> Self {
        self.database = database.into();
        self.schema = schema.into();
        self.table = table.into();
        self
    }

    /// `DB.SCHEMA.TABLE` of the owning table
    pub fn table_qualified_name(&self) -> String {
        qualify(&[&self.database, &self.schema, &self.table])
    }

    /// `DB.SCHEMA.TABLE.COLUMN`
    pub fn qualified_name(&self) -> String {
        qualify(&[&self.database, &self.schema, &self.table, &self.name])
    }
}

/// Metadata for a warehouse table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableMetadata {
    pub database: String,
    pub schema: String,
    pub name: String,
    #[serde(default)]
    pub table_type: TableType,
    /// Column definitions; empty until lazily loaded
    #[serde(default)]
    pub columns: Vec<ColumnMetadata>,
    #[serde(default)]
    pub row_count: Option<u64>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
}

impl TableMetadata {
    /// Create new table metadata with builder pattern
    pub fn new(
        database: impl Into<String>,
        schema: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            database: database.into(),
            schema: schema.into(),
            name: name.into(),
            table_type: TableType::Table,
            columns: Vec::new(),
            row_count: None,
            comment: None,
            owner: None,
        }
    }

    /// Builder method: add columns, attaching them to this table
    pub fn with_columns(mut self, columns: Vec<ColumnMetadata>) -> Self {
        self.columns = self.attach_columns(columns);
        self
    }

    /// Builder method: set row count
    pub fn with_row_count(mut self, count: u64) -> Self {
        self.row_count = Some(count);
        self
    }

    /// Builder method: set comment
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Builder method: set table type
    pub fn with_type(mut self, table_type: TableType) -> Self {
        self.table_type = table_type;
        self
    }

    pub fn qualified_name(&self) -> String {
        qualify(&[&self.database, &self.schema, &self.name])
    }

    pub fn schema_qualified_name(&self) -> String {
        qualify(&[&self.database, &self.schema])
    }

    /// Attach columns to this table and number them by position.
    pub fn attach_columns(&self, columns: Vec<ColumnMetadata>) -> Vec<ColumnMetadata> {
        columns
            .into_iter()
            .enumerate()
            .map(|(i, c)| {
                let position = if c.ordinal_position == 0 {
                    i as u32 + 1
                } else {
                    c.ordinal_position
                };
                let mut c = c.attach(&self.database, &self.schema, &self.name);
                c.ordinal_position = position;
                c
            })
            .collect()
    }

    /// Get column by name (case-insensitive)
    pub fn get_column(&self, name: &str) -> Option<&ColumnMetadata> {
        self.columns
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }
}

/// Metadata for a view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewMetadata {
    pub database: String,
    pub schema: String,
    pub name: String,
    #[serde(default)]
    pub is_materialized: bool,
    #[serde(default)]
    pub comment: Option<String>,
    /// View body, when the source exposes it
    #[serde(default)]
    pub text: Option<String>,
}

impl ViewMetadata {
    pub fn new(
        database: impl Into<String>,
        schema: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            database: database.into(),
            schema: schema.into(),
            name: name.into(),
            is_materialized: false,
            comment: None,
            text: None,
        }
    }

    /// Builder method: mark as materialized
    pub fn materialized(mut self) -> Self {
        self.is_materialized = true;
        self
    }

    pub fn qualified_name(&self) -> String {
        qualify(&[&self.database, &self.schema, &self.name])
    }
}

/// Metadata for a compute warehouse
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarehouseMetadata {
    pub name: String,
    /// e.g. `X-SMALL`
    #[serde(default)]
    pub size: Option<String>,
    /// e.g. `STARTED`, `SUSPENDED`
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
}

impl WarehouseMetadata {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size: None,
            state: None,
            comment: None,
        }
    }

    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.size = Some(size.into());
        self
    }

    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleMetadata {
    pub name: String,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
}

impl RoleMetadata {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            owner: None,
            comment: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserMetadata {
    pub name: String,
    #[serde(default)]
    pub login_name: Option<String>,
    #[serde(default)]
    pub default_role: Option<String>,
    #[serde(default)]
    pub default_warehouse: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
}

impl UserMetadata {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            login_name: None,
            default_role: None,
            default_warehouse: None,
            comment: None,
        }
    }

    pub fn with_default_role(mut self, role: impl Into<String>) -> Self {
        self.default_role = Some(role.into());
        self
    }
}

/// A recently executed statement reported by the warehouse
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryHistoryEntry {
    pub query_id: String,
    pub query_text: String,
    #[serde(default)]
    pub database: Option<String>,
    #[serde(default)]
    pub schema: Option<String>,
    #[serde(default)]
    pub warehouse: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    /// Start time as reported upstream (ISO-8601)
    #[serde(default)]
    pub start_time: Option<String>,
}

impl QueryHistoryEntry {
    pub fn new(query_id: impl Into<String>, query_text: impl Into<String>) -> Self {
        Self {
            query_id: query_id.into(),
            query_text: query_text.into(),
            database: None,
            schema: None,
            warehouse: None,
            user: None,
            status: None,
            start_time: None,
        }
    }
}

/// Ambient session settings reported by the warehouse at connect time
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDefaults {
    #[serde(default)]
    pub database: Option<String>,
    #[serde(default)]
    pub schema: Option<String>,
    #[serde(default)]
    pub warehouse: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_qualified_name() {
        let table = TableMetadata::new("prod", "analytics", "orders");
        assert_eq!(table.qualified_name(), "PROD.ANALYTICS.ORDERS");
        assert_eq!(table.schema_qualified_name(), "PROD.ANALYTICS");
    }

    #[test]
    fn test_table_type_label() {
        assert_eq!(TableType::Table.as_str(), "TABLE");
        assert_eq!(TableType::Transient.as_str(), "TRANSIENT TABLE");
        assert_eq!(TableType::Other("ICEBERG TABLE".into()).as_str(), "ICEBERG TABLE");
    }

    #[test]
    fn test_with_columns_attaches_ancestry() {
        let table = TableMetadata::new("PROD", "ANALYTICS", "ORDERS").with_columns(vec![
            ColumnMetadata::new("ID", "NUMBER(38,0)").with_nullable(false),
            ColumnMetadata::new("status", "VARCHAR"),
        ]);

        assert_eq!(table.columns[0].qualified_name(), "PROD.ANALYTICS.ORDERS.ID");
        assert_eq!(table.columns[1].qualified_name(), "PROD.ANALYTICS.ORDERS.STATUS");
        assert_eq!(table.columns[1].ordinal_position, 2);
        assert_eq!(
            table.columns[1].table_qualified_name(),
            "PROD.ANALYTICS.ORDERS"
        );
    }

    #[test]
    fn test_get_column_case_insensitive() {
        let table = TableMetadata::new("PROD", "ANALYTICS", "ORDERS")
            .with_columns(vec![ColumnMetadata::new("STATUS", "VARCHAR")]);
        assert!(table.get_column("status").is_some());
        assert!(table.get_column("missing").is_none());
    }

    #[test]
    fn test_column_deserialize_defaults() {
        let column: ColumnMetadata =
            serde_json::from_str(r#"{"name": "ID", "data_type": "NUMBER"}"#).unwrap();
        assert!(column.nullable);
        assert!(column.table.is_empty());
    }
}
