// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Qualified names
//!
//! Every catalog entity is addressed by the dot-joined, upper-cased path of
//! its ancestry (`DB.SCHEMA.TABLE`, `DB.SCHEMA.TABLE.COLUMN`). Upper-casing
//! follows the warehouse rule for unquoted identifiers; quoted mixed-case
//! identifiers are not modelled.

use std::fmt;

use crate::error::{CatalogError, CatalogResult};

/// Normalize a single identifier or dotted path to its cache key form.
pub fn normalize(name: &str) -> String {
    name.trim().to_uppercase()
}

/// Join identifier segments into a qualified name.
///
/// # Examples
///
/// ```
/// use warehouse_sql_lsp_catalog::qualified::qualify;
///
/// assert_eq!(qualify(&["prod", "analytics", "orders"]), "PROD.ANALYTICS.ORDERS");
/// ```
pub fn qualify(parts: &[&str]) -> String {
    parts
        .iter()
        .map(|p| normalize(p))
        .collect::<Vec<_>>()
        .join(".")
}

/// Last segment of a dotted name (the bare object name).
pub fn bare_name(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

/// A fully qualified table name split into its three segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableName {
    pub database: String,
    pub schema: String,
    pub table: String,
}

impl TableName {
    pub fn new(
        database: impl Into<String>,
        schema: impl Into<String>,
        table: impl Into<String>,
    ) -> Self {
        Self {
            database: normalize(&database.into()),
            schema: normalize(&schema.into()),
            table: normalize(&table.into()),
        }
    }

    /// Parse `DB.SCHEMA.TABLE`.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::InvalidQualifiedName` unless the name has exactly
    /// three non-empty segments.
    pub fn parse(qualified_name: &str) -> CatalogResult<Self> {
        let segments: Vec<&str> = qualified_name.trim().split('.').collect();
        if segments.len() != 3 || segments.iter().any(|s| s.trim().is_empty()) {
            return Err(CatalogError::InvalidQualifiedName {
                name: qualified_name.to_string(),
                segments: segments.len(),
            });
        }
        Ok(Self::new(segments[0], segments[1], segments[2]))
    }

    /// The `DB.SCHEMA` prefix of this table.
    pub fn schema_qualified(&self) -> String {
        format!("{}.{}", self.database, self.schema)
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.database, self.schema, self.table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qualify_upper_cases() {
        assert_eq!(qualify(&["db", "Sales", "t"]), "DB.SALES.T");
    }

    #[test]
    fn test_bare_name() {
        assert_eq!(bare_name("DB.S.ORDERS"), "ORDERS");
        assert_eq!(bare_name("ORDERS"), "ORDERS");
    }

    #[test]
    fn test_table_name_parse() {
        let name = TableName::parse("prod.analytics.orders").unwrap();
        assert_eq!(name.database, "PROD");
        assert_eq!(name.schema, "ANALYTICS");
        assert_eq!(name.table, "ORDERS");
        assert_eq!(name.to_string(), "PROD.ANALYTICS.ORDERS");
        assert_eq!(name.schema_qualified(), "PROD.ANALYTICS");
    }

    #[test]
    fn test_table_name_parse_rejects_wrong_arity() {
        for bad in ["orders", "s.orders", "a.b.c.d", "a..c"] {
            let err = TableName::parse(bad).unwrap_err();
            assert!(matches!(err, CatalogError::InvalidQualifiedName { .. }), "{bad}");
        }
    }
}
