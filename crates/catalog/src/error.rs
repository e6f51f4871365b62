// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Error types for Catalog operations
//!
//! This module defines the error types used throughout the catalog layer.
//! Lookup misses are never errors; they surface as `None` or empty results.

use serde::Serialize;
use thiserror::Error;

/// Result type alias for Catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors that can occur during Catalog operations
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize)]
pub enum CatalogError {
    /// Failed to connect to the warehouse
    #[error("Failed to connect to warehouse: {0}")]
    ConnectionFailed(String),

    /// Catalog query failed upstream
    #[error("Catalog query failed: {0}")]
    QueryFailed(String),

    /// Requested table is not present in the cache
    #[error("Table '{0}' not found in catalog cache")]
    TableNotFound(String),

    /// A qualified table name did not have the `DB.SCHEMA.TABLE` shape
    #[error("Invalid qualified table name '{name}': expected DATABASE.SCHEMA.TABLE, got {segments} segment(s)")]
    InvalidQualifiedName { name: String, segments: usize },

    /// Failed to serialize or deserialize catalog data
    #[error("Failed to serialize catalog data: {0}")]
    SerializationError(String),

    /// The operation is not supported by this catalog source
    #[error("Feature not supported: {0}")]
    NotSupported(String),
}

impl CatalogError {
    /// Whether the error came from the upstream warehouse rather than from
    /// a caller contract violation.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            CatalogError::ConnectionFailed(_) | CatalogError::QueryFailed(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_qualified_name_display() {
        let err = CatalogError::InvalidQualifiedName {
            name: "S.T".to_string(),
            segments: 2,
        };
        let msg = err.to_string();
        assert!(msg.contains("S.T"));
        assert!(msg.contains("2 segment"));
    }

    #[test]
    fn test_is_upstream() {
        assert!(CatalogError::QueryFailed("boom".into()).is_upstream());
        assert!(CatalogError::ConnectionFailed("down".into()).is_upstream());
        assert!(!CatalogError::TableNotFound("X".into()).is_upstream());
    }
}
