// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Engine error types
//!
//! This module defines error types for completion, hover and engine setup.

use warehouse_sql_lsp_catalog::CatalogError;

use crate::config::ConfigError;

pub type EngineResult<T> = Result<T, EngineError>;

/// Errors that can occur while serving editor requests
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Catalog-related error
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Invalid engine configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The global tracing subscriber could not be installed
    #[error("Failed to initialize logging: {0}")]
    Logging(String),
}

impl EngineError {
    /// Check if this error should result in an empty result
    /// (vs. propagating the error to the client)
    ///
    /// Stale references (a table dropped upstream, a malformed name) degrade
    /// silently; upstream connection and query failures propagate.
    pub fn should_return_empty(&self) -> bool {
        match self {
            EngineError::Catalog(e) => !e.is_upstream(),
            EngineError::Config(_) | EngineError::Logging(_) => false,
        }
    }
}
