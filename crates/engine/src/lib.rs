// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Warehouse SQL LSP Engine
//!
//! Editor-facing request handling on top of the context classifier and the
//! catalog cache.
//!
//! ## Modules
//!
//! - [`completion`]: candidate sourcing per context kind and locality ranking
//! - [`hover`]: markdown for tables (with DDL), columns, views and account
//!   objects
//! - [`validation`]: unknown table references as diagnostics
//! - [`engine`]: the [`SqlEngine`] facade tying catalog, sessions and
//!   requests together
//! - [`config`]: settings read from the editor client
//! - [`logging`]: `tracing` subscriber setup for the embedding process
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use warehouse_sql_lsp_engine::{EngineConfig, SqlEngine, init_tracing};
//!
//! let config = EngineConfig::from_lsp_settings(&settings)?;
//! init_tracing(&config.log_level)?;
//!
//! let engine = SqlEngine::new(Arc::new(source), config)?;
//! engine.bootstrap().await;
//! engine.document_changed(&uri, &text);
//! let items = engine.completion_items(&uri, &text, position).await?;
//! ```

pub mod completion;
pub mod config;
pub mod engine;
pub mod error;
pub mod hover;
pub mod logging;
pub mod validation;

pub use completion::{CandidateKind, CompletionCandidate, CompletionEngine, rank_candidates};
pub use config::{ConfigError, EngineConfig};
pub use engine::SqlEngine;
pub use error::{EngineError, EngineResult};
pub use hover::{HoverEngine, HoverInfo};
pub use logging::init_tracing;
pub use validation::{DiagnosticCode, DiagnosticCollector, SqlDiagnostic};
