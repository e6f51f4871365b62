// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Warehouse SQL LSP - Context Detection Layer
//!
//! This crate provides text-level context detection for SQL completion and
//! the per-document session context driven by `USE` statements.
//!
//! ## Overview
//!
//! Context detection works on raw, usually incomplete SQL text. Instead of a
//! grammar it runs a layered set of pattern matchers over the text around the
//! cursor and reports what kind of construct is being typed, which tables and
//! aliases are in scope, and the word under the cursor.
//!
//! ## Core Concepts
//!
//! ### Context Descriptor
//!
//! [`classifier::ContextDescriptor`] is the classifier's output. Its
//! [`classifier::ContextKind`] selects the completion source (columns,
//! tables, warehouses, roles...).
//!
//! ### Session Context
//!
//! [`session::SessionContextManager`] owns one [`session::SessionContext`]
//! per document, seeded from the warehouse defaults and updated by the
//! document's [`use_commands::UseCommand`]s.
//!
//! ### Keywords
//!
//! The [`keywords`] module provides SQL keyword definitions organized by
//! context.
//!
//! ## Examples
//!
//! ### Detecting Completion Context
//!
//! ```rust
//! use warehouse_sql_lsp_context::{ContextKind, classify_context};
//!
//! let text = "SELECT * FROM ";
//! let ctx = classify_context(text, text.len());
//! assert_eq!(ctx.kind, ContextKind::FromClause);
//! assert!(ctx.current_word.is_empty());
//! ```
//!
//! ### Tracking USE statements
//!
//! ```rust,ignore
//! let commands = parse_use_commands(&document_text);
//! let ctx = sessions.rebuild_context(&uri, &commands);
//! println!("{:?}.{:?}", ctx.database, ctx.schema);
//! ```

pub mod classifier;
pub mod cursor;
pub mod keywords;
pub mod session;
pub mod use_commands;

// Re-export commonly used types
pub use classifier::{
    ContextDescriptor, ContextKind, TableReference, classify_context, extract_cte_names,
    extract_table_references,
};
pub use cursor::{offset_range_to_lsp, offset_to_position, position_to_offset};
pub use keywords::{KeywordProvider, KeywordSet, SqlKeyword, is_keyword};
pub use session::{SessionContext, SessionContextManager, load_global_context};
pub use use_commands::{UseCommand, parse_use_commands};
