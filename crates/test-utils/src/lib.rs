// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Testing utilities for warehouse-sql-lsp
//!
//! This crate provides common testing components including:
//! - A mock catalog source with fetch counters and failure switches
//! - Sample warehouse SQL with cursor markers
//! - Cursor marker helpers

pub mod fixtures;
pub mod mock_catalog;

// Re-exports for convenience
pub use fixtures::{SqlFixtures, get_cursor_position, remove_cursor_marker, split_cursor, test_uri};
pub use mock_catalog::{MockCatalogBuilder, MockCatalogSource};
