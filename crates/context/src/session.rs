// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Session context
//!
//! Tracks, per open document, the database, schema, warehouse and role that
//! the document's `USE` statements select. Every record starts from a
//! process-wide global seed taken from the warehouse's session defaults.
//!
//! ## Transitions
//!
//! - `USE DATABASE x` sets the database and clears the schema
//! - `USE SCHEMA x` sets the schema
//! - `USE WAREHOUSE x` and `USE ROLE x` set their field
//!
//! Each application refreshes `last_updated`.

use std::collections::HashMap;
use std::time::SystemTime;

use lsp_types::Url;
use serde::Serialize;
use tracing::{debug, info, warn};
use warehouse_sql_lsp_catalog::{CatalogSource, SessionDefaults};

use crate::use_commands::UseCommand;

/// Effective session settings for one document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionContext {
    pub database: Option<String>,
    pub schema: Option<String>,
    pub warehouse: Option<String>,
    pub role: Option<String>,
    pub last_updated: SystemTime,
}

impl SessionContext {
    /// Create a record seeded from session defaults
    pub fn from_defaults(defaults: &SessionDefaults) -> Self {
        Self {
            database: defaults.database.clone(),
            schema: defaults.schema.clone(),
            warehouse: defaults.warehouse.clone(),
            role: defaults.role.clone(),
            last_updated: SystemTime::now(),
        }
    }

    /// Apply a single `USE` command
    pub fn apply(&mut self, command: &UseCommand) {
        match command {
            UseCommand::Database(name) => {
                self.database = Some(name.clone());
                self.schema = None;
            }
            UseCommand::Schema(name) => self.schema = Some(name.clone()),
            UseCommand::Warehouse(name) => self.warehouse = Some(name.clone()),
            UseCommand::Role(name) => self.role = Some(name.clone()),
        }
        self.last_updated = SystemTime::now();
    }

    /// Apply commands in order
    pub fn apply_all(&mut self, commands: &[UseCommand]) {
        for command in commands {
            self.apply(command);
        }
    }

    /// `DB.SCHEMA` when both are set
    pub fn qualified_schema(&self) -> Option<String> {
        match (&self.database, &self.schema) {
            (Some(db), Some(schema)) => Some(format!("{db}.{schema}")),
            _ => None,
        }
    }
}

/// Registry of session records keyed by document URI
#[derive(Debug, Default)]
pub struct SessionContextManager {
    contexts: HashMap<Url, SessionContext>,
    global: SessionDefaults,
}

impl SessionContextManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a manager with a global seed already set
    pub fn with_global(global: SessionDefaults) -> Self {
        Self {
            contexts: HashMap::new(),
            global,
        }
    }

    /// Replace the global seed; existing records are unaffected
    pub fn set_global_context(&mut self, global: SessionDefaults) {
        info!(
            database = ?global.database,
            schema = ?global.schema,
            warehouse = ?global.warehouse,
            role = ?global.role,
            "Global session context set"
        );
        self.global = global;
    }

    pub fn global_context(&self) -> &SessionDefaults {
        &self.global
    }

    /// Get a document's record, creating it from the global seed on first
    /// access
    pub fn get_context(&mut self, uri: &Url) -> &SessionContext {
        let global = &self.global;
        self.contexts
            .entry(uri.clone())
            .or_insert_with(|| SessionContext::from_defaults(global))
    }

    /// A document's record, without creating one
    pub fn peek_context(&self, uri: &Url) -> Option<&SessionContext> {
        self.contexts.get(uri)
    }

    /// Apply commands on top of the document's current record
    pub fn update_context(&mut self, uri: &Url, commands: &[UseCommand]) -> &SessionContext {
        let global = &self.global;
        let context = self
            .contexts
            .entry(uri.clone())
            .or_insert_with(|| SessionContext::from_defaults(global));
        context.apply_all(commands);
        debug!(uri = %uri, commands = commands.len(), "Session context updated");
        context
    }

    /// Reset the record to the global seed, then apply commands
    ///
    /// Used when the full command list of a document is re-extracted, so
    /// removed `USE` statements stop taking effect.
    pub fn rebuild_context(&mut self, uri: &Url, commands: &[UseCommand]) -> &SessionContext {
        let mut context = SessionContext::from_defaults(&self.global);
        context.apply_all(commands);
        debug!(uri = %uri, commands = commands.len(), "Session context rebuilt");
        self.contexts.insert(uri.clone(), context);
        self.get_context(uri)
    }

    /// Remove a document's record
    ///
    /// # Returns
    ///
    /// Whether a record existed.
    pub fn clear_context(&mut self, uri: &Url) -> bool {
        let removed = self.contexts.remove(uri).is_some();
        if removed {
            debug!(uri = %uri, "Session context cleared");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }
}

/// Fetch the warehouse's session defaults for the global seed
///
/// Falls back to all-`None` when the fetch fails.
pub async fn load_global_context(source: &dyn CatalogSource) -> SessionDefaults {
    match source.fetch_current_session_defaults().await {
        Ok(defaults) => defaults,
        Err(e) => {
            warn!(error = %e, "Failed to fetch session defaults, starting with empty context");
            SessionDefaults::default()
        }
    }
}
