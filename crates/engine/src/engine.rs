// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Engine facade
//!
//! [`SqlEngine`] owns the shared catalog, the per-document session registry
//! and the request engines, and exposes the operations an editor transport
//! calls: document events, completion, hover and diagnostics.
//!
//! ## Lifecycle
//!
//! 1. `SqlEngine::new` validates the configuration
//! 2. `bootstrap` populates the catalog (unless prefetch is disabled, in
//!    which case the first request does) and seeds the global session from
//!    the warehouse's defaults
//! 3. `document_changed` re-derives a document's session from its `USE`
//!    statements on every edit
//! 4. `document_closed` drops the document's session
//!
//! Locks are taken per lookup and never held across an `.await`.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use lsp_types::{CompletionItem, Diagnostic, Hover, Position, Url};
use parking_lot::RwLock;
use tracing::{debug, info, instrument, warn};
use warehouse_sql_lsp_catalog::{CatalogCache, CatalogSource, PopulateReport, SharedCatalog};
use warehouse_sql_lsp_context::{
    SessionContext, SessionContextManager, load_global_context, parse_use_commands,
    position_to_offset,
};

use crate::completion::{CompletionCandidate, CompletionEngine, to_completion_items};
use crate::config::EngineConfig;
use crate::error::EngineResult;
use crate::hover::{HoverEngine, HoverInfo};
use crate::validation::{DiagnosticCollector, SqlDiagnostic};

/// Editor-facing SQL engine
pub struct SqlEngine {
    source: Arc<dyn CatalogSource>,
    catalog: SharedCatalog,
    sessions: Arc<RwLock<SessionContextManager>>,
    config: EngineConfig,
    completion: CompletionEngine,
    hover: HoverEngine,
    diagnostics: DiagnosticCollector,
    /// Set once the catalog has been populated
    loaded: AtomicBool,
}

impl SqlEngine {
    /// Create a new engine
    ///
    /// # Arguments
    ///
    /// * `source` - Warehouse metadata source
    /// * `config` - Engine configuration, validated here
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let engine = SqlEngine::new(Arc::new(source), EngineConfig::default())?;
    /// engine.bootstrap().await;
    /// ```
    pub fn new(source: Arc<dyn CatalogSource>, config: EngineConfig) -> EngineResult<Self> {
        config.validate()?;

        let catalog = SharedCatalog::new(CatalogCache::with_ddl_ttl(config.ddl_ttl));
        let sessions = Arc::new(RwLock::new(SessionContextManager::new()));
        let completion =
            CompletionEngine::new(catalog.clone(), Arc::clone(&source), Arc::clone(&sessions))
                .with_limit(config.completion_limit);
        let hover = HoverEngine::new(catalog.clone(), Arc::clone(&source));
        let diagnostics = DiagnosticCollector::new(catalog.clone());

        Ok(Self {
            source,
            catalog,
            sessions,
            config,
            completion,
            hover,
            diagnostics,
            loaded: AtomicBool::new(false),
        })
    }

    /// Populate the catalog and seed the global session context
    ///
    /// # Returns
    ///
    /// The population report; empty when prefetch is disabled.
    #[instrument(skip(self))]
    pub async fn bootstrap(&self) -> PopulateReport {
        let report = if self.config.prefetch_on_startup {
            self.load_catalog().await
        } else {
            debug!("Catalog prefetch disabled, deferring to first request");
            PopulateReport::default()
        };

        let defaults = load_global_context(self.source.as_ref()).await;
        self.sessions.write().set_global_context(defaults);
        report
    }

    /// Re-fetch every catalog category, replacing the cached contents
    pub async fn reload_catalog(&self) -> PopulateReport {
        self.load_catalog().await
    }

    async fn load_catalog(&self) -> PopulateReport {
        let report = self.catalog.refresh(self.source.as_ref()).await;
        self.loaded.store(true, Ordering::Release);

        if !self.config.lazy_columns {
            let loaded = self.prefetch_columns().await;
            debug!(tables = loaded, "Prefetched table columns");
        }

        let stats = self.catalog.read().stats();
        info!(
            tables = stats.tables,
            views = stats.views,
            schemas = stats.schemas,
            failed = report.failed.len(),
            "Catalog loaded"
        );
        report
    }

    /// Load columns for every table that has none yet
    ///
    /// # Returns
    ///
    /// Number of tables whose columns were fetched.
    async fn prefetch_columns(&self) -> usize {
        let pending: Vec<String> = {
            let catalog = self.catalog.read();
            catalog
                .search_tables("", usize::MAX)
                .into_iter()
                .map(|t| t.qualified_name())
                .filter(|q| !catalog.columns_loaded(q))
                .collect()
        };

        let mut loaded = 0;
        for qualified in &pending {
            match self
                .catalog
                .ensure_columns_loaded(self.source.as_ref(), qualified)
                .await
            {
                Ok(()) => loaded += 1,
                Err(e) => warn!(table = %qualified, error = %e, "Column prefetch failed"),
            }
        }
        loaded
    }

    /// Populate the catalog on first use when bootstrap did not
    ///
    /// Concurrent first requests may each trigger a refresh; the last
    /// snapshot applied wins.
    async fn ensure_catalog_loaded(&self) {
        if !self.loaded.load(Ordering::Acquire) {
            self.load_catalog().await;
        }
    }

    /// Re-derive a document's session context from its `USE` statements
    pub fn document_changed(&self, uri: &Url, text: &str) -> SessionContext {
        let commands = parse_use_commands(text);
        self.sessions.write().rebuild_context(uri, &commands).clone()
    }

    /// Drop a document's session context
    ///
    /// # Returns
    ///
    /// Whether the document had one.
    pub fn document_closed(&self, uri: &Url) -> bool {
        self.sessions.write().clear_context(uri)
    }

    /// A document's session context, created from the global seed if new
    pub fn session_context(&self, uri: &Url) -> SessionContext {
        self.sessions.write().get_context(uri).clone()
    }

    /// Ranked completion candidates at a character offset
    pub async fn complete(
        &self,
        uri: &Url,
        text: &str,
        offset: usize,
    ) -> EngineResult<Vec<CompletionCandidate>> {
        self.ensure_catalog_loaded().await;
        self.completion.complete(uri, text, offset).await
    }

    /// LSP completion items at a position
    ///
    /// Errors that only mean "nothing to suggest" become an empty list;
    /// upstream failures propagate.
    pub async fn completion_items(
        &self,
        uri: &Url,
        text: &str,
        position: Position,
    ) -> EngineResult<Vec<CompletionItem>> {
        let offset = position_to_offset(text, position);
        match self.complete(uri, text, offset).await {
            Ok(candidates) => Ok(to_completion_items(&candidates)),
            Err(e) if e.should_return_empty() => {
                debug!(error = %e, "Completion degraded to empty list");
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }

    /// Hover information at a character offset
    pub async fn hover(&self, text: &str, offset: usize) -> Option<HoverInfo> {
        self.ensure_catalog_loaded().await;
        self.hover.hover(text, offset).await
    }

    /// LSP hover at a position
    pub async fn hover_at(&self, text: &str, position: Position) -> Option<Hover> {
        let offset = position_to_offset(text, position);
        self.hover(text, offset)
            .await
            .map(|info| info.to_lsp(text))
    }

    /// Unknown table references in `text`
    pub fn validate(&self, text: &str) -> Vec<SqlDiagnostic> {
        self.diagnostics.collect_diagnostics(text)
    }

    /// [`SqlEngine::validate`] in LSP form
    pub fn diagnostics(&self, text: &str) -> Vec<Diagnostic> {
        self.validate(text)
            .into_iter()
            .map(SqlDiagnostic::to_lsp)
            .collect()
    }

    pub fn catalog(&self) -> &SharedCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Whether the catalog has been populated
    pub fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::Acquire)
    }
}
