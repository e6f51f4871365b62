// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Logging setup
//!
//! Installs the global `tracing` subscriber for the process embedding the
//! engine. Output goes to stderr since stdout usually carries the editor
//! protocol.

use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::error::{EngineError, EngineResult};

/// Build the filter: `RUST_LOG` when set and valid, else `default_directive`
pub fn build_filter(default_directive: &str) -> EngineResult<EnvFilter> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive))
        .map_err(|e| EngineError::Logging(e.to_string()))
}

/// Install a `FmtSubscriber` as the global default
///
/// # Errors
///
/// Returns `EngineError::Logging` when the directive does not parse or a
/// global subscriber is already installed.
pub fn init_tracing(default_directive: &str) -> EngineResult<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(build_filter(default_directive)?)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| EngineError::Logging(e.to_string()))?;

    tracing::info!(filter = default_directive, "Tracing initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_filter_accepts_directive() {
        assert!(build_filter("warehouse_sql_lsp_engine=debug").is_ok());
    }

    #[test]
    fn test_second_init_fails() {
        let _ = init_tracing("info");
        assert!(matches!(init_tracing("info"), Err(EngineError::Logging(_))));
    }
}
