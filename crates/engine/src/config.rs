// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Engine Configuration
//!
//! This module provides configuration management for the engine.
//!
//! ## Configuration Structure
//!
//! The engine configuration includes:
//! - Completion list size
//! - DDL cache time-to-live
//! - Lazy versus eager column loading
//! - Whether the catalog is fetched at startup
//! - Log filter directive
//!
//! ## Example
//!
//! ```rust
//! use serde_json::json;
//! use warehouse_sql_lsp_engine::EngineConfig;
//!
//! let settings = json!({ "warehouseSqlLsp": { "completionLimit": 50 } });
//! let config = EngineConfig::from_lsp_settings(&settings).unwrap();
//! assert_eq!(config.completion_limit, 50);
//! assert!(config.lazy_columns);
//! ```

use std::time::Duration;

use serde_json::Value;
use tracing_subscriber::EnvFilter;
use warehouse_sql_lsp_catalog::DEFAULT_DDL_TTL;

/// Key of the settings section sent by the editor client
pub const SETTINGS_SECTION: &str = "warehouseSqlLsp";

/// Upper bound on `completion_limit`
pub const MAX_COMPLETION_LIMIT: usize = 10_000;

/// Main engine configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Maximum number of completion candidates returned per request
    pub completion_limit: usize,

    /// How long fetched DDL text stays valid
    pub ddl_ttl: Duration,

    /// Fetch table columns on first use instead of at startup
    pub lazy_columns: bool,

    /// Populate the catalog cache during bootstrap rather than on the first
    /// request
    pub prefetch_on_startup: bool,

    /// `tracing` filter directive, e.g. `info` or `warehouse_sql_lsp=debug`
    pub log_level: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            completion_limit: 100,
            ddl_ttl: DEFAULT_DDL_TTL,
            lazy_columns: true,
            prefetch_on_startup: true,
            log_level: "info".to_string(),
        }
    }
}

impl EngineConfig {
    /// Validate the configuration
    ///
    /// Checks that:
    /// - The completion limit is within `1..=MAX_COMPLETION_LIMIT`
    /// - The DDL TTL is not zero
    /// - The log level parses as a tracing filter
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.completion_limit == 0 || self.completion_limit > MAX_COMPLETION_LIMIT {
            return Err(ConfigError::InvalidCompletionLimit(self.completion_limit));
        }

        if self.ddl_ttl.is_zero() {
            return Err(ConfigError::InvalidDdlTtl);
        }

        EnvFilter::try_new(&self.log_level).map_err(|e| ConfigError::InvalidLogLevel {
            level: self.log_level.clone(),
            reason: e.to_string(),
        })?;

        Ok(())
    }

    /// Parse engine config from LSP client settings payload.
    ///
    /// Expected shape (every key optional):
    /// {
    ///   "warehouseSqlLsp": {
    ///     "completionLimit": 100,
    ///     "ddlTtlSecs": 86400,
    ///     "lazyColumns": true,
    ///     "prefetchOnStartup": true,
    ///     "logLevel": "info"
    ///   }
    /// }
    ///
    /// A missing section yields the defaults. Keys with the wrong JSON type
    /// are rejected, and the result is validated.
    pub fn from_lsp_settings(settings: &Value) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let Some(section) = settings.get(SETTINGS_SECTION) else {
            return Ok(config);
        };

        if let Some(limit) = read_u64(section, "completionLimit")? {
            config.completion_limit =
                usize::try_from(limit).map_err(|_| ConfigError::InvalidCompletionLimit(usize::MAX))?;
        }
        if let Some(secs) = read_u64(section, "ddlTtlSecs")? {
            config.ddl_ttl = Duration::from_secs(secs);
        }
        if let Some(lazy) = read_bool(section, "lazyColumns")? {
            config.lazy_columns = lazy;
        }
        if let Some(prefetch) = read_bool(section, "prefetchOnStartup")? {
            config.prefetch_on_startup = prefetch;
        }
        if let Some(level) = read_str(section, "logLevel")? {
            config.log_level = level.to_string();
        }

        config.validate()?;
        Ok(config)
    }
}

fn read_u64(section: &Value, key: &'static str) -> Result<Option<u64>, ConfigError> {
    match section.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v
            .as_u64()
            .map(Some)
            .ok_or(ConfigError::InvalidType { key, expected: "a non-negative integer" }),
    }
}

fn read_bool(section: &Value, key: &'static str) -> Result<Option<bool>, ConfigError> {
    match section.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v
            .as_bool()
            .map(Some)
            .ok_or(ConfigError::InvalidType { key, expected: "a boolean" }),
    }
}

fn read_str<'a>(section: &'a Value, key: &'static str) -> Result<Option<&'a str>, ConfigError> {
    match section.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v
            .as_str()
            .map(Some)
            .ok_or(ConfigError::InvalidType { key, expected: "a string" }),
    }
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A settings key had the wrong JSON type
    #[error("Setting '{key}' must be {expected}")]
    InvalidType {
        key: &'static str,
        expected: &'static str,
    },

    /// Completion limit out of range
    #[error("completionLimit must be between 1 and 10000, got {0}")]
    InvalidCompletionLimit(usize),

    /// Zero DDL time-to-live
    #[error("ddlTtlSecs must be greater than 0")]
    InvalidDdlTtl,

    /// Log level is not a valid filter directive
    #[error("Invalid log level '{level}': {reason}")]
    InvalidLogLevel { level: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_config_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.completion_limit, 100);
        assert_eq!(config.ddl_ttl, Duration::from_secs(86_400));
    }

    #[test]
    fn test_from_lsp_settings_all_keys() {
        let settings = json!({
            "warehouseSqlLsp": {
                "completionLimit": 25,
                "ddlTtlSecs": 60,
                "lazyColumns": false,
                "prefetchOnStartup": false,
                "logLevel": "warehouse_sql_lsp_engine=debug"
            }
        });
        let config = EngineConfig::from_lsp_settings(&settings).unwrap();
        assert_eq!(config.completion_limit, 25);
        assert_eq!(config.ddl_ttl, Duration::from_secs(60));
        assert!(!config.lazy_columns);
        assert!(!config.prefetch_on_startup);
        assert_eq!(config.log_level, "warehouse_sql_lsp_engine=debug");
    }

    #[test]
    fn test_missing_section_uses_defaults() {
        let config = EngineConfig::from_lsp_settings(&json!({ "other": {} })).unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_wrong_type_rejected() {
        let settings = json!({ "warehouseSqlLsp": { "lazyColumns": "yes" } });
        let err = EngineConfig::from_lsp_settings(&settings).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidType {
                key: "lazyColumns",
                expected: "a boolean"
            }
        );
    }

    #[test]
    fn test_validate_ranges() {
        let settings = json!({ "warehouseSqlLsp": { "completionLimit": 0 } });
        assert_eq!(
            EngineConfig::from_lsp_settings(&settings).unwrap_err(),
            ConfigError::InvalidCompletionLimit(0)
        );

        let settings = json!({ "warehouseSqlLsp": { "ddlTtlSecs": 0 } });
        assert_eq!(
            EngineConfig::from_lsp_settings(&settings).unwrap_err(),
            ConfigError::InvalidDdlTtl
        );
    }

    #[test]
    fn test_invalid_log_level() {
        let config = EngineConfig {
            log_level: "warehouse_sql_lsp=verbose".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidLogLevel { .. })
        ));
    }
}
