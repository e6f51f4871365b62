// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # USE command extraction
//!
//! Finds `USE DATABASE|SCHEMA|WAREHOUSE|ROLE <name>` statements, and the bare
//! `USE <name>` shorthand for a database, in document order.
//!
//! Lines are scanned one at a time and split on `;`; each fragment must start
//! with `USE`. Lines opening with `--`, `//`, `/*` or `*` are skipped as
//! comments. Names are upper-cased with surrounding double quotes removed.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::debug;

const NAME: &str = r#""?[A-Za-z_$][\w$]*"?"#;

static USE_DATABASE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)^USE\s+DATABASE\s+({NAME})")).expect("use database regex")
});

static USE_SCHEMA_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)^USE\s+SCHEMA\s+({NAME})(?:\s*\.\s*({NAME}))?"))
        .expect("use schema regex")
});

static USE_WAREHOUSE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)^USE\s+WAREHOUSE\s+({NAME})")).expect("use warehouse regex")
});

static USE_ROLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)^USE\s+ROLE\s+({NAME})")).expect("use role regex")
});

static USE_BARE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)^USE\s+({NAME})(?:\s*\.\s*({NAME}))?")).expect("use regex")
});

/// Words that follow `USE` but never name a database
const USE_OBJECT_KEYWORDS: &[&str] = &["DATABASE", "SCHEMA", "WAREHOUSE", "ROLE", "SECONDARY"];

/// A single session-changing statement
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum UseCommand {
    Database(String),
    Schema(String),
    Warehouse(String),
    Role(String),
}

impl UseCommand {
    pub fn name(&self) -> &str {
        match self {
            UseCommand::Database(n)
            | UseCommand::Schema(n)
            | UseCommand::Warehouse(n)
            | UseCommand::Role(n) => n,
        }
    }
}

impl fmt::Display for UseCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UseCommand::Database(n) => write!(f, "USE DATABASE {n}"),
            UseCommand::Schema(n) => write!(f, "USE SCHEMA {n}"),
            UseCommand::Warehouse(n) => write!(f, "USE WAREHOUSE {n}"),
            UseCommand::Role(n) => write!(f, "USE ROLE {n}"),
        }
    }
}

fn clean_name(raw: &str) -> String {
    raw.trim().trim_matches('"').to_uppercase()
}

fn is_comment_line(line: &str) -> bool {
    ["--", "//", "/*", "*"].iter().any(|p| line.starts_with(p))
}

/// `DB.SCHEMA` yields database then schema so the schema survives the
/// database switch.
fn push_schema(commands: &mut Vec<UseCommand>, first: &str, second: Option<&str>) {
    match second {
        Some(schema) => {
            commands.push(UseCommand::Database(clean_name(first)));
            commands.push(UseCommand::Schema(clean_name(schema)));
        }
        None => commands.push(UseCommand::Schema(clean_name(first))),
    }
}

fn parse_fragment(fragment: &str, commands: &mut Vec<UseCommand>) {
    if let Some(caps) = USE_DATABASE_RE.captures(fragment) {
        commands.push(UseCommand::Database(clean_name(&caps[1])));
    } else if let Some(caps) = USE_SCHEMA_RE.captures(fragment) {
        push_schema(commands, &caps[1], caps.get(2).map(|m| m.as_str()));
    } else if let Some(caps) = USE_WAREHOUSE_RE.captures(fragment) {
        commands.push(UseCommand::Warehouse(clean_name(&caps[1])));
    } else if let Some(caps) = USE_ROLE_RE.captures(fragment) {
        commands.push(UseCommand::Role(clean_name(&caps[1])));
    } else if let Some(caps) = USE_BARE_RE.captures(fragment) {
        let name = clean_name(&caps[1]);
        if USE_OBJECT_KEYWORDS.contains(&name.as_str()) {
            return;
        }
        match caps.get(2) {
            Some(schema) => push_schema(commands, &caps[1], Some(schema.as_str())),
            None => commands.push(UseCommand::Database(name)),
        }
    }
}

/// Extract `USE` commands from a document, in order
///
/// # Examples
///
/// ```
/// use warehouse_sql_lsp_context::{UseCommand, parse_use_commands};
///
/// let commands = parse_use_commands("use schema prod.analytics;\nUSE WAREHOUSE etl_wh;");
/// assert_eq!(
///     commands,
///     vec![
///         UseCommand::Database("PROD".into()),
///         UseCommand::Schema("ANALYTICS".into()),
///         UseCommand::Warehouse("ETL_WH".into()),
///     ]
/// );
/// ```
pub fn parse_use_commands(text: &str) -> Vec<UseCommand> {
    let mut commands = Vec::new();
    let mut in_block_comment = false;
    for line in text.lines() {
        let mut line = line.trim();
        if in_block_comment {
            let Some(end) = line.find("*/") else {
                continue;
            };
            in_block_comment = false;
            line = line[end + 2..].trim();
        }
        if line.starts_with("/*") && !line[2..].contains("*/") {
            in_block_comment = true;
            continue;
        }
        if line.is_empty() || is_comment_line(line) {
            continue;
        }
        for fragment in line.split(';') {
            parse_fragment(fragment.trim(), &mut commands);
        }
    }
    if !commands.is_empty() {
        debug!(count = commands.len(), "Parsed USE commands");
    }
    commands
}
