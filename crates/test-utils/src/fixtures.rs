// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Test fixtures and sample SQL queries
//!
//! Queries that carry a `|` mark the cursor position; strip it with
//! [`split_cursor`] before classifying.

use lsp_types::Url;

/// Sample SQL queries for testing
pub struct SqlFixtures;

impl SqlFixtures {
    // ===== Column positions =====

    /// Select list with a qualified table
    pub const fn select_list() -> &'static str {
        "SELECT | FROM PROD.ANALYTICS.ORDERS"
    }

    /// Alias member access
    pub const fn alias_member() -> &'static str {
        "SELECT o.| FROM PROD.ANALYTICS.ORDERS o JOIN PROD.SALES.CUSTOMERS c ON o.CUSTOMER_ID = c.CUSTOMER_ID"
    }

    /// WHERE predicate on a joined query
    pub const fn where_predicate() -> &'static str {
        "SELECT * FROM ORDERS o JOIN CUSTOMERS c ON o.CUSTOMER_ID = c.CUSTOMER_ID WHERE |"
    }

    // ===== Object positions =====

    /// Table name after FROM
    pub const fn from_table() -> &'static str {
        "SELECT * FROM |"
    }

    /// Tables of a schema after `SCHEMA.`
    pub const fn schema_member() -> &'static str {
        "SELECT * FROM ANALYTICS.|"
    }

    /// Comma separated table list
    pub const fn from_list() -> &'static str {
        "SELECT * FROM ORDERS o, |"
    }

    // ===== Session statements =====

    pub const fn use_warehouse() -> &'static str {
        "USE WAREHOUSE |"
    }

    pub const fn use_role() -> &'static str {
        "USE ROLE |"
    }

    pub const fn use_database() -> &'static str {
        "USE DATABASE |"
    }

    pub const fn use_schema() -> &'static str {
        "USE SCHEMA |"
    }

    pub const fn grant_to_role() -> &'static str {
        "GRANT SELECT ON TABLE ORDERS TO ROLE |"
    }

    pub const fn grant_to_user() -> &'static str {
        "GRANT ROLE ANALYST TO USER |"
    }

    // ===== Whole documents =====

    /// Worksheet that switches database and schema before querying
    pub const fn worksheet() -> &'static str {
        "-- daily revenue\nUSE ROLE SYSADMIN;\nUSE WAREHOUSE ETL_WH;\nUSE SCHEMA PROD.SALES;\n\nSELECT c.NAME, SUM(o.AMOUNT)\nFROM CUSTOMERS c\nJOIN PROD.ANALYTICS.ORDERS o ON o.CUSTOMER_ID = c.CUSTOMER_ID\nGROUP BY 1;"
    }

    /// Query with a CTE and a misspelled table
    pub const fn cte_with_unknown_table() -> &'static str {
        "WITH recent AS (SELECT * FROM ORDERS WHERE ORDER_DATE > '2024-01-01')\nSELECT * FROM recent JOIN ORDR_ITEMS i ON i.ORDER_ID = recent.ORDER_ID"
    }
}

/// Character offset of the first `|` cursor marker
pub fn get_cursor_position(input: &str) -> Option<usize> {
    input.chars().position(|c| c == '|')
}

/// Remove every `|` cursor marker
pub fn remove_cursor_marker(input: &str) -> String {
    input.replace('|', "")
}

/// Strip the cursor marker and return the text with its character offset
///
/// Inputs without a marker put the cursor at the end.
pub fn split_cursor(input: &str) -> (String, usize) {
    let text = remove_cursor_marker(input);
    let offset = get_cursor_position(input).unwrap_or_else(|| text.chars().count());
    (text, offset)
}

/// A `file://` URI for a named test document
pub fn test_uri(name: &str) -> Url {
    Url::parse(&format!("file:///workspace/{name}.sql")).expect("valid test uri")
}
