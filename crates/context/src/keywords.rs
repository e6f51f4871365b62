// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # SQL Keywords for Completion
//!
//! This module defines warehouse SQL keywords organized by context, and the
//! fixed keyword set the classifier uses to find the previous keyword.

use std::collections::HashSet;

/// Single-word keywords recognized when scanning backward for the previous
/// keyword. Multi-word clauses are matched by their last word (`BY`).
const KEYWORDS: &[&str] = &[
    "ALL", "ALTER", "AND", "AS", "ASC", "BETWEEN", "BY", "CALL", "CASE", "CREATE", "CROSS",
    "DATABASE", "DELETE", "DESC", "DESCRIBE", "DISTINCT", "DROP", "ELSE", "END", "EXCEPT",
    "EXISTS", "FROM", "FULL", "GRANT", "GROUP", "HAVING", "ILIKE", "IN", "INNER", "INSERT",
    "INTERSECT", "INTO", "IS", "JOIN", "LATERAL", "LEFT", "LIKE", "LIMIT", "MERGE", "MINUS",
    "NATURAL", "NOT", "OFFSET", "ON", "OR", "ORDER", "OUTER", "QUALIFY", "REVOKE", "RIGHT",
    "ROLE", "SCHEMA", "SELECT", "SET", "SHOW", "TABLE", "THEN", "TO", "TRUNCATE", "UNION",
    "UPDATE", "USE", "USER", "USING", "VALUES", "VIEW", "WAREHOUSE", "WHEN", "WHERE", "WITH",
];

/// Whether `word` is one of the fixed SQL keywords (case-insensitive)
pub fn is_keyword(word: &str) -> bool {
    let upper = word.to_ascii_uppercase();
    KEYWORDS.contains(&upper.as_str())
}

/// SQL keyword with metadata
#[derive(Debug, Clone, PartialEq)]
pub struct SqlKeyword {
    /// The keyword text
    pub label: String,
    /// Optional description/documentation
    pub description: Option<String>,
    /// Sort order (lower = higher priority)
    pub sort_priority: i32,
}

impl SqlKeyword {
    /// Create a new SQL keyword
    pub fn new(label: &str, description: Option<&str>, sort_priority: i32) -> Self {
        Self {
            label: label.to_uppercase(),
            description: description.map(|d| d.to_string()),
            sort_priority,
        }
    }

    /// Create a simple keyword without description
    pub fn simple(label: &str, sort_priority: i32) -> Self {
        Self::new(label, None, sort_priority)
    }
}

/// Keyword set for a specific context
#[derive(Debug, Clone)]
pub struct KeywordSet {
    /// Keywords in this set
    pub keywords: Vec<SqlKeyword>,
}

impl KeywordSet {
    /// Create a new keyword set
    pub fn new(keywords: Vec<SqlKeyword>) -> Self {
        Self { keywords }
    }

    /// Get all keyword labels as a HashSet for filtering
    pub fn labels(&self) -> HashSet<String> {
        self.keywords.iter().map(|k| k.label.clone()).collect()
    }

    /// Filter keywords excluding the given set
    pub fn exclude(&self, exclude: &HashSet<String>) -> Vec<SqlKeyword> {
        self.keywords
            .iter()
            .filter(|k| !exclude.contains(&k.label))
            .cloned()
            .collect()
    }

    /// Keywords whose label starts with `prefix` (case-insensitive)
    pub fn matching(&self, prefix: &str) -> Vec<SqlKeyword> {
        let upper = prefix.to_uppercase();
        self.keywords
            .iter()
            .filter(|k| k.label.starts_with(&upper))
            .cloned()
            .collect()
    }
}

/// Keyword provider for the warehouse dialect
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordProvider;

impl KeywordProvider {
    /// Create a new keyword provider
    pub fn new() -> Self {
        Self
    }

    /// Get statement keywords (for start of statement)
    pub fn statement_keywords(&self) -> KeywordSet {
        let keywords = vec![
            SqlKeyword::new("SELECT", Some("Retrieve data from tables"), 1),
            SqlKeyword::new("WITH", Some("Common Table Expression (CTE)"), 2),
            SqlKeyword::new("INSERT", Some("Insert new rows into a table"), 3),
            SqlKeyword::new("UPDATE", Some("Modify existing rows in a table"), 4),
            SqlKeyword::new("DELETE", Some("Delete rows from a table"), 5),
            SqlKeyword::new("MERGE", Some("Upsert rows from a source"), 6),
            SqlKeyword::new("CREATE", Some("Create database objects"), 7),
            SqlKeyword::new("ALTER", Some("Modify database objects"), 8),
            SqlKeyword::new("DROP", Some("Remove database objects"), 9),
            SqlKeyword::new("TRUNCATE", Some("Remove all rows from a table"), 10),
            SqlKeyword::new("USE", Some("Set the session database, schema, warehouse or role"), 11),
            SqlKeyword::new("SHOW", Some("List objects"), 12),
            SqlKeyword::new("DESCRIBE", Some("Describe an object"), 13),
            SqlKeyword::new("GRANT", Some("Grant privileges or roles"), 14),
            SqlKeyword::new("REVOKE", Some("Revoke privileges or roles"), 15),
            SqlKeyword::new("COPY INTO", Some("Load or unload data"), 16),
            SqlKeyword::new("CALL", Some("Call a stored procedure"), 17),
        ];

        KeywordSet::new(keywords)
    }

    /// Get SELECT clause keywords (for within SELECT statements)
    pub fn select_clause_keywords(&self) -> KeywordSet {
        let keywords = vec![
            SqlKeyword::new("CASE", Some("Conditional expression"), 1),
            SqlKeyword::new("FROM", Some("Specify tables to query"), 2),
            SqlKeyword::new("WHERE", Some("Filter rows"), 3),
            SqlKeyword::new("GROUP BY", Some("Group rows by values"), 4),
            SqlKeyword::new("HAVING", Some("Filter groups"), 5),
            SqlKeyword::new("QUALIFY", Some("Filter on window function results"), 6),
            SqlKeyword::new("ORDER BY", Some("Sort result rows"), 7),
            SqlKeyword::new("LIMIT", Some("Limit number of rows"), 8),
            SqlKeyword::new("OFFSET", Some("Skip rows before limiting"), 9),
            SqlKeyword::new("JOIN", Some("Join with another table"), 10),
            SqlKeyword::new("INNER JOIN", Some("Inner join with another table"), 11),
            SqlKeyword::new("LEFT JOIN", Some("Left outer join"), 12),
            SqlKeyword::new("RIGHT JOIN", Some("Right outer join"), 13),
            SqlKeyword::new("FULL JOIN", Some("Full outer join"), 14),
            SqlKeyword::new("CROSS JOIN", Some("Cross join"), 15),
            SqlKeyword::new("LATERAL FLATTEN", Some("Expand semi-structured values"), 16),
            SqlKeyword::new("UNION", Some("Combine result sets"), 17),
            SqlKeyword::new("UNION ALL", Some("Combine result sets with duplicates"), 18),
            SqlKeyword::new("INTERSECT", Some("Intersection of result sets"), 19),
            SqlKeyword::new("MINUS", Some("Difference of result sets"), 20),
            SqlKeyword::new("DISTINCT", Some("Remove duplicate rows"), 21),
            SqlKeyword::new("AS", Some("Alias for columns or tables"), 22),
        ];

        KeywordSet::new(keywords)
    }

    /// Get expression/operator keywords
    pub fn expression_keywords(&self) -> KeywordSet {
        let keywords = vec![
            SqlKeyword::new("AND", Some("Logical AND"), 1),
            SqlKeyword::new("OR", Some("Logical OR"), 2),
            SqlKeyword::new("NOT", Some("Logical NOT"), 3),
            SqlKeyword::new("IN", Some("Value in list"), 4),
            SqlKeyword::new("EXISTS", Some("Subquery exists"), 5),
            SqlKeyword::new("BETWEEN", Some("Value between range"), 6),
            SqlKeyword::new("LIKE", Some("Pattern matching"), 7),
            SqlKeyword::new("ILIKE", Some("Case-insensitive pattern matching"), 8),
            SqlKeyword::new("IS NULL", Some("Check if value is NULL"), 9),
            SqlKeyword::new("IS NOT NULL", Some("Check if value is not NULL"), 10),
            SqlKeyword::new("CASE", Some("Conditional expression"), 11),
            SqlKeyword::new("WHEN", Some("CASE WHEN condition"), 12),
            SqlKeyword::new("THEN", Some("CASE THEN result"), 13),
            SqlKeyword::new("ELSE", Some("CASE ELSE default"), 14),
            SqlKeyword::new("END", Some("END CASE expression"), 15),
            SqlKeyword::new("NULL", Some("NULL value"), 16),
            SqlKeyword::new("TRUE", Some("Boolean TRUE"), 17),
            SqlKeyword::new("FALSE", Some("Boolean FALSE"), 18),
            SqlKeyword::new("CAST", Some("Cast to type"), 19),
            SqlKeyword::new("TRY_CAST", Some("Cast to type, NULL on failure"), 20),
            SqlKeyword::new("IFF", Some("Inline if"), 21),
            SqlKeyword::new("COALESCE", Some("First non-NULL value"), 22),
            SqlKeyword::new("NULLIF", Some("NULL if equal"), 23),
        ];

        KeywordSet::new(keywords)
    }

    /// Get keywords that may follow `USE`
    pub fn use_keywords(&self) -> KeywordSet {
        let keywords = vec![
            SqlKeyword::new("DATABASE", Some("Set the current database"), 1),
            SqlKeyword::new("SCHEMA", Some("Set the current schema"), 2),
            SqlKeyword::new("WAREHOUSE", Some("Set the current warehouse"), 3),
            SqlKeyword::new("ROLE", Some("Set the current role"), 4),
            SqlKeyword::new("SECONDARY ROLES", Some("Set the secondary roles"), 5),
        ];

        KeywordSet::new(keywords)
    }

    /// Get keywords available after a specific clause
    pub fn keywords_after_clause(&self, clause: &str) -> Vec<SqlKeyword> {
        match clause.to_uppercase().as_str() {
            "SELECT" => self.select_clause_keywords().keywords,
            "FROM" => {
                // After FROM, we can have: JOIN, WHERE, GROUP BY, etc.
                let all = self.select_clause_keywords();
                all.exclude(&HashSet::from(["FROM".to_string(), "CASE".to_string()]))
            }
            "WHERE" => vec![
                SqlKeyword::new("GROUP BY", Some("Group rows by values"), 1),
                SqlKeyword::new("ORDER BY", Some("Sort result rows"), 2),
                SqlKeyword::new("QUALIFY", Some("Filter on window function results"), 3),
                SqlKeyword::new("LIMIT", Some("Limit number of rows"), 4),
                SqlKeyword::new("HAVING", Some("Filter groups"), 5),
            ],
            "JOIN" => vec![
                SqlKeyword::new("ON", Some("Join condition"), 1),
                SqlKeyword::new("USING", Some("Join using columns"), 2),
            ],
            "BY" | "GROUP BY" => vec![
                SqlKeyword::new("HAVING", Some("Filter groups"), 1),
                SqlKeyword::new("ORDER BY", Some("Sort result rows"), 2),
                SqlKeyword::new("LIMIT", Some("Limit number of rows"), 3),
            ],
            "ORDER BY" => vec![
                SqlKeyword::new("ASC", Some("Ascending order"), 1),
                SqlKeyword::new("DESC", Some("Descending order"), 2),
                SqlKeyword::new("LIMIT", Some("Limit number of rows"), 3),
            ],
            "USE" => self.use_keywords().keywords,
            _ => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sql_keyword_creation() {
        let kw = SqlKeyword::new("select", Some("Test description"), 1);
        assert_eq!(kw.label, "SELECT");
        assert_eq!(kw.description, Some("Test description".to_string()));
        assert_eq!(kw.sort_priority, 1);
    }

    #[test]
    fn test_keyword_set_exclude() {
        let set = KeywordSet::new(vec![
            SqlKeyword::simple("SELECT", 1),
            SqlKeyword::simple("FROM", 2),
            SqlKeyword::simple("WHERE", 3),
        ]);
        let filtered = set.exclude(&HashSet::from(["FROM".to_string()]));
        assert_eq!(filtered.len(), 2);
        assert!(!filtered.iter().any(|k| k.label == "FROM"));
        assert_eq!(set.labels().len(), 3);
    }

    #[test]
    fn test_keyword_set_matching() {
        let provider = KeywordProvider::new();
        let matches = provider.statement_keywords().matching("se");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].label, "SELECT");
    }

    #[test]
    fn test_select_keywords_include_qualify() {
        let provider = KeywordProvider::new();
        let labels = provider.select_clause_keywords().labels();
        assert!(labels.contains("QUALIFY"));
        assert!(labels.contains("LIMIT"));
    }

    #[test]
    fn test_keywords_after_clause() {
        let provider = KeywordProvider::new();
        let after_from = provider.keywords_after_clause("from");
        assert!(!after_from.iter().any(|k| k.label == "FROM"));
        assert!(after_from.iter().any(|k| k.label == "WHERE"));

        let after_use = provider.keywords_after_clause("USE");
        assert!(after_use.iter().any(|k| k.label == "WAREHOUSE"));
        assert!(provider.keywords_after_clause("LIMIT").is_empty());
    }

    #[test]
    fn test_is_keyword() {
        assert!(is_keyword("from"));
        assert!(is_keyword("Qualify"));
        assert!(!is_keyword("orders"));
    }
}
