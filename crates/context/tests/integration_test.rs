// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Integration tests for context detection and session tracking

use warehouse_sql_lsp_context::{
    ContextKind, SessionContextManager, UseCommand, classify_context, extract_cte_names,
    extract_table_references, load_global_context, parse_use_commands,
};
use warehouse_sql_lsp_test_utils::{MockCatalogBuilder, SqlFixtures, split_cursor, test_uri};

fn classify_fixture(input: &str) -> warehouse_sql_lsp_context::ContextDescriptor {
    let (text, offset) = split_cursor(input);
    classify_context(&text, offset)
}

#[test]
fn test_fixture_kinds() {
    let cases = [
        (SqlFixtures::select_list(), ContextKind::SelectList),
        (SqlFixtures::alias_member(), ContextKind::TableDot),
        (SqlFixtures::where_predicate(), ContextKind::WhereClause),
        (SqlFixtures::from_table(), ContextKind::FromClause),
        (SqlFixtures::schema_member(), ContextKind::SchemaDot),
        (SqlFixtures::from_list(), ContextKind::FromClause),
        (SqlFixtures::use_warehouse(), ContextKind::UseWarehouse),
        (SqlFixtures::use_role(), ContextKind::UseRole),
        (SqlFixtures::use_database(), ContextKind::UseDatabase),
        (SqlFixtures::use_schema(), ContextKind::UseSchema),
        (SqlFixtures::grant_to_role(), ContextKind::GrantToRole),
        (SqlFixtures::grant_to_user(), ContextKind::GrantToUser),
    ];
    for (input, expected) in cases {
        assert_eq!(classify_fixture(input).kind, expected, "input: {input}");
    }
}

#[test]
fn test_alias_member_resolves_qualified_table() {
    let ctx = classify_fixture(SqlFixtures::alias_member());
    assert_eq!(ctx.qualifier.as_deref(), Some("o"));
    assert_eq!(ctx.resolved_table.as_deref(), Some("PROD.ANALYTICS.ORDERS"));
    assert_eq!(
        ctx.alias_map.get("c").map(String::as_str),
        Some("PROD.SALES.CUSTOMERS")
    );
    assert_eq!(
        ctx.tables(),
        vec!["PROD.ANALYTICS.ORDERS", "PROD.SALES.CUSTOMERS"]
    );
}

#[test]
fn test_worksheet_alias_and_use_commands() {
    let text = SqlFixtures::worksheet();
    let offset = text.find("c.NAME").unwrap() + 2;
    let ctx = classify_context(text, offset);
    assert_eq!(ctx.kind, ContextKind::TableDot);
    assert_eq!(ctx.current_word, "c.NAME");
    assert_eq!(ctx.resolved_table.as_deref(), Some("CUSTOMERS"));

    assert_eq!(
        parse_use_commands(text),
        vec![
            UseCommand::Role("SYSADMIN".into()),
            UseCommand::Warehouse("ETL_WH".into()),
            UseCommand::Database("PROD".into()),
            UseCommand::Schema("SALES".into()),
        ]
    );
}

#[test]
fn test_cte_names_are_not_table_references_to_validate() {
    let text = SqlFixtures::cte_with_unknown_table();
    let ctes = extract_cte_names(text);
    assert_eq!(ctes, vec!["recent"]);

    let unknown: Vec<_> = extract_table_references(text)
        .into_iter()
        .filter(|r| !ctes.contains(&r.table.to_lowercase()))
        .map(|r| r.table)
        .collect();
    assert_eq!(unknown, vec!["ORDERS", "ORDR_ITEMS"]);
}

#[tokio::test]
async fn test_sessions_seeded_from_source_defaults() {
    let source = MockCatalogBuilder::new().with_standard_schema().build();
    let mut sessions = SessionContextManager::new();
    sessions.set_global_context(load_global_context(&source).await);

    let uri = test_uri("worksheet");
    let commands = parse_use_commands(SqlFixtures::worksheet());
    let ctx = sessions.rebuild_context(&uri, &commands);
    assert_eq!(ctx.database.as_deref(), Some("PROD"));
    assert_eq!(ctx.schema.as_deref(), Some("SALES"));
    assert_eq!(ctx.warehouse.as_deref(), Some("ETL_WH"));
    assert_eq!(ctx.role.as_deref(), Some("SYSADMIN"));

    let fresh = sessions.get_context(&test_uri("other"));
    assert_eq!(fresh.schema.as_deref(), Some("ANALYTICS"));
    assert_eq!(fresh.role.as_deref(), Some("ANALYST"));
}

#[tokio::test]
async fn test_failed_defaults_fall_back_to_empty_seed() {
    let source = MockCatalogBuilder::new()
        .with_standard_schema()
        .failing_session_defaults()
        .build();
    let defaults = load_global_context(&source).await;
    assert_eq!(defaults, Default::default());

    let mut sessions = SessionContextManager::with_global(defaults);
    let ctx = sessions.get_context(&test_uri("a"));
    assert!(ctx.database.is_none());
    assert!(ctx.warehouse.is_none());
}

#[test]
fn test_editing_use_lines_rebuilds_session() {
    let uri = test_uri("edit");
    let mut sessions = SessionContextManager::new();

    let before = "USE DATABASE X;\nUSE SCHEMA Y;\nUSE DATABASE Z;";
    let ctx = sessions.rebuild_context(&uri, &parse_use_commands(before));
    assert_eq!(ctx.database.as_deref(), Some("Z"));
    assert_eq!(ctx.schema, None);

    let after = "USE DATABASE X;\nUSE SCHEMA Y;";
    let ctx = sessions.rebuild_context(&uri, &parse_use_commands(after));
    assert_eq!(ctx.database.as_deref(), Some("X"));
    assert_eq!(ctx.schema.as_deref(), Some("Y"));
}
