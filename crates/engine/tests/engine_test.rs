// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! End-to-end tests for the engine facade against the mock catalog source

use std::sync::Arc;

use lsp_types::{CompletionItemKind, Position};
use warehouse_sql_lsp_catalog::{CatalogCategory, CatalogError};
use warehouse_sql_lsp_engine::{
    CandidateKind, CompletionCandidate, DiagnosticCode, EngineConfig, EngineError, SqlEngine,
};
use warehouse_sql_lsp_test_utils::{
    MockCatalogBuilder, MockCatalogSource, SqlFixtures, split_cursor, test_uri,
};

fn standard_source() -> Arc<MockCatalogSource> {
    Arc::new(MockCatalogBuilder::new().with_standard_schema().build())
}

async fn engine_with(source: &Arc<MockCatalogSource>, config: EngineConfig) -> SqlEngine {
    let engine = SqlEngine::new(source.clone(), config).unwrap();
    engine.bootstrap().await;
    engine
}

async fn complete(engine: &SqlEngine, name: &str, input: &str) -> Vec<CompletionCandidate> {
    let (text, offset) = split_cursor(input);
    engine.complete(&test_uri(name), &text, offset).await.unwrap()
}

fn labels(candidates: &[CompletionCandidate]) -> Vec<&str> {
    candidates.iter().map(|c| c.label.as_str()).collect()
}

#[tokio::test]
async fn test_from_clause_ranks_session_schema_first() {
    let source = standard_source();
    let engine = engine_with(&source, EngineConfig::default()).await;

    let candidates = complete(&engine, "a", "SELECT * FROM ORD|").await;
    assert_eq!(labels(&candidates), vec!["ORDERS", "ORDER_ITEMS", "ORDERS"]);
    let inserts: Vec<_> = candidates
        .iter()
        .map(|c| c.insert_text.as_deref().unwrap())
        .collect();
    assert_eq!(inserts, vec!["ORDERS", "ORDER_ITEMS", "SALES.ORDERS"]);
}

#[tokio::test]
async fn test_use_schema_changes_locality() {
    let source = standard_source();
    let engine = engine_with(&source, EngineConfig::default()).await;
    let uri = test_uri("b");

    let (text, offset) = split_cursor("USE SCHEMA SALES;\nSELECT * FROM ORD|");
    let session = engine.document_changed(&uri, &text);
    assert_eq!(session.database.as_deref(), Some("PROD"));
    assert_eq!(session.schema.as_deref(), Some("SALES"));

    let candidates = engine.complete(&uri, &text, offset).await.unwrap();
    assert_eq!(candidates[0].schema.as_deref(), Some("SALES"));
    assert_eq!(candidates[0].insert_text.as_deref(), Some("ORDERS"));
    assert_eq!(candidates[1].insert_text.as_deref(), Some("ANALYTICS.ORDERS"));
}

#[tokio::test]
async fn test_schema_dot_lists_tables_then_views() {
    let source = standard_source();
    let engine = engine_with(&source, EngineConfig::default()).await;

    let candidates = complete(&engine, "c", SqlFixtures::schema_member()).await;
    assert_eq!(
        labels(&candidates),
        vec!["ORDERS", "ORDER_ITEMS", "DAILY_REVENUE"]
    );
    assert_eq!(candidates[2].kind, CandidateKind::View);

    let candidates = complete(&engine, "c", "SELECT * FROM PROD.|").await;
    assert_eq!(labels(&candidates), vec!["ANALYTICS", "SALES"]);
    assert!(candidates[0].is_current);
}

#[tokio::test]
async fn test_table_dot_loads_columns_once() {
    let source = standard_source();
    let engine = engine_with(&source, EngineConfig::default()).await;
    assert_eq!(source.column_fetches(), 0);

    let candidates = complete(&engine, "d", SqlFixtures::alias_member()).await;
    assert_eq!(
        labels(&candidates),
        vec!["ORDER_ID", "CUSTOMER_ID", "ORDER_DATE", "STATUS", "AMOUNT"]
    );
    assert!(candidates.iter().all(|c| c.kind == CandidateKind::Column));

    complete(&engine, "d", SqlFixtures::alias_member()).await;
    assert_eq!(source.column_fetches(), 1);
}

#[tokio::test]
async fn test_failed_column_load_propagates_then_retries() {
    let source = Arc::new(
        MockCatalogBuilder::new()
            .with_standard_schema()
            .failing_columns()
            .build(),
    );
    let engine = engine_with(&source, EngineConfig::default()).await;
    let uri = test_uri("e");
    let (text, offset) = split_cursor(SqlFixtures::alias_member());

    let err = engine.complete(&uri, &text, offset).await.unwrap_err();
    assert!(matches!(
        err,
        EngineError::Catalog(CatalogError::ConnectionFailed(_))
    ));
    assert!(!err.should_return_empty());
    assert!(!engine.catalog().read().columns_loaded("PROD.ANALYTICS.ORDERS"));

    source.set_fail_columns(false);
    let candidates = engine.complete(&uri, &text, offset).await.unwrap();
    assert_eq!(candidates.len(), 5);
    assert_eq!(source.column_fetches(), 2);
}

#[tokio::test]
async fn test_select_list_qualifies_shared_column_names() {
    let source = standard_source();
    let engine = engine_with(&source, EngineConfig::default()).await;

    let candidates = complete(
        &engine,
        "f",
        "SELECT | FROM PROD.ANALYTICS.ORDERS o JOIN PROD.SALES.CUSTOMERS c ON o.CUSTOMER_ID = c.CUSTOMER_ID",
    )
    .await;
    assert_eq!(source.column_fetches(), 2);

    let shared: Vec<_> = candidates
        .iter()
        .filter(|c| c.label == "CUSTOMER_ID")
        .map(|c| c.insert_text.as_deref().unwrap())
        .collect();
    assert_eq!(shared, vec!["o.CUSTOMER_ID", "c.CUSTOMER_ID"]);

    let name = candidates.iter().find(|c| c.label == "NAME").unwrap();
    assert_eq!(name.insert_text, None);

    // Current-schema columns, then other-schema columns, then keywords
    assert_eq!(candidates[0].label, "ORDER_ID");
    let first_keyword = candidates
        .iter()
        .position(|c| c.kind == CandidateKind::Keyword)
        .unwrap();
    assert!(
        candidates[first_keyword..]
            .iter()
            .all(|c| c.kind == CandidateKind::Keyword)
    );
}

#[tokio::test]
async fn test_use_warehouse_tags_current() {
    let source = standard_source();
    let engine = engine_with(&source, EngineConfig::default()).await;
    let uri = test_uri("g");

    let (text, offset) = split_cursor(SqlFixtures::use_warehouse());
    let candidates = engine.complete(&uri, &text, offset).await.unwrap();
    assert_eq!(labels(&candidates), vec!["COMPUTE_WH", "ETL_WH"]);
    assert!(candidates[0].is_current);

    engine.document_changed(&uri, "USE WAREHOUSE ETL_WH;");
    let items = engine
        .completion_items(&uri, "USE WAREHOUSE ", Position::new(0, 14))
        .await
        .unwrap();
    assert_eq!(items[0].label, "ETL_WH");
    assert_eq!(items[0].preselect, Some(true));
    assert_eq!(items[0].kind, Some(CompletionItemKind::CONSTANT));
    assert_eq!(items[1].preselect, Some(false));
}

#[tokio::test]
async fn test_worksheet_session_and_alias_columns() {
    let source = standard_source();
    let engine = engine_with(&source, EngineConfig::default()).await;
    let uri = test_uri("worksheet");
    let text = SqlFixtures::worksheet();

    let session = engine.document_changed(&uri, text);
    assert_eq!(session.warehouse.as_deref(), Some("ETL_WH"));
    assert_eq!(session.role.as_deref(), Some("SYSADMIN"));

    let offset = text.find("c.NAME").unwrap() + 2;
    let candidates = engine.complete(&uri, text, offset).await.unwrap();
    assert_eq!(labels(&candidates), vec!["NAME"]);
    assert_eq!(candidates[0].sort_priority, 0);
}

#[tokio::test]
async fn test_failed_category_is_isolated() {
    let source = Arc::new(
        MockCatalogBuilder::new()
            .with_standard_schema()
            .failing(CatalogCategory::Warehouses)
            .build(),
    );
    let engine = SqlEngine::new(source.clone(), EngineConfig::default()).unwrap();
    let report = engine.bootstrap().await;
    assert!(report.has_failed(CatalogCategory::Warehouses));
    assert!(!report.has_failed(CatalogCategory::Tables));

    assert!(complete(&engine, "h", SqlFixtures::use_warehouse()).await.is_empty());
    assert!(!complete(&engine, "h", SqlFixtures::from_table()).await.is_empty());
}

#[tokio::test]
async fn test_deferred_catalog_loads_on_first_request() {
    let source = standard_source();
    let config = EngineConfig {
        prefetch_on_startup: false,
        ..Default::default()
    };
    let engine = engine_with(&source, config).await;
    assert!(!engine.is_loaded());
    assert_eq!(source.table_fetches(), 0);
    assert!(engine.validate("SELECT * FROM NOPE").is_empty());

    complete(&engine, "i", SqlFixtures::from_table()).await;
    assert!(engine.is_loaded());
    complete(&engine, "i", SqlFixtures::from_table()).await;
    assert_eq!(source.table_fetches(), 1);
    assert_eq!(engine.validate("SELECT * FROM NOPE").len(), 1);
}

#[tokio::test]
async fn test_eager_columns_prefetched_at_bootstrap() {
    let source = standard_source();
    let config = EngineConfig {
        lazy_columns: false,
        ..Default::default()
    };
    let engine = engine_with(&source, config).await;
    assert_eq!(source.column_fetches(), 5);

    complete(&engine, "j", SqlFixtures::alias_member()).await;
    assert_eq!(source.column_fetches(), 5);
}

#[tokio::test]
async fn test_completion_limit_truncates() {
    let source = standard_source();
    let config = EngineConfig {
        completion_limit: 2,
        ..Default::default()
    };
    let engine = engine_with(&source, config).await;
    assert_eq!(complete(&engine, "k", SqlFixtures::from_table()).await.len(), 2);
}

#[tokio::test]
async fn test_invalid_config_rejected() {
    let config = EngineConfig {
        completion_limit: 0,
        ..Default::default()
    };
    let result = SqlEngine::new(standard_source(), config);
    assert!(matches!(result, Err(EngineError::Config(_))));
}

#[tokio::test]
async fn test_hover_table_fetches_ddl_once() {
    let source = standard_source();
    let engine = engine_with(&source, EngineConfig::default()).await;
    let text = "SELECT * FROM PROD.ANALYTICS.ORDERS";
    let offset = text.find("ORDERS").unwrap() + 1;

    let info = engine.hover(text, offset).await.unwrap();
    assert!(info.contents.starts_with("**TABLE** `PROD.ANALYTICS.ORDERS`"));
    assert!(info.contents.contains("Fact table of placed orders"));
    assert!(info.contents.contains("| AMOUNT | NUMBER(12,2) | yes |"));
    assert!(info.contents.contains("create or replace TABLE ORDERS"));
    assert_eq!(info.range, 14..35);

    engine.hover(text, offset).await.unwrap();
    assert_eq!(source.ddl_fetches(), 1);
    assert_eq!(source.column_fetches(), 1);
}

#[tokio::test]
async fn test_hover_without_ddl_still_describes_table() {
    let source = standard_source();
    source.set_fail_ddl(true);
    let engine = engine_with(&source, EngineConfig::default()).await;
    let text = "SELECT * FROM CUSTOMERS c";

    let info = engine.hover(text, 16).await.unwrap();
    assert!(info.contents.starts_with("**TABLE** `PROD.SALES.CUSTOMERS`"));
    assert!(!info.contents.contains("```sql"));

    // Alias resolves to the same table
    let info = engine.hover(text, 24).await.unwrap();
    assert!(info.contents.starts_with("**TABLE** `PROD.SALES.CUSTOMERS`"));
}

#[tokio::test]
async fn test_hover_columns() {
    let source = standard_source();
    let engine = engine_with(&source, EngineConfig::default()).await;

    let text = "SELECT o.AMOUNT, REGION FROM PROD.ANALYTICS.ORDERS o JOIN PROD.SALES.CUSTOMERS c ON 1 = 1";
    let info = engine.hover(text, text.find("AMOUNT").unwrap()).await.unwrap();
    assert!(info.contents.contains("`PROD.ANALYTICS.ORDERS.AMOUNT`"));
    assert_eq!(info.range, 7..15);

    let hover = engine
        .hover_at(text, Position::new(0, text.find("REGION").unwrap() as u32 + 1))
        .await
        .unwrap();
    let lsp_types::HoverContents::Markup(markup) = hover.contents else {
        panic!("expected markdown hover");
    };
    assert!(markup.value.contains("`PROD.SALES.CUSTOMERS.REGION`"));
    assert!(markup.value.contains("VARCHAR(8)"));
}

#[tokio::test]
async fn test_hover_account_objects_and_misses() {
    let source = standard_source();
    let engine = engine_with(&source, EngineConfig::default()).await;

    let info = engine.hover("USE WAREHOUSE COMPUTE_WH", 16).await.unwrap();
    assert!(info.contents.contains("**WAREHOUSE** `COMPUTE_WH`"));
    assert!(info.contents.contains("X-SMALL"));

    let info = engine.hover("USE DATABASE PROD", 14).await.unwrap();
    assert!(info.contents.contains("Production"));

    assert!(engine.hover("SELECT * FROM NOPE", 15).await.is_none());
}

#[tokio::test]
async fn test_validation_skips_ctes() {
    let source = standard_source();
    let engine = engine_with(&source, EngineConfig::default()).await;
    let text = SqlFixtures::cte_with_unknown_table();

    let diagnostics = engine.validate(text);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].message, "Table 'ORDR_ITEMS' does not exist");
    assert_eq!(diagnostics[0].code, Some(DiagnosticCode::UndefinedTable));

    let expected_start = text.find("ORDR_ITEMS").unwrap();
    assert_eq!(diagnostics[0].span, expected_start..expected_start + 10);

    let lsp = engine.diagnostics(text);
    assert_eq!(lsp[0].range.start.line, 1);
}

#[tokio::test]
async fn test_document_lifecycle() {
    let source = standard_source();
    let engine = engine_with(&source, EngineConfig::default()).await;
    let uri = test_uri("lifecycle");

    engine.document_changed(&uri, "USE DATABASE DEV;");
    assert_eq!(engine.session_context(&uri).database.as_deref(), Some("DEV"));
    assert_eq!(engine.session_context(&uri).schema, None);

    // Removing the USE line falls back to the warehouse defaults
    let session = engine.document_changed(&uri, "SELECT 1;");
    assert_eq!(session.database.as_deref(), Some("PROD"));
    assert_eq!(session.schema.as_deref(), Some("ANALYTICS"));

    assert!(engine.document_closed(&uri));
    assert!(!engine.document_closed(&uri));
}
