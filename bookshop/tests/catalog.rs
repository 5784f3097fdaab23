use bookshop::{CatalogConfig, CatalogService, DraftEvent, SequentialIds, operations::APPROVE_BOOK};
use hookline::{
    Cause, EventKind, Phase, Query, Record, Registry, RunState,
    serde_json::{Value, json},
    testing::{FailingGateway, FailingHandler, GatewayCall},
};
use std::{
    io,
    sync::{Arc, Mutex},
};

mod common;
use common::{ShapedCounts, Stalled, catalog, catalog_with, record};

// ============================================================================
// CREATE
// ============================================================================

#[tokio::test]
async fn test_create_without_name_is_rejected_before_storage() {
    let catalog = catalog();

    for data in [
        json!({}),
        json!({"name": null}),
        json!({"name": "", "id": 5}),
        json!({"name": "  "}),
    ] {
        let err = catalog.service.create(record(data)).await.unwrap_err();
        assert_eq!(err.status(), 400);
        assert_eq!(err.message(), "Book name is mandatory");
        assert_eq!(err.phase(), Phase::Before);
    }

    assert_eq!(catalog.gateway.inserts(), 0);
    assert!(catalog.gateway.calls().is_empty());
}

#[tokio::test]
async fn test_create_with_non_string_name_is_rejected() {
    let catalog = catalog();

    for name in [json!(false), json!(0), json!(42), json!(["Dune"]), json!({"title": "Dune"})] {
        let err = catalog
            .service
            .create(record(json!({"name": name})))
            .await
            .unwrap_err();
        assert_eq!(err.status(), 400);
        assert_eq!(err.message(), "Book name is mandatory");
    }

    assert_eq!(catalog.gateway.inserts(), 0);
    assert!(catalog.gateway.inner().is_empty("books"));
}

#[tokio::test]
async fn test_create_generates_missing_id() {
    let catalog = catalog();

    let book = catalog
        .service
        .create(record(json!({"name": "Dune"})))
        .await
        .unwrap();

    assert_eq!(book, json!({"name": "Dune", "id": 1000}));
    assert_eq!(catalog.gateway.inserts(), 1);
    assert_eq!(catalog.gateway.inner().snapshot("books"), vec![record(book)]);
}

#[tokio::test]
async fn test_create_keeps_given_id() {
    let catalog = catalog();

    for id in [json!(7), json!(0), json!("B-12")] {
        let book = catalog
            .service
            .create(record(json!({"id": id.clone(), "name": "Emma"})))
            .await
            .unwrap();
        assert_eq!(book["id"], id);
    }
    assert_eq!(catalog.gateway.inserts(), 3);
}

#[tokio::test]
async fn test_random_ids_are_in_range() {
    let config = CatalogConfig {
        id_ceiling: 1_000_000,
        ..CatalogConfig::default()
    };
    let catalog = CatalogService::in_memory(config).unwrap();

    let book = catalog.create(record(json!({"name": "Ubik"}))).await.unwrap();
    let id = book["id"].as_i64().unwrap();
    assert!((0..1_000_000).contains(&id));
}

#[tokio::test]
async fn test_forced_error_is_unhandled_and_not_stored() {
    let catalog = catalog();

    let err = catalog
        .service
        .create(record(json!({"name": "Error"})))
        .await
        .unwrap_err();

    assert_eq!(err.status(), 500);
    assert!(err.is_unhandled());
    assert!(err.message().contains("Forced error for testing"));
    assert_eq!(err.state(), RunState::Aborted);
    assert_eq!(catalog.gateway.inserts(), 0);
}

#[tokio::test]
async fn test_duplicate_id_is_conflict() {
    let catalog = catalog();
    let book = record(json!({"id": 1, "name": "Dune"}));

    catalog.service.create(book.clone()).await.unwrap();
    let err = catalog.service.create(book).await.unwrap_err();

    assert_eq!(err.status(), 409);
    assert!(matches!(err.cause(), Cause::Gateway(_)));
}

// ============================================================================
// READ / UPDATE / DELETE
// ============================================================================

#[tokio::test]
async fn test_read_runs_query() {
    let catalog = catalog();
    for name in ["Dune", "Emma", "Ubik"] {
        catalog
            .service
            .create(record(json!({"name": name})))
            .await
            .unwrap();
    }

    let all = catalog.service.list().await.unwrap();
    assert_eq!(all.as_array().map(Vec::len), Some(3));

    let names = catalog
        .service
        .read(Query::from("books").where_eq("id", 1001).columns(["name"]))
        .await
        .unwrap();
    assert_eq!(names, json!([{"name": "Emma"}]));

    let missing = catalog.service.find(99).await.unwrap();
    assert_eq!(missing, Value::Null);
}

#[tokio::test]
async fn test_update_echoes_payload_without_storage() {
    let catalog = catalog();
    catalog
        .service
        .create(record(json!({"id": 1, "name": "Dune", "status": "Open"})))
        .await
        .unwrap();
    catalog.gateway.clear();

    let outcome = catalog
        .service
        .update(record(json!({"id": 1, "name": "Dune Messiah"})))
        .await
        .unwrap();

    assert_eq!(outcome, json!({"id": 1, "name": "Dune Messiah"}));
    assert_eq!(catalog.gateway.calls(), vec![GatewayCall::Query("books".into())]);
    assert_eq!(catalog.service.find(1).await.unwrap()["name"], "Dune");
}

#[tokio::test]
async fn test_update_to_approved_is_rejected() {
    let catalog = catalog();

    let err = catalog
        .service
        .update(record(json!({"id": 1, "status": "Approved"})))
        .await
        .unwrap_err();

    assert_eq!(err.status(), 400);
    assert_eq!(err.message(), "Approved books cannot be updated");
    assert!(catalog.gateway.calls().is_empty());
}

#[tokio::test]
async fn test_update_of_approved_book_is_rejected() {
    let catalog = catalog();
    catalog
        .service
        .create(record(json!({"id": 3, "name": "Ubik", "status": "Open"})))
        .await
        .unwrap();
    catalog.service.approve_book(3).await.unwrap();
    catalog.gateway.clear();

    let err = catalog
        .service
        .update(record(json!({"id": 3, "name": "Ubik (revised)"})))
        .await
        .unwrap_err();

    assert_eq!(err.status(), 400);
    assert!(
        !catalog
            .gateway
            .calls()
            .iter()
            .any(|call| matches!(call, GatewayCall::Update(_)))
    );
}

#[tokio::test]
async fn test_delete_acknowledges_without_storage() {
    let catalog = catalog();
    catalog
        .service
        .create(record(json!({"id": 1, "name": "Dune"})))
        .await
        .unwrap();
    catalog.gateway.clear();

    let outcome = catalog
        .service
        .delete(record(json!({"id": 1})))
        .await
        .unwrap();

    assert_eq!(outcome, Value::Null);
    assert!(catalog.gateway.calls().is_empty());
    assert_eq!(catalog.gateway.inner().len("books"), 1);
}

// ============================================================================
// Operations
// ============================================================================

#[tokio::test]
async fn test_approve_then_read_round_trip() {
    let catalog = catalog();
    let book = catalog
        .service
        .create(record(json!({"name": "Dune", "status": "Open"})))
        .await
        .unwrap();
    let id = book["id"].clone();

    let message = catalog.service.approve_book(id.clone()).await.unwrap();
    assert_eq!(message, "Book 1000 approved successfully");

    let stored = catalog.service.find(id).await.unwrap();
    assert_eq!(stored["status"], "Approved");
    assert_eq!(stored["name"], "Dune");
}

#[tokio::test]
async fn test_approve_requires_id() {
    let catalog = catalog();

    let err = catalog
        .service
        .dispatcher()
        .invoke(APPROVE_BOOK, Record::new())
        .await
        .unwrap_err();

    assert_eq!(err.status(), 400);
    assert_eq!(err.message(), "Book id is mandatory");
    assert!(catalog.gateway.calls().is_empty());
}

#[tokio::test]
async fn test_book_count_matches_storage_and_is_idempotent() {
    let catalog = catalog();
    assert_eq!(catalog.service.book_count().await.unwrap(), 0);

    for name in ["Dune", "Emma", "Ubik", "Solaris"] {
        catalog
            .service
            .create(record(json!({"name": name})))
            .await
            .unwrap();
    }

    let first = catalog.service.book_count().await.unwrap();
    let second = catalog.service.book_count().await.unwrap();
    assert_eq!(first, 4);
    assert_eq!(first, second);
    assert_eq!(first as usize, catalog.gateway.inner().len("books"));
    assert_eq!(catalog.gateway.inserts(), 4);
}

#[tokio::test]
async fn test_operations_skip_phases() {
    let catalog = catalog();

    // An approval for an unknown id matches nothing but still succeeds.
    let message = catalog.service.approve_book("nope").await.unwrap();
    assert_eq!(message, "Book nope approved successfully");
    assert_eq!(
        catalog.gateway.calls(),
        vec![GatewayCall::Update("books".into())]
    );

    let err = catalog
        .service
        .dispatcher()
        .invoke("publishBook", Record::new())
        .await
        .unwrap_err();
    assert_eq!(err.status(), 404);
}

// ============================================================================
// Drafts
// ============================================================================

#[tokio::test]
async fn test_draft_events_are_dispatchable() {
    let catalog = catalog();

    for event in DraftEvent::ALL {
        let outcome = catalog
            .service
            .draft(event, record(json!({"id": 1, "name": "Draft"})))
            .await
            .unwrap();
        assert_eq!(outcome, json!({"id": 1, "name": "Draft"}));
    }
    assert!(catalog.gateway.calls().is_empty());
}

#[tokio::test]
async fn test_drafts_need_default_handlers() {
    let catalog = catalog_with(CatalogConfig {
        default_handlers: false,
        ..CatalogConfig::default()
    });

    let err = catalog
        .service
        .draft(DraftEvent::Save, Record::new())
        .await
        .unwrap_err();
    assert_eq!(err.status(), 501);
}

// ============================================================================
// Setup and failures
// ============================================================================

#[test]
fn test_duplicate_on_fails_before_dispatch() {
    let mut builder = Registry::builder();
    builder
        .on(EventKind::Create, "books", bookshop::handlers::books::InsertBook)
        .unwrap();

    let err = builder
        .on(EventKind::Create, "books", bookshop::handlers::books::InsertBook)
        .unwrap_err();
    assert!(err.to_string().contains("CREATE"));
}

#[tokio::test]
async fn test_after_failure_reports_failed_run() {
    let mut builder = Registry::builder();
    builder
        .on(EventKind::Create, "books", bookshop::handlers::books::InsertBook)
        .unwrap();
    builder.after(
        EventKind::Create,
        "books",
        FailingHandler::unhandled("after handler exploded"),
    );
    let gateway = Arc::new(hookline::MemoryGateway::new());
    let dispatcher = hookline::Dispatcher::new(builder.build(), gateway.clone());

    let err = dispatcher
        .dispatch(hookline::Request::create(
            "books",
            record(json!({"id": 1, "name": "Dune"})),
        ))
        .await
        .unwrap_err();

    assert_eq!(err.state(), RunState::Failed);
    assert_eq!(err.phase(), Phase::After);
    assert_eq!(err.discarded_outcome(), Some(&json!({"id": 1, "name": "Dune"})));
    assert_eq!(gateway.len("books"), 1);
}

#[tokio::test]
async fn test_gateway_outage_surfaces_as_503() {
    let catalog = CatalogService::with_ids(
        CatalogConfig::default(),
        Arc::new(FailingGateway),
        Arc::new(bookshop::SequentialIds::default()),
    )
    .unwrap();

    let err = catalog.create(record(json!({"name": "Dune"}))).await.unwrap_err();
    assert_eq!(err.status(), 503);
    assert_eq!(err.phase(), Phase::On);

    let err = catalog.book_count().await.unwrap_err();
    assert_eq!(err.status(), 503);
}

#[tokio::test]
async fn test_gateway_timeout_is_applied() {
    let config = CatalogConfig {
        gateway_timeout_ms: Some(1_000),
        ..CatalogConfig::default()
    };
    let catalog = CatalogService::in_memory(config).unwrap();

    catalog.create(record(json!({"name": "Dune"}))).await.unwrap();
    assert_eq!(catalog.book_count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_stalled_gateway_times_out_as_504() {
    let config = CatalogConfig {
        gateway_timeout_ms: Some(20),
        ..CatalogConfig::default()
    };
    let catalog =
        CatalogService::with_ids(config, Arc::new(Stalled), Arc::new(SequentialIds::default()))
            .unwrap();

    let err = catalog.create(record(json!({"name": "Dune"}))).await.unwrap_err();
    assert_eq!(err.status(), 504);
    assert_eq!(err.phase(), Phase::On);
    assert!(matches!(err.cause(), Cause::Gateway(hookline::GatewayError::Timeout(_))));

    let err = catalog.book_count().await.unwrap_err();
    assert_eq!(err.status(), 504);
}

#[tokio::test]
async fn test_book_count_reads_count_rows() {
    let gateway = Arc::new(ShapedCounts::new(|count| json!({"count": count})));
    let catalog = CatalogService::with_ids(
        CatalogConfig::default(),
        gateway.clone(),
        Arc::new(SequentialIds::default()),
    )
    .unwrap();

    for name in ["Dune", "Emma", "Ubik"] {
        catalog.create(record(json!({"name": name}))).await.unwrap();
    }
    assert_eq!(catalog.book_count().await.unwrap(), 3);
    assert_eq!(gateway.inner.len("books"), 3);
}

#[tokio::test]
async fn test_book_count_refuses_unknown_shapes() {
    let catalog = CatalogService::with_ids(
        CatalogConfig::default(),
        Arc::new(ShapedCounts::new(|count| json!({"total": count}))),
        Arc::new(SequentialIds::default()),
    )
    .unwrap();
    catalog.create(record(json!({"name": "Dune"}))).await.unwrap();

    let err = catalog.book_count().await.unwrap_err();
    assert_eq!(err.status(), 500);
    assert!(err.is_unhandled());
    assert!(err.message().contains("total"));
}

#[test]
fn test_invalid_config_is_refused() {
    let config = CatalogConfig {
        entity: " ".to_owned(),
        ..CatalogConfig::default()
    };
    assert!(matches!(
        CatalogService::in_memory(config),
        Err(bookshop::CatalogError::InvalidConfig(_))
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_creates_share_one_service() {
    let catalog = catalog();
    let service = catalog.service.clone();

    let runs = (0..50).map(|n| {
        let service = service.clone();
        tokio::spawn(async move { service.create(record(json!({"name": format!("Book {n}")}))).await })
    });
    for run in futures::future::join_all(runs).await {
        run.unwrap().unwrap();
    }

    assert_eq!(catalog.service.book_count().await.unwrap(), 50);
}

// ============================================================================
// Logging
// ============================================================================

#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl Captured {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn test_log_lines_name_the_configured_entity() {
    let captured = Captured::default();
    let writer = captured.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .with_target(false)
        .with_writer(move || writer.clone())
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let catalog = catalog_with(CatalogConfig {
        entity: "novels".to_owned(),
        ..CatalogConfig::default()
    });
    catalog
        .service
        .create(record(json!({"name": "Dune"})))
        .await
        .unwrap();
    catalog.service.list().await.unwrap();

    let logs = captured.text();
    for line in ["Before CREATE novels", "ON CREATE novels", "After CREATE novels", "ON READ novels"] {
        assert!(logs.contains(line), "missing `{line}` in:\n{logs}");
    }
    for line in ["CREATE books", "READ books"] {
        assert!(!logs.contains(line), "unexpected `{line}` in:\n{logs}");
    }
}
