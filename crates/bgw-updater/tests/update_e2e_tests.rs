//! End-to-end tests against a synthetic SPARQL endpoint
//!
//! Each test serves canned tab-separated responses through wiremock and
//! verifies the resulting documents in an in-memory store with the same
//! merge semantics as the MongoDB sink.

use std::sync::Arc;

use mongodb::bson::{doc, Bson};
use wiremock::matchers::{method, path, query_param_contains};
use wiremock::{Mock, MockServer, ResponseTemplate};

use bgw_updater::{
    CollectionRef, DataType, FieldFlags, FieldKind, MemoryStore, RowWindow, Scheduler,
    SparqlClient, UpdateContext, UpdateJob,
};

fn single_collection(graph: &str, flags: FieldFlags) -> DataType {
    DataType::new(graph, vec![CollectionRef::new(graph)], "", flags)
}

#[tokio::test]
async fn labels_job_builds_the_expected_document() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sparql"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("\"id\"\t\"label\"\t\"def\"\n\"E1\"\t\"Foo\"\t\"A thing\"\n"),
        )
        .mount(&server)
        .await;

    let store = Arc::new(MemoryStore::new());
    let data_type = single_collection(
        "prot",
        FieldFlags {
            labels: true,
            ..Default::default()
        },
    );
    let job = UpdateJob::new(
        SparqlClient::new(server.uri()).unwrap(),
        store.clone(),
        data_type,
        FieldKind::Labels,
    );

    let outcome = job.run(RowWindow::Full { limit: None }).await.unwrap();
    assert_eq!(outcome.rows, 1);
    assert_eq!(store.count("prot").await, 1);

    let document = store.document("prot", "E1").await.unwrap();
    assert_eq!(
        document,
        doc! {
            "_id": "E1",
            "prefLabel": "Foo",
            "lcLabel": "foo",
            "definition": "A thing",
        }
    );
}

#[tokio::test]
async fn replaying_a_job_leaves_documents_unchanged() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sparql"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("\"id\"\t\"syn\"\n\"E1\"\t\"Foo\"\n\"E1\"\t\"Bar\"\n"),
        )
        .mount(&server)
        .await;

    let store = Arc::new(MemoryStore::new());
    let data_type = single_collection(
        "prot",
        FieldFlags {
            labels: true,
            ..Default::default()
        },
    );
    let job = UpdateJob::new(
        SparqlClient::new(server.uri()).unwrap(),
        store.clone(),
        data_type,
        FieldKind::Synonyms,
    );

    job.run(RowWindow::Full { limit: None }).await.unwrap();
    let once = store.document("prot", "E1").await.unwrap();

    // Retry-by-replay: the same batch applied again is a no-op
    job.run(RowWindow::Full { limit: None }).await.unwrap();
    let twice = store.document("prot", "E1").await.unwrap();

    assert_eq!(once, twice);
    assert_eq!(
        twice.get_array("synonyms").unwrap(),
        &vec![Bson::String("Foo".into()), Bson::String("Bar".into())]
    );
}

#[tokio::test]
async fn fan_out_writes_every_collection_of_the_data_type() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sparql"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(
                "\"id\"\t\"label\"\t\"def\"\n\"GO:1\"\t\"proteolysis\"\t\"Breakdown of proteins\"\n",
            ),
        )
        .mount(&server)
        .await;

    let store = Arc::new(MemoryStore::new());
    let data_type = DataType::new(
        "go",
        vec![
            CollectionRef::new("gobp"),
            CollectionRef::with_prefix("goall", "Biological Process"),
        ],
        "",
        FieldFlags {
            labels: true,
            ..Default::default()
        },
    );
    let job = UpdateJob::new(
        SparqlClient::new(server.uri()).unwrap(),
        store.clone(),
        data_type,
        FieldKind::Labels,
    );

    job.run(RowWindow::Full { limit: None }).await.unwrap();

    // Exactly one upsert per collection, both keyed by the same id
    assert_eq!(store.count("gobp").await, 1);
    assert_eq!(store.count("goall").await, 1);

    let plain = store.document("gobp", "GO:1").await.unwrap();
    assert_eq!(plain.get_str("definition").unwrap(), "Breakdown of proteins");

    // The union collection gets the namespace-prefixed definition
    let prefixed = store.document("goall", "GO:1").await.unwrap();
    assert_eq!(
        prefixed.get_str("definition").unwrap(),
        "Biological ProcessBreakdown of proteins"
    );
}

#[tokio::test]
async fn parallel_run_processes_every_partition() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/sparql"))
        .and(query_param_contains("query", "COUNT"))
        .respond_with(ResponseTemplate::new(200).set_body_string("\"count\"\n\"5\"\n"))
        .with_priority(1)
        .mount(&server)
        .await;

    let batches = [
        ("OFFSET 0", "\"id\"\t\"taxon\"\n\"P1\"\t\"9606\"\n\"P2\"\t\"9606\"\n"),
        ("OFFSET 2", "\"id\"\t\"taxon\"\n\"P3\"\t\"9606\"\n\"P4\"\t\"9606\"\n"),
        ("OFFSET 4", "\"id\"\t\"taxon\"\n\"P5\"\t\"9606\"\n"),
    ];
    for (clause, body) in batches {
        Mock::given(method("GET"))
            .and(path("/sparql"))
            .and(query_param_contains("query", clause))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .expect(1)
            .mount(&server)
            .await;
    }

    let store = Arc::new(MemoryStore::new());
    let catalog = vec![single_collection(
        "prot",
        FieldFlags {
            taxon: true,
            ..Default::default()
        },
    )];

    let context = UpdateContext::new(server.uri(), "testdb")
        .with_batch_size(2)
        .with_parallel(true);
    let scheduler = Scheduler::new(
        SparqlClient::new(server.uri()).unwrap(),
        store.clone(),
        context,
    );

    let report = scheduler.run(&catalog).await.unwrap();
    assert!(report.is_success());
    assert_eq!(report.completed.len(), 3);
    assert_eq!(report.total_rows(), 5);
    assert_eq!(store.count("prot").await, 5);
}

#[tokio::test]
async fn parallel_failure_does_not_cancel_sibling_batches() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/sparql"))
        .and(query_param_contains("query", "COUNT"))
        .respond_with(ResponseTemplate::new(200).set_body_string("\"count\"\n\"5\"\n"))
        .with_priority(1)
        .mount(&server)
        .await;

    // The middle batch fails at the endpoint; its siblings keep running
    Mock::given(method("GET"))
        .and(path("/sparql"))
        .and(query_param_contains("query", "OFFSET 2"))
        .respond_with(ResponseTemplate::new(500))
        .with_priority(2)
        .mount(&server)
        .await;

    for (clause, body) in [
        ("OFFSET 0", "\"id\"\t\"taxon\"\n\"P1\"\t\"9606\"\n\"P2\"\t\"9606\"\n"),
        ("OFFSET 4", "\"id\"\t\"taxon\"\n\"P5\"\t\"9606\"\n"),
    ] {
        Mock::given(method("GET"))
            .and(path("/sparql"))
            .and(query_param_contains("query", clause))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&server)
            .await;
    }

    let store = Arc::new(MemoryStore::new());
    let catalog = vec![single_collection(
        "prot",
        FieldFlags {
            taxon: true,
            ..Default::default()
        },
    )];

    let context = UpdateContext::new(server.uri(), "testdb")
        .with_batch_size(2)
        .with_parallel(true);
    let scheduler = Scheduler::new(
        SparqlClient::new(server.uri()).unwrap(),
        store.clone(),
        context,
    );

    let report = scheduler.run(&catalog).await.unwrap();
    assert!(!report.is_success());
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.completed.len(), 2);
    assert_eq!(report.failures[0].offset, Some(2));

    // Work from successful siblings is durably applied
    assert_eq!(store.count("prot").await, 3);
}

#[tokio::test]
async fn serial_run_applies_the_hard_row_limit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sparql"))
        .and(query_param_contains("query", "LIMIT 1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("\"id\"\t\"taxon\"\n\"P1\"\t\"9606\"\n"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryStore::new());
    let catalog = vec![single_collection(
        "prot",
        FieldFlags {
            taxon: true,
            ..Default::default()
        },
    )];

    let context = UpdateContext::new(server.uri(), "testdb").with_limit(Some(1));
    let scheduler = Scheduler::new(
        SparqlClient::new(server.uri()).unwrap(),
        store.clone(),
        context,
    );

    let report = scheduler.run(&catalog).await.unwrap();
    assert!(report.is_success());
    assert_eq!(report.total_rows(), 1);
}
