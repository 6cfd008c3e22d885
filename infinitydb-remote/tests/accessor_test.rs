//! Accessor requests against a mock InfinityDB server

use infinitydb_core::{Component, Item};
use infinitydb_json::{Key, Mapping, Tree};
use infinitydb_remote::{
    Accessor, AccessorConfig, Bound, QueryOptions, QueryResponse, RemoteError, RequestOptions,
};
use pretty_assertions::assert_eq;

const DB: &str = "demo/readonly";

fn accessor(server: &wiremock::MockServer) -> Accessor {
    let config = AccessorConfig::new(server.uri())
        .with_db(DB)
        .with_credentials("user", "pass");
    Accessor::from_config(&config).unwrap()
}

fn docs() -> Component {
    Component::entity_class("Docs").unwrap()
}

fn item(text: &str) -> Item {
    text.parse().unwrap()
}

// ===========================================================================
// Reads
// ===========================================================================

#[tokio::test]
async fn test_get_json_decodes_tree() {
    let server = wiremock::MockServer::start().await;
    wiremock::Mock::given(wiremock::matchers::method("GET"))
        .and(wiremock::matchers::path("/demo/readonly/Docs"))
        .and(wiremock::matchers::query_param("action", "as-json"))
        .and(wiremock::matchers::header("authorization", "Basic dXNlcjpwYXNz"))
        .respond_with(
            wiremock::ResponseTemplate::new(200)
                .set_body_string(r#"{"_Title": "Intro", "_pages": 12}"#),
        )
        .expect(1)
        .mount(&server)
        .await;

    let tree = accessor(&server)
        .get_json(&[docs()], &RequestOptions::new())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        tree.get(Component::entity_class("Title").unwrap()),
        Some(&Tree::from("Intro"))
    );
    assert_eq!(
        tree.get(Component::attribute("pages").unwrap()),
        Some(&Tree::from(12i64))
    );
}

#[tokio::test]
async fn test_no_content_is_none() {
    let server = wiremock::MockServer::start().await;
    wiremock::Mock::given(wiremock::matchers::method("GET"))
        .respond_with(wiremock::ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let accessor = accessor(&server);
    let options = RequestOptions::new();
    assert_eq!(accessor.get_json(&[docs()], &options).await.unwrap(), None);
    assert_eq!(accessor.get_items(&[docs()], &options).await.unwrap(), None);
    assert_eq!(accessor.get_blob(&[docs()], &options).await.unwrap(), None);
    assert!(!accessor.exists(&[docs()], &options).await.unwrap());
}

#[tokio::test]
async fn test_server_error_is_transport_failure() {
    let server = wiremock::MockServer::start().await;
    wiremock::Mock::given(wiremock::matchers::method("GET"))
        .respond_with(wiremock::ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let err = accessor(&server)
        .get_json(&[docs()], &RequestOptions::new())
        .await
        .unwrap_err();
    match err {
        RemoteError::TransportFailure { status, reason } => {
            assert_eq!(status, Some(500));
            assert_eq!(reason, "Internal Server Error");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_get_items_with_limit() {
    let server = wiremock::MockServer::start().await;
    wiremock::Mock::given(wiremock::matchers::method("GET"))
        .and(wiremock::matchers::query_param("action", "as-items"))
        .and(wiremock::matchers::query_param("limit", "2"))
        .respond_with(
            wiremock::ResponseTemplate::new(200).set_body_string("Docs \"a\" 1\nDocs \"b\" 2.5\n"),
        )
        .mount(&server)
        .await;

    let items = accessor(&server)
        .get_items(&[docs()], &RequestOptions::new().param("limit", 2i64))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(items, vec![item("Docs \"a\" 1"), item("Docs \"b\" 2.5")]);
}

#[tokio::test]
async fn test_get_blob_keeps_content_type() {
    let server = wiremock::MockServer::start().await;
    wiremock::Mock::given(wiremock::matchers::method("GET"))
        .and(wiremock::matchers::query_param("action", "get-blob"))
        .respond_with(
            wiremock::ResponseTemplate::new(200).set_body_raw(b"\x89PNG".to_vec(), "image/png"),
        )
        .mount(&server)
        .await;

    let blob = accessor(&server)
        .get_blob(&[docs()], &RequestOptions::new())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(blob.content_type.as_deref(), Some("image/png"));
    assert_eq!(blob.data, b"\x89PNG".to_vec());
}

#[tokio::test]
async fn test_head_and_per_call_database() {
    let server = wiremock::MockServer::start().await;
    wiremock::Mock::given(wiremock::matchers::method("HEAD"))
        .and(wiremock::matchers::path("/demo/readonly"))
        .respond_with(wiremock::ResponseTemplate::new(204))
        .mount(&server)
        .await;
    wiremock::Mock::given(wiremock::matchers::method("GET"))
        .and(wiremock::matchers::path("/other/db/Docs"))
        .respond_with(wiremock::ResponseTemplate::new(200).set_body_string("{}"))
        .expect(1)
        .mount(&server)
        .await;

    let accessor = accessor(&server);
    let status = accessor.head().await.unwrap();
    assert_eq!(status.status, 200);

    let tree = accessor
        .get_json(&[docs()], &RequestOptions::for_db("other/db"))
        .await
        .unwrap();
    assert_eq!(tree, Some(Tree::empty_map()));
}

#[tokio::test]
async fn test_missing_database_sends_nothing() {
    let server = wiremock::MockServer::start().await;
    wiremock::Mock::given(wiremock::matchers::any())
        .respond_with(wiremock::ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let accessor = Accessor::from_config(&AccessorConfig::new(server.uri())).unwrap();
    let err = accessor
        .get_json(&[docs()], &RequestOptions::new())
        .await
        .unwrap_err();
    assert!(matches!(err, RemoteError::MissingDatabase));
}

// ===========================================================================
// Writes
// ===========================================================================

#[tokio::test]
async fn test_put_json_sends_quoted_body() {
    let server = wiremock::MockServer::start().await;
    wiremock::Mock::given(wiremock::matchers::method("PUT"))
        .and(wiremock::matchers::path("/demo/readonly/Docs"))
        .and(wiremock::matchers::header("content-type", "application/json"))
        .and(wiremock::matchers::body_json(serde_json::json!({
            "_Title": "Intro",
            "_pages": 12,
            "_tag": "__hidden"
        })))
        .respond_with(wiremock::ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let mut map = Mapping::new();
    map.insert(Component::entity_class("Title").unwrap(), "Intro");
    map.insert(Component::attribute("pages").unwrap(), 12i64);
    map.insert(Component::attribute("tag").unwrap(), "_hidden");

    accessor(&server)
        .put_json(&[docs()], &Tree::Map(map), &RequestOptions::new())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_post_json_returns_components() {
    let server = wiremock::MockServer::start().await;
    wiremock::Mock::given(wiremock::matchers::method("POST"))
        .respond_with(wiremock::ResponseTemplate::new(200).set_body_string("Docs 7"))
        .mount(&server)
        .await;

    let components = accessor(&server)
        .post_json(&[docs()], &Tree::empty_map(), &RequestOptions::new())
        .await
        .unwrap();
    assert_eq!(components, Some(vec![docs(), Component::Int(7)]));
}

#[tokio::test]
async fn test_item_writes_and_commit() {
    let server = wiremock::MockServer::start().await;
    for action in ["insert-item", "delete-item", "delete-subspace"] {
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::query_param("action", action))
            .respond_with(wiremock::ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;
    }
    wiremock::Mock::given(wiremock::matchers::method("GET"))
        .and(wiremock::matchers::path("/demo/readonly"))
        .and(wiremock::matchers::query_param("action", "commit"))
        .and(wiremock::matchers::query_param("wait_for_durable", "true"))
        .and(wiremock::matchers::header("content-type", "application/infinitydb"))
        .respond_with(wiremock::ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let mut accessor = accessor(&server);
    let options = RequestOptions::new();
    let target = item("Docs \"a\" 1");
    accessor.insert_item(&target, &options).await.unwrap();
    accessor.delete_item(&target, &options).await.unwrap();
    accessor.delete_subspace(&item("Docs"), &options).await.unwrap();
    accessor.commit(&options).await.unwrap();
}

// ===========================================================================
// Moves and the next buffer
// ===========================================================================

#[tokio::test]
async fn test_single_step_moves() {
    let server = wiremock::MockServer::start().await;
    wiremock::Mock::given(wiremock::matchers::method("GET"))
        .and(wiremock::matchers::query_param("action", "first-tuple"))
        .respond_with(wiremock::ResponseTemplate::new(200).set_body_string("Docs \"a\""))
        .mount(&server)
        .await;
    wiremock::Mock::given(wiremock::matchers::method("GET"))
        .and(wiremock::matchers::query_param("action", "previous-component"))
        .respond_with(wiremock::ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let accessor = accessor(&server);
    let options = RequestOptions::new();
    assert_eq!(
        accessor.first(Bound::Tuple, &[docs()], &options).await.unwrap(),
        Some(item("Docs \"a\""))
    );
    assert_eq!(
        accessor
            .previous(Bound::Component, &[docs()], &options)
            .await
            .unwrap(),
        None
    );
}

#[tokio::test]
async fn test_buffered_next_reads_one_batch() {
    let server = wiremock::MockServer::start().await;
    wiremock::Mock::given(wiremock::matchers::method("GET"))
        .and(wiremock::matchers::query_param("action", "next-item"))
        .respond_with(wiremock::ResponseTemplate::new(200).set_body_string("Docs \"b\""))
        .expect(1)
        .mount(&server)
        .await;
    wiremock::Mock::given(wiremock::matchers::method("GET"))
        .and(wiremock::matchers::query_param("action", "as-items-batch"))
        .and(wiremock::matchers::query_param("limit", "1000"))
        .respond_with(
            wiremock::ResponseTemplate::new(200).set_body_string("Docs \"b\"\nDocs \"c\"\n"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut accessor = accessor(&server);
    let b = accessor.next_item(&item("Docs \"a\"")).await.unwrap();
    assert_eq!(b, Some(item("Docs \"b\"")));

    // answered from the batch
    let c = accessor.next_item(&item("Docs \"b\"")).await.unwrap();
    assert_eq!(c, Some(item("Docs \"c\"")));

    // the short batch ran to the end of the database
    assert_eq!(accessor.next_item(&item("Docs \"c\"")).await.unwrap(), None);
    assert_eq!(accessor.next_buffer().len(), 2);
}

#[tokio::test]
async fn test_writes_flush_the_next_buffer() {
    let server = wiremock::MockServer::start().await;
    // before the write
    wiremock::Mock::given(wiremock::matchers::method("GET"))
        .and(wiremock::matchers::query_param("action", "next-item"))
        .respond_with(wiremock::ResponseTemplate::new(200).set_body_string("Docs \"b\""))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    wiremock::Mock::given(wiremock::matchers::method("GET"))
        .and(wiremock::matchers::query_param("action", "as-items-batch"))
        .respond_with(
            wiremock::ResponseTemplate::new(200).set_body_string("Docs \"b\"\nDocs \"c\"\n"),
        )
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    // after the write
    wiremock::Mock::given(wiremock::matchers::method("GET"))
        .and(wiremock::matchers::query_param("action", "next-item"))
        .respond_with(wiremock::ResponseTemplate::new(200).set_body_string("Docs \"bb\""))
        .expect(2)
        .mount(&server)
        .await;
    wiremock::Mock::given(wiremock::matchers::method("GET"))
        .and(wiremock::matchers::query_param("action", "as-items-batch"))
        .respond_with(
            wiremock::ResponseTemplate::new(200)
                .set_body_string("Docs \"bb\"\nDocs \"c\"\n"),
        )
        .expect(2)
        .mount(&server)
        .await;
    wiremock::Mock::given(wiremock::matchers::method("PUT"))
        .respond_with(wiremock::ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    wiremock::Mock::given(wiremock::matchers::method("GET"))
        .and(wiremock::matchers::query_param("action", "commit"))
        .respond_with(wiremock::ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let mut accessor = accessor(&server);
    let options = RequestOptions::new();
    assert_eq!(
        accessor.next_item(&item("Docs \"a\"")).await.unwrap(),
        Some(item("Docs \"b\""))
    );
    assert_eq!(
        accessor.next_item(&item("Docs \"b\"")).await.unwrap(),
        Some(item("Docs \"c\""))
    );
    assert_eq!(accessor.next_buffer().len(), 2);

    // a failed write still drops the batch
    let mut added = Mapping::new();
    added.insert(Component::from("bb"), Tree::null());
    let err = accessor
        .put_json(&[docs()], &Tree::Map(added), &options)
        .await
        .unwrap_err();
    assert!(matches!(err, RemoteError::TransportFailure { status: Some(500), .. }));
    assert_eq!(accessor.next_buffer().len(), 0);

    assert_eq!(
        accessor.next_item(&item("Docs \"b\"")).await.unwrap(),
        Some(item("Docs \"bb\""))
    );

    accessor.commit(&options).await.unwrap();
    assert_eq!(accessor.next_buffer().len(), 0);
    assert_eq!(
        accessor.next_item(&item("Docs \"b\"")).await.unwrap(),
        Some(item("Docs \"bb\""))
    );
}

#[tokio::test]
async fn test_set_next_buffer_controls_batch_size() {
    let server = wiremock::MockServer::start().await;
    wiremock::Mock::given(wiremock::matchers::method("GET"))
        .and(wiremock::matchers::query_param("action", "next-component"))
        .respond_with(wiremock::ResponseTemplate::new(200).set_body_string("Docs \"b\""))
        .mount(&server)
        .await;
    wiremock::Mock::given(wiremock::matchers::method("GET"))
        .and(wiremock::matchers::query_param("action", "as-items-batch"))
        .and(wiremock::matchers::query_param("limit", "1"))
        .respond_with(wiremock::ResponseTemplate::new(200).set_body_string("Docs \"b\" 1\n"))
        .expect(1)
        .mount(&server)
        .await;

    let mut accessor = accessor(&server);
    accessor.set_next_buffer(true, 1);
    let next = accessor.next_component(&item("Docs \"a\"")).await.unwrap();
    assert_eq!(next, Some(item("Docs \"b\"")));
}

// ===========================================================================
// Queries
// ===========================================================================

#[tokio::test]
async fn test_execute_query_round_trip() {
    let server = wiremock::MockServer::start().await;
    wiremock::Mock::given(wiremock::matchers::method("POST"))
        .and(wiremock::matchers::path("/demo/readonly/Docs/%22search%22"))
        .and(wiremock::matchers::query_param("action", "execute-query"))
        .and(wiremock::matchers::query_param("query-parameter", r#"{"_Limit":5}"#))
        .and(wiremock::matchers::body_json(serde_json::json!({"term": {"x": null}})))
        .respond_with(
            wiremock::ResponseTemplate::new(200)
                .set_body_string(r#"{"_Hits": {"a": {"b": null}}}"#),
        )
        .expect(1)
        .mount(&server)
        .await;

    let request = Tree::Map(Mapping::single(
        Key::Tuple(vec![Component::from("term"), Component::from("x")]),
        Tree::null(),
    ));
    let query = QueryOptions {
        request_parameter: Some(Tree::Map(Mapping::single(
            Component::entity_class("Limit").unwrap(),
            5i64,
        ))),
        ..QueryOptions::default()
    };
    let response = accessor(&server)
        .execute_query(
            &[docs(), Component::from("search")],
            request,
            &query,
            &RequestOptions::new(),
        )
        .await
        .unwrap();

    let hits = Component::entity_class("Hits").unwrap();
    let expected = Tree::Map(Mapping::single(
        hits,
        Mapping::single(
            Key::Tuple(vec![Component::from("a"), Component::from("b")]),
            Tree::null(),
        ),
    ));
    assert_eq!(response, Some(QueryResponse::Tree(expected)));
}
