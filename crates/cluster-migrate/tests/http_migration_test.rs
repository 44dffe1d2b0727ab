//! Migration over HTTP against mock admin APIs.

#![allow(clippy::pedantic)]

use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use cluster_migrate::{
    CollectionSpec, Endpoint, Error, MigrationConfig, MigrationOptions, Pipeline,
};

fn endpoint_of(server: &MockServer) -> Endpoint {
    let addr = server.address();
    Endpoint::new(addr.ip().to_string(), addr.port()).unwrap()
}

async fn mount_root(server: &MockServer, version: &str, plugins: Value) {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "version": version,
            "hostname": "gw-1",
            "plugins": {"available_on_server": plugins, "enabled_in_cluster": []},
        })))
        .expect(1)
        .mount(server)
        .await;
}

fn config_for(source: &MockServer, destination: &MockServer) -> MigrationConfig {
    MigrationConfig {
        source: Some(endpoint_of(source)),
        destination: Some(endpoint_of(destination)),
        options: MigrationOptions {
            timeout_ms: 2_000,
            ..Default::default()
        },
        collections: vec![CollectionSpec::new("/apis/")],
    }
}

#[tokio::test]
async fn test_three_apis_over_two_pages() {
    // Arrange
    let source = MockServer::start().await;
    let destination = MockServer::start().await;
    let plugins = json!({"acl": true, "cors": true});
    mount_root(&source, "0.10.3", plugins.clone()).await;
    mount_root(&destination, "0.10.3", plugins).await;

    Mock::given(method("GET"))
        .and(path("/apis/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": "a1", "name": "one"}, {"id": "a2", "name": "two"}],
            "total": 3,
            "next": format!("{}/apis/?offset=WyJhMiJd&size=2", source.uri()),
        })))
        .expect(1)
        .mount(&source)
        .await;
    Mock::given(method("GET"))
        .and(path("/apis/"))
        .and(query_param("offset", "WyJhMiJd"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": "a3", "name": "three"}],
            "total": 3,
        })))
        .with_priority(1)
        .expect(1)
        .mount(&source)
        .await;
    Mock::given(method("POST"))
        .and(path("/apis/"))
        .respond_with(ResponseTemplate::new(201))
        .expect(3)
        .mount(&destination)
        .await;

    // Act
    let stats = Pipeline::new(config_for(&source, &destination))
        .unwrap()
        .run()
        .await
        .unwrap();

    // Assert
    assert_eq!(stats.created, 3);
    assert_eq!(stats.pages, 2);

    let posted: Vec<String> = destination
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path() == "/apis/")
        .map(|r| {
            let body: Value = serde_json::from_slice(&r.body).unwrap();
            body["id"].as_str().unwrap().to_string()
        })
        .collect();
    assert_eq!(posted, vec!["a1", "a2", "a3"]);
}

#[tokio::test]
async fn test_conflict_on_destination_is_skipped() {
    let source = MockServer::start().await;
    let destination = MockServer::start().await;
    mount_root(&source, "0.10.3", json!(["acl"])).await;
    mount_root(&destination, "0.10.3", json!({"acl": true})).await;

    Mock::given(method("GET"))
        .and(path("/apis/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": "a1"}],
        })))
        .mount(&source)
        .await;
    Mock::given(method("POST"))
        .and(path("/apis/"))
        .respond_with(
            ResponseTemplate::new(409).set_body_json(json!({"name": "already exists with value 'a1'"})),
        )
        .expect(1)
        .mount(&destination)
        .await;

    let stats = Pipeline::new(config_for(&source, &destination))
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(stats.skipped, 1);
    assert_eq!(stats.created, 0);
}

#[tokio::test]
async fn test_plugin_mismatch_issues_no_migration_requests() {
    // Arrange
    let source = MockServer::start().await;
    let destination = MockServer::start().await;
    mount_root(&source, "0.10.3", json!({"acl": true, "cors": true, "jwt": true})).await;
    mount_root(&destination, "0.10.3", json!({"acl": true, "cors": true})).await;

    Mock::given(method("GET"))
        .and(path("/apis/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .expect(0)
        .mount(&source)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&destination)
        .await;

    // Act
    let result = Pipeline::new(config_for(&source, &destination))
        .unwrap()
        .run()
        .await;

    // Assert
    assert!(matches!(result, Err(Error::IncompatiblePlugins { .. })));
}

#[tokio::test]
async fn test_unreachable_destination_aborts_before_migration() {
    let source = MockServer::start().await;
    mount_root(&source, "0.10.3", json!({})).await;
    Mock::given(method("GET"))
        .and(path("/apis/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .expect(0)
        .mount(&source)
        .await;

    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let config = MigrationConfig {
        source: Some(endpoint_of(&source)),
        destination: Some(Endpoint::new("127.0.0.1", port).unwrap()),
        ..Default::default()
    };
    let result = Pipeline::new(config).unwrap().run().await;

    assert!(matches!(result, Err(Error::Transport { .. })));
}

#[tokio::test]
async fn test_root_error_status_aborts() {
    let source = MockServer::start().await;
    let destination = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&source)
        .await;

    let result = Pipeline::new(config_for(&source, &destination))
        .unwrap()
        .check()
        .await;

    assert!(matches!(
        result,
        Err(Error::UnexpectedStatus { status: 503, .. })
    ));
    assert!(destination.received_requests().await.unwrap().is_empty());
}
