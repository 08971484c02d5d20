//! The HTTP include endpoint, exercised over a real listener.

use std::sync::Arc;

use foliate::{FixedContext, IncludeServer, Node, repository::Repository};

use crate::helpers::*;

async fn running_server(repo: Arc<foliate::repository::InMemory>) -> IncludeServer {
    let (materializer, _clock) = materializer(repo);
    let mut server = IncludeServer::new(
        Arc::new(materializer),
        Arc::new(FixedContext::new(breakpoints())),
    );
    server.start("127.0.0.1:0").await.unwrap();
    server
}

#[tokio::test(flavor = "multi_thread")]
async fn get_streams_the_materialized_tree_as_json() {
    let repo = repo_with_dialog(true);
    let server = running_server(repo.clone()).await;
    let url = format!(
        "http://{}/include{}",
        server.address().unwrap(),
        MOUNTED_SOURCE_PATH
    );

    let response = reqwest::get(&url).await.unwrap();
    assert!(response.status().is_success());
    let body: Node = response.json().await.unwrap();

    assert_eq!(body.name(), "tabs");
    assert!(body.has_child("tabsMobile"));
    assert!(body.has_child("tabsTablet"));
    assert!(body.has_child("tabsDesktop"));

    // The first request materialized the tree into the repository
    assert!(repo.exists(&path(TARGET_PATH)).unwrap());
}

#[tokio::test(flavor = "multi_thread")]
async fn missing_source_yields_an_empty_body() {
    let repo = repo_with_dialog(false);
    let server = running_server(repo).await;
    let url = format!(
        "http://{}/include/apps/dx/component/cq:dialog/nope",
        server.address().unwrap()
    );

    let response = reqwest::get(&url).await.unwrap();
    assert!(response.status().is_success());
    assert!(response.text().await.unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn persistence_failure_yields_an_empty_body_and_no_partial_tree() {
    let repo = repo_with_dialog(true);
    let server = running_server(repo.clone()).await;
    let url = format!(
        "http://{}/include{}",
        server.address().unwrap(),
        SOURCE_PATH
    );

    repo.fail_next_apply();
    let response = reqwest::get(&url).await.unwrap();
    assert!(response.status().is_success());
    assert!(response.text().await.unwrap().is_empty());
    assert!(!repo.exists(&path(TARGET_PATH)).unwrap());
}

#[tokio::test(flavor = "multi_thread")]
async fn the_endpoint_answers_get_only() {
    let repo = repo_with_dialog(false);
    let server = running_server(repo).await;
    let url = format!(
        "http://{}/include{}",
        server.address().unwrap(),
        SOURCE_PATH
    );

    let client = reqwest::Client::new();
    let response = client.post(&url).send().await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::METHOD_NOT_ALLOWED);
    let response = client.delete(&url).send().await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test(flavor = "multi_thread")]
async fn lifecycle_errors_are_typed() {
    let repo = repo_with_dialog(false);
    let mut server = running_server(repo).await;
    assert!(server.is_running());

    let err = server.start("127.0.0.1:0").await.unwrap_err();
    assert_eq!(err.module(), "serve");

    server.stop().await.unwrap();
    assert!(!server.is_running());
    assert!(server.address().is_err());
    assert!(server.stop().await.is_err());
}
