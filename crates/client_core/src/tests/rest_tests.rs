use super::*;
use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use tokio::{net::TcpListener, sync::Mutex};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Recorded {
    List,
    Search(HashMap<String, String>),
    Find(i64),
    Delete(i64),
}

#[derive(Clone, Default)]
struct ServerState {
    requests: Arc<Mutex<Vec<Recorded>>>,
    auth_headers: Arc<Mutex<Vec<String>>>,
}

impl ServerState {
    async fn record(&self, request: Recorded, headers: &HeaderMap) {
        self.requests.lock().await.push(request);
        if let Some(value) = headers
            .get("authorization")
            .and_then(|value| value.to_str().ok())
        {
            self.auth_headers.lock().await.push(value.to_string());
        }
    }
}

async fn handle_list(State(state): State<ServerState>, headers: HeaderMap) -> impl IntoResponse {
    state.record(Recorded::List, &headers).await;
    Json(vec![
        ProductCategory::new(1, "Shoes"),
        ProductCategory::new(2, "Hats"),
    ])
}

async fn handle_search(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    let term = params.get("query").cloned().unwrap_or_default();
    state.record(Recorded::Search(params), &headers).await;
    match term.as_str() {
        "empty" => (StatusCode::OK, String::new()),
        "null" => (StatusCode::OK, "null".to_string()),
        "boom" => (
            StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"title":"Internal Server Error","status":500,"detail":"index unavailable"}"#
                .to_string(),
        ),
        _ => (
            StatusCode::OK,
            serde_json::to_string(&vec![ProductCategory::new(1, "Shoes")]).expect("json"),
        ),
    }
}

async fn handle_find(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> axum::response::Response {
    state.record(Recorded::Find(id), &headers).await;
    if id == 1 {
        Json(ProductCategory::new(1, "Shoes")).into_response()
    } else {
        StatusCode::NOT_FOUND.into_response()
    }
}

async fn handle_delete(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> StatusCode {
    state.record(Recorded::Delete(id), &headers).await;
    if id == 1 {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::FORBIDDEN
    }
}

async fn spawn_category_server() -> anyhow::Result<(String, ServerState)> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let state = ServerState::default();
    let app = Router::new()
        .route(PRODUCT_CATEGORIES_PATH, get(handle_list))
        .route(PRODUCT_CATEGORIES_SEARCH_PATH, get(handle_search))
        .route(
            &format!("{PRODUCT_CATEGORIES_PATH}/:id"),
            get(handle_find).delete(handle_delete),
        )
        .with_state(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok((format!("http://{addr}/"), state))
}

#[tokio::test]
async fn query_fetches_unfiltered_collection() {
    let (server_url, state) = spawn_category_server().await.expect("spawn server");
    let client = ProductCategoryClient::new(server_url);

    let items = client.query().await.expect("query").expect("body");
    assert_eq!(items.len(), 2);
    assert_eq!(items[1].name, "Hats");
    assert_eq!(*state.requests.lock().await, vec![Recorded::List]);
}

#[tokio::test]
async fn search_sends_query_parameter() {
    let (server_url, state) = spawn_category_server().await.expect("spawn server");
    let client = ProductCategoryClient::new(server_url);

    let items = client
        .search(&SearchQuery::new("running shoes"))
        .await
        .expect("search")
        .expect("body");
    assert_eq!(items, vec![ProductCategory::new(1, "Shoes")]);

    let requests = state.requests.lock().await;
    let Recorded::Search(params) = &requests[0] else {
        panic!("unexpected request: {:?}", requests[0]);
    };
    assert_eq!(params.get("query").map(String::as_str), Some("running shoes"));
    assert_eq!(params.len(), 1);
}

#[tokio::test]
async fn missing_or_null_body_is_reported_as_none() {
    let (server_url, _state) = spawn_category_server().await.expect("spawn server");
    let client = ProductCategoryClient::new(server_url);

    assert_eq!(
        client.search(&SearchQuery::new("empty")).await.expect("empty"),
        None
    );
    assert_eq!(
        client.search(&SearchQuery::new("null")).await.expect("null"),
        None
    );
}

#[tokio::test]
async fn server_problem_is_surfaced_with_detail() {
    let (server_url, _state) = spawn_category_server().await.expect("spawn server");
    let client = ProductCategoryClient::new(server_url);

    let err = client
        .search(&SearchQuery::new("boom"))
        .await
        .expect_err("must fail");
    let api_error = err.downcast_ref::<ApiError>().expect("api error");
    assert_eq!(api_error.status, 500);
    assert_eq!(api_error.message, "Internal Server Error: index unavailable");
}

#[tokio::test]
async fn find_maps_not_found_to_none() {
    let (server_url, _state) = spawn_category_server().await.expect("spawn server");
    let client = ProductCategoryClient::new(server_url);

    let found = client.find(CategoryId(1)).await.expect("find");
    assert_eq!(found.map(|c| c.name), Some("Shoes".to_string()));
    assert_eq!(client.find(CategoryId(42)).await.expect("find missing"), None);
}

#[tokio::test]
async fn delete_attaches_bearer_token_and_reports_rejection() {
    let (server_url, state) = spawn_category_server().await.expect("spawn server");
    let client = ProductCategoryClient::new(server_url).with_auth_token("admin-jwt");

    client.delete(CategoryId(1)).await.expect("delete");
    let err = client.delete(CategoryId(2)).await.expect_err("forbidden");
    assert!(err.to_string().contains("403"), "unexpected error: {err}");

    assert_eq!(
        *state.requests.lock().await,
        vec![Recorded::Delete(1), Recorded::Delete(2)]
    );
    assert_eq!(
        *state.auth_headers.lock().await,
        vec!["Bearer admin-jwt".to_string(), "Bearer admin-jwt".to_string()]
    );
}

#[test]
fn whitespace_body_parses_as_absent() {
    let parsed: Option<Vec<ProductCategory>> = parse_optional_body(b" \n").expect("parse");
    assert_eq!(parsed, None);
    assert!(parse_optional_body::<Vec<ProductCategory>>(b"{oops").is_err());
}

#[test]
fn trailing_slash_is_trimmed_from_server_url() {
    let client = ProductCategoryClient::new("http://localhost:8080///");
    assert_eq!(client.server_url(), "http://localhost:8080");
}
