use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;

mod common;
use common::{setup_test_app, setup_users_db};

async fn get_json(uri: &str) -> (StatusCode, Value) {
    let db = setup_users_db().await.expect("Failed to setup test database");
    let app = setup_test_app(db);

    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_widget_query_string() {
    // draw=7&start=0&length=2&search[value]=jo&order[0][column]=1&order[0][dir]=desc
    // &columns[0][data]=id&columns[1][data]=name&columns[2][data]=email
    let uri = "/api/v1/users?draw=7&start=0&length=2\
        &search%5Bvalue%5D=jo\
        &order%5B0%5D%5Bcolumn%5D=1&order%5B0%5D%5Bdir%5D=desc\
        &columns%5B0%5D%5Bdata%5D=id&columns%5B0%5D%5Bsearchable%5D=true\
        &columns%5B1%5D%5Bdata%5D=name&columns%5B1%5D%5Borderable%5D=true\
        &columns%5B2%5D%5Bdata%5D=email&columns%5B2%5D%5Bsearch%5D%5Bvalue%5D=";

    let (status, body) = get_json(uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "draw": 7,
            "recordsTotal": 3,
            "recordsFiltered": 2,
            "data": [
                {"id": 1, "name": "john", "email": "john@example.com"},
                {"id": 3, "name": "joan", "email": "joan@example.com"}
            ]
        })
    );
}

#[tokio::test]
async fn test_positional_columns_render_arrays() {
    let uri = "/api/v1/users?draw=1&length=1\
        &columns%5B0%5D%5Bdata%5D=0&columns%5B1%5D%5Bdata%5D=1&columns%5B2%5D%5Bdata%5D=2";

    let (status, body) = get_json(uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([[1, "john", "john@example.com"]]));
}

#[tokio::test]
async fn test_empty_query_string_returns_all_rows() {
    let (status, body) = get_json("/api/v1/users").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["draw"], 0);
    assert_eq!(body["recordsTotal"], 3);
    assert_eq!(body["data"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_garbage_numbers_are_coerced() {
    let (status, body) = get_json("/api/v1/users?draw=2&start=xyz&length=abc").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["draw"], 2);
    assert_eq!(body["data"].as_array().unwrap().len(), 3);

    // A draw token that coerces to 0 disables paging.
    let (status, body) = get_json("/api/v1/users?draw=abc&length=1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["draw"], 0);
    assert_eq!(body["data"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_unrecognised_flag_keeps_default() {
    // columns[1][orderable]=yes, order[0][column]=1, order[0][dir]=desc
    let (status, body) = get_json(
        "/api/v1/users?draw=1\
        &columns%5B1%5D%5Borderable%5D=yes\
        &order%5B0%5D%5Bcolumn%5D=1&order%5B0%5D%5Bdir%5D=desc",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["john", "joan", "amy"]);
}

#[tokio::test]
async fn test_database_error_is_sanitized() {
    let (status, body) = get_json("/api/v1/broken?draw=1").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "A database error occurred"}));
}
