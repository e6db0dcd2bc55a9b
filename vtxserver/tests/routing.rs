use axum::body::{Body, to_bytes};
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::{Json, Router, routing::get};
use tower::ServiceExt;
use vtxserver::ServerBuilder;

#[derive(utoipa::OpenApi)]
#[openapi(paths(ping))]
struct PingApi;

#[utoipa::path(get, path = "/ping", responses((status = 200, description = "pong")))]
async fn ping() -> &'static str {
    "pong"
}

async fn get_json(router: Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let response = router
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), 1 << 20).await.unwrap();
    (status, body.to_vec())
}

#[tokio::test]
async fn json_route_is_mounted() {
    let mut server = ServerBuilder::new("Test", "localhost", 0).build();
    server
        .add_route("/info", || async { serde_json::json!({"version": "1.0.0"}) })
        .await;

    let (status, body) = get_json(server.router().await, "/info").await;
    assert_eq!(status, StatusCode::OK);
    let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(value["version"], "1.0.0");
}

#[tokio::test]
async fn handler_with_state() {
    async fn count(State(n): State<usize>) -> Json<usize> {
        Json(n)
    }

    let mut server = ServerBuilder::new("Test", "localhost", 0).build();
    server.add_handler_with_state("/count", count, 7usize).await;

    let (status, body) = get_json(server.router().await, "/count").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"7");
}

#[tokio::test]
async fn openapi_is_nested_and_documented() {
    use utoipa::OpenApi;

    let mut server = ServerBuilder::new("Test", "localhost", 0).build();
    let api = Router::new().route("/ping", get(ping));
    server.add_openapi(api, PingApi::openapi(), "demo").await;

    let router = server.router().await;
    let (status, body) = get_json(router.clone(), "/api/demo/ping").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"pong");

    let (status, body) = get_json(router, "/api-docs/demo.json").await;
    assert_eq!(status, StatusCode::OK);
    let doc: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert!(doc["paths"]["/ping"].is_object());
}

#[test]
fn info_reports_builder_values() {
    let server = ServerBuilder::new("Vortex", "music.local", 8123)
        .name("Renamed")
        .build();
    let info = server.info();
    assert_eq!(info.name, "Renamed");
    assert_eq!(info.base_url, "music.local");
    assert_eq!(info.http_port, 8123);
}
