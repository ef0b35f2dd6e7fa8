use std::sync::Arc;

use api_ingress::{ApiIngress, ApiIngressConfig};
use axum::{
    body::Body,
    extract::Path,
    http::{Request, StatusCode},
    Json, Router,
};
use modkit::api::{Missing, OperationBuilder};
use modkit::{ModuleRegistry, OpenApiRegistry, RestfulModule};
use serde::{Deserialize, Serialize};
use tower::util::ServiceExt;

#[derive(Serialize, Deserialize, utoipa::ToSchema)]
struct Thing {
    id: i32,
    name: String,
}

async fn list_things() -> Json<Vec<Thing>> {
    Json(vec![Thing {
        id: 1,
        name: "one".into(),
    }])
}

async fn get_thing(Path(id): Path<i32>) -> Json<Thing> {
    Json(Thing {
        id,
        name: "any".into(),
    })
}

struct Things;

impl RestfulModule for Things {
    fn register_rest(
        &self,
        router: Router,
        openapi: &dyn OpenApiRegistry,
    ) -> anyhow::Result<Router> {
        let router = OperationBuilder::<Missing, Missing, ()>::get("/api/thing")
            .operation_id("things.list")
            .summary("List things")
            .tag("Things")
            .handler(list_things)
            .json_array_response::<Thing>(openapi, 200, "All things")
            .register(router, openapi);

        let router = OperationBuilder::<Missing, Missing, ()>::get("/api/thing/{id}")
            .operation_id("things.get")
            .path_param_typed("id", "Thing id", "integer")
            .handler(get_thing)
            .json_response_with_schema::<Thing>(openapi, 200, "One thing")
            .problem_response(openapi, 404, "Not found")
            .register(router, openapi);

        // Same (method, path) again: only the first registration is documented.
        let shadow = OperationBuilder::<Missing, Missing, ()>::get("/api/thing")
            .summary("Shadowed")
            .json_response(200, "ignored");
        openapi.register_operation(shadow.spec());

        Ok(router)
    }
}

fn wired() -> (Arc<ApiIngress>, Router) {
    let host = Arc::new(ApiIngress::new(ApiIngressConfig::default()));
    let registry = ModuleRegistry::builder()
        .register_rest_host("api_ingress", host.clone())
        .register_rest("things", Arc::new(Things))
        .build()
        .unwrap();
    let router = registry.run_rest_phase(Router::new()).unwrap();
    (host, router)
}

async fn get_json(router: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let resp = router
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null))
}

#[tokio::test]
async fn health_is_served_with_request_id() {
    let (_, router) = wired();
    let resp = router
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("x-request-id"));

    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "healthy");
}

#[tokio::test]
async fn module_routes_are_mounted() {
    let (_, router) = wired();
    let (status, json) = get_json(router.clone(), "/api/thing/7").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["id"], 7);

    let (status, json) = get_json(router, "/api/thing").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn openapi_document_lists_registered_operations() {
    let (host, router) = wired();
    let (status, doc) = get_json(router, "/openapi.json").await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(doc["info"]["title"], "Skopei API");
    let list = &doc["paths"]["/api/thing"]["get"];
    assert_eq!(list["operationId"], "things.list");
    assert_eq!(list["summary"], "List things");
    assert_eq!(list["tags"][0], "Things");

    let one = &doc["paths"]["/api/thing/{id}"]["get"];
    assert_eq!(one["parameters"][0]["name"], "id");
    assert_eq!(one["parameters"][0]["schema"]["type"], "integer");
    assert!(one["responses"]["404"]["content"]
        .get("application/problem+json")
        .is_some());

    let schemas = &doc["components"]["schemas"];
    assert!(schemas.get("Thing").is_some());
    assert!(schemas.get("Problem").is_some());

    // Same document from the host directly
    let direct = serde_json::to_value(host.build_openapi()).unwrap();
    assert_eq!(direct["paths"], doc["paths"]);
}

#[tokio::test]
async fn unknown_route_is_404() {
    let (_, router) = wired();
    let (status, _) = get_json(router, "/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn server_starts_and_stops_on_cancel() {
    use modkit::StatefulModule;
    use tokio_util::sync::CancellationToken;

    let host = Arc::new(ApiIngress::new(ApiIngressConfig {
        bind_addr: "127.0.0.1:0".into(),
        ..Default::default()
    }));
    let registry = ModuleRegistry::builder()
        .register_rest_host("api_ingress", host.clone())
        .build()
        .unwrap();
    registry.run_rest_phase(Router::new()).unwrap();

    let cancel = CancellationToken::new();
    host.start(cancel.clone()).await.unwrap();
    let addr = host.local_addr().unwrap();
    assert_ne!(addr.port(), 0);

    let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    stream
        .write_all(b"GET /health HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .await
        .unwrap();
    let mut buf = Vec::new();
    stream.read_to_end(&mut buf).await.unwrap();
    let text = String::from_utf8_lossy(&buf);
    assert!(text.starts_with("HTTP/1.1 200"));

    cancel.cancel();
    host.stop(cancel).await.unwrap();
}

fn slow_router(request_timeout_sec: u64) -> Router {
    use modkit::RestHostModule;

    let host = ApiIngress::new(ApiIngressConfig {
        request_timeout_sec,
        ..Default::default()
    });
    let router = host.rest_prepare(Router::new()).unwrap().route(
        "/slow",
        axum::routing::get(|| async {
            tokio::time::sleep(std::time::Duration::from_secs(120)).await;
            "done"
        }),
    );
    host.rest_finalize(router).unwrap()
}

#[tokio::test(start_paused = true)]
async fn default_config_does_not_time_out_requests() {
    assert_eq!(ApiIngressConfig::default().request_timeout_sec, 0);

    let resp = slow_router(0)
        .oneshot(Request::builder().uri("/slow").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test(start_paused = true)]
async fn configured_timeout_cuts_slow_handlers() {
    let resp = slow_router(1)
        .oneshot(Request::builder().uri("/slow").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::REQUEST_TIMEOUT);
}
