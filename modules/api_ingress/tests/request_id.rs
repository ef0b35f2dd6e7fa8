//! Request ids through the host's own middleware stack.

use api_ingress::request_id::XRequestId;
use api_ingress::{ApiIngress, ApiIngressConfig};
use axum::{
    body::Body,
    extract::Extension,
    http::{Request, StatusCode},
    routing::get,
    Router,
};
use modkit::RestHostModule;
use tower::util::ServiceExt;
use tracing_test::traced_test;

async fn echo_request_id(Extension(XRequestId(id)): Extension<XRequestId>) -> String {
    id
}

/// prepare -> module route -> finalize, the same sequence the REST phase runs.
fn hosted_router() -> Router {
    let host = ApiIngress::new(ApiIngressConfig::default());
    let router = host
        .rest_prepare(Router::new())
        .unwrap()
        .route("/echo", get(echo_request_id));
    host.rest_finalize(router).unwrap()
}

struct Echo {
    status: StatusCode,
    header: Option<String>,
    body: String,
}

async fn send(router: Router, uri: &str, request_id: Option<&str>) -> Echo {
    let mut req = Request::builder().uri(uri);
    if let Some(id) = request_id {
        req = req.header("x-request-id", id);
    }
    let resp = router
        .oneshot(req.body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = resp.status();
    let header = resp
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    Echo {
        status,
        header,
        body: String::from_utf8_lossy(&bytes).into_owned(),
    }
}

#[tokio::test]
async fn missing_id_is_generated_and_seen_by_the_handler() {
    let echo = send(hosted_router(), "/echo", None).await;

    assert_eq!(echo.status, StatusCode::OK);
    let header = echo.header.expect("x-request-id should be generated");
    assert_eq!(header.len(), 21, "nanoid default length");
    assert_eq!(echo.body, header);
}

#[tokio::test]
async fn incoming_id_is_kept_end_to_end() {
    let echo = send(hosted_router(), "/echo", Some("abc-123")).await;

    assert_eq!(echo.status, StatusCode::OK);
    assert_eq!(echo.header.as_deref(), Some("abc-123"));
    assert_eq!(echo.body, "abc-123");
}

#[tokio::test]
async fn each_request_gets_its_own_id() {
    let router = hosted_router();
    let first = send(router.clone(), "/echo", None).await;
    let second = send(router, "/echo", None).await;
    assert_ne!(first.header, second.header);
}

#[tokio::test]
async fn host_routes_and_fallback_carry_the_id() {
    let health = send(hosted_router(), "/health", Some("health-1")).await;
    assert_eq!(health.status, StatusCode::OK);
    assert_eq!(health.header.as_deref(), Some("health-1"));

    let missing = send(hosted_router(), "/nope", Some("nf-1")).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.header.as_deref(), Some("nf-1"));
}

#[traced_test]
#[tokio::test]
async fn request_runs_inside_http_request_span() {
    let echo = send(hosted_router(), "/echo", Some("span-42")).await;
    assert_eq!(echo.status, StatusCode::OK);

    assert!(logs_contain("http_request"));
    assert!(logs_contain("request_id=span-42"));
    assert!(logs_contain("uri=/echo"));
    assert!(logs_contain("request completed"));
    assert!(logs_contain("status=200"));
}
