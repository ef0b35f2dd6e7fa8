//! HTTP host: owns the axum router, the OpenAPI registry and the listener.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::{middleware::from_fn, routing::get, Router};
use dashmap::DashMap;
use modkit::api::{OpenApiRegistry, OperationSpec, SchemaCollection};
use modkit::{RestHostModule, StatefulModule};
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tower_http::{
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
};
use utoipa::openapi::{schema::Schema, RefOr};

mod config;
pub mod openapi;
pub mod request_id;
mod web;

pub use config::ApiIngressConfig;

/// Collects typed operation specs from every REST module and serves them,
/// together with `/health` and `/openapi.json`, on a single listener.
pub struct ApiIngress {
    config: ApiIngressConfig,
    // "METHOD path" -> spec; the first registration wins
    operation_specs: DashMap<String, OperationSpec>,
    components: DashMap<String, RefOr<Schema>>,
    final_router: Mutex<Option<Router>>,
    local_addr: Mutex<Option<SocketAddr>>,
    server: Mutex<Option<JoinHandle<()>>>,
}

impl Default for ApiIngress {
    fn default() -> Self {
        Self::new(ApiIngressConfig::default())
    }
}

impl ApiIngress {
    pub fn new(config: ApiIngressConfig) -> Self {
        Self {
            config,
            operation_specs: DashMap::new(),
            components: DashMap::new(),
            final_router: Mutex::new(None),
            local_addr: Mutex::new(None),
            server: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &ApiIngressConfig {
        &self.config
    }

    /// Address the listener is bound to, once `start` has run.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        *self.local_addr.lock()
    }

    /// The router assembled by `rest_finalize`, if the REST phase has run.
    pub fn router(&self) -> Option<Router> {
        self.final_router.lock().clone()
    }

    pub fn build_openapi(&self) -> utoipa::openapi::OpenApi {
        let specs: Vec<OperationSpec> = self
            .operation_specs
            .iter()
            .map(|e| e.value().clone())
            .collect();
        let components: BTreeMap<String, RefOr<Schema>> = self
            .components
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect();
        tracing::info!(
            operations = specs.len(),
            schemas = components.len(),
            "Building OpenAPI document"
        );
        openapi::build(&specs, &components)
    }

    /// Global middleware, outermost first:
    /// SetRequestId -> PropagateRequestId -> Trace -> push_req_id -> Timeout -> CORS -> BodyLimit.
    /// `Router::layer` wraps, so layers are applied innermost first.
    fn apply_middleware(&self, mut router: Router) -> Router {
        let x_request_id = request_id::header();

        router = router.layer(RequestBodyLimitLayer::new(self.config.body_limit_bytes));
        if self.config.cors_enabled {
            router = router.layer(CorsLayer::permissive());
        }
        if self.config.request_timeout_sec > 0 {
            router = router.layer(TimeoutLayer::new(Duration::from_secs(
                self.config.request_timeout_sec,
            )));
        }
        router = router.layer(from_fn(request_id::push_req_id_to_extensions));
        router = router.layer(request_id::create_trace_layer());
        router = router.layer(PropagateRequestIdLayer::new(x_request_id.clone()));
        router.layer(SetRequestIdLayer::new(x_request_id, request_id::MakeReqId))
    }
}

impl OpenApiRegistry for ApiIngress {
    fn register_operation(&self, spec: &OperationSpec) {
        let key = format!("{} {}", spec.method.as_str(), spec.path);
        match self.operation_specs.entry(key) {
            dashmap::mapref::entry::Entry::Occupied(e) => {
                tracing::error!(
                    operation = %e.key(),
                    "Duplicate operation registration ignored"
                );
            }
            dashmap::mapref::entry::Entry::Vacant(e) => {
                tracing::debug!(operation = %e.key(), handler_id = %spec.handler_id, "Registered operation");
                e.insert(spec.clone());
            }
        }
    }

    fn ensure_schema_raw(&self, name: &str, schemas: SchemaCollection) -> String {
        for (key, schema) in schemas {
            self.components.entry(key).or_insert(schema);
        }
        name.to_string()
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

impl RestHostModule for ApiIngress {
    fn rest_prepare(&self, router: Router) -> Result<Router> {
        Ok(router.route("/health", get(web::health_check)))
    }

    fn rest_finalize(&self, router: Router) -> Result<Router> {
        let doc = serde_json::to_value(self.build_openapi())?;
        let doc = Arc::new(doc);
        let router = router.route(
            "/openapi.json",
            get(move || web::openapi_json(doc.clone())),
        );
        let router = self.apply_middleware(router);
        *self.final_router.lock() = Some(router.clone());
        Ok(router)
    }

    fn as_registry(&self) -> &dyn OpenApiRegistry {
        self
    }
}

#[async_trait]
impl StatefulModule for ApiIngress {
    async fn start(&self, cancel: CancellationToken) -> Result<()> {
        let router = self
            .final_router
            .lock()
            .clone()
            .ok_or_else(|| anyhow::anyhow!("REST phase has not produced a router"))?;

        let listener = tokio::net::TcpListener::bind(&self.config.bind_addr)
            .await
            .map_err(|e| anyhow::anyhow!("failed to bind {}: {e}", self.config.bind_addr))?;
        let addr = listener.local_addr()?;
        *self.local_addr.lock() = Some(addr);
        tracing::info!(%addr, "HTTP server listening");

        let handle = tokio::spawn(async move {
            let shutdown = cancel.clone();
            if let Err(e) = axum::serve(listener, router)
                .with_graceful_shutdown(async move { shutdown.cancelled().await })
                .await
            {
                tracing::error!(error = %e, "HTTP server terminated with error");
                cancel.cancel();
            }
        });
        *self.server.lock() = Some(handle);
        Ok(())
    }

    async fn stop(&self, _cancel: CancellationToken) -> Result<()> {
        let handle = self.server.lock().take();
        if let Some(handle) = handle {
            handle.await?;
            tracing::info!("HTTP server stopped");
        }
        Ok(())
    }
}
