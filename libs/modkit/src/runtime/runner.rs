//! ModKit runtime runner.
//!
//! Drives a [`ModuleRegistry`] through its phases:
//! db (migrations) → rest (router composition) → start → wait → stop.
//! Shutdown can be driven by OS signals, an external `CancellationToken`,
//! or an arbitrary future.

use crate::registry::ModuleRegistry;
use crate::runtime::shutdown;
use modkit_db::DbHandle;
use std::{future::Future, pin::Pin, sync::Arc};
use tokio_util::sync::CancellationToken;

/// How the runtime should provide a database to modules.
pub enum DbOptions {
    /// No database integration; the db phase is skipped.
    None,
    /// A connected handle; every `DbModule` migrates against it.
    Handle(Arc<DbHandle>),
}

/// How the runtime should decide when to stop.
pub enum ShutdownOptions {
    /// Listen for OS signals (Ctrl+C / SIGTERM).
    Signals,
    /// An external `CancellationToken` controls the lifecycle.
    Token(CancellationToken),
    /// An arbitrary future; when it completes, we initiate shutdown.
    Future(Pin<Box<dyn Future<Output = ()> + Send>>),
}

pub struct RunOptions {
    pub registry: ModuleRegistry,
    pub db: DbOptions,
    pub shutdown: ShutdownOptions,
}

/// Full cycle: db → rest (sync) → start → wait → stop.
pub async fn run(opts: RunOptions) -> anyhow::Result<()> {
    let RunOptions {
        registry,
        db,
        shutdown,
    } = opts;

    let cancel = match &shutdown {
        ShutdownOptions::Token(t) => t.clone(),
        _ => CancellationToken::new(),
    };

    match shutdown {
        ShutdownOptions::Signals => {
            let c = cancel.clone();
            tokio::spawn(async move {
                match shutdown::wait_for_shutdown().await {
                    Ok(()) => tracing::info!("shutdown: signal received"),
                    Err(e) => {
                        tracing::warn!(
                            error = %e,
                            "shutdown: primary waiter failed; falling back to ctrl_c()"
                        );
                        let _ = tokio::signal::ctrl_c().await;
                    }
                }
                c.cancel();
            });
        }
        ShutdownOptions::Future(waiter) => {
            let c = cancel.clone();
            tokio::spawn(async move {
                waiter.await;
                tracing::info!("shutdown: external future completed");
                c.cancel();
            });
        }
        ShutdownOptions::Token(_) => {
            tracing::info!("shutdown: external token will control lifecycle");
        }
    }

    if let DbOptions::Handle(ref handle) = db {
        tracing::info!(engine = ?handle.engine(), "Phase: db");
        registry.run_db_phase(handle).await?;
    }

    tracing::info!("Phase: rest (sync)");
    let _router = registry.run_rest_phase(axum::Router::new())?;

    tracing::info!("Phase: start");
    if let Err(e) = registry.run_start_phase(cancel.clone()).await {
        // Stop whatever already started before reporting the failure.
        cancel.cancel();
        registry.run_stop_phase(cancel).await;
        return Err(e.into());
    }

    cancel.cancelled().await;

    tracing::info!("Phase: stop");
    registry.run_stop_phase(cancel).await;

    if let DbOptions::Handle(handle) = db {
        match Arc::try_unwrap(handle) {
            Ok(handle) => handle.close().await,
            Err(_) => tracing::debug!("database handle still shared; leaving pool to drop"),
        }
    }
    Ok(())
}
