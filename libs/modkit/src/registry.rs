use axum::Router;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::contracts;

/// One module and the capabilities it registered.
pub struct ModuleEntry {
    pub name: &'static str,
    pub db: Option<Arc<dyn contracts::DbModule>>,
    pub rest: Option<Arc<dyn contracts::RestfulModule>>,
    pub rest_host: Option<Arc<dyn contracts::RestHostModule>>,
    pub stateful: Option<Arc<dyn contracts::StatefulModule>>,
}

impl std::fmt::Debug for ModuleEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleEntry")
            .field("name", &self.name)
            .field("has_db", &self.db.is_some())
            .field("has_rest", &self.rest.is_some())
            .field("is_rest_host", &self.rest_host.is_some())
            .field("has_stateful", &self.stateful.is_some())
            .finish()
    }
}

/// Modules in registration order; phases walk them front to back (stop: back to front).
pub struct ModuleRegistry {
    modules: Vec<ModuleEntry>,
}

impl std::fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&'static str> = self.modules.iter().map(|m| m.name).collect();
        f.debug_struct("ModuleRegistry")
            .field("modules", &names)
            .finish()
    }
}

impl ModuleRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    pub fn modules(&self) -> &[ModuleEntry] {
        &self.modules
    }

    // ---- Ordered phases: DB → REST (sync) → start → stop ----

    pub async fn run_db_phase(&self, db: &modkit_db::DbHandle) -> Result<(), RegistryError> {
        for e in &self.modules {
            if let Some(dbm) = &e.db {
                tracing::debug!(module = e.name, "running migrations");
                dbm.migrate(db)
                    .await
                    .map_err(|source| RegistryError::DbMigrate {
                        module: e.name,
                        source,
                    })?;
            }
        }
        Ok(())
    }

    pub fn run_rest_phase(&self, mut router: Router) -> Result<Router, RegistryError> {
        // The builder guarantees at most one host, and a host whenever REST modules exist.
        let Some((host_name, host)) = self
            .modules
            .iter()
            .find_map(|e| e.rest_host.as_ref().map(|h| (e.name, h)))
        else {
            return Ok(router);
        };

        let registry: &dyn contracts::OpenApiRegistry = host.as_registry();

        router = host
            .rest_prepare(router)
            .map_err(|source| RegistryError::RestPrepare {
                module: host_name,
                source,
            })?;

        for e in &self.modules {
            if let Some(rest) = &e.rest {
                router = rest.register_rest(router, registry).map_err(|source| {
                    RegistryError::RestRegister {
                        module: e.name,
                        source,
                    }
                })?;
            }
        }

        host.rest_finalize(router)
            .map_err(|source| RegistryError::RestFinalize {
                module: host_name,
                source,
            })
    }

    pub async fn run_start_phase(&self, cancel: CancellationToken) -> Result<(), RegistryError> {
        for e in &self.modules {
            if let Some(s) = &e.stateful {
                s.start(cancel.clone())
                    .await
                    .map_err(|source| RegistryError::Start {
                        module: e.name,
                        source,
                    })?;
            }
        }
        Ok(())
    }

    pub async fn run_stop_phase(&self, cancel: CancellationToken) {
        for e in self.modules.iter().rev() {
            if let Some(s) = &e.stateful {
                if let Err(err) = s.stop(cancel.clone()).await {
                    tracing::warn!(module = e.name, error = %err, "Failed to stop module");
                }
            }
        }
    }
}

/// Collects capabilities per module name; `build` validates the combination.
#[derive(Default)]
pub struct RegistryBuilder {
    order: Vec<&'static str>,
    db: HashMap<&'static str, Arc<dyn contracts::DbModule>>,
    rest: HashMap<&'static str, Arc<dyn contracts::RestfulModule>>,
    rest_host: HashMap<&'static str, Arc<dyn contracts::RestHostModule>>,
    stateful: HashMap<&'static str, Arc<dyn contracts::StatefulModule>>,
    errors: Vec<RegistryError>,
}

impl RegistryBuilder {
    fn note(&mut self, name: &'static str) {
        if !self.order.contains(&name) {
            self.order.push(name);
        }
    }

    fn insert<T: ?Sized>(
        map: &mut HashMap<&'static str, Arc<T>>,
        errors: &mut Vec<RegistryError>,
        name: &'static str,
        capability: &'static str,
        m: Arc<T>,
    ) {
        if map.insert(name, m).is_some() {
            errors.push(RegistryError::DuplicateCapability {
                module: name,
                capability,
            });
        }
    }

    pub fn register_db(mut self, name: &'static str, m: Arc<dyn contracts::DbModule>) -> Self {
        self.note(name);
        Self::insert(&mut self.db, &mut self.errors, name, "db", m);
        self
    }

    pub fn register_rest(
        mut self,
        name: &'static str,
        m: Arc<dyn contracts::RestfulModule>,
    ) -> Self {
        self.note(name);
        Self::insert(&mut self.rest, &mut self.errors, name, "rest", m);
        self
    }

    pub fn register_rest_host(
        mut self,
        name: &'static str,
        m: Arc<dyn contracts::RestHostModule>,
    ) -> Self {
        self.note(name);
        Self::insert(&mut self.rest_host, &mut self.errors, name, "rest_host", m);
        self
    }

    pub fn register_stateful(
        mut self,
        name: &'static str,
        m: Arc<dyn contracts::StatefulModule>,
    ) -> Self {
        self.note(name);
        Self::insert(&mut self.stateful, &mut self.errors, name, "stateful", m);
        self
    }

    pub fn build(mut self) -> Result<ModuleRegistry, RegistryError> {
        if let Some(err) = self.errors.into_iter().next() {
            return Err(err);
        }
        match self.rest_host.len() {
            0 if !self.rest.is_empty() => return Err(RegistryError::RestRequiresHost),
            0 | 1 => {}
            _ => return Err(RegistryError::MultipleRestHosts),
        }

        let modules = self
            .order
            .into_iter()
            .map(|name| ModuleEntry {
                name,
                db: self.db.remove(name),
                rest: self.rest.remove(name),
                rest_host: self.rest_host.remove(name),
                stateful: self.stateful.remove(name),
            })
            .collect();

        Ok(ModuleRegistry { modules })
    }
}

/// Structured errors for the module registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("module '{module}' registered capability '{capability}' twice")]
    DuplicateCapability {
        module: &'static str,
        capability: &'static str,
    },
    #[error("REST phase requires an ingress host: modules with capability 'rest' found, but no module with capability 'rest_host'")]
    RestRequiresHost,
    #[error("multiple 'rest_host' modules detected; exactly one is allowed")]
    MultipleRestHosts,

    #[error("DB migration failed for module '{module}'")]
    DbMigrate {
        module: &'static str,
        #[source]
        source: anyhow::Error,
    },
    #[error("REST prepare failed for host module '{module}'")]
    RestPrepare {
        module: &'static str,
        #[source]
        source: anyhow::Error,
    },
    #[error("REST registration failed for module '{module}'")]
    RestRegister {
        module: &'static str,
        #[source]
        source: anyhow::Error,
    },
    #[error("REST finalize failed for host module '{module}'")]
    RestFinalize {
        module: &'static str,
        #[source]
        source: anyhow::Error,
    },
    #[error("start failed for '{module}'")]
    Start {
        module: &'static str,
        #[source]
        source: anyhow::Error,
    },
}
