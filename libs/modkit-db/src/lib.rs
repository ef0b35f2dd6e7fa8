#![cfg_attr(
    not(any(feature = "pg", feature = "mysql", feature = "sqlite")),
    allow(unused_imports, unused_variables, dead_code, unreachable_code)
)]

//! Database handle shared by the resource modules.
//!
//! A [`DbHandle`] owns one sqlx pool for the engine named by the connection
//! string and exposes it to the modules as a SeaORM [`DatabaseConnection`].
//!
//! # Features
//! - `pg`, `mysql`, `sqlite`: enable SQLx backends
//!
//! # Example
//! ```rust,no_run
//! #[tokio::main]
//! async fn main() -> modkit_db::Result<()> {
//!     use modkit_db::{DbHandle, ConnectOpts};
//!
//!     let db = DbHandle::connect("sqlite::memory:", ConnectOpts::default()).await?;
//!     let conn = db.sea();
//!     # drop(conn);
//!     db.close().await;
//!     Ok(())
//! }
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

#[cfg(feature = "mysql")]
use sqlx::mysql::MySqlPoolOptions;
#[cfg(feature = "pg")]
use sqlx::postgres::PgPoolOptions;
#[cfg(feature = "sqlite")]
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use sea_orm::DatabaseConnection;
#[cfg(feature = "mysql")]
use sea_orm::SqlxMySqlConnector;
#[cfg(feature = "pg")]
use sea_orm::SqlxPostgresConnector;
#[cfg(feature = "sqlite")]
use sea_orm::SqlxSqliteConnector;

use thiserror::Error;

/// Library-local result type.
pub type Result<T> = std::result::Result<T, DbError>;

/// Typed error for the DB handle and helpers.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("Unknown DSN: {0}")]
    UnknownDsn(String),

    #[error("Invalid DSN '{dsn}': {reason}")]
    InvalidDsn { dsn: String, reason: String },

    #[error("Feature not enabled: {0}")]
    FeatureDisabled(&'static str),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Supported engines.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DbEngine {
    Postgres,
    MySql,
    Sqlite,
}

/// Pool options; each driver applies the subset it supports.
#[derive(Clone, Debug)]
pub struct ConnectOpts {
    /// Maximum number of connections in the pool.
    pub max_conns: Option<u32>,
    /// Timeout to acquire a connection from the pool.
    pub acquire_timeout: Option<Duration>,
    /// SQLite-specific: busy timeout applied to every connection.
    pub sqlite_busy_timeout: Option<Duration>,
    /// For SQLite file DSNs, create parent directories if missing.
    pub create_sqlite_dirs: bool,
}

impl Default for ConnectOpts {
    fn default() -> Self {
        Self {
            max_conns: Some(10),
            acquire_timeout: Some(Duration::from_secs(30)),
            sqlite_busy_timeout: Some(Duration::from_millis(5_000)),
            create_sqlite_dirs: true,
        }
    }
}

/// Main handle.
#[derive(Debug)]
pub struct DbHandle {
    engine: DbEngine,
    dsn: String,
    sea: DatabaseConnection,
}

impl DbHandle {
    /// Detect engine by DSN scheme.
    pub fn detect(dsn: &str) -> Result<DbEngine> {
        let s = dsn.trim_start();
        if s.starts_with("postgres://") || s.starts_with("postgresql://") {
            Ok(DbEngine::Postgres)
        } else if s.starts_with("mysql://") || s.starts_with("mariadb://") {
            Ok(DbEngine::MySql)
        } else if s.starts_with("sqlite:") {
            Ok(DbEngine::Sqlite)
        } else {
            Err(DbError::UnknownDsn(redact_credentials_in_dsn(dsn)))
        }
    }

    /// Connect and build handle.
    pub async fn connect(dsn: &str, opts: ConnectOpts) -> Result<Self> {
        let engine = Self::detect(dsn)?;
        tracing::debug!(?engine, dsn = %redact_credentials_in_dsn(dsn), "opening database pool");

        let sea = match engine {
            #[cfg(feature = "pg")]
            DbEngine::Postgres => {
                let mut o = PgPoolOptions::new();
                if let Some(n) = opts.max_conns {
                    o = o.max_connections(n);
                }
                if let Some(t) = opts.acquire_timeout {
                    o = o.acquire_timeout(t);
                }
                let pool = o.connect(dsn).await?;
                SqlxPostgresConnector::from_sqlx_postgres_pool(pool)
            }
            #[cfg(feature = "mysql")]
            DbEngine::MySql => {
                let mut o = MySqlPoolOptions::new();
                if let Some(n) = opts.max_conns {
                    o = o.max_connections(n);
                }
                if let Some(t) = opts.acquire_timeout {
                    o = o.acquire_timeout(t);
                }
                let pool = o.connect(dsn).await?;
                SqlxMySqlConnector::from_sqlx_mysql_pool(pool)
            }
            #[cfg(feature = "sqlite")]
            DbEngine::Sqlite => {
                use std::str::FromStr;

                if opts.create_sqlite_dirs {
                    create_sqlite_parent_dir(dsn)?;
                }

                let mut co = SqliteConnectOptions::from_str(dsn)?.create_if_missing(true);
                if let Some(t) = opts.sqlite_busy_timeout {
                    co = co.busy_timeout(t);
                }

                let mut o = SqlitePoolOptions::new();
                if let Some(t) = opts.acquire_timeout {
                    o = o.acquire_timeout(t);
                }
                if is_sqlite_memory(dsn) {
                    // Every connection to `:memory:` opens its own database, so the
                    // pool must keep exactly one connection alive for its lifetime.
                    o = o
                        .max_connections(1)
                        .min_connections(1)
                        .idle_timeout(None)
                        .max_lifetime(None);
                } else if let Some(n) = opts.max_conns {
                    o = o.max_connections(n);
                }
                let pool = o.connect_with(co).await?;
                SqlxSqliteConnector::from_sqlx_sqlite_pool(pool)
            }
            #[cfg(not(feature = "pg"))]
            DbEngine::Postgres => return Err(DbError::FeatureDisabled("PostgreSQL feature not enabled")),
            #[cfg(not(feature = "mysql"))]
            DbEngine::MySql => return Err(DbError::FeatureDisabled("MySQL feature not enabled")),
            #[cfg(not(feature = "sqlite"))]
            DbEngine::Sqlite => return Err(DbError::FeatureDisabled("SQLite feature not enabled")),
        };

        Ok(Self {
            engine,
            dsn: dsn.to_string(),
            sea,
        })
    }

    /// Graceful pool close.
    pub async fn close(self) {
        if let Err(e) = self.sea.close().await {
            tracing::warn!(error = %e, "failed to close database pool");
        }
    }

    /// Get the backend.
    pub fn engine(&self) -> DbEngine {
        self.engine
    }

    /// Get the DSN used for this connection.
    pub fn dsn(&self) -> &str {
        &self.dsn
    }

    /// Get SeaORM connection (clone; cheap handle over the shared pool).
    pub fn sea(&self) -> DatabaseConnection {
        self.sea.clone()
    }

    /// Borrow the SeaORM connection.
    pub fn seaorm(&self) -> &DatabaseConnection {
        &self.sea
    }
}

// ===================== helpers =====================

fn is_sqlite_memory(dsn: &str) -> bool {
    dsn.contains(":memory:") || dsn.contains("mode=memory")
}

/// Expand a sqlite DSN into an absolute-path DSN using a base directory.
/// - Keeps in-memory DSNs as `sqlite::memory:`.
/// - Normalizes backslashes into forward slashes.
/// - Non-sqlite DSNs are returned untouched.
pub fn absolutize_sqlite_dsn(dsn: &str, base_dir: &Path) -> Result<String> {
    let trimmed = dsn.trim();
    if !trimmed.starts_with("sqlite:") {
        return Ok(trimmed.to_string());
    }
    if is_sqlite_memory(trimmed) {
        return Ok("sqlite::memory:".to_string());
    }

    let db_path = trimmed
        .strip_prefix("sqlite://")
        .or_else(|| trimmed.strip_prefix("sqlite:"))
        .unwrap_or(trimmed);

    let (path_str, query) = match db_path.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (db_path, None),
    };

    let mut p = PathBuf::from(path_str);
    if p.as_os_str().is_empty() {
        return Err(DbError::InvalidDsn {
            dsn: dsn.to_string(),
            reason: "empty SQLite path".to_string(),
        });
    }
    if p.is_relative() {
        p = base_dir.join(p);
    }

    let mut out = String::from("sqlite://");
    out.push_str(&p.to_string_lossy().replace('\\', "/"));
    if let Some(q) = query {
        out.push('?');
        out.push_str(q);
    }
    Ok(out)
}

fn create_sqlite_parent_dir(dsn: &str) -> Result<()> {
    if is_sqlite_memory(dsn) {
        return Ok(());
    }
    let raw = dsn
        .strip_prefix("sqlite://")
        .or_else(|| dsn.strip_prefix("sqlite:"))
        .unwrap_or(dsn);
    let path = raw.split_once('?').map(|(p, _)| p).unwrap_or(raw);
    if path.starts_with("file:") {
        return Ok(());
    }
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Mask the password part of a DSN for logging.
pub fn redact_credentials_in_dsn(dsn: &str) -> String {
    if !dsn.contains('@') {
        return dsn.to_string();
    }
    match url::Url::parse(dsn) {
        Ok(mut parsed) => {
            if parsed.password().is_some() {
                let _ = parsed.set_password(Some("***"));
            }
            parsed.to_string()
        }
        Err(_) => "***".to_string(),
    }
}
