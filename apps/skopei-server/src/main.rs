use anyhow::{anyhow, Context, Result};
use api_ingress::{ApiIngress, ApiIngressConfig};
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use modkit::runtime::{run, DbOptions, RunOptions, ShutdownOptions};
use modkit::ModuleRegistry;
use modkit_db::{absolutize_sqlite_dsn, redact_credentials_in_dsn, ConnectOpts, DbHandle};
use products::ProductsModule;
use runtime::{AppConfig, CliArgs, DatabaseConfig};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use url::Url;
use users::UsersModule;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Skopei Server - CRUD backend for users and products
#[derive(Parser)]
#[command(name = "skopei-server")]
#[command(about = "Skopei Server - CRUD backend for users and products")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Use an in-memory SQLite database
    #[arg(long)]
    mock: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Check configuration
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        port: cli.port,
        print_config: cli.print_config,
        verbose: cli.verbose,
        mock: cli.mock,
    };

    // home_dir comes back absolute and already created
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);

    let logging_config = config.logging.clone().unwrap_or_default();
    runtime::logging::init_logging_from_config(&logging_config, Path::new(&config.server.home_dir));
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Skopei Server starting");

    if args.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config).await,
        Commands::Check => check_config(config),
    }
}

/// Reject DSNs whose scheme no compiled-in driver understands.
fn detect_from_dsn(cfg: &DatabaseConfig) -> Result<&'static str> {
    let raw = cfg.url.trim();
    if raw.is_empty() {
        return Err(anyhow!("Database URL not configured"));
    }

    let url = Url::parse(raw)
        .map_err(|e| anyhow!("Invalid database DSN '{}': {}", redact_credentials_in_dsn(raw), e))?;

    match url.scheme() {
        "sqlite" => Ok("sqlite"),
        "postgres" | "postgresql" => Ok("postgres"),
        "mysql" | "mariadb" => Ok("mysql"),
        other => Err(anyhow!("Unsupported database type: {}", other)),
    }
}

fn ingress_config(config: &AppConfig) -> Result<ApiIngressConfig> {
    let mut cfg: ApiIngressConfig = config.module_config("api_ingress")?;
    cfg.bind_addr = config.bind_addr();
    cfg.request_timeout_sec = config.server.timeout_sec;
    Ok(cfg)
}

async fn connect_db(db_config: &DatabaseConfig, base_dir: &Path) -> Result<DbHandle> {
    let backend = detect_from_dsn(db_config)?;

    // Relative SQLite paths resolve against home_dir, not the cwd
    let dsn = absolutize_sqlite_dsn(db_config.url.trim(), base_dir)?;

    let connect_opts = ConnectOpts {
        max_conns: db_config.max_conns,
        acquire_timeout: Some(Duration::from_secs(5)),
        sqlite_busy_timeout: db_config
            .busy_timeout_ms
            .map(|ms| Duration::from_millis(u64::from(ms))),
        create_sqlite_dirs: true,
    };

    tracing::info!(backend, dsn = %redact_credentials_in_dsn(&dsn), "Connecting to database");
    let db = DbHandle::connect(&dsn, connect_opts)
        .await
        .with_context(|| format!("failed to connect to {}", redact_credentials_in_dsn(&dsn)))?;
    tracing::info!(engine = ?db.engine(), "Connected to database");
    Ok(db)
}

async fn run_server(config: AppConfig) -> Result<()> {
    tracing::info!("Initializing modules...");

    let db_config = config
        .database
        .as_ref()
        .ok_or_else(|| anyhow!("Database URL not configured"))?;
    let db = connect_db(db_config, Path::new(&config.server.home_dir)).await?;

    let ingress = Arc::new(ApiIngress::new(ingress_config(&config)?));
    let users = Arc::new(UsersModule::new(db.sea()));
    let products = Arc::new(ProductsModule::new(db.sea()));

    let registry = ModuleRegistry::builder()
        .register_rest_host("api_ingress", ingress.clone())
        .register_stateful("api_ingress", ingress)
        .register_db("users", users.clone())
        .register_rest("users", users)
        .register_db("products", products.clone())
        .register_rest("products", products)
        .build()?;

    run(RunOptions {
        registry,
        db: DbOptions::Handle(Arc::new(db)),
        shutdown: ShutdownOptions::Signals,
    })
    .await
}

fn check_config(config: AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");

    if let Some(db_config) = &config.database {
        detect_from_dsn(db_config)?;
    }
    ingress_config(&config)?;

    tracing::info!("Configuration is valid");
    println!("Configuration check passed");
    println!("Server config:");
    println!("{}", config.to_yaml()?);

    Ok(())
}
