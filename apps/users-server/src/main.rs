use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use runtime::{redact_credentials_in_dsn, AppConfig, CliArgs, DatabaseConfig};
use std::path::{Path, PathBuf};
use users::infra::storage::pool::{self, Backend, PoolSettings};
use users::Users;

mod ingress;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Users Server - CRUD HTTP service for user records
#[derive(Parser)]
#[command(name = "users-server")]
#[command(about = "Users Server - CRUD HTTP service for user records")]
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
    };

    // Load configuration (normalized home_dir is applied inside)
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    let logging_config = config.logging.clone().unwrap_or_default();
    runtime::logging::init_logging_from_config(&logging_config, Path::new(&config.server.home_dir));
    tracing::info!("Users Server starting");

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config).await,
        Commands::Check => check_config(config),
    }
}

fn pool_settings(db: &DatabaseConfig) -> PoolSettings {
    let defaults = PoolSettings::default();
    PoolSettings {
        max_conns: db.max_conns.unwrap_or(defaults.max_conns),
        acquire_timeout: db.acquire_timeout.unwrap_or(defaults.acquire_timeout),
    }
}

async fn run_server(config: AppConfig) -> Result<()> {
    let backend = Backend::detect(&config.database.url)?;
    tracing::info!(
        "Using {:?} database: {}",
        backend,
        redact_credentials_in_dsn(&config.database.url)
    );

    let pool = pool::connect_lazy(&config.database.url, &pool_settings(&config.database))?;
    let users = Users::from_pool(pool.clone(), backend);
    let router = ingress::build_router(&users, config.server.timeout_sec);

    let served = ingress::serve(router, &config.server.host, config.server.port).await;
    pool.close().await;
    tracing::info!("Users Server stopped");
    served
}

fn check_config(config: AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");

    Backend::detect(&config.database.url).context("Invalid database configuration")?;

    tracing::info!("Configuration is valid");
    println!("Configuration check passed");
    println!("{}", config.to_yaml()?);

    Ok(())
}
