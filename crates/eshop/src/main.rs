use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use comfy_table::Table;
use eshop_core::config::Settings;
use eshop_core::db::{self, MemorySeedStore, PgSeedStore, SeedStore};
use eshop_core::seed::validation::SeedPropertiesValidator;
use eshop_core::seed::{SeedOrchestrator, SeedProperties, SeedingResult};
use eshop_core::startup;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "E-shop database tooling", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply the embedded database migrations
    Migrate,
    /// Seed development data into the database
    DbSeed(DbSeedArgs),
    /// Check a seed properties file without touching the database
    Validate(ValidateArgs),
    /// Run migrations and startup seeding, as the server does on boot
    Serve,
}

#[derive(Args, Debug, Default)]
struct DbSeedArgs {
    /// Seed an in-memory store instead of the database
    #[arg(long)]
    dry_run: bool,
    /// Skip running embedded database migrations before seeding
    #[arg(long)]
    skip_migrations: bool,
    /// Seed properties file (defaults to ESHOP_SEED_FILE, then the bundled file)
    #[arg(long)]
    seed_file: Option<PathBuf>,
    /// Print the result as JSON instead of a table
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug, Default)]
struct ValidateArgs {
    /// Seed properties file (defaults to ESHOP_SEED_FILE, then the bundled file)
    #[arg(long)]
    seed_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let settings = Settings::from_env().context("invalid environment configuration")?;

    match cli.command {
        Command::Migrate => handle_migrate(&settings).await,
        Command::DbSeed(args) => handle_db_seed(settings, args).await,
        Command::Validate(args) => handle_validate(&settings, args),
        Command::Serve => handle_serve(settings).await,
    }
}

fn load_properties(settings: &Settings, seed_file: Option<PathBuf>) -> Result<SeedProperties> {
    let path = seed_file.or_else(|| settings.seed_file.clone());
    let properties = SeedProperties::load(path.as_deref()).with_context(|| match &path {
        Some(path) => format!("failed to load seed properties from '{}'", path.display()),
        None => "failed to load the bundled seed properties".to_string(),
    })?;
    Ok(properties)
}

async fn connect(settings: &Settings, skip_migrations: bool) -> Result<db::DbPool> {
    let database_url = settings.require_database_url()?;
    let pool = db::connect(database_url)
        .await
        .context("failed to connect to the database")?;

    if skip_migrations {
        info!("Skipping migrations at user request");
    } else {
        db::run_migrations(&pool).await.context("failed to run migrations")?;
    }
    Ok(pool)
}

async fn handle_migrate(settings: &Settings) -> Result<()> {
    connect(settings, false).await?;
    println!("Migrations applied.");
    Ok(())
}

async fn handle_db_seed(settings: Settings, args: DbSeedArgs) -> Result<()> {
    let properties = Arc::new(load_properties(&settings, args.seed_file)?);

    let store: Arc<dyn SeedStore> = if args.dry_run {
        info!("Dry run: seeding an in-memory store");
        Arc::new(MemorySeedStore::new())
    } else {
        Arc::new(PgSeedStore::new(connect(&settings, args.skip_migrations).await?))
    };

    let result = SeedOrchestrator::with_default_seeders(store, settings, properties)
        .orchestrate()
        .await
        .context("database seeding failed")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_result(&result);
    }
    Ok(())
}

fn handle_validate(settings: &Settings, args: ValidateArgs) -> Result<()> {
    let properties = load_properties(settings, args.seed_file)?;
    let validator = SeedPropertiesValidator;
    validator.validate(&properties)?;

    let warnings = validator.check_references(&properties);
    if warnings.is_empty() {
        println!("Seed properties are valid.");
    } else {
        println!("Seed properties are valid with {} warnings:", warnings.len());
        for warning in &warnings {
            println!("  - {warning}");
        }
    }
    Ok(())
}

async fn handle_serve(settings: Settings) -> Result<()> {
    let properties = Arc::new(load_properties(&settings, None)?);
    let pool = connect(&settings, false).await?;
    let store: Arc<dyn SeedStore> = Arc::new(PgSeedStore::new(pool));

    if let Some(result) = startup::run_on_startup(store, settings, properties)
        .await
        .context("startup seeding failed")?
    {
        info!(%result, "Startup seeding result");
    }

    info!("Startup complete; the HTTP API is served by the storefront application");
    Ok(())
}

fn print_result(result: &SeedingResult) {
    if result.skipped {
        println!("Database already populated; seeding skipped (run {}).", result.run_id);
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["Seeder", "Rows"]);
    for (seeder, count) in &result.seeder_counts {
        table.add_row(vec![seeder.clone(), count.to_string()]);
    }
    table.add_row(vec!["Total".to_string(), result.total_seeded().to_string()]);

    println!("{table}");
    println!("Seeded in {} ms (run {}).", result.duration_ms, result.run_id);
}
