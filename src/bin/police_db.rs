use clap::Parser;
use colored::Colorize;
use flyweight_cache::{CacheError, CarRegistry, Config, FlyweightFactory};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Registers cars against a shared pool of car models.
#[derive(Parser, Debug)]
#[command(name = "police-db")]
struct Args {
    /// TOML file with `[logging]` and `[factory]` sections
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, default_value = "CL234IR")]
    plates: String,

    #[arg(long, default_value = "James Doe")]
    owner: String,
}

fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

// Must run after `init_tracing`.
fn report_config(path: &Path, config: &Config) {
    info!(
        path = %path.display(),
        filter = %config.logging.filter,
        seeds = config.factory.seed.len(),
        "loaded config"
    );
}

fn main() -> Result<(), CacheError> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    init_tracing(&config.logging.filter);
    if let Some(path) = &args.config {
        report_config(path, &config);
    }

    let fleet = match &args.config {
        Some(_) => config.seed_cars()?,
        None => CarRegistry::police_fleet(),
    };
    let mut registry = CarRegistry::with_factory(FlyweightFactory::with_initial(fleet));

    println!("{}", registry.factory().listing().cyan());

    for (brand, model, color) in [("BMW", "M5", "red"), ("BMW", "X1", "red")] {
        println!("\n{}", "Client: Adding a car to DB.".bold());
        let registration = registry.add_car(&args.plates, &args.owner, brand, model, color)?;
        println!("{}", registration.describe()?);
    }

    println!("\n{}", registry.factory().listing().cyan());

    let stats = registry.factory().stats();
    println!(
        "\n{} {} hits, {} misses",
        "Lookups:".green(),
        stats.hits,
        stats.misses
    );

    Ok(())
}
