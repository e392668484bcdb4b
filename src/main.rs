use colored::*;
use env_logger::{Builder, Env, Target};
use gearfind::catalog::GearId;
use gearfind::error::{CatalogError, Result};
use gearfind::output::render;
use gearfind::{
    AlternativeFilter, Cli, Commands, Config, GearCatalog, GearFilter, MemoryStore, Parser,
};
use log::info;
use std::fs;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = setup_logging(&cli) {
        eprintln!("{} {e}", "warning:".yellow().bold());
    }

    let start_time = Instant::now();
    info!("Application started with command: {:?}", cli.command);

    let result = run(cli).await;
    info!(
        "Application finished. Total elapsed time: {:.2?}",
        start_time.elapsed()
    );

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {e}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let store = Arc::new(MemoryStore::from_json_file(&cli.catalog)?);
    let catalog = GearCatalog::new(store, config)?;
    catalog.refresh().await?;

    let format = cli.output_format;
    let output = match cli.command {
        Commands::Autocomplete { query, limit } => {
            render(&catalog.autocomplete(&query, limit).await?, format)?
        }
        Commands::Brands { query, limit } => {
            render(&catalog.autocomplete_brands(&query, limit)?, format)?
        }
        Commands::Alternatives {
            gear_id,
            max_weight,
            max_price,
            capacity,
            product_type,
            limit,
        } => {
            let filter = AlternativeFilter {
                max_weight,
                max_price,
                limit,
                capacity_persons: capacity,
                product_type,
            };
            render(
                &catalog.find_alternatives(&GearId::new(gear_id), &filter)?,
                format,
            )?
        }
        Commands::Gear { key, by_name } => {
            let gear = if by_name {
                catalog.gear_by_name(&key)?
            } else {
                catalog.gear(&GearId::new(key))?
            };
            render(&gear, format)?
        }
        Commands::List {
            brand,
            product_type,
            category,
            weight_under,
            weight_over,
            price_under,
            price_over,
            capacity,
            limit,
            offset,
        } => {
            let filter = GearFilter {
                brand_name: brand,
                product_type,
                category,
                weight_grams_lt: weight_under,
                weight_grams_gt: weight_over,
                price_minor_lt: price_under,
                price_minor_gt: price_over,
                capacity_persons: capacity,
            };
            render(&catalog.list_gear(&filter, limit, offset)?, format)?
        }
        Commands::Categories => render(&catalog.categories()?, format)?,
        Commands::Stats => {
            let mut out = render(&catalog.stats()?, format)?;
            if matches!(format, gearfind::OutputFormat::Text) {
                out.push_str(&render(&catalog.status(), format)?);
            }
            out
        }
        Commands::Metrics => catalog.metrics().gather(),
    };

    println!("{output}");
    Ok(())
}

fn setup_logging(cli: &Cli) -> Result<()> {
    let default_level = if cli.verbose { "debug" } else { "warn" };
    let mut builder = Builder::from_env(Env::default().default_filter_or(default_level));

    builder.format(|buf, record| {
        use std::io::Write;
        writeln!(
            buf,
            "{} [{}] [{}] {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            record.level(),
            record.module_path().unwrap_or("unknown"),
            record.args()
        )
    });

    if let Some(log_path) = &cli.log {
        if let Some(parent_dir) = log_path.parent() {
            if !parent_dir.as_os_str().is_empty() && !parent_dir.exists() {
                fs::create_dir_all(parent_dir)?;
            }
        }
        let log_file = fs::File::create(log_path)?;
        builder.target(Target::Pipe(Box::new(log_file)));
    } else {
        builder.target(Target::Stderr);
    }

    builder
        .try_init()
        .map_err(|e| CatalogError::Config(e.to_string()))?;
    Ok(())
}
