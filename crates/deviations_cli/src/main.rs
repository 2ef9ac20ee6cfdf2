//! CLI entry point over `deviations_core`.
//!
//! # Responsibility
//! - Provide a minimal executable to exercise the deviation store end to end.
//! - Print one JSON document per line so output stays scriptable.

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use deviations_core::db::open_db;
use deviations_core::{
    init_logging, CatalogRepository, DeviationCategory, DeviationService, DeviationType,
    DeviationsConfig, ReportDeviationRequest, SqliteCatalogRepository,
    SqliteDeviationRepository,
};
use log::info;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;
use std::error::Error;
use std::path::{Path, PathBuf};
use uuid::Uuid;

#[derive(Debug, Parser)]
#[command(name = "deviations", version, about = "Track service deviations")]
struct Cli {
    /// TOML config file; `DEVIATIONS_*` environment variables override it.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Check core linkage without touching the database.
    Ping,
    /// Manage fee-bearing categories.
    #[command(subcommand)]
    Category(CategoryCommand),
    /// Manage deviation types.
    #[command(subcommand)]
    Type(TypeCommand),
    /// Report and read deviations.
    #[command(subcommand)]
    Deviation(DeviationCommand),
}

#[derive(Debug, Subcommand)]
enum CategoryCommand {
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        fee: Decimal,
    },
    List,
    /// Deletes the category, its types and their deviations.
    Delete { id: Uuid },
}

#[derive(Debug, Subcommand)]
enum TypeCommand {
    Add {
        #[arg(long)]
        category: Uuid,
        #[arg(long)]
        name: String,
    },
    List {
        #[arg(long)]
        category: Uuid,
    },
    /// Deletes the type and its deviations.
    Delete { id: Uuid },
}

#[derive(Debug, Subcommand)]
enum DeviationCommand {
    Report {
        #[arg(long = "type")]
        deviation_type: Uuid,
        #[arg(long)]
        description: String,
        #[arg(long)]
        line: String,
        #[arg(long)]
        stop: Option<String>,
        /// RFC 3339 timestamp; defaults to now.
        #[arg(long)]
        reported_at: Option<DateTime<Utc>>,
    },
    Get { id: Uuid },
    List,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Ping => {
            println!("deviations_core ping={}", deviations_core::ping());
            println!("deviations_core version={}", deviations_core::core_version());
            Ok(())
        }
        Command::Category(command) => {
            let conn = open_store(cli.config.as_deref())?;
            let catalog = SqliteCatalogRepository::try_new(&conn)?;
            run_category(&catalog, command)
        }
        Command::Type(command) => {
            let conn = open_store(cli.config.as_deref())?;
            let catalog = SqliteCatalogRepository::try_new(&conn)?;
            run_type(&catalog, command)
        }
        Command::Deviation(command) => {
            let conn = open_store(cli.config.as_deref())?;
            let service = DeviationService::new(
                SqliteDeviationRepository::try_new(&conn)?,
                SqliteCatalogRepository::try_new(&conn)?,
            );
            run_deviation(&service, command)
        }
    }
}

/// Loads config, starts file logging when a directory is configured, and
/// opens the migrated database.
fn open_store(config_path: Option<&Path>) -> Result<Connection, Box<dyn Error>> {
    let config = DeviationsConfig::load(config_path)?;
    if let Some(log_dir) = config.logging.dir.as_deref() {
        init_logging(&config.logging.level, log_dir)?;
    }

    info!(
        "event=cli_open module=cli status=start database={}",
        config.database.path.display()
    );
    Ok(open_db(&config.database.path)?)
}

fn run_category(
    catalog: &SqliteCatalogRepository<'_>,
    command: CategoryCommand,
) -> Result<(), Box<dyn Error>> {
    match command {
        CategoryCommand::Add { name, fee } => {
            let category = DeviationCategory::new(name, fee)?;
            catalog.add_category(&category)?;
            print_json(&category)
        }
        CategoryCommand::List => {
            for category in catalog.list_categories()? {
                print_json(&category)?;
            }
            Ok(())
        }
        CategoryCommand::Delete { id } => Ok(catalog.delete_category(id)?),
    }
}

fn run_type(
    catalog: &SqliteCatalogRepository<'_>,
    command: TypeCommand,
) -> Result<(), Box<dyn Error>> {
    match command {
        TypeCommand::Add { category, name } => {
            let category = catalog
                .get_category(category)?
                .ok_or_else(|| format!("unknown category: {category}"))?;
            let deviation_type = DeviationType::new(name, category)?;
            catalog.add_deviation_type(&deviation_type)?;
            print_json(&deviation_type)
        }
        TypeCommand::List { category } => {
            for deviation_type in catalog.list_deviation_types_in_category(category)? {
                print_json(&deviation_type)?;
            }
            Ok(())
        }
        TypeCommand::Delete { id } => Ok(catalog.delete_deviation_type(id)?),
    }
}

fn run_deviation(
    service: &DeviationService<SqliteDeviationRepository<'_>, SqliteCatalogRepository<'_>>,
    command: DeviationCommand,
) -> Result<(), Box<dyn Error>> {
    match command {
        DeviationCommand::Report {
            deviation_type,
            description,
            line,
            stop,
            reported_at,
        } => {
            let deviation = service.report_deviation(ReportDeviationRequest {
                deviation_type_id: deviation_type,
                reported_at: reported_at.unwrap_or_else(Utc::now),
                description,
                line_id: line,
                stop_place: stop,
            })?;
            print_json(&deviation)
        }
        DeviationCommand::Get { id } => match service.get_deviation(id)? {
            Some(deviation) => print_json(&deviation),
            None => Err(format!("deviation not found: {id}").into()),
        },
        DeviationCommand::List => {
            for deviation in service.list_deviations()? {
                print_json(&deviation)?;
            }
            Ok(())
        }
    }
}

fn print_json(value: &impl Serialize) -> Result<(), Box<dyn Error>> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}
