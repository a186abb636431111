use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use rowmap_core::{describe, Config, Diagnostic, EngineKind, FieldValue, Record};
use rowmap_csv::{CsvTable, LoadReport};
use rowmap_sql::{create_table_for, table_name_for};
use rowmap_store::{
    CommandLog, MemoryExecutor, RecordStore, ResultSet, SqlExecutor, SqliteExecutor,
};

mod vehicle;

use vehicle::{random_vehicle, Vehicle};

/// Environment variable that selects the SQLite engine and its database file
const DATABASE_PATH_VAR: &str = "ROWMAP_DATABASE_PATH";

/// rowmap - Map plain records to CSV files and SQL tables
#[derive(Parser)]
#[command(name = "rowmap")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: rowmap.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate vehicles, round-trip them through CSV and query them
    Run {
        /// Number of random vehicles to generate
        #[arg(short = 'n', long, default_value_t = 10)]
        count: usize,

        /// Directory for Vehicles.csv (overrides csv_dir in the config)
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },

    /// Show the vehicle CSV header and CREATE TABLE statement
    Schema,

    /// Load a vehicles CSV file and report skipped rows
    Load {
        /// CSV file to read
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    dotenvy::dotenv().ok();

    let mut config = if let Some(config_path) = &cli.config {
        Config::from_file(config_path)?
    } else if Path::new("rowmap.toml").exists() {
        Config::from_file(Path::new("rowmap.toml"))?
    } else {
        if cli.verbose {
            eprintln!("{}", "No config file found, using defaults".yellow());
        }
        Config::default()
    };

    if let Ok(path) = std::env::var(DATABASE_PATH_VAR) {
        config.engine.kind = EngineKind::Sqlite;
        config.engine.path = Some(PathBuf::from(path));
    }

    if cli.verbose {
        eprintln!("{} engine: {:?}", "Using".cyan(), config.engine.kind);
    }

    match cli.command {
        Commands::Run { count, dir } => {
            let dir = dir.unwrap_or_else(|| config.csv_dir.clone());
            run_command(&config, count, &dir, cli.json).await
        }
        Commands::Schema => schema_command(cli.json),
        Commands::Load { path } => load_command(&path, cli.json),
    }
}

/// Run command - the full save, load, insert and query pipeline
async fn run_command(config: &Config, count: usize, dir: &Path, json: bool) -> Result<()> {
    let file = dir.join(CsvTable::file_name::<Vehicle>());
    if !json {
        println!(
            "{} {} random vehicles and saving them to {}",
            "Creating".cyan(),
            count,
            file.display()
        );
    }

    let vehicles = (0..count)
        .map(|_| random_vehicle())
        .collect::<Result<Vec<Vehicle>, _>>()?;
    let summary = CsvTable::save(&vehicles, dir)?;

    // Saving nothing writes no file; with none on disk there is nothing to load
    let report = if summary.rows == 0 && !file.exists() {
        if !json {
            println!("{}", "No vehicles to save, nothing to load".yellow());
        }
        LoadReport {
            records: Vec::new(),
            diagnostics: Vec::new(),
        }
    } else {
        CsvTable::load::<Vehicle>(&file)?
    };

    let log = CommandLog::open(&config.log_file)?;

    match config.engine.kind {
        EngineKind::Memory => {
            let store = RecordStore::new(MemoryExecutor::new()).with_log(log);
            pipeline(config, &store, report, count, json).await
        }
        EngineKind::Sqlite => {
            let executor = match &config.engine.path {
                Some(path) => SqliteExecutor::open(path)?,
                None => SqliteExecutor::open_in_memory()?,
            };

            let store = RecordStore::new(executor).with_log(log);
            pipeline(config, &store, report, count, json).await
        }
    }
}

async fn pipeline<E: SqlExecutor>(
    config: &Config,
    store: &RecordStore<E>,
    report: LoadReport<Vehicle>,
    saved: usize,
    json: bool,
) -> Result<()> {
    let table = config
        .table_name
        .clone()
        .unwrap_or_else(table_name_for::<Vehicle>);

    if !json {
        print_diagnostics(&report.diagnostics);
        println!(
            "{} to {} engine successfully\n",
            "Connected".green(),
            store.executor().name()
        );
    }

    store.create_table::<Vehicle>(&table).await?;

    let inserted = store.insert_all(&table, &report.records).await?;

    let all = store.select(&table, "*", "").await?;
    let chevys_and_toyotas = store
        .select(&table, "*", "Make = 'CHEVY' OR Make = 'TOYOTA'")
        .await?;
    let heavy = store.select(&table, "*", "Weight > 2500").await?;

    if !json {
        print_rows(&format!("Vehicles in {}:", table), &all);
        print_rows("Chevys and Toyotas:", &chevys_and_toyotas);
        print_rows("Vehicles weighing more than 2500 pounds:", &heavy);
    }

    let mut diagnostics = report.diagnostics;
    let dropped = match store.drop_table(&table).await {
        Ok(()) => true,
        Err(e) => {
            tracing::debug!(error = %e, "drop table failed");
            let diagnostic = e.diagnostic();
            if !json {
                println!(
                    "{}",
                    format!("Table {} did not exist, so it could not be dropped.", table).yellow()
                );
                println!("  {}", diagnostic.to_string().red());
            }
            diagnostics.push(diagnostic);
            false
        }
    };

    if json {
        let output = json!({
            "engine": store.executor().name(),
            "table": table,
            "saved": saved,
            "loaded": report.records.len(),
            "diagnostics": diagnostics,
            "inserted": inserted,
            "all": all,
            "chevys_and_toyotas": chevys_and_toyotas,
            "heavy": heavy,
            "dropped": dropped,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    if let Some(log) = store.log() {
        println!("{} {}", "Command log:".cyan().bold(), log.path().display());
        print!("{}", log.contents()?);
    }

    if dropped {
        println!("\n{} table {}", "Dropped".green(), table);
    }

    Ok(())
}

/// Schema command - show what a vehicle looks like as CSV and SQL
fn schema_command(json: bool) -> Result<()> {
    let schema = describe::<Vehicle>()?;
    let header = CsvTable::header_line(&schema);
    let table = table_name_for::<Vehicle>();
    let create = create_table_for::<Vehicle>(&table)?;

    if json {
        let output = json!({
            "schema": schema,
            "csv_header": header,
            "create_table": create,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{} {}", "Record:".cyan().bold(), schema.type_name);
    for field in schema.fields {
        println!("  {} {}", field.name.bold(), field.semantic_type);
    }
    println!("\n{}\n{}", "CSV header:".cyan().bold(), header);
    println!("\n{}\n{}", "CREATE TABLE:".cyan().bold(), create);

    Ok(())
}

/// Load command - read a vehicles CSV and report what was skipped
fn load_command(path: &Path, json: bool) -> Result<()> {
    let report = CsvTable::load::<Vehicle>(path)?;

    if json {
        let records: Vec<_> = report.records.iter().map(record_json).collect();
        let output = json!({
            "records": records,
            "diagnostics": report.diagnostics,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!(
        "{} {} vehicles from {}",
        "Loaded".green(),
        report.records.len(),
        path.display()
    );
    for vehicle in &report.records {
        println!("  {}", CsvTable::record_line(vehicle));
    }
    print_diagnostics(&report.diagnostics);

    Ok(())
}

fn print_rows(title: &str, rows: &ResultSet) {
    println!("{}", title.cyan().bold());
    if rows.is_empty() {
        println!("  {}", "(no rows)".dimmed());
    }
    print!("{}", rows.render());
    println!();
}

fn print_diagnostics(diagnostics: &[Diagnostic]) {
    if diagnostics.is_empty() {
        return;
    }

    println!("{} {} rows skipped", "⚠".yellow(), diagnostics.len());
    for diagnostic in diagnostics {
        println!("  {}", diagnostic.to_string().yellow());
    }
}

/// Field name to JSON value, in schema order
fn record_json<R: Record>(record: &R) -> serde_json::Value {
    let mut map = serde_json::Map::new();

    for (index, field) in R::schema().iter().enumerate() {
        let value = match record.get(index) {
            None | Some(FieldValue::Null) => serde_json::Value::Null,
            Some(FieldValue::Integer(v)) => v.into(),
            Some(FieldValue::Float(v)) => serde_json::Number::from_f64(v)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Some(FieldValue::Boolean(v)) => v.into(),
            Some(FieldValue::Text(v)) | Some(FieldValue::Enum(v)) => v.into(),
        };
        map.insert(field.name.to_string(), value);
    }

    serde_json::Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vehicle::{Make, Size};

    #[test]
    fn cli_parses_run_defaults() {
        let cli = Cli::try_parse_from(["rowmap", "run"]).unwrap();
        match cli.command {
            Commands::Run { count, dir } => {
                assert_eq!(count, 10);
                assert!(dir.is_none());
            }
            _ => panic!("expected run"),
        }
        assert!(!cli.json);
    }

    #[test]
    fn cli_parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["rowmap", "load", "Vehicles.csv", "--json", "-v"]).unwrap();
        assert!(cli.json);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Load { ref path } if path == Path::new("Vehicles.csv")));
    }

    #[test]
    fn record_json_uses_field_names() {
        let vehicle = Vehicle {
            make: Make::Nissan,
            size: Size::Compact,
            weight: 1750.5,
            engine_size: 120.0,
        };

        assert_eq!(
            record_json(&vehicle),
            json!({
                "make": "NISSAN",
                "size": "COMPACT",
                "weight": 1750.5,
                "engine_size": 120.0,
            })
        );
    }

    #[tokio::test]
    async fn run_pipeline_against_memory_engine() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            csv_dir: dir.path().to_path_buf(),
            log_file: dir.path().join("database_log.txt"),
            ..Config::default()
        };

        run_command(&config, 5, dir.path(), true).await.unwrap();

        let log = std::fs::read_to_string(&config.log_file).unwrap();
        assert!(log.contains("Executing command: CREATE TABLE Vehicles (make VARCHAR(10), size VARCHAR(12), weight DOUBLE, engine_size DOUBLE)"));
        assert_eq!(log.matches("affected rows: 1").count(), 5);
        assert!(log.contains("Executing command: SELECT * FROM Vehicles WHERE Weight > 2500"));
        assert!(log.contains("Executing command: DROP TABLE Vehicles"));

        let csv = std::fs::read_to_string(dir.path().join("Vehicles.csv")).unwrap();
        assert_eq!(csv.lines().count(), 6);
    }

    #[tokio::test]
    async fn run_with_no_vehicles_still_drops_the_table() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            csv_dir: dir.path().to_path_buf(),
            log_file: dir.path().join("database_log.txt"),
            ..Config::default()
        };

        run_command(&config, 0, dir.path(), true).await.unwrap();

        let log = std::fs::read_to_string(&config.log_file).unwrap();
        assert!(log.contains("Executing command: CREATE TABLE Vehicles"));
        assert!(!log.contains("INSERT INTO"));
        assert!(log.contains("Executing command: DROP TABLE Vehicles"));
        assert!(!log.contains("There was an issue executing the command"));
        assert!(!dir.path().join("Vehicles.csv").exists());
    }

    #[tokio::test]
    async fn run_pipeline_against_sqlite_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            csv_dir: dir.path().to_path_buf(),
            log_file: dir.path().join("database_log.txt"),
            engine: rowmap_core::EngineConfig {
                kind: EngineKind::Sqlite,
                path: Some(dir.path().join("cars.db")),
            },
            ..Config::default()
        };

        run_command(&config, 4, dir.path(), true).await.unwrap();

        let log = std::fs::read_to_string(&config.log_file).unwrap();
        assert!(log.contains("Executing command: CREATE TABLE Vehicles (make VARCHAR(10), size VARCHAR(12), weight DOUBLE, engine_size DOUBLE)"));
        assert_eq!(log.matches("affected rows: 1").count(), 4);
        assert!(log.contains("Executing command: DROP TABLE Vehicles"));
        assert!(!log.contains("There was an issue executing the command"));
        assert!(dir.path().join("cars.db").exists());
    }
}
