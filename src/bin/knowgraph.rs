//! knowgraph CLI: inspect, export and import a SQLite-backed graph.
//!
//! Usage:
//!   knowgraph stats [--db path] [--config file]
//!   knowgraph export --format json|csv|graphml --output <path>
//!   knowgraph import --format json|csv --input <path> [--strategy merge]
//!   knowgraph clear --yes

use clap::{Parser, Subcommand};
use knowgraph::{ExportFormat, GraphConfig, GraphStore, MergeStrategy, SqliteStore};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "knowgraph", version, about = "Typed knowledge graph engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Path to SQLite database file
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    /// Path to a YAML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print graph statistics as JSON
    Stats,
    /// Export the whole graph
    Export {
        #[arg(long, value_enum)]
        format: ExportFormat,
        /// Output file (a directory for csv)
        #[arg(long)]
        output: PathBuf,
    },
    /// Import a snapshot
    Import {
        #[arg(long, value_enum)]
        format: ExportFormat,
        /// Input file (a directory for csv)
        #[arg(long)]
        input: PathBuf,
        #[arg(long, value_enum, default_value_t = MergeStrategy::Merge)]
        strategy: MergeStrategy,
    },
    /// Delete every node and relationship
    Clear {
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
}

/// Get the default database path (~/.local/share/knowgraph/knowgraph.db)
fn default_db_path() -> PathBuf {
    let data_dir = dirs::data_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_default().join(".local/share"));
    data_dir.join("knowgraph").join("knowgraph.db")
}

fn load_config(path: Option<&Path>) -> Result<GraphConfig, String> {
    match path {
        Some(path) => GraphConfig::load(path)
            .map_err(|e| format!("Failed to load config '{}': {}", path.display(), e)),
        None => Ok(GraphConfig::default()),
    }
}

/// `RUST_LOG` wins over the configured level. Logs go to stderr so stdout
/// stays parseable.
fn init_tracing(config: &GraphConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("knowgraph={}", config.log_level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn open_store(db: Option<PathBuf>, config: GraphConfig) -> Result<SqliteStore, String> {
    let db_path = db.unwrap_or_else(default_db_path);
    let mut store = SqliteStore::open_with_config(&db_path, config)
        .map_err(|e| format!("Failed to open database: {}", e))?;
    store
        .initialize()
        .map_err(|e| format!("Failed to initialize database: {}", e))?;
    Ok(store)
}

fn print_json(value: &impl serde::Serialize) -> Result<(), String> {
    let json = serde_json::to_string_pretty(value).map_err(|e| e.to_string())?;
    println!("{}", json);
    Ok(())
}

fn run(cli: Cli, config: GraphConfig) -> Result<(), String> {
    let mut store = open_store(cli.db, config)?;

    let result = match cli.command {
        Commands::Stats => {
            let stats = store.get_graph_stats().map_err(|e| e.to_string())?;
            print_json(&stats)
        }
        Commands::Export { format, output } => {
            let report = store
                .export_graph(format, &output)
                .map_err(|e| e.to_string())?;
            println!(
                "Exported {} nodes and {} relationships to {}",
                report.nodes,
                report.relationships,
                output.display()
            );
            Ok(())
        }
        Commands::Import {
            format,
            input,
            strategy,
        } => {
            let report = store
                .import_graph(format, &input, strategy)
                .map_err(|e| e.to_string())?;
            print_json(&report)
        }
        Commands::Clear { yes } => {
            if !yes {
                return Err("refusing to clear the graph without --yes".to_string());
            }
            store.clear_graph(true).map_err(|e| e.to_string())?;
            println!("Graph cleared");
            Ok(())
        }
    };

    store.shutdown().map_err(|e| e.to_string())?;
    result
}

fn main() {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    init_tracing(&config);

    if let Err(e) = run(cli, config) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
