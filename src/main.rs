use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use common::cli::{CommonArgs, utils};
use dashboard_api::dashboard::Dashboard;
use dashboard_api::{AnnotationConfig, QueryResponse};
use serde::Serialize;
use transform::overlay;
use transform::{QueryResult, SeriesOptions};

/// dashkit: render time-series query responses for dashboards
#[derive(Parser)]
#[command(name = "dashkit", version, about)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a query response as chart lines
    Timeseries {
        /// Query response JSON file
        file: PathBuf,

        #[command(flatten)]
        query: QueryArgs,
    },
    /// Render a query response as a table
    Table {
        /// Query response JSON file
        file: PathBuf,
    },
    /// Extract annotation events from a query response
    Annotations {
        /// Query response JSON file
        file: PathBuf,

        #[arg(long)]
        title_column: Option<String>,

        #[arg(long)]
        tags_column: Option<String>,

        #[arg(long)]
        text_column: Option<String>,
    },
    /// Rebuild offset overlay lines on a dashboard document
    PrepareSave {
        /// Dashboard JSON file
        file: PathBuf,

        /// Write the result here instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Show the effective configuration
    Config {
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
struct QueryArgs {
    /// Naming template, e.g. `$m.$col` or `[[0]]-[[tag_host]]`
    #[arg(long)]
    alias: Option<String>,

    /// Column that partitions grouped responses
    #[arg(long)]
    group_by: Option<String>,

    /// Shift timestamps forward by this offset, e.g. `1d`
    #[arg(long)]
    time_offset: Option<String>,

    /// Treat the query as an auto-generated overlay line
    #[arg(long, requires = "time_offset")]
    auto_created: bool,
}

impl QueryArgs {
    fn options(self) -> SeriesOptions {
        let mut options = SeriesOptions::default();
        if let Some(alias) = self.alias {
            options = options.with_alias(alias);
        }
        if let Some(field) = self.group_by {
            options = options.with_group_by(field);
        }
        if let Some(offset) = self.time_offset {
            options = options.with_time_offset(offset, self.auto_created);
        }
        options
    }
}

impl Cli {
    fn run(self) -> Result<()> {
        let config = utils::load_config(self.common.config.as_ref())?;
        utils::init_logging(&self.common, &config);
        log::debug!("Running {}", utils::version_info());
        if let Some(path) = &self.common.config {
            log::info!("Loaded configuration from {}", path.display());
        }

        match self.command {
            Commands::Timeseries { file, query } => {
                let result = QueryResult::new(read_json(&file)?, query.options())?;
                print_json(&result.time_series()?)
            }
            Commands::Table { file } => {
                let result = QueryResult::new(read_json(&file)?, SeriesOptions::default())?;
                print_json(&result.table(config.table.schema_policy)?)
            }
            Commands::Annotations {
                file,
                title_column,
                tags_column,
                text_column,
            } => {
                let annotation = AnnotationConfig {
                    title_column,
                    tags_column,
                    text_column,
                    ..Default::default()
                };
                let response: QueryResponse = read_json(&file)?;
                let result =
                    QueryResult::new(response, SeriesOptions::default().with_annotation(annotation))?;
                print_json(&result.annotations())
            }
            Commands::PrepareSave { file, output } => {
                let dashboard: Dashboard = read_json(&file)?;
                let prepared = overlay::prepare_for_save(&dashboard)?;
                match output {
                    Some(path) => write_json(&path, &prepared),
                    None => print_json(&prepared),
                }
            }
            Commands::Config { json } => utils::display_config(&config, json),
        }
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{json}");
    Ok(())
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    log::info!("Wrote {}", path.display());
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = cli.run() {
        eprintln!("Error: {e}");
        for cause in e.chain().skip(1) {
            eprintln!("  caused by: {cause}");
        }
        std::process::exit(1);
    }
}
