mod cli;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use cli::search::SearchMode;
use nornicdb_accel::config::AccelConfig;

#[derive(Parser)]
#[command(
    name = "nornicdb-accel",
    version,
    about = "Warmup cache and pattern search over a NornicDB graph"
)]
struct Cli {
    /// Config file (defaults to ~/.nornicdb/accel.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding nodes.json and relationships.json
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Preload the graph into the warmup cache and report cache state
    Warmup {
        /// Only preload nodes with these labels
        #[arg(long = "label")]
        labels: Vec<String>,
        /// Only preload relationships of these types
        #[arg(long = "type")]
        types: Vec<String>,
        /// Also collect all values (duplicates included) for these property keys
        #[arg(long = "properties", value_delimiter = ',')]
        properties: Vec<String>,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Preload the neighborhood of one node
    Subgraph {
        /// Start node ID
        id: i64,
        /// Hop limit (defaults to [warmup] subgraph_depth)
        #[arg(long)]
        depth: Option<i64>,
        #[arg(long)]
        json: bool,
    },
    /// Match nodes by label and property
    Search {
        mode: SearchMode,
        label: String,
        property: String,
        query: String,
        /// Rank results by relevance to the query
        #[arg(long)]
        score: bool,
        /// Wrap query occurrences in the printed value
        #[arg(long)]
        highlight: bool,
    },
    /// Property values starting with a prefix
    Suggest {
        label: String,
        property: String,
        prefix: String,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Property values close to a misspelled query
    DidYouMean {
        label: String,
        property: String,
        query: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AccelConfig::load_from(path)?,
        None => AccelConfig::load()?,
    };
    if let Some(dir) = &cli.data_dir {
        config.graph.data_dir = dir.to_string_lossy().into_owned();
    }

    // Log to stderr so stdout carries only command output.
    let filter =
        EnvFilter::try_new(&config.logging.level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Warmup {
            labels,
            types,
            properties,
            json,
        } => cli::warmup::warmup(&config, labels, types, &properties, json)?,
        Command::Subgraph { id, depth, json } => {
            let depth = depth.unwrap_or(config.warmup.subgraph_depth);
            cli::subgraph::subgraph(&config, id, depth, json)?;
        }
        Command::Search {
            mode,
            label,
            property,
            query,
            score,
            highlight,
        } => {
            let opts = cli::search::SearchOptions { score, highlight };
            cli::search::search(&config, mode, &label, &property, &query, opts)?;
        }
        Command::Suggest {
            label,
            property,
            prefix,
            limit,
        } => {
            let limit = limit.unwrap_or(config.search.suggest_limit);
            cli::search::suggest(&config, &label, &property, &prefix, limit)?;
        }
        Command::DidYouMean {
            label,
            property,
            query,
        } => cli::search::did_you_mean(&config, &label, &property, &query)?,
    }

    Ok(())
}
