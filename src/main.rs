use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use repo2source::config::Config;
use repo2source::model::SourceModel;
use repo2source::transformer::Transformer;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("GIT_COMMIT_HASH"),
    ", built ",
    env!("BUILD_TIMESTAMP"),
    ")"
);

#[derive(Parser)]
#[command(
    name = "repo2source",
    about = "Extract source files and their UASTs from repositories into per-repository models",
    version,
    long_version = LONG_VERSION,
    args_conflicts_with_subcommands = true
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Repository directories to transform
    repositories: Vec<String>,

    /// File listing one repository per line
    #[arg(long, value_name = "FILE")]
    repos_list: Option<PathBuf>,

    /// Root directory for the generated models
    #[arg(short, long, default_value = ".")]
    output: PathBuf,

    /// Write the model of a single repository to exactly this file
    #[arg(long, value_name = "FILE", conflicts_with_all = ["repos_list", "depth", "output"])]
    output_file: Option<PathBuf>,

    /// Parser service address
    #[arg(long)]
    endpoint: Option<String>,

    /// Per-file parse timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Skip files larger than this many bytes
    #[arg(long)]
    max_file_size: Option<u64>,

    /// Number of prefix directories above each model file
    #[arg(long)]
    depth: Option<usize>,

    /// Rebuild models that already exist
    #[arg(long)]
    overwrite: bool,

    /// Repositories processed concurrently
    #[arg(short = 'j', long)]
    workers: Option<usize>,

    /// Configuration file (defaults to the per-user config)
    #[arg(long, env = "REPO2SOURCE_CONFIG")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a summary of a model file
    Show {
        /// Path to the model
        model: PathBuf,

        /// Also list every entry
        #[arg(long)]
        entries: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "repo2source=debug"
    } else {
        "repo2source=info"
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    if let Some(Commands::Show { model, entries }) = &cli.command {
        return show(model, *entries);
    }
    run(cli).await
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => {
            let mut config = Config::from_file(path)?;
            config.apply_env_overrides();
            config
        }
        None => Config::new()?,
    };

    if let Some(endpoint) = cli.endpoint {
        config.parser.endpoint = endpoint;
    }
    if let Some(timeout) = cli.timeout {
        config.parser.timeout_secs = timeout;
    }
    if let Some(max_file_size) = cli.max_file_size {
        config.selection.max_file_size = max_file_size;
    }
    if let Some(depth) = cli.depth {
        config.output.shard_depth = depth;
    }
    if cli.overwrite {
        config.output.overwrite_existing = true;
    }
    if let Some(workers) = cli.workers {
        config.workers.num_workers = workers;
    }
    config.validate()?;

    let mut repositories = cli.repositories;
    if let Some(list) = &cli.repos_list {
        repositories.extend(read_repos_list(list)?);
    }
    if repositories.is_empty() {
        bail!("No repositories given; pass them as arguments or with --repos-list");
    }

    let transformer = Transformer::new(config)?;

    if let Some(destination) = &cli.output_file {
        let [repository] = repositories.as_slice() else {
            bail!(
                "--output-file takes exactly one repository, got {}",
                repositories.len()
            );
        };
        let outcome = transformer
            .transform_to_file(repository, destination)
            .await
            .with_context(|| format!("Failed to transform {}", repository.trim_end()))?;
        tracing::info!("{:?}", outcome);
        return Ok(());
    }

    let report = transformer.transform(&repositories, &cli.output).await;

    for (repository, reason) in &report.failed {
        eprintln!("{}: {}", repository.trim_end(), reason);
    }
    if report.has_failures() {
        bail!("{} of {} repositories failed", report.failed.len(), report.total());
    }

    Ok(())
}

fn read_repos_list(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read repository list {:?}", path))?;
    Ok(content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect())
}

fn show(path: &Path, entries: bool) -> Result<()> {
    let model = SourceModel::load(path)
        .with_context(|| format!("Failed to load model {:?}", path))?;
    println!("{}", model);

    if entries {
        for (index, entry) in model.iter().enumerate() {
            let nodes = entry.decode_uast().map(|uast| uast.node_count()).unwrap_or(0);
            println!(
                "{:>6}  {:>8} bytes  {:>6} nodes  {}",
                index,
                entry.source.len(),
                nodes,
                entry.filename
            );
        }
    }

    Ok(())
}
