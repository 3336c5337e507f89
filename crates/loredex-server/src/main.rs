use anyhow::Result;
use clap::{Parser, Subcommand};
use loredex_server::{Config, Dispatcher};
use loredex_index::{IndexBuilder, ResourceScanner};
use loredex_search::{ResourceCatalog, SearchOptions, DEFAULT_SEARCH_LIMIT};
use loredex_types::ResourceKind;
use serde_json::json;
use tokio::io::BufReader;

/// Index and serve agent knowledge resources
#[derive(Parser, Debug)]
#[command(name = "loredex", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scan the resource directories and write fresh index snapshots
    Build,
    /// Serve the tool protocol over stdin/stdout
    Serve,
    /// Ranked search over the index
    Search {
        /// Query matched against names and descriptions
        query: String,
        /// Restrict to one kind (skill, agent, prompt, instruction)
        #[arg(long)]
        kind: Option<ResourceKind>,
        /// Keep resources carrying at least one of these tags
        #[arg(long = "tag")]
        tags: Vec<String>,
        /// Maximum number of results
        #[arg(long, default_value_t = DEFAULT_SEARCH_LIMIT)]
        limit: usize,
        /// Attach each hit's full body
        #[arg(long)]
        content: bool,
    },
    /// Fetch one resource with its full body
    Get {
        /// Resource name
        name: String,
        /// Kind, required when several kinds share the name
        #[arg(long)]
        kind: Option<ResourceKind>,
    },
    /// List indexed resources
    List {
        /// Restrict to one kind
        kind: Option<ResourceKind>,
    },
    /// Show index statistics
    Stats,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load()?;
    loredex_logging::init_logging(&config.logging.level)?;

    match cli.command {
        Command::Build => build(&config),
        Command::Serve => serve(&config).await,
        Command::Search {
            query,
            kind,
            tags,
            limit,
            content,
        } => search(&config, &query, SearchOptions { kind, tags, limit }, content),
        Command::Get { name, kind } => get(&config, &name, kind),
        Command::List { kind } => list(&config, kind),
        Command::Stats => stats(&config),
    }
}

fn build(config: &Config) -> Result<()> {
    let scanner = ResourceScanner::new(config.scan_roots());
    let report = IndexBuilder::new(scanner, config.index_dir()).build()?;
    print_json(&json!({
        "indexed": report.stats,
        "contentBytes": report.total_content_bytes,
        "indexBytes": report.master_index_bytes,
        "savingsPercent": format!("{:.1}", report.savings_percent()),
    }))
}

async fn serve(config: &Config) -> Result<()> {
    let dispatcher = Dispatcher::new(
        config.index_dir(),
        config.workspace_root(),
        config.system_rules_path(),
    );
    dispatcher
        .run(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
        .await
}

fn search(config: &Config, query: &str, options: SearchOptions, content: bool) -> Result<()> {
    let catalog = load_catalog(config)?;
    let hits = catalog.search(query, &options);

    if content {
        let mut loaded = Vec::with_capacity(hits.len());
        for hit in hits {
            loaded.push(catalog.get_by_name(&hit.name, Some(hit.kind()))?);
        }
        print_json(&loaded)
    } else {
        print_json(&hits)
    }
}

fn get(config: &Config, name: &str, kind: Option<ResourceKind>) -> Result<()> {
    let loaded = load_catalog(config)?.get_by_name(name, kind)?;
    print_json(&loaded)
}

fn list(config: &Config, kind: Option<ResourceKind>) -> Result<()> {
    let catalog = load_catalog(config)?;
    print_json(&catalog.list(kind))
}

fn stats(config: &Config) -> Result<()> {
    let catalog = load_catalog(config)?;
    print_json(&catalog.stats())
}

fn load_catalog(config: &Config) -> Result<ResourceCatalog> {
    Ok(ResourceCatalog::load(
        &config.index_dir(),
        config.workspace_root(),
    )?)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
