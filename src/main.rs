use std::io::IsTerminal;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use serde_json::json;
use tracing_subscriber::EnvFilter;

use repotree::cli::{self, Args, Command};
use repotree::context::{ContextResolver, DefaultBranchCache, Resolution};
use repotree::diff::DiffOverlay;
use repotree::fetch::GitHubClient;
use repotree::page::PageSnapshot;
use repotree::pipeline::{LoadedTree, Outcome, TreeLoader};
use repotree::render::render_forest;

const LOG_ENV: &str = "REPOTREE_LOG";

// ANSI color codes
const DIM: &str = "\x1b[2m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

fn init_tracing(verbose: bool) -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .try_init()
        .map_err(|error| anyhow::anyhow!(error))?;

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = match cli::parse_args() {
        Ok(args) => args,
        Err(err) => {
            eprintln!("{}\n\n{}", err, cli::USAGE);
            std::process::exit(2);
        }
    };
    if args.command == Command::Help {
        println!("{}", cli::USAGE);
        return Ok(());
    }

    init_tracing(args.verbose)?;

    let config = cli::load_config(&args)?;
    let page_path = args.page.as_deref().context("Missing --page <snapshot.json>")?;
    let page = PageSnapshot::load(page_path)?;

    let mut options = config.load_options();
    options.show_non_code_pages |= args.show_non_code;
    let resolver = ContextResolver::new(config.resolver_config(), Arc::new(DefaultBranchCache::new()));

    match args.command {
        Command::Resolve => {
            let resolution = resolver.resolve(&page, options.show_non_code_pages, None);
            print_resolution(&resolution, args.json)
        }
        _ => {
            let host = cli::resolve_host(args.host.as_deref(), &config);
            let token = cli::resolve_token(args.token.as_deref(), &config);
            let client = GitHubClient::new(&host, token)?;
            let overlay = DiffOverlay::new(config.diff.rename_marker.clone());
            let loader = TreeLoader::new(client, resolver, overlay, options);
            run_tree(&loader, &page, &args).await
        }
    }
}

async fn run_tree(loader: &TreeLoader<GitHubClient>, page: &PageSnapshot, args: &Args) -> Result<()> {
    let outcome = match loader.load(page, page).await {
        Ok(outcome) => outcome,
        Err(err) if err.is_recoverable() => {
            bail!(
                "{}\nhint: set lazy_on_truncated = true in the config to load directories on demand",
                err
            )
        }
        Err(err) => return Err(err.into()),
    };

    match outcome {
        Outcome::Ready(tree) => print_tree(&tree, args.json),
        Outcome::Skipped(reason) => {
            eprintln!("{DIM}nothing to show: {:?}{RESET}", reason);
            Ok(())
        }
        Outcome::Superseded => Ok(()),
    }
}

fn print_tree(tree: &LoadedTree, as_json: bool) -> Result<()> {
    if as_json {
        println!("{}", serde_json::to_string_pretty(tree).context("Failed to serialize tree")?);
        return Ok(());
    }

    let color = std::io::stdout().is_terminal();
    let title = format!("{}@{}", tree.context.key(), tree.context.git_ref);
    if color {
        println!("{BOLD}{}{RESET}", title);
    } else {
        println!("{}", title);
    }
    for line in render_forest(&tree.forest, tree.submodules(), color) {
        println!("{}", line);
    }
    if tree.lazy {
        eprintln!("{DIM}listing truncated by the server; directories were not expanded{RESET}");
    }
    Ok(())
}

fn print_resolution(resolution: &Resolution, as_json: bool) -> Result<()> {
    let value = match resolution {
        Resolution::Skip(reason) => json!({ "skip": format!("{:?}", reason) }),
        Resolution::Ready(context) => json!({ "context": context }),
        Resolution::NeedsDefaultBranch(context) => {
            json!({ "context": context, "needs_default_branch": true })
        }
    };

    if as_json {
        println!("{}", serde_json::to_string_pretty(&value).context("Failed to serialize context")?);
        return Ok(());
    }

    match resolution {
        Resolution::Skip(reason) => println!("skipped: {:?}", reason),
        Resolution::Ready(context) => println!("{}@{}", context.key(), context.git_ref),
        Resolution::NeedsDefaultBranch(context) => {
            println!("{}@<default branch>", context.key())
        }
    }
    Ok(())
}
