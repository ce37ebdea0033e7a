//! CLI argument parsing and startup utilities
//!
//! Handles command-line argument parsing and token/host resolution.

use std::env;
use std::path::PathBuf;

use anyhow::{bail, Result};

use crate::config::Config;

pub const TOKEN_ENV: &str = "REPOTREE_TOKEN";

pub const USAGE: &str = "\
usage: repotree [tree] --page <snapshot.json> [options]
       repotree resolve --page <snapshot.json> [options]

options:
  --page, -p PATH     page snapshot to load
  --token, -t TOKEN   API token (else REPOTREE_TOKEN, else config)
  --host HOST         hosting site, e.g. github.com
  --show-non-code     also load trees on non-code pages
  --json              print JSON instead of an indented tree
  --verbose, -v       debug logging on stderr
  --config PATH       config file (default ~/.repotree/config.toml)
  --help, -h          show this message";

/// Subcommand to run
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Command {
    /// Resolve the page and print its tree
    #[default]
    Tree,
    /// Print only the resolved context; no network
    Resolve,
    Help,
}

/// Parsed command-line arguments
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Args {
    pub command: Command,
    pub page: Option<PathBuf>,
    pub token: Option<String>,
    pub host: Option<String>,
    pub show_non_code: bool,
    pub json: bool,
    pub verbose: bool,
    pub config: Option<PathBuf>,
}

/// Parse command-line arguments
pub fn parse_args() -> Result<Args> {
    parse_from(env::args().skip(1)) // Skip the binary name
}

pub fn parse_from<I>(argv: I) -> Result<Args>
where
    I: IntoIterator<Item = String>,
{
    let mut args = Args::default();
    let mut iter = argv.into_iter().peekable();

    // Check for subcommand first
    if let Some(first) = iter.peek() {
        match first.as_str() {
            "tree" => {
                iter.next();
            }
            "resolve" => {
                iter.next();
                args.command = Command::Resolve;
            }
            _ => {}
        }
    }

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--page" | "-p" => args.page = Some(PathBuf::from(value(&arg, iter.next())?)),
            "--token" | "-t" => args.token = Some(value(&arg, iter.next())?),
            "--host" => args.host = Some(value(&arg, iter.next())?),
            "--config" => args.config = Some(PathBuf::from(value(&arg, iter.next())?)),
            "--show-non-code" => args.show_non_code = true,
            "--json" => args.json = true,
            "--verbose" | "-v" => args.verbose = true,
            "--help" | "-h" => {
                args.command = Command::Help;
                return Ok(args);
            }
            _ => bail!("Unknown argument: {}", arg),
        }
    }

    if args.page.is_none() {
        bail!("Missing --page <snapshot.json>");
    }
    Ok(args)
}

fn value(flag: &str, next: Option<String>) -> Result<String> {
    match next {
        Some(v) => Ok(v),
        None => bail!("{} requires a value", flag),
    }
}

/// Load the config named on the command line, or the default one
pub fn load_config(args: &Args) -> Result<Config> {
    match &args.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

/// Resolve the token from explicit arg, env var, or config file
pub fn resolve_token(explicit: Option<&str>, config: &Config) -> Option<String> {
    if let Some(token) = explicit.filter(|t| !t.is_empty()) {
        return Some(token.to_string());
    }

    if let Ok(token) = env::var(TOKEN_ENV) {
        if !token.is_empty() {
            return Some(token);
        }
    }

    config.token.clone().filter(|t| !t.is_empty())
}

/// Resolve the host from explicit arg or config file
pub fn resolve_host(explicit: Option<&str>, config: &Config) -> String {
    explicit
        .filter(|h| !h.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| config.host.clone())
}
