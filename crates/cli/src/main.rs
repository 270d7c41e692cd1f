mod config;
mod error;
mod tools;

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use engine::{
    BatchPolicy, Orchestrator, StrictAdapter, ToolCallRequest, Transcript, WithTimeout,
};
use policy::{ENV_STRICT_TOOLS, parse_flag};
use tracing_subscriber::EnvFilter;

use config::Config;
use error::{Error, Result};

const CONFIG_FILE: &str = "toolgate.toml";

#[derive(Parser)]
#[command(name = "toolgate")]
#[command(about = "Run a batch of LLM tool calls under a gating policy", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the config file (defaults to ./toolgate.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute tool calls read from a JSON file
    Run(RunArgs),
    /// List the built-in tools
    Tools,
}

#[derive(Args)]
struct RunArgs {
    /// JSON array of tool calls
    calls: PathBuf,

    /// Reject unregistered tools before execution
    #[arg(long, conflicts_with = "permissive")]
    strict: bool,

    /// Defer unregistered tools to execution time
    #[arg(long)]
    permissive: bool,

    /// Maximum number of concurrent calls
    #[arg(short = 'j', long)]
    max_concurrency: Option<usize>,

    /// Run calls one at a time and print the resulting transcript
    #[arg(long)]
    sequential: bool,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Run(args) => cmd_run(config, args).await,
        Commands::Tools => cmd_tools(),
    }
}

async fn cmd_run(config: Config, args: RunArgs) -> Result<()> {
    let env = |key: &str| std::env::var(key).ok();

    // stdout carries only the JSON output.
    if let Some(notice) = strict_notice(env) {
        eprintln!("{notice}");
    }

    let policy = resolve_policy(config.batch, &args, env)?;
    let calls = read_calls(&args.calls)?;
    tracing::info!(
        calls = calls.len(),
        strict = policy.strict,
        max_concurrency = policy.max_concurrency,
        sequential = args.sequential,
        "running tool calls"
    );

    let registry = WithTimeout::new(tools::builtin(), config.tools.timeout());

    let output = if args.sequential {
        let adapter = StrictAdapter::new(registry).with_strict(policy.strict);
        let mut transcript = Transcript::new();
        adapter.handle_turn(&mut transcript, &calls).await;
        serde_json::to_string_pretty(&transcript)?
    } else {
        let report = Orchestrator::new(registry).run_batch(calls, &policy).await?;
        serde_json::to_string_pretty(&report)?
    };

    println!("{output}");
    Ok(())
}

fn cmd_tools() -> Result<()> {
    for name in tools::builtin().names() {
        println!("{name}");
    }
    Ok(())
}

/// Notice shown when the environment switches strict mode on.
fn strict_notice(lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
    lookup(ENV_STRICT_TOOLS)
        .and_then(|raw| parse_flag(&raw))
        .filter(|strict| *strict)
        .map(|_| format!("Strict tools mode requested via {ENV_STRICT_TOOLS}"))
}

/// File, then environment, then flags.
fn resolve_policy(
    base: BatchPolicy,
    args: &RunArgs,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<BatchPolicy> {
    let mut policy = base.with_env(lookup)?;

    if args.strict {
        policy.strict = true;
    }
    if args.permissive {
        policy.strict = false;
    }
    if let Some(max) = args.max_concurrency {
        policy.max_concurrency = max;
    }

    policy.validate()?;
    Ok(policy)
}

fn read_calls(path: &Path) -> Result<Vec<ToolCallRequest>> {
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|source| Error::InvalidCalls {
        path: path.to_path_buf(),
        source,
    })
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Ok(Config::load(path)?),
        None if Path::new(CONFIG_FILE).exists() => Ok(Config::load(CONFIG_FILE)?),
        None => Ok(Config::default()),
    }
}
