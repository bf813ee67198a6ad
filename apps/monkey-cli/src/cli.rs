use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use thiserror::Error;
use tokio::net::TcpListener;

use monkey_agent::{Agent, AppleScriptBackend};
use monkey_core::{group_blocks, parse_script, render_dry_run, Script, ScriptError};
use monkey_presenter::Presenter;

use crate::tui;

/// Process-level failure, mapped onto the documented exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("cannot read {path}: {source}")]
    ReadScript {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{0}")]
    Parse(#[from] ScriptError),
    #[error("--agent <host:port> is required unless --dry-run is set")]
    AgentRequired,
    #[error("invalid agent address '{addr}': {reason}")]
    Address { addr: String, reason: String },
    #[error("cannot bind agent port {port}: {source}")]
    Bind {
        port: u16,
        source: std::io::Error,
    },
    #[error("agent terminated: {0}")]
    Runtime(std::io::Error),
    #[error("terminal failure: {0}")]
    Terminal(anyhow::Error),
}

impl CliError {
    /// 1 = parse/validation, 2 = bind/connect, 3 = runtime.
    pub fn exit_code(&self) -> ExitCode {
        match self {
            CliError::ReadScript { .. } | CliError::Parse(_) | CliError::AgentRequired => {
                ExitCode::from(1)
            }
            CliError::Address { .. } | CliError::Bind { .. } => ExitCode::from(2),
            CliError::Runtime(_) | CliError::Terminal(_) => ExitCode::from(3),
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "code-monkey",
    version,
    about = "Two-machine presentation driver"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Start the demo-machine agent
    Agent {
        /// Script file, parsed for validation only
        script: PathBuf,
        /// TCP port to listen on (default: the script's agent_port)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Drive a presentation from this machine
    Present {
        /// Script file path
        script: PathBuf,
        /// Agent address as host:port
        #[arg(long)]
        agent: Option<String>,
        /// List the blocks without connecting or executing
        #[arg(long)]
        dry_run: bool,
    },
    /// Parse and group a script, reporting problems
    Check {
        /// Script file path
        script: PathBuf,
    },
}

impl Cli {
    pub async fn run(self) -> Result<(), CliError> {
        match self.command {
            Command::Check { script } => check(&script),
            Command::Present {
                script,
                agent,
                dry_run,
            } => present(&script, agent, dry_run).await,
            Command::Agent { script, port } => agent(&script, port).await,
        }
    }
}

pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn load_script(path: &Path) -> Result<Script, CliError> {
    let content = std::fs::read_to_string(path).map_err(|source| CliError::ReadScript {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_script(&content)?)
}

fn check(path: &Path) -> Result<(), CliError> {
    let script = load_script(path)?;
    let blocks = group_blocks(&script);
    println!(
        "Script '{}' is valid: {} directives, {} blocks",
        path.display(),
        script.lines.len(),
        blocks.len()
    );
    if let Some(title) = &script.front_matter.title {
        println!("Title: {title}");
    }
    Ok(())
}

async fn present(path: &Path, agent: Option<String>, dry_run: bool) -> Result<(), CliError> {
    let script = load_script(path)?;

    if dry_run {
        let blocks = group_blocks(&script);
        println!("=== Dry Run: {} ===\n", path.display());
        print!("{}", render_dry_run(&blocks));
        return Ok(());
    }

    let agent = agent.ok_or(CliError::AgentRequired)?;
    let addr: SocketAddr = agent.parse().map_err(|err| CliError::Address {
        addr: agent.clone(),
        reason: format!("{err}"),
    })?;

    let mut presenter = Presenter::new(script, addr);
    if let Err(err) = presenter.connect().await {
        // Recoverable: the TUI starts disconnected and offers retry.
        tracing::warn!(%addr, error = %err, "could not reach agent");
    }

    tui::run(presenter).await.map_err(CliError::Terminal)
}

async fn agent(path: &Path, port: Option<u16>) -> Result<(), CliError> {
    let script = load_script(path)?;
    let port = port.unwrap_or(script.front_matter.agent_port);

    let listener = TcpListener::bind(("0.0.0.0", port))
        .await
        .map_err(|source| CliError::Bind { port, source })?;

    let agent = Agent::new(Arc::new(AppleScriptBackend::new()));
    agent.serve(listener).await.map_err(CliError::Runtime)
}
