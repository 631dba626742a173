//! `stoker` - interactive console serving the sample `item` commands.

use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use stoker::sample::{Catalog, Collection, sample_registry};
use stoker::{LineOutcome, Shell, ShellConfig, StdoutSink};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "stoker")]
#[command(about = "Interactive command console with completion")]
#[command(version)]
struct Args {
    /// Config file (default: .stoker/config.toml in the working directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log filter when RUST_LOG is unset (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Run a command line and exit; repeat to run several in order
    #[arg(short = 'c', long = "command", value_name = "LINE")]
    commands: Vec<String>,

    /// Print completions for a partial line, one per line, and exit
    #[arg(long, value_name = "LINE")]
    complete: Option<String>,

    /// Prompt override
    #[arg(long)]
    prompt: Option<String>,

    /// Do not print the greeting in interactive mode
    #[arg(long)]
    no_banner: bool,
}

fn load_config(args: &Args) -> Result<ShellConfig> {
    let mut config = match &args.config {
        Some(path) => ShellConfig::load_from_path(path),
        None => ShellConfig::load(&std::env::current_dir().context("reading working directory")?),
    };
    if let Some(level) = &args.log_level {
        config.log_level = level.clone();
    }
    if let Some(prompt) = &args.prompt {
        config.prompt = prompt.clone();
    }
    Ok(config)
}

fn init_tracing(level: &str) {
    // Logging goes to stderr; stdout carries command output.
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"))),
        )
        .init();
}

fn run() -> Result<ExitCode> {
    let args = Args::parse();

    // Config decides the log level, so its own warnings go through a
    // temporary stderr subscriber.
    let config = {
        let bootstrap = tracing_subscriber::fmt()
            .with_writer(io::stderr)
            .with_env_filter(EnvFilter::new("warn"))
            .finish();
        tracing::subscriber::with_default(bootstrap, || load_config(&args))?
    };
    init_tracing(&config.log_level);

    let registry = sample_registry(Arc::new(Catalog::sample()), Arc::new(Collection::new()))
        .context("building command registry")?;
    tracing::debug!(commands = ?registry.names().collect::<Vec<_>>(), "registry ready");

    let sink = StdoutSink;
    let shell = Shell::new(registry, config, &sink);

    if let Some(line) = &args.complete {
        for candidate in shell.complete_line(line) {
            println!("{candidate}");
        }
        return Ok(ExitCode::SUCCESS);
    }

    if !args.commands.is_empty() {
        for line in &args.commands {
            match shell.execute_line(line) {
                Ok(LineOutcome::Continue) => {}
                Ok(LineOutcome::Exit) => break,
                Err(err) => {
                    eprintln!("error: {err}");
                    return Ok(ExitCode::from(1));
                }
            }
        }
        return Ok(ExitCode::SUCCESS);
    }

    let stdin = io::stdin();
    if !stdin.is_terminal() {
        shell
            .run(stdin.lock(), io::stdout())
            .context("console input/output failed")?;
        return Ok(ExitCode::SUCCESS);
    }
    if !args.no_banner {
        println!(
            "stoker v{} - 'commands' lists commands, '<command> --help' explains one, Tab completes, 'exit' leaves",
            env!("CARGO_PKG_VERSION")
        );
    }
    shell.run_interactive().context("line editor failed")?;
    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("[stoker] Error: {:#}", e);
            ExitCode::from(1)
        }
    }
}
