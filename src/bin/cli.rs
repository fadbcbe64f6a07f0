//! Keyword Watcher CLI
//!
//! Polls the configured listing page and notifies when a post matches one of
//! the loaded keyword conditions.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use keyword_watcher::{
    error::Result,
    models::{Config, Post},
    pipeline::{self, MatchPipeline, Scheduler, TickOutcome, WatchState},
    services::{Condition, ConditionLoader, build_notifier, evaluate},
};
use tokio::io::{AsyncBufReadExt, BufReader};

/// Keyword Watcher - news listing keyword alerts
#[derive(Parser, Debug)]
#[command(
    name = "keyword-watcher",
    version,
    about = "Watches a news listing for posts matching keyword conditions"
)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "data/config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check the page on a timer; reads control commands from stdin
    Watch {
        /// Condition spreadsheet (.xlsx)
        #[arg(long)]
        conditions: Option<PathBuf>,

        /// Load everything but wait for `start`
        #[arg(long)]
        paused: bool,
    },

    /// Run a single check and print the result
    Check {
        /// Condition spreadsheet (.xlsx)
        #[arg(long)]
        conditions: Option<PathBuf>,
    },

    /// Evaluate one condition against an ad-hoc post
    Eval {
        /// Condition expression, e.g. "(금리 OR 환율) AND 속보"
        expression: String,

        #[arg(long, default_value = "")]
        title: String,

        #[arg(long, default_value = "")]
        description: String,
    },

    /// Validate configuration and, optionally, a condition file
    Validate {
        /// Condition spreadsheet (.xlsx)
        #[arg(long)]
        conditions: Option<PathBuf>,
    },
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load_or_default(&cli.config);

    match cli.command {
        Command::Watch { conditions, paused } => {
            config.validate()?;
            let scheduler = build_scheduler(&config).await?;
            let loader = ConditionLoader::new(&config.conditions);
            if let Some(path) = conditions.or_else(|| config.conditions.path.clone()) {
                load_conditions(scheduler.pipeline().state(), &loader, &path);
            }

            if !paused {
                scheduler.start();
            }
            log::info!("Commands: load <file>, start, stop, status, posts, quit");
            run_controls(&scheduler, &loader).await?;
            scheduler.stop();
        }

        Command::Check { conditions } => {
            config.validate()?;
            let state = Arc::new(WatchState::new());
            if let Some(path) = conditions.or_else(|| config.conditions.path.clone()) {
                let loader = ConditionLoader::new(&config.conditions);
                pipeline::reload_conditions(&state, &loader, &path)?;
            }

            let notifier = build_notifier(&config.notifier, &config.watcher).await?;
            let pipeline = MatchPipeline::from_config(&config, notifier, Arc::clone(&state))?;

            match pipeline.tick().await {
                TickOutcome::Failed(e) => return Err(e),
                TickOutcome::Matched(_) | TickOutcome::NoMatch { .. } | TickOutcome::Skipped => {}
            }
            println!("{}", state.feedback());
        }

        Command::Eval {
            expression,
            title,
            description,
        } => {
            let post = Post::new(title, description);
            match evaluate(&expression, &post) {
                Ok(true) => println!("match"),
                Ok(false) => println!("no match"),
                Err(e) => return Err(e.into()),
            }
        }

        Command::Validate { conditions } => {
            log::info!("Validating configuration...");
            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK");

            if let Some(path) = conditions.or_else(|| config.conditions.path.clone()) {
                let table = ConditionLoader::new(&config.conditions).load(&path)?;
                for entry in table.iter() {
                    let status = match Condition::parse(&entry.condition) {
                        Ok(_) => "ok".to_string(),
                        Err(e) => format!("invalid: {e}"),
                    };
                    println!("{} -> {} ({})", entry.condition, entry.tag, status);
                }
                log::info!("✓ {} condition(s) in {}", table.len(), path.display());
            }
        }
    }

    Ok(())
}

async fn build_scheduler(config: &Config) -> Result<Scheduler> {
    let state = Arc::new(WatchState::new());
    let notifier = build_notifier(&config.notifier, &config.watcher).await?;
    let pipeline = MatchPipeline::from_config(config, notifier, state)?;
    Ok(Scheduler::new(
        Arc::new(pipeline),
        Duration::from_secs(config.watcher.interval_secs),
    ))
}

fn load_conditions(state: &WatchState, loader: &ConditionLoader, path: &Path) {
    match pipeline::reload_conditions(state, loader, path) {
        Ok(count) => log::info!("Installed {} condition(s) from {}", count, path.display()),
        Err(e) => log::error!("Keeping previous conditions: {}", e),
    }
}

/// Read control commands until `quit`, end of input or Ctrl-C.
async fn run_controls(scheduler: &Scheduler, loader: &ConditionLoader) -> Result<()> {
    let state = Arc::clone(scheduler.pipeline().state());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => {
                log::info!("Interrupted");
                return Ok(());
            }
        };
        let Some(line) = line else {
            return Ok(());
        };

        let (command, argument) = match line.trim().split_once(char::is_whitespace) {
            Some((command, argument)) => (command, argument.trim()),
            None => (line.trim(), ""),
        };

        match command {
            "" => {}
            "load" if argument.is_empty() => log::warn!("Usage: load <file.xlsx>"),
            "load" => load_conditions(&state, loader, Path::new(argument)),
            "start" => {
                if !scheduler.start() {
                    log::info!("Already checking");
                }
            }
            "stop" => {
                if !scheduler.stop() {
                    log::info!("Not checking");
                }
            }
            "status" => {
                let last = state
                    .last_checked()
                    .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                    .unwrap_or_else(|| "never".to_string());
                println!("checking:   {}", state.is_checking());
                println!("loading:    {}", state.is_loading());
                println!("conditions: {}", state.conditions().len());
                println!("posts:      {}", state.posts().len());
                println!("last check: {}", last);
                println!("{}", state.feedback());
            }
            "posts" => {
                for (i, post) in state.posts().iter().enumerate() {
                    println!("{:>3}. {}", i + 1, post.title);
                    if !post.description.is_empty() {
                        println!("     {}", post.description);
                    }
                }
            }
            "quit" | "exit" => return Ok(()),
            other => log::warn!("Unknown command '{}'", other),
        }
    }
}
