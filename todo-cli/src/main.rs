//! ToDo Merger - one dashboard for your assigned issues on GitHub and GitLab

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use todo_core::{CacheStore, Config, IssueSource, PrefsStore, Service, TodoRepo};
use todo_github::{GitHubSource, GitHubTodoRepo};
use todo_gitlab::{GitLabSource, GitLabTodoRepo};
use todo_web::AppState;

/// ToDo Merger: one dashboard for your assigned issues on GitHub and GitLab
#[derive(Parser, Debug)]
#[command(name = "todo-merger")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the app config file
    #[arg(short, long, global = true)]
    config_file: Option<PathBuf>,

    /// Port the dashboard listens on (overrides config and env)
    #[arg(short, long, env = "TODO_MERGER_PORT")]
    port: Option<u16>,

    /// Increase log verbosity (-v for info, -vv for debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show current configuration
    Config,
}

/// Build the issue sources and the optional todo repo from the account table
fn build_sources(
    config: &Config,
) -> anyhow::Result<(Vec<Box<dyn IssueSource>>, Option<Box<dyn TodoRepo>>)> {
    let mut sources: Vec<Box<dyn IssueSource>> = Vec::new();
    let mut todo_repo: Option<Box<dyn TodoRepo>> = None;

    for (name, account) in &config.accounts {
        let repo_here = config
            .todo_repo
            .as_ref()
            .filter(|todo| &todo.account == name);

        match account.service {
            Service::Github => {
                let source = GitHubSource::new(name.clone(), account.token.clone())
                    .with_context(|| format!("Failed to set up GitHub account '{}'", name))?;
                if let Some(todo) = repo_here {
                    todo_repo = Some(Box::new(GitHubTodoRepo::new(&source, &todo.repo)?));
                }
                sources.push(Box::new(source));
            }
            Service::Gitlab => {
                let url = account
                    .url
                    .as_deref()
                    .with_context(|| format!("GitLab account '{}' has no url", name))?;
                let source = GitLabSource::new(name.clone(), url, account.token.clone())
                    .with_context(|| format!("Failed to set up GitLab account '{}'", name))?;
                if let Some(todo) = repo_here {
                    todo_repo = Some(Box::new(GitLabTodoRepo::new(&source, todo.repo.clone())));
                }
                sources.push(Box::new(source));
            }
        }
    }

    Ok((sources, todo_repo))
}

fn print_config(config: &Config) {
    println!("ToDo Merger Configuration");
    println!("=========================");
    println!();
    println!("Server:");
    println!("  port: {}", config.server.port);
    println!("Cache:");
    println!("  timeout: {:?}", config.cache.timeout);
    println!();
    println!("Accounts:");
    if config.accounts.is_empty() {
        println!("  (none configured)");
    }
    for (name, account) in &config.accounts {
        println!(
            "  {}: {} at {} (token: ***)",
            name,
            account.service,
            account.url.as_deref().unwrap_or("default")
        );
    }
    println!();
    match &config.todo_repo {
        Some(todo) => println!("Todo repo: {} on account '{}'", todo.repo, todo.account),
        None => println!("Todo repo: (not configured)"),
    }
    println!();
    if let Some(path) = Config::default_config_path() {
        println!("Config file: {}", path.display());
        if path.exists() {
            println!("  (exists)");
        } else {
            println!("  (not found - using defaults)");
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing; RUST_LOG wins when set
    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    // Load configuration with overrides (CLI > env > file > defaults)
    let config = Config::load_with_overrides(cli.config_file.clone(), cli.port)?;

    if let Some(Commands::Config) = cli.command {
        print_config(&config);
        return Ok(());
    }

    if config.accounts.is_empty() {
        tracing::warn!(
            "No accounts configured - the dashboard will be empty. \
             Add [accounts.*] sections to the config file."
        );
    }

    let (sources, todo_repo) = build_sources(&config)?;

    let prefs = PrefsStore::new(
        PrefsStore::default_path().context("Could not determine the config directory")?,
    );
    let cache = CacheStore::new(
        CacheStore::default_dir().context("Could not determine the cache directory")?,
    );

    let colored_labels = config
        .todo_repo
        .as_ref()
        .is_some_and(|todo| todo.colored_labels);

    let state = Arc::new(AppState::new(
        sources,
        todo_repo,
        colored_labels,
        prefs,
        cache,
        config.cache.timeout,
    ));

    println!(
        "ToDo Merger will be available on http://localhost:{}",
        config.server.port
    );

    todo_web::serve(state, config.server.port)
        .await
        .context("Dashboard server failed")?;

    Ok(())
}
