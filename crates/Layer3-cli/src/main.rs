//! LLM Executor CLI - Main entry point

mod console;
mod manifest;
mod serve;

use clap::{Parser, Subcommand};
use console::ConsoleRuntime;
use llmexec_core::{operator, ExecutionRequest, ExecutorContext, SettingsSource};
use llmexec_foundation::{
    ExecutorConfig, JsonSettings, JsonStore, StaticSettings, EXECUTOR_CONFIG_FILE,
};
use manifest::ManifestHost;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// LLM Executor - let an agent run chat commands through a permission gate
#[derive(Parser, Debug)]
#[command(name = "llmexec")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Plugin manifest (JSON) used as the host command registry
    #[arg(short, long, default_value = "plugins.json")]
    manifest: PathBuf,

    /// Directory holding executor.json; re-read on every request
    #[arg(long)]
    config_dir: Option<PathBuf>,

    /// Requesting user id
    #[arg(short, long, default_value = "cli_user")]
    user: String,

    /// Platform name reported to the executor
    #[arg(long)]
    platform: Option<String>,

    /// Do not echo delivered chat messages
    #[arg(short, long)]
    quiet: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a default executor.json into .llmexec/
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
    /// Rebuild the command cache and print the count
    Refresh,
    /// Show executor status
    Status {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Execute one command
    Exec {
        /// Command name or alias
        name: String,

        /// Argument string
        #[arg(default_value = "")]
        args: String,

        /// User to mention (repeatable, maps to @0, @1, ...)
        #[arg(long = "at")]
        at: Vec<String>,

        /// Image URL sent as a quoted reply
        #[arg(long)]
        reply_image: Option<String>,

        /// Run as the bot account
        #[arg(long)]
        as_bot: bool,
    },
    /// List executable commands
    List {
        /// Exact plugin name
        category: Option<String>,
    },
    /// Print LLM tool definitions
    Tools,
    /// Serve JSON Lines tool calls on stdin/stdout
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let settings: Arc<dyn SettingsSource> = match &args.config_dir {
        Some(dir) => Arc::new(JsonSettings::new(JsonStore::new(dir))),
        None => {
            let config = ExecutorConfig::load().unwrap_or_else(|e| {
                eprintln!("Warning: Failed to load config: {}", e);
                ExecutorConfig::default()
            });
            Arc::new(StaticSettings::new(config))
        }
    };

    let ctx = ExecutorContext::new(
        Arc::new(ManifestHost::new(&args.manifest)),
        Arc::new(ConsoleRuntime::new(args.quiet)),
        settings,
    );

    match args.command {
        Command::Init { force } => init_config(force)?,
        Command::Refresh => {
            let outcome = ctx.refresh();
            println!("{}", operator::render_refresh(&outcome));
            if outcome.is_err() {
                std::process::exit(1);
            }
        }
        Command::Status { json } => {
            if let Err(e) = ctx.refresh() {
                eprintln!("Warning: {}", e);
            }
            let status = ctx.status();
            if json {
                println!("{}", serde_json::to_string_pretty(&status)?);
            } else {
                println!("{}", status.render());
            }
        }
        Command::Exec {
            name,
            args: cmd_args,
            at,
            reply_image,
            as_bot,
        } => {
            let mut request = ExecutionRequest::new(name, args.user.clone())
                .args(cmd_args)
                .mentions(at)
                .as_bot(as_bot);
            if let Some(url) = reply_image {
                request = request.reply_image(url);
            }
            if let Some(platform) = &args.platform {
                request = request.platform(platform.clone());
            }

            let result = ctx.execute(request).await;
            println!("{}", serde_json::to_string_pretty(&result.to_json())?);
            if !result.is_success() {
                std::process::exit(1);
            }
        }
        Command::List { category } => {
            let input = match category {
                Some(c) => serde_json::json!({ "category": c }),
                None => serde_json::json!({}),
            };
            let call_ctx = llmexec_core::ToolCallContext::new(args.user.clone());
            println!(
                "{}",
                ctx.call_tool("list_executable_commands", input, &call_ctx).await
            );
        }
        Command::Tools => {
            println!("{}", serde_json::to_string_pretty(&ctx.tools().definitions())?);
        }
        Command::Serve => {
            if let Err(e) = ctx.refresh() {
                eprintln!("Warning: {}", e);
            }
            serve::run(&ctx, &args.user).await?;
        }
    }

    Ok(())
}

/// 프로젝트 설정 파일 생성
fn init_config(force: bool) -> anyhow::Result<()> {
    let store = JsonStore::current_project()?;

    if store.exists(EXECUTOR_CONFIG_FILE) && !force {
        println!(
            "✓ {} already exists. Use --force to overwrite.",
            store.file_path(EXECUTOR_CONFIG_FILE).display()
        );
        return Ok(());
    }

    ExecutorConfig::default().save_to(&store)?;
    println!("  Created {}", store.file_path(EXECUTOR_CONFIG_FILE).display());
    Ok(())
}
