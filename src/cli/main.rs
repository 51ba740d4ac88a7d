use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};

use png_comment::{api, config, metadata};

#[derive(Parser, Debug)]
#[command(
    name = "png-comment-server",
    version,
    about = "HTTP service that embeds a JSON comment into the tEXt metadata of PNG images"
)]
struct Cli {
    /// Path to config file (default: config.json next to binary)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Initialize a default config.json and exit
    #[arg(long)]
    init: bool,

    /// Address to bind to (overrides config and PNG_COMMENT_BIND)
    #[arg(long, value_name = "ADDR")]
    bind: Option<String>,

    /// Port to listen on (overrides config and PNG_COMMENT_PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print the UserComment stored in a PNG file and exit
    #[arg(long = "show-comment", value_name = "PNG")]
    show_comment: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Handle --init
    if cli.init {
        let config = config::Config::default();
        let path = cli.config.as_deref();
        config.save(path)?;
        let save_path = match path {
            Some(p) => p.to_path_buf(),
            None => config::Config::config_path()?,
        };
        println!("Default config written to {}", save_path.display());
        return Ok(());
    }

    // Handle --show-comment
    if let Some(ref path) = cli.show_comment {
        return print_comment(path);
    }

    let mut config = config::Config::load(cli.config.as_deref())?;
    config.apply_env_overrides()?;
    if let Some(bind) = cli.bind {
        config.server.bind_address = bind;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    config.server.validate()?;

    api::serve(&config).await
}

fn print_comment(path: &Path) -> Result<()> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let comment = metadata::read_user_comment(&bytes)
        .with_context(|| format!("Failed to read PNG metadata from {}", path.display()))?;

    match comment {
        Some(text) => match serde_json::from_str::<serde_json::Value>(&text) {
            Ok(value) => println!("{}", serde_json::to_string_pretty(&value)?),
            Err(_) => println!("{text}"),
        },
        None => log::info!("No {} entry in {}", metadata::USER_COMMENT_KEY, path.display()),
    }
    Ok(())
}
