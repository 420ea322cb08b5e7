use std::{io::BufRead, path::PathBuf, sync::Arc};

use anyhow::Context;
use clap::{Parser, Subcommand};
use realty_api::{hash_password, Server};
use realty_core::{ConfigManager, LoggingConfig};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "realty-api", version, about = "JSON API for the bilingual real-estate site")]
struct Cli {
    /// Directory holding default.toml, {env}.toml and local.toml
    #[arg(long, env = "REALTY_CONFIG_DIR", global = true)]
    config_dir: Option<PathBuf>,

    /// Environment name selecting {env}.toml
    #[arg(long, env = "APP_ENV", global = true)]
    env: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Print an argon2 hash for admin.password_hash
    HashPassword {
        /// Password to hash; read from stdin when omitted
        #[arg(long)]
        password: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(cli.config_dir, cli.env).await,
        Command::HashPassword { password } => {
            let password = match password {
                Some(password) => password,
                None => read_line().context("Failed to read password from stdin")?,
            };
            anyhow::ensure!(!password.is_empty(), "password cannot be empty");
            println!("{}", hash_password(&password)?);
            Ok(())
        }
    }
}

async fn serve(config_dir: Option<PathBuf>, env: Option<String>) -> anyhow::Result<()> {
    let config = Arc::new(ConfigManager::new(config_dir, env)?);
    init_tracing(&config.settings().logging);
    info!(env = config.env(), dir = ?config.config_dir(), "Starting realty-api");

    let server = Server::new(config).await?;
    server.run().await?;
    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},tower_http=info", logging.level)));
    let registry = tracing_subscriber::registry().with(filter);
    if logging.json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

fn read_line() -> std::io::Result<String> {
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
