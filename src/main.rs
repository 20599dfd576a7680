//! Itemstore CLI - serve an in-memory item collection over HTTP

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use itemstore::config::{self, ItemstoreConfig};
use itemstore::ui;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "itemstore")]
#[command(version = "0.0.1")]
#[command(about = "In-memory item collection with filtered, sorted and paginated listing")]
#[command(long_about = r#"
Itemstore serves a single item collection over HTTP:
  • Create, read, update and delete items under /api/v1/items
  • List with ?category=, ?sort=field:asc|desc, ?page= and ?limit=
  • Health check at /health

Example usage:
  itemstore init
  itemstore serve --port 8080
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Path to the config file (defaults to itemstore.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Address to bind (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides config and PORT)
        #[arg(short, long)]
        port: Option<u16>,

        /// Disable per-client rate limiting
        #[arg(long)]
        no_rate_limit: bool,
    },

    /// Write a default config file
    Init {
        /// Where to write the config
        #[arg(short, long, default_value = "itemstore.toml")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    match cli.command {
        Commands::Serve { config: config_path, host, port, no_rate_limit } => {
            let mut settings = config::load_config(config_path.as_deref())?
                .unwrap_or_default()
                .with_env_overrides()?;

            if let Some(host) = host {
                settings.server.host = host;
            }
            if let Some(port) = port {
                settings.server.port = port;
            }
            if no_rate_limit {
                settings.rate_limit.enabled = false;
            }

            ui::serve_banner(&settings);

            itemstore::server::start_server(settings).await?;
        }

        Commands::Init { path, force } => {
            if let Err(e) = config::write_config(&path, &ItemstoreConfig::default(), force) {
                ui::config_failed(&path, &e);
                anyhow::bail!("could not write config");
            }
            ui::config_written(&path);
        }
    }

    Ok(())
}
