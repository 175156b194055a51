//! winavg: sliding-window average over numbers fetched from a test server.
//!
//! Run with:  `RUST_LOG=info winavg fetch p --window 10`

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use winavg_config::AppConfig;
use winavg_core::{NumberKind, WindowState};
use winavg_processor::WindowProcessor;
use winavg_server::NumbersService;
use winavg_source::HttpNumberSource;
use winavg_store::{FileStore, KeyValueStore, MemoryStore};

#[derive(Parser, Debug)]
#[command(author, version, about = "Sliding-window average calculator")]
struct Args {
    /// Config file (default: $XDG_CONFIG_HOME/winavg/winavg.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch numbers of one kind and merge them into the window
    Fetch {
        /// p (prime), f (fibonacci), e (even) or r (random)
        kind: NumberKind,

        /// Window size; defaults to `[window] size` from config
        #[arg(long, short, allow_negative_numbers = true)]
        window: Option<i64>,
    },
    /// Print the persisted window state
    Show,
    /// Clear the persisted window state
    Reset,
    /// Check the connection to the test server
    Status,
    /// Serve `GET /numbers/{p|f|e|r}` over HTTP
    Serve {
        /// Listen address; defaults to `[server] listen` from config
        #[arg(long)]
        listen: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Structured logging on stderr; RUST_LOG controls verbosity (default: info).
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config_path = args.config.unwrap_or_else(winavg_config::default_path);
    let config = winavg_config::load(&config_path)?;

    tracing::debug!("winavg v{} using {}", env!("CARGO_PKG_VERSION"), config_path.display());

    let source = Arc::new(HttpNumberSource::new(&config.source)?);

    match args.command {
        Command::Fetch { kind, window } => {
            let processor = build_processor(&config, source)?;
            let size = window.unwrap_or(config.window.size);
            let state = processor
                .merge(kind, size)
                .await
                .with_context(|| format!("could not fetch {kind} numbers; window unchanged"))?;
            print_state(&state)?;
        }
        Command::Show => {
            let processor = build_processor(&config, source)?;
            print_state(&processor.current_state().await)?;
        }
        Command::Reset => {
            let processor = build_processor(&config, source)?;
            processor.reset().await?;
            eprintln!("Window state has been reset");
        }
        Command::Status => {
            let status = source.probe().await;
            println!("{status}");
            if !status.is_connected() {
                std::process::exit(1);
            }
        }
        Command::Serve { listen } => {
            let processor = Arc::new(build_processor(&config, source)?);
            let addr = listen.unwrap_or_else(|| config.server.listen.clone());
            let listener = tokio::net::TcpListener::bind(&addr)
                .await
                .with_context(|| format!("cannot bind {addr}"))?;
            let service = Arc::new(NumbersService::new(processor, config.window.size));

            tokio::select! {
                res = service.serve(listener) => res?,
                _ = tokio::signal::ctrl_c() => tracing::info!("shutting down"),
            }
        }
    }

    Ok(())
}

fn build_processor(config: &AppConfig, source: Arc<HttpNumberSource>) -> Result<WindowProcessor> {
    let store: Arc<dyn KeyValueStore> = if config.store.in_memory {
        Arc::new(MemoryStore::new())
    } else {
        let dir = config.store.resolved_directory();
        Arc::new(
            FileStore::open(&dir)
                .with_context(|| format!("cannot open state store at {}", dir.display()))?,
        )
    };
    Ok(WindowProcessor::new(store, source, config.window.storage_key.clone()))
}

fn print_state(state: &WindowState) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(state)?);
    Ok(())
}
