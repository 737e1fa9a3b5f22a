mod commands;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use roster_core::{IndexNames, PagingConfig};
use roster_service::PageEngine;
use roster_storage::StoreBackend;
use tracing_subscriber::EnvFilter;

use crate::commands::lessons::LessonArgs;
use crate::commands::subscriptions::SubscriptionArgs;

#[derive(Parser)]
#[command(name = "roster")]
#[command(about = "Page through lesson and student subscription listings", long_about = None)]
struct Cli {
    /// Storage backend to read from
    #[arg(short, long, value_enum, global = true, default_value_t = Backend::Postgres)]
    backend: Backend,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Backend {
    Postgres,
    Elasticsearch,
}

#[derive(Subcommand)]
enum Commands {
    /// List lessons, earliest first (or latest first with --past)
    Lessons(LessonArgs),
    /// List student subscriptions, newest first by default
    Subscriptions(SubscriptionArgs),
}

async fn open_backend(backend: Backend) -> Result<StoreBackend> {
    let store = match backend {
        Backend::Postgres => {
            let url = std::env::var("DATABASE_URL")
                .context("DATABASE_URL must be set for the postgres backend")?;
            StoreBackend::new_postgres(&url).await?
        },
        Backend::Elasticsearch => {
            let url = std::env::var("ELASTICSEARCH_URL")
                .context("ELASTICSEARCH_URL must be set for the elasticsearch backend")?;
            StoreBackend::new_elasticsearch(&url, IndexNames::from_env())?
        },
    };
    tracing::info!(backend = store.name(), "storage backend ready");
    Ok(store)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let store = open_backend(cli.backend).await?;
    let engine = PageEngine::new(Arc::new(store), PagingConfig::from_env());

    match cli.command {
        Commands::Lessons(args) => commands::lessons::run(engine, args).await?,
        Commands::Subscriptions(args) => commands::subscriptions::run(engine, args).await?,
    }

    Ok(())
}
