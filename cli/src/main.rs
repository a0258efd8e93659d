//! CLI entrypoint for flare
//!
//! This is the main binary that wires together all layers using
//! dependency injection: configuration → registry + HTTP invoker →
//! ProcessCommandUseCase.

use anyhow::{Result, bail};
use clap::Parser;
use flare_application::{ModelInvoker, ProcessCommandUseCase};
use flare_domain::{ModelId, ModelRegistry};
use flare_infrastructure::{
    CachedModelRegistry, ConfigLoader, FileConfig, HttpCatalogSource, HttpModelInvoker,
    SystemClock,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Execute a FLARE command against one or more model backends
///
/// Example: flare '{ flare model:mistral,llama vote `What is Rust?` }'
#[derive(Parser)]
#[command(name = "flare", version)]
struct Cli {
    /// The FLARE command text
    command: Option<String>,

    /// Path to a config file (overrides flare.toml discovery)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Skip config file discovery and use built-in defaults
    #[arg(long)]
    no_config: bool,

    /// Overall deadline in seconds (overrides config)
    #[arg(long)]
    timeout: Option<u64>,

    /// Suppress informational output
    #[arg(short, long)]
    quiet: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let filter = if cli.quiet {
        EnvFilter::new("error")
    } else {
        match cli.verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("info"),
            2 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let command_text = match cli.command {
        Some(text) => text,
        None => bail!("A FLARE command is required, e.g. '{{ flare model:mistral `Say hi` }}'"),
    };

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref()).map_err(|e| anyhow::anyhow!(e))?
    };

    // === Dependency Injection ===
    let invoker = Arc::new(HttpModelInvoker::from_config(&config.providers));
    let registry = build_registry(&config, &invoker).await?;

    let mut use_case = ProcessCommandUseCase::new(
        Arc::clone(&invoker) as Arc<dyn ModelInvoker>,
        registry,
    )
    .with_dispatch_params(config.dispatch.to_params());

    if let Some(model) = &config.synthesis.model {
        use_case = use_case.with_synthesis_model(ModelId::new(model.clone()));
    }

    let overall_timeout = cli
        .timeout
        .map(Duration::from_secs)
        .or_else(|| config.dispatch.overall_timeout());
    if let Some(timeout) = overall_timeout {
        use_case = use_case.with_overall_timeout(timeout);
    }

    let outcome = use_case.execute(&command_text).await?;

    println!("{}", outcome.text);
    Ok(())
}

/// Pick the registry implementation: models pinned in the config file, or
/// a cached catalog fetched from the default endpoint.
async fn build_registry(
    config: &FileConfig,
    invoker: &HttpModelInvoker,
) -> Result<Arc<dyn ModelRegistry>> {
    if !config.registry.models.is_empty() {
        return Ok(Arc::new(config.registry.to_registry()));
    }

    let Some(endpoint) = invoker.default_endpoint() else {
        bail!(
            "No models registered: add [[registry.models]] entries or a \
             [providers] default endpoint to flare.toml"
        );
    };

    let ttl = Duration::from_secs(config.registry.ttl_secs.unwrap_or(300));
    let registry = CachedModelRegistry::new(
        Arc::new(HttpCatalogSource::new(endpoint.clone())),
        Arc::new(SystemClock),
        ttl,
    );
    registry.refresh().await?;
    info!("Registry loaded from catalog: {} models", registry.get().len());

    Ok(Arc::new(registry))
}
