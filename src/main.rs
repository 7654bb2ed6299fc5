//! Advisor - multi-agent advisory swarm for sales leads
//!
//! Runs the swarm for a lead stored as JSON, printing each step as it
//! happens and the consultation script at the end. With the `web` feature
//! it can also start the HTTP/WebSocket server.

mod cli;

use advisor_core::{
    apply_effect_to_lead, load_config, load_from_file, market, sample_config, AdvisorConfig,
    FileMarketContext, Lead, MarketContextProvider, ProviderRegistry, StepStatus, SwarmEffect,
    SwarmEngine, SwarmObserver, SwarmOutcome, SwarmStep,
};
use anyhow::Context;
use cli::{Command, RunArgs, USAGE};
use std::sync::{Arc, Once};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing subscriber (only once), logging to stderr
fn init_tracing() {
    TRACING_INIT.call_once(|| {
        tracing_subscriber::registry()
            .with(tracing_subscriber::EnvFilter::new(
                std::env::var("RUST_LOG").unwrap_or_else(|_| "advisor=info,advisor_core=info".into()),
            ))
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    });
}

/// Prints progress to stderr so stdout carries only the result
struct ConsoleObserver;

impl SwarmObserver for ConsoleObserver {
    fn on_step(&self, step: &SwarmStep) {
        match step.status {
            StepStatus::Thinking => eprintln!("[{}] thinking...", step.agent_name),
            StepStatus::Done => eprintln!(
                "[{}] done: {}",
                step.agent_name,
                step.output.as_deref().unwrap_or_default()
            ),
        }
    }

    fn on_effect(&self, effect: &SwarmEffect) {
        match effect {
            SwarmEffect::PersistPsychology { update, .. } => eprintln!(
                "  -> profile: DISC {}, risk tolerance {}",
                update.disc_type, update.risk_tolerance
            ),
            SwarmEffect::PersistPriority { from, to, .. } => {
                eprintln!("  -> priority: {} -> {}", from, to)
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let command = match cli::parse(std::env::args().skip(1)) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("Error: {}\n\n{}", e, USAGE);
            std::process::exit(2);
        }
    };

    match command {
        Command::Run(args) => run(args).await,
        Command::Init => {
            print!("{}", sample_config());
            Ok(())
        }
        Command::Serve { port } => serve(port).await,
        Command::Version => {
            println!("advisor {}", advisor_core::version());
            Ok(())
        }
        Command::Help => {
            println!("{}", USAGE);
            Ok(())
        }
    }
}

#[cfg(feature = "web")]
async fn serve(port: u16) -> anyhow::Result<()> {
    advisor_server::run_server(port).await
}

#[cfg(not(feature = "web"))]
async fn serve(_port: u16) -> anyhow::Result<()> {
    anyhow::bail!("advisor was built without the `web` feature")
}

fn resolve_config(args: &RunArgs) -> anyhow::Result<AdvisorConfig> {
    if let Some(path) = &args.config {
        return load_from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()));
    }

    let cwd = std::env::current_dir()?;
    Ok(load_config(&cwd).unwrap_or_else(|e| {
        eprintln!("Warning: Failed to load config: {}. Using defaults.", e);
        AdvisorConfig::default()
    }))
}

async fn run(args: RunArgs) -> anyhow::Result<()> {
    init_tracing();

    let config = resolve_config(&args)?;

    let raw = std::fs::read_to_string(&args.lead)
        .with_context(|| format!("Failed to read lead file {}", args.lead.display()))?;
    let mut lead: Lead = serde_json::from_str(&raw)
        .with_context(|| format!("Invalid lead JSON in {}", args.lead.display()))?;
    tracing::debug!(lead_id = %lead.id, "Loaded lead");

    let registry = ProviderRegistry::from_config(&config).context(
        "No usable LLM provider (set GEMINI_API_KEY, OPENAI_API_KEY or configure .advisor.toml)",
    )?;

    let market: Arc<dyn MarketContextProvider> = match &args.market {
        Some(path) => Arc::new(FileMarketContext::new(path)),
        None => market::from_config(&config.market),
    };

    let engine = SwarmEngine::new(registry, config.run.clone()).with_market(market);
    let outcome = engine.run(&lead, &ConsoleObserver).await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print_outcome(&outcome);
    }

    if args.write_back && !outcome.effects.is_empty() {
        for effect in &outcome.effects {
            apply_effect_to_lead(&mut lead, effect);
        }
        std::fs::write(&args.lead, serde_json::to_string_pretty(&lead)?)
            .with_context(|| format!("Failed to write lead file {}", args.lead.display()))?;
        eprintln!("Updated {}", args.lead.display());
    }

    Ok(())
}

fn print_outcome(outcome: &SwarmOutcome) {
    println!("{}", outcome.consultation_script);
    println!();
    println!("Priority: {}", outcome.lead_priority);
    if !outcome.key_insights.is_empty() {
        println!("Key insights:");
        for insight in &outcome.key_insights {
            println!("  - {}", insight);
        }
    }
    if !outcome.degraded_roles.is_empty() {
        let roles: Vec<&str> = outcome.degraded_roles.iter().map(|r| r.display_name()).collect();
        eprintln!("Warning: unavailable specialists: {}", roles.join(", "));
    }
}
