//! # Briefwire — Scheduled Intelligence Briefs
//!
//! Evaluates schedule rules, generates briefs through a layered backend
//! fallback, and appends them to per-topic history logs.
//!
//! Usage:
//!   briefwire run                  # Evaluate schedules once, refresh what is due
//!   briefwire run --all            # Refresh every topic regardless of schedule
//!   briefwire run --topic <id>     # Refresh a single topic
//!   briefwire serve                # Start the HTTP gateway
//!   briefwire daemon               # Recurring evaluation loop
//!   briefwire init                 # Write starter config + sample inputs

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use briefwire_core::BriefwireConfig;
use briefwire_schedule::{OutcomeStatus, RefreshRunner};

#[derive(Parser)]
#[command(
    name = "briefwire",
    version,
    about = "📰 Briefwire — Scheduled Intelligence Briefs"
)]
struct Cli {
    /// Path to config file (default: ~/.briefwire/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Evaluate schedules once and refresh whatever is due.
    Run {
        /// Refresh every topic regardless of schedule
        #[arg(long)]
        all: bool,

        /// Refresh a single topic by id
        #[arg(long, value_name = "ID", conflicts_with = "all")]
        topic: Option<String>,

        /// Evaluate at this RFC 3339 instant instead of now
        #[arg(long, value_name = "INSTANT", conflicts_with_all = ["all", "topic"])]
        at: Option<String>,
    },

    /// Start the HTTP gateway.
    Serve,

    /// Run the recurring evaluation loop.
    Daemon {
        /// Seconds between checks (each minute bucket fires at most once)
        #[arg(long, default_value = "20")]
        interval: u64,
    },

    /// Write starter config and sample inputs.
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "briefwire=debug,briefwire_schedule=debug,briefwire_generate=debug,briefwire_gateway=debug,tower_http=debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Command::Run { all, topic, at } => {
            let config = load_config(cli.config.as_deref())?;
            run_once(config, all, topic, at).await
        }
        Command::Serve => {
            let config = load_config(cli.config.as_deref())?;
            serve(config).await
        }
        Command::Daemon { interval } => {
            let config = load_config(cli.config.as_deref())?;
            daemon(config, interval).await
        }
        Command::Init => init(cli.config.as_deref()),
    }
}

fn load_config(path: Option<&Path>) -> Result<BriefwireConfig> {
    match path {
        Some(path) => Ok(BriefwireConfig::load_from(path)?),
        // --config wins; BRIEFWIRE_CONFIG is the env fallback
        None => match std::env::var("BRIEFWIRE_CONFIG") {
            Ok(env_path) => Ok(BriefwireConfig::load_from(Path::new(&env_path))?),
            Err(_) => Ok(BriefwireConfig::load()?),
        },
    }
}

async fn run_once(
    config: BriefwireConfig,
    all: bool,
    topic: Option<String>,
    at: Option<String>,
) -> Result<()> {
    let runner = RefreshRunner::new(config);

    if let Some(id) = topic {
        runner.run_topic(&id).await?;
        println!("✅ Refreshed topic '{id}'");
        return Ok(());
    }

    if all {
        let refreshed = runner.run_all().await?;
        println!("✅ Refreshed {refreshed} topic(s)");
        return Ok(());
    }

    let instant = match at {
        Some(ref s) => DateTime::parse_from_rfc3339(s)
            .map_err(|e| anyhow::anyhow!("Invalid --at instant '{s}': {e}"))?
            .with_timezone(&Utc),
        None => Utc::now(),
    };

    let report = runner.run_at(instant).await?;
    if report.due_count == 0 {
        println!(
            "📅 No schedules due at {}",
            instant.format("%Y-%m-%d %H:%M UTC")
        );
        return Ok(());
    }

    println!("🔔 {} schedule(s) due", report.due_count);
    for outcome in &report.outcomes {
        match outcome.status {
            OutcomeStatus::Success => println!(
                "   ✅ {} — {} topic(s) refreshed",
                outcome.schedule_id, outcome.topics_count
            ),
            OutcomeStatus::Error => println!(
                "   ❌ {} failed: {}",
                outcome.schedule_id,
                outcome.error.as_deref().unwrap_or("unknown error")
            ),
        }
    }
    Ok(())
}

async fn serve(config: BriefwireConfig) -> Result<()> {
    println!("📰 Briefwire v{}", env!("CARGO_PKG_VERSION"));
    println!(
        "   🌐 Gateway:  http://{}:{}",
        config.gateway.host, config.gateway.port
    );
    println!(
        "   📡 Trigger:  http://{}:{}/api/cron",
        config.gateway.host, config.gateway.port
    );
    println!("   📂 Data Dir: {}", config.resolve_data_dir().display());
    println!();

    if config.gateway.trigger_secret.is_empty() {
        tracing::warn!(
            "⚠️  No trigger secret configured! Set gateway.trigger_secret for production."
        );
    }

    briefwire_gateway::start(config).await
}

async fn daemon(config: BriefwireConfig, interval: u64) -> Result<()> {
    let schedules = briefwire_schedule::inputs::load_schedules(&config.schedules_path())?;
    for rule in &schedules {
        tracing::info!(
            "📅 Registered schedule '{}': {} at {} ({})",
            rule.id,
            rule.frequency,
            rule.time,
            rule.timezone.as_deref().unwrap_or("UTC")
        );
    }

    let runner = RefreshRunner::new(config);
    briefwire_schedule::daemon::run_daemon(runner, interval).await;
    Ok(())
}

fn init(config_path: Option<&Path>) -> Result<()> {
    println!("📰 Briefwire — Starter Setup\n");

    let path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(BriefwireConfig::default_path);
    let config = if path.exists() {
        println!("⚠️  Config already exists: {}", path.display());
        BriefwireConfig::load_from(&path)?
    } else {
        let config = BriefwireConfig::default();
        config.save_to(&path)?;
        println!("✅ Wrote config: {}", path.display());
        config
    };

    let data_dir = config.resolve_data_dir();
    std::fs::create_dir_all(&data_dir)?;

    let topics = serde_json::json!({
        "topics": [
            {
                "id": "ai-infrastructure",
                "title": "AI Infrastructure",
                "prompt": "Track the AI infrastructure market: compute supply, model serving stacks, and notable deployments.",
                "scheduleId": "daily-morning"
            }
        ]
    });
    let schedules = serde_json::json!({
        "schedules": [
            {
                "id": "daily-morning",
                "frequency": "daily",
                "time": "09:00",
                "timezone": "UTC"
            }
        ]
    });
    let instructions = "---\ntitle: Generation Instructions\n---\n\n\
        Write for an executive audience. Lead with what changed since the last\n\
        brief, quantify where possible, and keep the markdown body scannable:\n\
        short sections, bold key figures, bullet lists over paragraphs.\n";

    write_if_missing(
        &config.topics_path(),
        &serde_json::to_string_pretty(&topics)?,
    )?;
    write_if_missing(
        &config.schedules_path(),
        &serde_json::to_string_pretty(&schedules)?,
    )?;
    write_if_missing(&config.instructions_path(), instructions)?;

    println!("\nNext steps:");
    println!(
        "   1. Edit {} to add your topics",
        config.topics_path().display()
    );
    println!("   2. Run `briefwire run --all` for a first refresh");
    println!("   3. Run `briefwire serve` to expose the trigger endpoint");
    Ok(())
}

fn write_if_missing(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        println!("⚠️  Skipping existing file: {}", path.display());
    } else {
        std::fs::write(path, content)?;
        println!("✅ Wrote {}", path.display());
    }
    Ok(())
}
