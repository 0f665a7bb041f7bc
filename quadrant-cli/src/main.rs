use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::{Parser, Subcommand};
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

use quadrant_core::{
    SessionRegistry, SystemClock, TaskStats, UtcOffset, bucketize, classify,
    days_remaining_local, is_urgent, parse_local_deadline,
};
use quadrant_sched::{ReminderScheduler, SchedulerConfig, TaskStore};

mod api;
mod config;
mod sink;
mod state;

#[derive(Parser, Debug)]
#[command(name = "quadrant", version, about = "Eisenhower task matrix toolkit")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a default config.toml under ~/.quadrant
    Init,

    /// Run the reminder scheduler against the configured backend
    Serve {
        /// Override the configured poll interval, in seconds
        #[arg(long)]
        poll_interval: Option<u64>,
    },

    /// Fetch tasks and print timing buckets + quadrant stats
    Stats {
        /// Limit to one user's tasks; omit for all tasks
        #[arg(long)]
        user: Option<i64>,
    },

    /// Classify a task locally, without touching the backend
    Classify {
        /// Mark the task important
        #[arg(long, default_value_t = false)]
        important: bool,

        /// Deadline on your wall clock, "YYYY-MM-DD HH:MM"
        #[arg(long)]
        deadline: Option<String>,

        /// UTC offset in whole hours used to read the deadline (default +3)
        #[arg(long)]
        utc_offset: Option<i32>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Init => config::init_config(),
        Command::Serve { poll_interval } => serve(poll_interval).await,
        Command::Stats { user } => stats(user).await,
        Command::Classify { important, deadline, utc_offset } => {
            run_classify(important, deadline, utc_offset)
        }
    }
}

async fn serve(poll_override: Option<u64>) -> Result<()> {
    let cfg = config::load_config()?;

    if cfg.telegram.bot_token.is_empty() {
        bail!(
            "telegram.bot_token is not set; run `quadrant init` and edit {}",
            config::config_path()?.display()
        );
    }
    if cfg.sessions.is_empty() {
        bail!("no [[sessions]] configured; nothing to remind");
    }

    let registry = Arc::new(SessionRegistry::new());
    for seed in &cfg.sessions {
        registry.register(seed.user_id);
        if let Some(hours) = seed.utc_offset {
            registry
                .set_offset(seed.user_id, hours)
                .with_context(|| format!("utc_offset for session {}", seed.user_id))?;
        }
    }

    let store = api::ApiClient::new(&cfg.api.base_url, &cfg.api.token)?;
    let sink = sink::TelegramSink::new(&cfg.telegram.bot_token)?;

    let sched_config = SchedulerConfig {
        poll_interval: Duration::from_secs(
            poll_override.unwrap_or(cfg.scheduler.poll_interval_secs),
        ),
        ..SchedulerConfig::default()
    };

    let scheduler = ReminderScheduler::new(store, sink, registry, SystemClock, sched_config);

    let (stop_tx, stop_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = stop_tx.send(true);
        }
    });

    scheduler.run(stop_rx).await;
    Ok(())
}

async fn stats(user: Option<i64>) -> Result<()> {
    let cfg = config::load_config()?;
    let client = api::ApiClient::new(&cfg.api.base_url, &cfg.api.token)?;

    let tasks = match user {
        Some(user) => client.tasks_for_user(user).await,
        None => client.all_tasks().await,
    }
    .context("fetching tasks")?;
    let now = Utc::now();
    let buckets = bucketize(&tasks, now);
    let stats = TaskStats::collect(&tasks);

    println!(
        "Tasks: {} total ({} completed, {} pending)",
        stats.total, stats.completed, stats.pending
    );
    println!(
        "Quadrants: Q1={} Q2={} Q3={} Q4={}",
        stats.q1, stats.q2, stats.q3, stats.q4
    );
    println!("\nTiming:");
    println!("- completed on time: {}", buckets.completed_on_time);
    println!("- completed late:    {}", buckets.completed_late);
    println!("- pending on plan:   {}", buckets.on_plan_pending);
    println!("- pending overdue:   {}", buckets.overdue_pending);

    Ok(())
}

fn run_classify(important: bool, deadline: Option<String>, utc_offset: Option<i32>) -> Result<()> {
    let offset = match utc_offset {
        Some(hours) => UtcOffset::new(hours)?,
        None => UtcOffset::default(),
    };

    let deadline_utc = match deadline.as_deref() {
        Some(raw) => {
            let local = parse_local_deadline(raw)
                .with_context(|| format!("invalid deadline '{raw}', expected YYYY-MM-DD HH:MM"))?;
            Some(offset.local_to_utc(local))
        }
        None => None,
    };

    let now = Utc::now();

    println!("Quadrant: {}", classify(important, deadline_utc, now));
    println!("Urgent: {}", is_urgent(deadline_utc, now));
    match days_remaining_local(deadline_utc, now, offset) {
        Some(days) => println!("Days left ({offset}): {days}"),
        None => println!("Days left: no deadline"),
    }

    Ok(())
}
