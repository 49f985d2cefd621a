//! CLI command handlers.
//!
//! Wires the SQLite stores, feed client, and services together and executes
//! the requested subcommand.

use std::time::Duration;

use chrono::Utc;
use tracing::info;

use super::command::{Cli, Commands, ReportArgs, RunArgs, SyncArgs};
use crate::adapter::outbound::feed::FeedClient;
use crate::adapter::outbound::sqlite::database::connection::{create_pool, run_migrations};
use crate::adapter::outbound::sqlite::{SqliteMasterStore, SqliteTrendStore};
use crate::config::Config;
use crate::domain::{Channel, RowFilter, Topic, TopicWindowRequest};
use crate::error::Result;
use crate::port::{MasterStore, TrendStore};
use crate::service::aggregate::keyword_frequencies;
use crate::service::report::daily_digest;
use crate::service::{
    select_window, MasterCachePolicy, Orchestrator, OrchestratorSettings, RetentionSync,
};

/// Execute the parsed CLI command against the configured stores.
///
/// # Errors
/// Returns the first fatal error from store setup or the command itself.
pub async fn execute(cli: Cli, config: Config) -> Result<()> {
    let pool = create_pool(&config.database)?;
    run_migrations(&pool)?;

    let trend_store = SqliteTrendStore::new(pool.clone());
    let master_store = SqliteMasterStore::new(pool);

    match cli.command {
        Commands::Run(args) => run(args, &config, trend_store, master_store).await,
        Commands::Sync(args) => sync(args, &config, trend_store, master_store).await,
        Commands::Report(args) => report(&args, &trend_store).await,
    }
}

async fn run(
    args: RunArgs,
    config: &Config,
    trend_store: SqliteTrendStore,
    master_store: SqliteMasterStore,
) -> Result<()> {
    let fetcher = FeedClient::new(config.feed.clone())?;
    let orchestrator = Orchestrator::new(
        trend_store,
        master_store,
        fetcher,
        MasterCachePolicy {
            freshness_secs: config.cache.freshness_secs,
            min_records: config.cache.min_records,
        },
        OrchestratorSettings {
            retention_days: config.cache.retention_days,
            min_frequency: config.cache.min_frequency,
            fetch_timeout: Duration::from_secs(config.feed.timeout_secs),
        },
    );

    let request = TopicWindowRequest::trailing(
        Topic::new(args.topic),
        Channel::new(args.channel),
        Utc::now().date_naive(),
        args.window_days.saturating_sub(1),
    );
    let report = orchestrator.run(&request).await?;

    println!("{}", report.digest);
    Ok(())
}

/// Rebuild one day's trend rows from the persisted master cache, without
/// touching the external feed. Useful after a retention or aggregation
/// settings change.
async fn sync(
    args: SyncArgs,
    config: &Config,
    trend_store: SqliteTrendStore,
    master_store: SqliteMasterStore,
) -> Result<()> {
    let topic = Topic::new(args.topic);
    let channel = Channel::new(args.channel);
    let date = args.date.unwrap_or_else(|| Utc::now().date_naive());

    let records = master_store.load(&topic, &channel).await?;
    let day = select_window(&records, date, 0);
    info!(%topic, %channel, %date, records = day.len(), "rebuilding from master cache");

    let rows = keyword_frequencies(&day, &topic, &channel, date);
    let synced = RetentionSync::new(trend_store)
        .sync(
            &topic,
            &channel,
            date,
            rows,
            config.cache.retention_days,
            config.cache.min_frequency,
        )
        .await?;

    println!("Synced {synced} rows for '{topic}' on '{channel}' ({date}).");
    Ok(())
}

async fn report(args: &ReportArgs, trend_store: &SqliteTrendStore) -> Result<()> {
    let topic = Topic::new(args.topic.as_str());
    let channel = Channel::new(args.channel.as_str());

    let rows = trend_store
        .get(&RowFilter::new().topic(&topic).channel(&channel))
        .await?;
    println!("{}", daily_digest(&topic, &channel, &rows));
    Ok(())
}
