use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::{info, warn};

use crate::config::Config;
use crate::db::SeenStore;
use crate::jobs::{JSearchSource, Job, KeywordMatcher, ListingSource, TelegramNotifier};
use crate::worker::{CycleRunner, Pipeline, Trigger};

/// Polls a job-search provider and sends matching listings to Telegram
#[derive(Debug, Parser)]
#[command(name = "job-alert-bot", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP control surface and the check schedule (default)
    Serve,

    /// Run a single full cycle, print its report and exit
    RunOnce,

    /// Fetch one page and show which listings would match; sends nothing
    Probe {
        /// Search query to use instead of the configured one
        #[arg(long)]
        query: Option<String>,

        /// Show at most this many listings
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
}

/// Wire the pipeline from configuration
pub fn build_runner(config: &Config) -> std::io::Result<Arc<CycleRunner>> {
    let source = JSearchSource::new(config.rapidapi_key.clone(), config.search_query.clone())
        .map_err(std::io::Error::other)?;
    let notifier = TelegramNotifier::new(config.bot_token.clone(), config.chat_id.clone())
        .map_err(std::io::Error::other)?;

    let pipeline = Pipeline::new(
        Arc::new(source),
        Arc::new(notifier),
        KeywordMatcher::new(&config.keywords),
        SeenStore::load(&config.seen_file),
        config.notify_delay,
    );
    Ok(Arc::new(CycleRunner::new(pipeline)))
}

pub async fn run_once(config: Config) -> std::io::Result<()> {
    let runner = build_runner(&config)?;

    if let Some(report) = runner.try_run(Trigger::Manual).await {
        let json = serde_json::to_string_pretty(&report).map_err(std::io::Error::other)?;
        println!("{}", json);
    }
    Ok(())
}

pub async fn probe(config: Config, query: Option<String>, limit: usize) -> std::io::Result<()> {
    let query = query.unwrap_or_else(|| config.search_query.clone());
    let source = JSearchSource::new(config.rapidapi_key.clone(), query.clone())
        .map_err(std::io::Error::other)?;
    let matcher = KeywordMatcher::new(&config.keywords);

    info!("Probing provider with query={:?}", query);
    info!("Keyword profile: {}", matcher.keywords().join(", "));
    let listings = match source.fetch().await {
        Ok(listings) => listings,
        Err(e) => {
            warn!("Probe fetch failed: {}", e);
            return Err(std::io::Error::other(e));
        }
    };

    let total = listings.len();
    let mut matching = 0;
    for (index, job) in listings.into_iter().map(Job::from).enumerate() {
        let hits = matcher.matched_keywords(&job);
        if !hits.is_empty() {
            matching += 1;
        }
        if index < limit {
            println!(
                "{:>2}. [{}] {} @ {} ({})",
                index + 1,
                job.dedup_id().unwrap_or("no id"),
                job.title,
                job.company,
                job.location
            );
            if hits.is_empty() {
                println!("    no keyword match");
            } else {
                println!("    matches: {}", hits.join(", "));
            }
        }
    }

    println!("Jobs matching keywords: {}/{}", matching, total);
    Ok(())
}
