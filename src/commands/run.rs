use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::config::Config;
use crate::ledger::{fetch_window_start, LedgerStore};
use crate::models::{LedgerEntry, Ticket, TicketBuckets};
use crate::report;
use crate::slack::client::SlackGateway;
use crate::tracking;

/// One full reporting run: load the ledger, fetch the channel window,
/// classify, diff, record the newly done tickets and post the report.
///
/// The ledger is appended exactly once, after all classification, so a
/// failure anywhere earlier leaves it untouched.
pub fn run(config: &Config, gateway: &dyn SlackGateway, store: &mut dyn LedgerStore) -> Result<()> {
    let (buckets, newly_done) = classify_window(config, gateway, store)?;

    if !newly_done.is_empty() {
        let entries: Vec<LedgerEntry> = newly_done.iter().map(LedgerEntry::from).collect();
        store
            .append(&entries)
            .context("Failed to record newly done tickets")?;
        info!(count = entries.len(), "recorded newly done tickets");
    }

    let blocks = report::compose(config, gateway, &buckets, &newly_done);
    gateway.post_message(&config.channel_id, &blocks)?;

    println!(
        "Posted grooming report: {} newly done, {} in progress, {} not started",
        newly_done.len(),
        buckets.in_progress.tickets.len(),
        buckets.not_started.tickets.len()
    );
    Ok(())
}

/// Dry run: same classification and diff, but the composed blocks are
/// printed as JSON and neither the ledger nor the channel is touched.
pub fn preview(
    config: &Config,
    gateway: &dyn SlackGateway,
    store: &mut dyn LedgerStore,
) -> Result<()> {
    let (buckets, newly_done) = classify_window(config, gateway, store)?;
    let blocks = report::compose(config, gateway, &buckets, &newly_done);

    println!("{}", serde_json::to_string_pretty(&blocks)?);
    Ok(())
}

fn classify_window(
    config: &Config,
    gateway: &dyn SlackGateway,
    store: &mut dyn LedgerStore,
) -> Result<(TicketBuckets, Vec<Ticket>)> {
    let ledger = store.load().context("Failed to read the ticket ledger")?;
    let window_start = fetch_window_start(&ledger, config.first_init)?;
    info!(entries = ledger.len(), oldest = %window_start, "loaded ticket ledger");

    let messages = gateway.fetch_history(&config.channel_id, window_start.timestamp())?;
    debug!(count = messages.len(), "fetched channel history");

    let buckets = tracking::aggregate(config, &messages);
    let newly_done = tracking::diff_newly_done(&ledger, &buckets);
    info!(
        done = buckets.done.tickets.len(),
        in_progress = buckets.in_progress.tickets.len(),
        not_started = buckets.not_started.tickets.len(),
        newly_done = newly_done.len(),
        "classified channel messages"
    );

    Ok((buckets, newly_done))
}
