use anyhow::Result;
use chrono::DateTime;

use crate::ledger::LedgerStore;

/// Print every recorded done ticket in append order.
pub fn run(store: &dyn LedgerStore) -> Result<()> {
    let entries = store.load()?;

    if entries.is_empty() {
        println!("No tickets recorded yet.");
        return Ok(());
    }

    for (index, entry) in entries.iter().enumerate() {
        println!(
            "#{:<4} {:<50} {}",
            index + 1,
            truncate(&entry.title, 50),
            recorded_date(&entry.timestamp)
        );
    }

    Ok(())
}

fn recorded_date(timestamp: &str) -> String {
    timestamp
        .split('.')
        .next()
        .and_then(|seconds| seconds.parse::<i64>().ok())
        .and_then(|seconds| DateTime::from_timestamp(seconds, 0))
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn truncate(s: &str, max_chars: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max_chars {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_chars - 3).collect();
        format!("{}...", truncated)
    }
}
