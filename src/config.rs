use anyhow::{bail, Result};
use chrono::NaiveDate;

/// Immutable run configuration. Built once from the CLI and passed
/// explicitly into classification and composition.
#[derive(Debug, Clone)]
pub struct Config {
    pub token: String,
    pub channel_id: String,
    /// Approvals required to move a ticket to done.
    pub team_size_approval: usize,
    /// Reaction name counted toward the approval quorum.
    pub emoji_validation: String,
    /// Reaction name that closes a ticket regardless of quorum.
    pub emoji_admin: String,
    /// Fetch-window fallback for the very first run, when the ledger is
    /// still empty.
    pub first_init: Option<NaiveDate>,
}

impl Config {
    pub fn new(
        token: String,
        channel_id: String,
        team_size_approval: usize,
        emoji_validation: String,
        emoji_admin: String,
        first_init: Option<NaiveDate>,
    ) -> Result<Self> {
        if token.is_empty() {
            bail!("The Slack token must be defined");
        }
        if channel_id.is_empty() {
            bail!("The grooming channel id must be defined");
        }
        if team_size_approval == 0 {
            bail!("The team size approval must be at least 1");
        }
        if emoji_validation.is_empty() || emoji_admin.is_empty() {
            bail!("Emoji names must not be empty");
        }

        Ok(Config {
            token,
            channel_id,
            team_size_approval,
            emoji_validation,
            emoji_admin,
            first_init,
        })
    }
}
