use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use groombot::commands;
use groombot::config::Config;
use groombot::ledger::SqliteLedger;
use groombot::slack::client::HttpSlackClient;

#[derive(Parser)]
#[command(name = "groombot")]
#[command(about = "Posts a grooming report for the ticket messages in a Slack channel")]
#[command(version)]
struct Cli {
    /// Path to the done-ticket ledger database
    #[arg(long, env = "GROOMBOT_DB", default_value = "groombot.db", global = true)]
    database: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify the channel, record newly done tickets and post the report
    Run {
        #[command(flatten)]
        args: RunArgs,
    },

    /// Same classification, but print the report blocks instead of
    /// posting; the ledger is left untouched
    Preview {
        #[command(flatten)]
        args: RunArgs,
    },

    /// List every done ticket recorded so far
    Ledger,
}

#[derive(Args)]
struct RunArgs {
    /// Slack bot token
    #[arg(long, env = "SLACK_TOKEN")]
    token: String,

    /// Channel to read tickets from and post the report to
    #[arg(long, env = "GROOMING_CHANNEL_ID")]
    channel: String,

    /// Approvals required to move a ticket to done
    #[arg(long, default_value_t = 3)]
    team_size_approval: usize,

    /// Reaction name counted toward the approval quorum
    #[arg(long, default_value = "white_check_mark")]
    emoji_validation: String,

    /// Reaction name that closes a ticket regardless of quorum
    #[arg(long, default_value = "ok")]
    emoji_admin: String,

    /// Date (YYYY-MM-DD) to start fetching from on the very first run
    #[arg(long)]
    first_init: Option<NaiveDate>,
}

impl RunArgs {
    fn into_config(self) -> Result<Config> {
        Config::new(
            self.token,
            self.channel,
            self.team_size_approval,
            self.emoji_validation,
            self.emoji_admin,
            self.first_init,
        )
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { args } => {
            let config = args.into_config()?;
            let gateway = HttpSlackClient::new(&config.token);
            let mut store = SqliteLedger::open(&cli.database)?;
            commands::run::run(&config, &gateway, &mut store)
        }

        Commands::Preview { args } => {
            let config = args.into_config()?;
            let gateway = HttpSlackClient::new(&config.token);
            let mut store = SqliteLedger::open(&cli.database)?;
            commands::run::preview(&config, &gateway, &mut store)
        }

        Commands::Ledger => {
            let store = SqliteLedger::open(&cli.database)?;
            commands::ledger::run(&store)
        }
    }
}
