//! Turns the run's buckets and the newly-done diff into the ordered
//! Block Kit message the bot posts.

use tracing::warn;

use crate::config::Config;
use crate::models::{Status, Ticket, TicketBuckets};
use crate::slack::blocks::{Accessory, Block, Element, Text};
use crate::slack::client::SlackGateway;

const GREETING: &str = "Hello :wave:, _Grooming Bot_ at your service! @here\nHere is your daily update on the current tickets :smile:";
const GOODBYE: &str = "Thanks for your attention, _Grooming Bot_";
const EMPTY_SECTION: &str = "No tickets here !";

/// Shown when a ticket was closed with fewer approvers than the quorum
/// (an admin override).
const PARTIAL_GLYPH: &str = "🆗";
const COMPLETE_GLYPH: &str = "✅";

/// Compose the full report. The done section is populated with the
/// newly-done diff, never the raw done bucket, so tickets recorded in a
/// prior run are not re-shown. Per-ticket permalink and avatar lookups
/// degrade on failure; composition itself never fails.
pub fn compose(
    config: &Config,
    gateway: &dyn SlackGateway,
    buckets: &TicketBuckets,
    newly_done: &[Ticket],
) -> Vec<Block> {
    let mut blocks = vec![Block::section(Text::mrkdwn(GREETING))];

    push_group(&mut blocks, config, gateway, &buckets.done.label, newly_done);
    push_group(
        &mut blocks,
        config,
        gateway,
        &buckets.in_progress.label,
        &buckets.in_progress.tickets,
    );
    push_group(
        &mut blocks,
        config,
        gateway,
        &buckets.not_started.label,
        &buckets.not_started.tickets,
    );

    blocks.push(Block::section(Text::mrkdwn(GOODBYE)));
    blocks
}

fn push_group(
    blocks: &mut Vec<Block>,
    config: &Config,
    gateway: &dyn SlackGateway,
    label: &str,
    tickets: &[Ticket],
) {
    blocks.push(Block::header(label));
    blocks.push(Block::Divider);

    if tickets.is_empty() {
        blocks.push(Block::section(Text::plain(EMPTY_SECTION)));
        return;
    }

    for ticket in tickets {
        blocks.push(ticket_section(config, gateway, ticket));

        if !ticket.approvers.is_empty() {
            blocks.push(approver_context(config, gateway, ticket));
        }
    }
}

fn ticket_section(config: &Config, gateway: &dyn SlackGateway, ticket: &Ticket) -> Block {
    let accessory = match gateway.permalink(&config.channel_id, &ticket.timestamp) {
        Ok(url) => Some(Accessory::link_button("Message", url)),
        Err(error) => {
            warn!(ticket = %ticket.title, %error, "cannot resolve message permalink");
            None
        }
    };

    Block::Section {
        text: Text::plain(&ticket.title),
        accessory,
    }
}

fn approver_context(config: &Config, gateway: &dyn SlackGateway, ticket: &Ticket) -> Block {
    let mut elements = vec![Element::plain(status_glyph(config, ticket))];

    for approver in &ticket.approvers {
        match gateway.avatar_url(approver) {
            Ok(url) => elements.push(Element::avatar(url)),
            Err(error) => {
                warn!(user = %approver, %error, "cannot resolve approver avatar");
            }
        }
    }

    Block::Context { elements }
}

fn status_glyph(config: &Config, ticket: &Ticket) -> &'static str {
    if ticket.status == Status::Done && ticket.approvers.len() < config.team_size_approval {
        PARTIAL_GLYPH
    } else {
        COMPLETE_GLYPH
    }
}
