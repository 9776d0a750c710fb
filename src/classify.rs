//! Message eligibility, status classification and ticket construction.

use std::sync::OnceLock;

use regex::Regex;

use crate::config::Config;
use crate::models::{Status, Ticket};
use crate::slack::types::{Message, Reaction};

/// A candidate ticket title: `[TAG] summary`, checked against the first
/// line of the message only.
fn title_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[(.*)\](.*)").expect("title pattern is valid"))
}

/// First line of the message body; titles end at the first line break.
pub fn title_line(text: &str) -> &str {
    text.lines().next().unwrap_or("")
}

fn is_thread_reply(message: &Message) -> bool {
    message.thread_ts.as_deref().is_some_and(|ts| !ts.is_empty())
}

fn is_bot(message: &Message) -> bool {
    message.bot_id.as_deref().is_some_and(|id| !id.is_empty())
}

fn is_join_or_leave(message: &Message) -> bool {
    message.text.contains("has joined") || message.text.contains("has left")
}

/// Whether a raw channel message is a ticket candidate at all: an
/// ordinary top-level post by a human whose first line carries a
/// bracketed tag. Messages failing this are dropped silently.
pub fn is_eligible(message: &Message) -> bool {
    message.kind == "message"
        && !is_thread_reply(message)
        && !is_bot(message)
        && !is_join_or_leave(message)
        && title_regex().is_match(title_line(&message.text))
}

/// Derive the workflow status and approver set from a message's
/// reactions and reply count.
///
/// The admin emoji closes the ticket outright. Otherwise the validation
/// emoji closes it once a single reaction reaches the quorum; a
/// validation reaction below quorum leaves the ticket in progress, as
/// does reply activity on its own.
pub fn classify(config: &Config, reactions: &[Reaction], reply_count: u32) -> (Status, Vec<String>) {
    for reaction in reactions {
        if reaction.name == config.emoji_admin {
            return (Status::Done, reaction.users.clone());
        }
    }

    let mut validation_seen = false;
    let mut approvers: Vec<String> = Vec::new();

    for reaction in reactions {
        if reaction.name == config.emoji_validation {
            // The last matching reaction supplies the approver list.
            approvers = reaction.users.clone();

            if reaction.count as usize >= config.team_size_approval {
                return (Status::Done, approvers);
            }
            validation_seen = true;
        }
    }

    if !validation_seen && reply_count == 0 {
        return (Status::NotStarted, Vec::new());
    }

    (Status::InProgress, approvers)
}

/// Assemble a ticket from an eligible message. Callers must have applied
/// [`is_eligible`] first; no validation happens here.
pub fn build_ticket(config: &Config, message: &Message) -> Ticket {
    let (status, approvers) = classify(config, &message.reactions, message.reply_count);

    Ticket {
        id: message.client_msg_id.clone().unwrap_or_default(),
        title: title_line(&message.text).to_string(),
        timestamp: message.ts.clone(),
        status,
        approvers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn config() -> Config {
        Config {
            token: "xoxb-test".to_string(),
            channel_id: "C0123".to_string(),
            team_size_approval: 3,
            emoji_validation: "white_check_mark".to_string(),
            emoji_admin: "ok".to_string(),
            first_init: None,
        }
    }

    fn message(text: &str) -> Message {
        Message {
            kind: "message".to_string(),
            client_msg_id: Some("msg-1".to_string()),
            text: text.to_string(),
            ts: "1700000000.000100".to_string(),
            ..Default::default()
        }
    }

    fn reaction(name: &str, users: &[&str]) -> Reaction {
        Reaction {
            name: name.to_string(),
            users: users.iter().map(|u| u.to_string()).collect(),
            count: users.len() as u32,
        }
    }

    #[test]
    fn test_admin_override_is_done_regardless_of_count() {
        let (status, approvers) = classify(&config(), &[reaction("ok", &["U01"])], 5);
        assert_eq!(status, Status::Done);
        assert_eq!(approvers, vec!["U01"]);
    }

    #[test]
    fn test_admin_override_checked_before_validation() {
        let reactions = vec![
            reaction("white_check_mark", &["U01", "U02", "U03"]),
            reaction("ok", &["U09"]),
        ];
        let (status, approvers) = classify(&config(), &reactions, 0);
        assert_eq!(status, Status::Done);
        assert_eq!(approvers, vec!["U09"]);
    }

    #[test]
    fn test_validation_at_quorum_is_done() {
        let reactions = vec![reaction("white_check_mark", &["U01", "U02", "U03"])];
        let (status, approvers) = classify(&config(), &reactions, 0);
        assert_eq!(status, Status::Done);
        assert_eq!(approvers, vec!["U01", "U02", "U03"]);
    }

    #[test]
    fn test_validation_below_quorum_is_in_progress() {
        let reactions = vec![reaction("white_check_mark", &["U01", "U02"])];
        let (status, approvers) = classify(&config(), &reactions, 0);
        assert_eq!(status, Status::InProgress);
        assert_eq!(approvers, vec!["U01", "U02"]);
    }

    #[test]
    fn test_last_validation_reaction_supplies_approvers() {
        // Two below-quorum entries sharing the validation name: the one
        // scanned last wins.
        let reactions = vec![
            reaction("white_check_mark", &["U01"]),
            reaction("eyes", &["U05"]),
            reaction("white_check_mark", &["U02", "U03"]),
        ];
        let (status, approvers) = classify(&config(), &reactions, 0);
        assert_eq!(status, Status::InProgress);
        assert_eq!(approvers, vec!["U02", "U03"]);
    }

    #[test]
    fn test_no_reactions_no_replies_is_not_started() {
        let (status, approvers) = classify(&config(), &[], 0);
        assert_eq!(status, Status::NotStarted);
        assert!(approvers.is_empty());
    }

    #[test]
    fn test_unrelated_reactions_do_not_start_a_ticket() {
        let (status, approvers) = classify(&config(), &[reaction("eyes", &["U01"])], 0);
        assert_eq!(status, Status::NotStarted);
        assert!(approvers.is_empty());
    }

    #[test]
    fn test_replies_alone_mean_in_progress() {
        let (status, approvers) = classify(&config(), &[], 4);
        assert_eq!(status, Status::InProgress);
        assert!(approvers.is_empty());
    }

    #[test]
    fn test_duplicate_users_in_reaction_are_preserved() {
        let reactions = vec![reaction("white_check_mark", &["U01", "U01"])];
        let (_, approvers) = classify(&config(), &reactions, 0);
        assert_eq!(approvers, vec!["U01", "U01"]);
    }

    #[test]
    fn test_eligible_ticket_message() {
        assert!(is_eligible(&message("[BUG-1] Fix crash\nmore text")));
    }

    #[test]
    fn test_empty_brackets_are_still_eligible() {
        assert!(is_eligible(&message("[] untagged")));
    }

    #[test]
    fn test_missing_brackets_excluded() {
        assert!(!is_eligible(&message("no brackets here")));
    }

    #[test]
    fn test_brackets_on_second_line_excluded() {
        assert!(!is_eligible(&message("intro line\n[BUG-2] too late")));
    }

    #[test]
    fn test_thread_reply_excluded() {
        let mut msg = message("[BUG-1] Fix crash");
        msg.thread_ts = Some("1699990000.000001".to_string());
        assert!(!is_eligible(&msg));
    }

    #[test]
    fn test_bot_message_excluded() {
        let mut msg = message("[BUG-1] Fix crash");
        msg.bot_id = Some("B042".to_string());
        assert!(!is_eligible(&msg));
    }

    #[test]
    fn test_join_and_leave_messages_excluded() {
        assert!(!is_eligible(&message("[U09] has joined the channel")));
        assert!(!is_eligible(&message("[U09] has left the channel")));
    }

    #[test]
    fn test_non_message_events_excluded() {
        let mut msg = message("[BUG-1] Fix crash");
        msg.kind = "channel_purpose".to_string();
        assert!(!is_eligible(&msg));
    }

    #[test]
    fn test_build_ticket_uses_first_line_as_title() {
        let ticket = build_ticket(&config(), &message("[BUG-1] Fix crash\nmore text"));
        assert_eq!(ticket.id, "msg-1");
        assert_eq!(ticket.title, "[BUG-1] Fix crash");
        assert_eq!(ticket.timestamp, "1700000000.000100");
        assert_eq!(ticket.status, Status::NotStarted);
        assert!(ticket.approvers.is_empty());
    }

    #[test]
    fn test_build_ticket_below_quorum_scenario() {
        let mut msg = message("[BUG-1] Fix crash\nmore text");
        msg.reactions = vec![reaction("white_check_mark", &["U01", "U02"])];
        let ticket = build_ticket(&config(), &msg);
        assert_eq!(ticket.status, Status::InProgress);
        assert_eq!(ticket.approvers, vec!["U01", "U02"]);
    }

    #[test]
    fn test_build_ticket_at_quorum_scenario() {
        let mut msg = message("[BUG-1] Fix crash\nmore text");
        msg.reactions = vec![reaction("white_check_mark", &["U01", "U02", "U03"])];
        let ticket = build_ticket(&config(), &msg);
        assert_eq!(ticket.status, Status::Done);
        assert_eq!(ticket.approvers.len(), 3);
    }

    prop_compose! {
        fn arb_reaction()(
            name in "[a-z_]{1,16}",
            users in proptest::collection::vec("U[0-9A-Z]{2,8}", 0..5),
            extra in 0u32..3,
        ) -> Reaction {
            let count = users.len() as u32 + extra;
            Reaction { name, users, count }
        }
    }

    proptest! {
        #[test]
        fn prop_classify_never_panics(
            reactions in proptest::collection::vec(arb_reaction(), 0..8),
            reply_count in 0u32..50,
        ) {
            let (status, approvers) = classify(&config(), &reactions, reply_count);
            if status == Status::NotStarted {
                prop_assert!(approvers.is_empty());
            }
        }

        #[test]
        fn prop_admin_reaction_always_means_done(
            mut reactions in proptest::collection::vec(arb_reaction(), 0..6),
            reply_count in 0u32..50,
        ) {
            reactions.push(Reaction {
                name: "ok".to_string(),
                users: vec!["U01".to_string()],
                count: 1,
            });
            let (status, _) = classify(&config(), &reactions, reply_count);
            prop_assert_eq!(status, Status::Done);
        }

        #[test]
        fn prop_title_is_prefix_of_text(text in "[\\PC\n]{0,120}") {
            let title = title_line(&text);
            prop_assert!(text.starts_with(title));
            prop_assert!(!title.contains('\n'));
        }
    }
}
