use serde::{Serialize, Deserialize};
use pollbot_shared::{command::{CREATE_USAGE, VOTE_USAGE}, models::*, CommandError, PollError};

pub const IN_CHANNEL: &str = "in_channel";

/// Chat webhook response body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Reply {
    pub response_type: String,
    pub text: String,
}

impl Reply {
    pub fn in_channel(text: impl Into<String>) -> Self {
        Self {
            response_type: IN_CHANNEL.into(),
            text: text.into(),
        }
    }
}

pub fn created(poll: &CreatedPoll) -> String {
    let mut msg = format!("Created poll *{}* (ID: `{}`):\n", poll.question, poll.id);
    for (i, option) in poll.options.iter().enumerate() {
        msg.push_str(&format!("{}. {}\n", i + 1, option));
    }
    msg.push_str(&format!("\nTo vote: `/poll vote {} <option number>`", poll.id));
    msg
}

pub fn voted(receipt: &VoteReceipt) -> String {
    format!(
        "✅ {}, you voted for *{}* in poll *{}*.",
        receipt.voter, receipt.option_label, receipt.question
    )
}

pub fn results(tally: &Tally) -> String {
    let mut msg = format!("📊 Results for *{}*:\n", tally.question);
    for option in &tally.options {
        msg.push_str(&format!("{}. {} — {} vote(s)\n", option.position, option.label, option.votes));
    }
    if tally.closed {
        msg.push_str("(poll closed)\n");
    }
    msg
}

pub fn closed(receipt: &CloseReceipt) -> String {
    format!("🔒 Poll *{}* has been closed. Voting is over.", receipt.question)
}

pub fn poll_error(error: &PollError) -> String {
    match error {
        PollError::InvalidFormat(reason) => {
            format!("Invalid poll: {}. Example:\n`{}`", reason, CREATE_USAGE)
        }
        PollError::PollNotFound(id) => format!("Poll with ID `{}` was not found.", id),
        PollError::PollClosed => "Voting in this poll has ended.".into(),
        PollError::AlreadyVoted => "You have already voted in this poll.".into(),
        PollError::InvalidOption { position, count } => {
            format!("Option {} does not exist. Choose a number from 1 to {}.", position, count)
        }
        PollError::AlreadyClosed => "This poll has already been closed.".into(),
        PollError::NotAuthor => "You cannot close this poll because you did not create it.".into(),
    }
}

pub fn command_error(error: &CommandError) -> String {
    match error {
        CommandError::Unknown => format!("Unknown command. Use: `{}`", CREATE_USAGE),
        CommandError::CreateUsage => format!("Wrong format. Example:\n`{}`", CREATE_USAGE),
        CommandError::VoteUsage => format!("Wrong format. Example: `{}`", VOTE_USAGE),
        CommandError::OptionNumber(_) => "The option number must be a positive number.".into(),
        CommandError::PollIdUsage(verb) => format!("Wrong format. Example: `/poll {} poll-123456789`", verb),
    }
}
