use serde::{Serialize, Deserialize};
use thiserror::Error;

pub const CREATE_USAGE: &str = "/poll create Question | Option 1 | Option 2";
pub const VOTE_USAGE: &str = "/poll vote poll-123456789 2";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", tag = "command")]
pub enum Command {
    Create { question: String, options: Vec<String> },
    Vote { poll_id: String, option: usize },
    Results { poll_id: String },
    Close { poll_id: String },
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command")]
    Unknown,
    #[error("Expected: {CREATE_USAGE}")]
    CreateUsage,
    #[error("Expected: {VOTE_USAGE}")]
    VoteUsage,
    #[error("Option number must be a positive integer, got {0:?}")]
    OptionNumber(String),
    #[error("Expected: /poll {0} <poll ID>")]
    PollIdUsage(&'static str),
}

impl Command {
    pub fn parse(text: &str) -> Result<Self, CommandError> {
        let text = text.trim();
        let (verb, rest) = text
            .split_once(char::is_whitespace)
            .map(|(v, r)| (v, r.trim()))
            .unwrap_or((text, ""));

        // A verb needs arguments to count as that command.
        if rest.is_empty() {
            return Err(CommandError::Unknown);
        }

        match verb {
            "create" => Self::parse_create(rest),
            "vote" => Self::parse_vote(rest),
            "results" => Self::single_id(rest, "results").map(|poll_id| Command::Results { poll_id }),
            "close" => Self::single_id(rest, "close").map(|poll_id| Command::Close { poll_id }),
            _ => Err(CommandError::Unknown),
        }
    }

    pub fn poll_id(&self) -> Option<&str> {
        match self {
            Command::Create { .. } => None,
            Command::Vote { poll_id, .. }
            | Command::Results { poll_id }
            | Command::Close { poll_id } => Some(poll_id),
        }
    }

    fn parse_create(rest: &str) -> Result<Self, CommandError> {
        let mut parts = rest.split('|').map(str::trim);
        let question = parts.next().unwrap_or_default().to_string();
        let options: Vec<String> = parts.map(str::to_string).collect();
        if options.is_empty() {
            return Err(CommandError::CreateUsage);
        }
        Ok(Command::Create { question, options })
    }

    fn parse_vote(rest: &str) -> Result<Self, CommandError> {
        let args: Vec<&str> = rest.split_whitespace().collect();
        let [poll_id, option] = args.as_slice() else {
            return Err(CommandError::VoteUsage);
        };
        let option = option
            .parse::<usize>()
            .map_err(|_| CommandError::OptionNumber(option.to_string()))?;
        Ok(Command::Vote { poll_id: poll_id.to_string(), option })
    }

    fn single_id(rest: &str, verb: &'static str) -> Result<String, CommandError> {
        let args: Vec<&str> = rest.split_whitespace().collect();
        match args.as_slice() {
            [poll_id] => Ok(poll_id.to_string()),
            _ => Err(CommandError::PollIdUsage(verb)),
        }
    }
}
