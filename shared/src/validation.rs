use crate::error::PollError;
use crate::models::NewPoll;

pub const MAX_QUESTION_LENGTH: usize = 300;
pub const MAX_OPTION_LENGTH: usize = 100;
pub const MAX_OPTIONS: usize = 20;
pub const MIN_OPTIONS: usize = 2;

fn invalid(reason: impl Into<String>) -> PollError {
    PollError::InvalidFormat(reason.into())
}

/// Trims the input and checks it can become a poll.
pub fn validate_new_poll<S: AsRef<str>>(question: &str, options: &[S]) -> Result<NewPoll, PollError> {
    let question = question.trim();
    if question.is_empty() { return Err(invalid("question is empty")); }
    if question.chars().count() > MAX_QUESTION_LENGTH {
        return Err(invalid(format!("question exceeds {MAX_QUESTION_LENGTH} characters")));
    }

    let options: Vec<String> = options.iter().map(|o| o.as_ref().trim().to_string()).collect();
    if options.len() < MIN_OPTIONS {
        return Err(invalid(format!("at least {MIN_OPTIONS} options are required")));
    }
    if options.len() > MAX_OPTIONS {
        return Err(invalid(format!("at most {MAX_OPTIONS} options are allowed")));
    }
    if let Some(idx) = options.iter().position(|o| o.is_empty()) {
        return Err(invalid(format!("option {} is empty", idx + 1)));
    }
    if let Some(idx) = options.iter().position(|o| o.chars().count() > MAX_OPTION_LENGTH) {
        return Err(invalid(format!("option {} exceeds {MAX_OPTION_LENGTH} characters", idx + 1)));
    }

    Ok(NewPoll { question: question.to_string(), options })
}

/// Checks a 1-based position against the option count.
pub fn validate_position(position: usize, count: usize) -> Result<usize, PollError> {
    if position == 0 || position > count {
        return Err(PollError::InvalidOption { position, count });
    }
    Ok(position)
}
