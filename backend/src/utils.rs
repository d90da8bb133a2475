use time::OffsetDateTime;
use uuid::Uuid;
use pollbot_shared::models::PollId;

pub const POLL_ID_PREFIX: &str = "poll-";

/// `poll-<unix nanos>-<8 random hex chars>`.
pub fn generate_poll_id() -> PollId {
    let nanos = OffsetDateTime::now_utc().unix_timestamp_nanos();
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}{}-{}", POLL_ID_PREFIX, nanos, &suffix[..8])
}
