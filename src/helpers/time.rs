use chrono::Utc;
use tokio::time::Instant;

/// Share event id sent to the issuing service: current unix time in seconds.
pub fn share_event_id() -> u64 {
    Utc::now().timestamp().max(0) as u64
}

pub fn get_instant() -> Instant {
    Instant::now()
}
