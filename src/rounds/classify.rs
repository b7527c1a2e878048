use serde::Serialize;

use super::{Round, RoundStatus};

/// A room's rounds as one viewer sees them.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Buckets {
    /// Unanswered and waiting on the viewer.
    pub inbox: Vec<Round>,
    /// Unanswered and asked by the viewer.
    pub sent: Vec<Round>,
    /// Answered, whoever asked.
    pub history: Vec<Round>,
}

impl Buckets {
    pub fn inbox_count(&self) -> usize {
        self.inbox.len()
    }
}

/// Whether `sender` is the viewer. An empty identity on either side never matches.
pub fn is_mine(sender: &str, viewer: &str) -> bool {
    !sender.is_empty() && !viewer.is_empty() && sender == viewer
}

/// Splits `rounds` into inbox, sent and history for `viewer`.
///
/// Single pass, keeps the relative order of the input inside every bucket.
/// Anything that isn't answered counts as pending.
pub fn classify<I>(rounds: I, viewer: &str) -> Buckets
where
    I: IntoIterator<Item = Round>,
{
    let mut buckets = Buckets::default();
    for round in rounds {
        match round.status {
            RoundStatus::Answered => buckets.history.push(round),
            RoundStatus::Pending if is_mine(&round.question_sender, viewer) => buckets.sent.push(round),
            RoundStatus::Pending => buckets.inbox.push(round),
        }
    }
    buckets
}
