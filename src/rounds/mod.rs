mod classify;
pub(crate) mod render;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sqlx::SqlitePool;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{appresult::RoomError, db, feed::RoomFeed, session::RoomContext, AppResult};

pub use classify::{classify, is_mine, Buckets};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RoundStatus {
    #[default]
    Pending,
    Answered,
}

impl RoundStatus {
    /// Only `"answered"` means answered. Missing, legacy (`question_sent`)
    /// and unknown values all mean the round is still waiting.
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("answered") => RoundStatus::Answered,
            _ => RoundStatus::Pending,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RoundStatus::Pending => "pending",
            RoundStatus::Answered => "answered",
        }
    }
}

impl Serialize for RoundStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RoundStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // not a string at all is just as unknown as an unknown string
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(RoundStatus::parse(value.as_str()))
    }
}

/// One question and, eventually, its single answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Round {
    pub id: Uuid,
    pub room_id: Uuid,

    pub question_text: String,
    pub question_sender: String,

    #[serde(default)]
    pub answer_text: Option<String>,
    #[serde(default)]
    pub answer_sender: Option<String>,

    #[serde(default)]
    pub status: RoundStatus,

    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub answered_at: Option<OffsetDateTime>,
}

/// Everything a viewer needs to redraw a room. Always replaces what they had.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    #[serde(flatten)]
    pub buckets: Buckets,
    pub inbox_count: usize,
}

impl From<Buckets> for Snapshot {
    fn from(buckets: Buckets) -> Self {
        let inbox_count = buckets.inbox_count();
        Snapshot { buckets, inbox_count }
    }
}

fn required<'a>(what: &'static str, text: &'a str) -> Result<&'a str, RoomError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(RoomError::Empty(what));
    }
    Ok(text)
}

/// Fetches the room and sorts it for whoever is looking.
pub async fn snapshot(db_pool: &SqlitePool, ctx: &RoomContext) -> AppResult<Snapshot> {
    let rounds = db::list_rounds(db_pool, ctx.room_id).await?;
    Ok(classify(rounds, &ctx.nickname).into())
}

pub async fn ask(
    db_pool: &SqlitePool,
    feed: &RoomFeed,
    ctx: &RoomContext,
    question_text: &str,
) -> AppResult<Round> {
    let question_text = required("question", question_text)?;

    let round = db::insert_round(db_pool, ctx.room_id, question_text, &ctx.nickname).await?;
    tracing::info!(room_id = %ctx.room_id, round_id = %round.id, sender = %ctx.nickname, "question asked");

    feed.notify(ctx.room_id);
    Ok(round)
}

pub async fn reply(
    db_pool: &SqlitePool,
    feed: &RoomFeed,
    ctx: &RoomContext,
    round_id: Uuid,
    answer_text: &str,
) -> AppResult<Round> {
    let answer_text = required("answer", answer_text)?;

    let Some(round) = db::find_round(db_pool, ctx.room_id, round_id).await? else {
        return Err(RoomError::RoundNotFound(round_id))?;
    };
    if round.status == RoundStatus::Answered {
        return Err(RoomError::AlreadyAnswered(round_id))?;
    }
    if is_mine(&round.question_sender, &ctx.nickname) {
        return Err(RoomError::OwnQuestion)?;
    }

    // the update only matches unanswered rows, so a racing reply loses here
    if !db::answer_round(db_pool, ctx.room_id, round_id, answer_text, &ctx.nickname).await? {
        return Err(RoomError::AlreadyAnswered(round_id))?;
    }
    tracing::info!(room_id = %ctx.room_id, %round_id, sender = %ctx.nickname, "question answered");

    feed.notify(ctx.room_id);
    db::find_round(db_pool, ctx.room_id, round_id)
        .await?
        .ok_or_else(|| RoomError::RoundNotFound(round_id).into())
}
