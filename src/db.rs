use sqlx::{sqlite::SqlitePoolOptions, FromRow, SqlitePool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    rounds::{Round, RoundStatus},
    AppResult,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Room {
    pub id: Uuid,
    pub name: String,
    pub created_by: String,
    pub created_at: OffsetDateTime,
}

// unique: id
// status is nullable, rows written before it existed are pending unless they carry an answer
#[derive(FromRow)]
struct RoundRow {
    id: String,
    room_id: String,
    question_text: String,
    question_sender: String,
    answer_text: Option<String>,
    answer_sender: Option<String>,
    status: Option<String>,
    created_at: OffsetDateTime,
    answered_at: Option<OffsetDateTime>,
}

impl TryFrom<RoundRow> for Round {
    type Error = uuid::Error;

    fn try_from(row: RoundRow) -> Result<Self, Self::Error> {
        let status = match RoundStatus::parse(row.status.as_deref()) {
            RoundStatus::Pending if row.answer_text.is_some() => RoundStatus::Answered,
            status => status,
        };

        Ok(Round {
            id: Uuid::parse_str(&row.id)?,
            room_id: Uuid::parse_str(&row.room_id)?,
            question_text: row.question_text,
            question_sender: row.question_sender,
            answer_text: row.answer_text,
            answer_sender: row.answer_sender,
            status,
            created_at: row.created_at,
            answered_at: row.answered_at,
        })
    }
}

const ROUND_COLUMNS: &str = "id,room_id,question_text,question_sender,answer_text,answer_sender,status,created_at,answered_at";

pub async fn connect(database_url: &str, max_connections: u32) -> AppResult<SqlitePool> {
    let mut options = SqlitePoolOptions::new().max_connections(max_connections);
    if database_url.contains(":memory:") {
        // every connection to an in-memory database is its own database
        options = options.max_connections(1).idle_timeout(None).max_lifetime(None);
    }
    Ok(options.connect(database_url).await?)
}

pub async fn init(db_pool: &SqlitePool) -> AppResult<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS rooms (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            created_by TEXT NOT NULL,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(db_pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS qa_rounds (
            id TEXT PRIMARY KEY,
            room_id TEXT NOT NULL REFERENCES rooms(id),
            question_text TEXT NOT NULL,
            question_sender TEXT NOT NULL,
            answer_text TEXT,
            answer_sender TEXT,
            status TEXT,
            created_at TEXT NOT NULL,
            answered_at TEXT
        )
        "#,
    )
    .execute(db_pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_qa_rounds_room ON qa_rounds(room_id)")
        .execute(db_pool)
        .await?;

    Ok(())
}

pub async fn create_room(db_pool: &SqlitePool, name: &str, created_by: &str) -> AppResult<Room> {
    let room = Room {
        id: Uuid::now_v7(),
        name: name.to_owned(),
        created_by: created_by.to_owned(),
        created_at: OffsetDateTime::now_utc(),
    };

    sqlx::query("INSERT INTO rooms (id,name,created_by,created_at) VALUES (?,?,?,?)")
        .bind(room.id.to_string())
        .bind(&room.name)
        .bind(&room.created_by)
        .bind(room.created_at)
        .execute(db_pool)
        .await?;

    Ok(room)
}

pub async fn find_room(db_pool: &SqlitePool, room_id: Uuid) -> AppResult<Option<Room>> {
    let row: Option<(String, String, OffsetDateTime)> =
        sqlx::query_as("SELECT name,created_by,created_at FROM rooms WHERE id=?")
            .bind(room_id.to_string())
            .fetch_optional(db_pool)
            .await?;

    Ok(row.map(|(name, created_by, created_at)| Room {
        id: room_id,
        name,
        created_by,
        created_at,
    }))
}

/// Newest first. Rounds created within the same instant come out in reverse insertion order.
pub async fn list_rounds(db_pool: &SqlitePool, room_id: Uuid) -> AppResult<Vec<Round>> {
    let rows: Vec<RoundRow> = sqlx::query_as(&format!(
        "SELECT {ROUND_COLUMNS} FROM qa_rounds WHERE room_id=? ORDER BY julianday(created_at) DESC, rowid DESC"
    ))
    .bind(room_id.to_string())
    .fetch_all(db_pool)
    .await?;

    let mut rounds = Vec::with_capacity(rows.len());
    for row in rows {
        rounds.push(Round::try_from(row)?);
    }
    Ok(rounds)
}

pub async fn find_round(db_pool: &SqlitePool, room_id: Uuid, round_id: Uuid) -> AppResult<Option<Round>> {
    let row: Option<RoundRow> = sqlx::query_as(&format!(
        "SELECT {ROUND_COLUMNS} FROM qa_rounds WHERE id=? AND room_id=?"
    ))
    .bind(round_id.to_string())
    .bind(room_id.to_string())
    .fetch_optional(db_pool)
    .await?;

    match row {
        Some(row) => Ok(Some(Round::try_from(row)?)),
        None => Ok(None),
    }
}

pub async fn insert_round(
    db_pool: &SqlitePool,
    room_id: Uuid,
    question_text: &str,
    question_sender: &str,
) -> AppResult<Round> {
    let round = Round {
        id: Uuid::now_v7(),
        room_id,
        question_text: question_text.to_owned(),
        question_sender: question_sender.to_owned(),
        answer_text: None,
        answer_sender: None,
        status: RoundStatus::Pending,
        created_at: OffsetDateTime::now_utc(),
        answered_at: None,
    };

    sqlx::query("INSERT INTO qa_rounds (id,room_id,question_text,question_sender,status,created_at) VALUES (?,?,?,?,?,?)")
        .bind(round.id.to_string())
        .bind(room_id.to_string())
        .bind(&round.question_text)
        .bind(&round.question_sender)
        .bind(round.status.as_str())
        .bind(round.created_at)
        .execute(db_pool)
        .await?;

    Ok(round)
}

/// Stores the answer unless the round already has one. Returns whether it did.
pub async fn answer_round(
    db_pool: &SqlitePool,
    room_id: Uuid,
    round_id: Uuid,
    answer_text: &str,
    answer_sender: &str,
) -> AppResult<bool> {
    let result = sqlx::query(
        r#"
        UPDATE qa_rounds
        SET answer_text=?, answer_sender=?, status=?, answered_at=?
        WHERE id=? AND room_id=? AND answer_text IS NULL AND (status IS NULL OR status!=?)
        "#,
    )
    .bind(answer_text)
    .bind(answer_sender)
    .bind(RoundStatus::Answered.as_str())
    .bind(OffsetDateTime::now_utc())
    .bind(round_id.to_string())
    .bind(room_id.to_string())
    .bind(RoundStatus::Answered.as_str())
    .execute(db_pool)
    .await?;

    Ok(result.rows_affected() == 1)
}
