use axum::{debug_handler, extract::State, response::{IntoResponse, Redirect, Response}, Form};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_sessions::Session;
use uuid::Uuid;

use crate::{appresult::RoomError, db, session::{self, RoomContext}, AppResult};

#[derive(Debug, Deserialize)]
pub(crate) struct NewRoomQuery {
    name: String,
    nickname: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct JoinRoomQuery {
    room_id: String,
    nickname: String,
}

fn nickname(nickname: &str) -> Result<String, RoomError> {
    let nickname = nickname.trim();
    if nickname.is_empty() {
        return Err(RoomError::Empty("nickname"));
    }
    Ok(nickname.to_owned())
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn new_room(
    State(db_pool): State<SqlitePool>,
    session: Session,

    Form(NewRoomQuery { name, nickname: raw_nickname }): Form<NewRoomQuery>,
) -> AppResult<Response> {
    let name = name.trim();
    if name.is_empty() {
        return Err(RoomError::Empty("room name"))?;
    }
    let nickname = nickname(&raw_nickname)?;

    let room = db::create_room(&db_pool, name, &nickname).await?;
    tracing::info!(room_id = %room.id, created_by = %nickname, "room created");

    session::enter_room(&session, &RoomContext { room_id: room.id, nickname }).await?;
    Ok(Redirect::to(&format!("/r/{}", room.id)).into_response())
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn join_room(
    State(db_pool): State<SqlitePool>,
    session: Session,

    Form(JoinRoomQuery { room_id, nickname: raw_nickname }): Form<JoinRoomQuery>,
) -> AppResult<Response> {
    let nickname = nickname(&raw_nickname)?;

    let room_id = room_id.trim();
    let room = match Uuid::parse_str(room_id) {
        Ok(id) => db::find_room(&db_pool, id).await?,
        Err(_) => None,
    };
    let Some(room) = room else {
        return Err(RoomError::RoomNotFound(room_id.to_owned()))?;
    };
    tracing::info!(room_id = %room.id, %nickname, "joined room");

    session::enter_room(&session, &RoomContext { room_id: room.id, nickname }).await?;
    Ok(Redirect::to(&format!("/r/{}", room.id)).into_response())
}
