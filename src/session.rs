use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use uuid::Uuid;

use crate::{appresult::RoomError, AppResult};

pub const ROOM_CONTEXT: &str = "room_context";

/// Which room the viewer is in and the name they go by there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomContext {
    pub room_id: Uuid,
    pub nickname: String,
}

pub async fn room_context(session: &Session) -> AppResult<Option<RoomContext>> {
    Ok(session.get::<RoomContext>(ROOM_CONTEXT).await?)
}

pub async fn enter_room(session: &Session, ctx: &RoomContext) -> AppResult<()> {
    session.cycle_id().await?;
    session.insert(ROOM_CONTEXT, ctx).await?;
    Ok(())
}

pub async fn require_room(session: &Session, room_id: Uuid) -> AppResult<RoomContext> {
    match room_context(session).await? {
        Some(ctx) if ctx.room_id == room_id => Ok(ctx),
        _ => Err(RoomError::NoRoom.into()),
    }
}

pub async fn leave(session: &Session) {
    session.clear().await;
}
