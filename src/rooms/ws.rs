use axum::{debug_handler, extract::{ws::{Message, WebSocket}, Path, State, WebSocketUpgrade}, response::{IntoResponse, Response}};
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tokio::sync::mpsc;
use tower_sessions::Session;
use uuid::Uuid;

use crate::{feed::RoomFeed, rounds::{self, Snapshot}, session::{self, RoomContext}, AppResult};

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(crate) enum ClientCommand {
    Ask { question_text: String },
    Reply { round_id: Uuid, answer_text: String },
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(crate) enum ServerFrame {
    Snapshot(Snapshot),
    Error { message: String },
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn room_ws(
    Path(room_id): Path<Uuid>,
    State(db_pool): State<SqlitePool>,
    State(feed): State<RoomFeed>,
    session: Session,

    ws: WebSocketUpgrade,
) -> AppResult<Response> {
    let ctx = session::require_room(&session, room_id).await?;
    tracing::debug!(%room_id, nickname = %ctx.nickname, "socket opened");

    Ok(ws.on_upgrade(move |stream| serve(stream, db_pool, feed, ctx)).into_response())
}

async fn handle(db_pool: &SqlitePool, feed: &RoomFeed, ctx: &RoomContext, command: ClientCommand) -> AppResult<()> {
    match command {
        ClientCommand::Ask { question_text } => {
            rounds::ask(db_pool, feed, ctx, &question_text).await?;
        }
        ClientCommand::Reply { round_id, answer_text } => {
            rounds::reply(db_pool, feed, ctx, round_id, &answer_text).await?;
        }
    }
    Ok(())
}

async fn serve(stream: WebSocket, db_pool: SqlitePool, feed: RoomFeed, ctx: RoomContext) {
    let (mut sender, mut receiver) = stream.split();
    let (frames, mut outbox) = mpsc::channel::<ServerFrame>(16);

    let write_task = tokio::spawn(async move {
        while let Some(frame) = outbox.recv().await {
            let text = match serde_json::to_string(&frame) {
                Ok(text) => text,
                Err(err) => {
                    tracing::warn!(error = %err, "couldn't encode frame");
                    continue;
                }
            };
            if sender.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    // one full snapshot now, and a fresh one after every change in the room
    let refresh_task = {
        let frames = frames.clone();
        let db_pool = db_pool.clone();
        let ctx = ctx.clone();
        let mut changes = feed.subscribe(ctx.room_id);
        tokio::spawn(async move {
            loop {
                match rounds::snapshot(&db_pool, &ctx).await {
                    Ok(snapshot) => {
                        if frames.send(ServerFrame::Snapshot(snapshot)).await.is_err() {
                            break;
                        }
                    }
                    Err(err) => tracing::warn!(room_id = %ctx.room_id, error = %err.0, "couldn't load rounds"),
                }
                if !changes.changed().await {
                    break;
                }
            }
        })
    };

    while let Some(Ok(msg)) = receiver.next().await {
        let text = match msg {
            Message::Text(text) => text,
            Message::Close(_) => break,
            _ => continue,
        };

        let result = match serde_json::from_str::<ClientCommand>(text.as_str()) {
            Ok(command) => handle(&db_pool, &feed, &ctx, command).await,
            Err(err) => Err(err.into()),
        };
        if let Err(err) = result {
            tracing::warn!(room_id = %ctx.room_id, error = %err.0, "socket command failed");
            let message = match err.room_error() {
                Some(_) => err.user_message(),
                None if err.0.is::<serde_json::Error>() => format!("bad command: {}", err.0),
                None => err.user_message(),
            };
            if frames.send(ServerFrame::Error { message }).await.is_err() {
                break;
            }
        }
    }

    tracing::debug!(room_id = %ctx.room_id, nickname = %ctx.nickname, "socket closed");
    refresh_task.abort();
    write_task.abort();
}
