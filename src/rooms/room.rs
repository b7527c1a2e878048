use axum::{debug_handler, extract::{Path, Query, State}, response::{Html, IntoResponse, Redirect, Response}, Form, Json};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_sessions::Session;
use uuid::Uuid;

use crate::{
    appresult::RoomError,
    db, feed::RoomFeed, include_res, res,
    rounds::{self, render, Snapshot},
    session::{self, RoomContext},
    AppResult,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum Tab {
    #[default]
    Ask,
    Inbox,
    Sent,
    History,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DashboardQuery {
    #[serde(default)]
    tab: Tab,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AskQuery {
    question_text: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReplyQuery {
    answer_text: String,
}

fn panel(tab: Tab, ctx: &RoomContext, snapshot: &Snapshot) -> String {
    let list = |title: &str, items: Vec<String>, empty: &str| {
        if items.is_empty() {
            return include_res!(str, "/pages/rooms/empty.html").replace("{message}", empty);
        }
        include_res!(str, "/pages/rooms/list.html")
            .replace("{title}", title)
            .replace("{items}", &items.concat())
    };

    let buckets = &snapshot.buckets;
    match tab {
        Tab::Ask => include_res!(str, "/pages/rooms/ask.html").replace("{room_id}", &ctx.room_id.to_string()),
        Tab::Inbox => list(
            "Inbox",
            buckets.inbox.iter().map(render::inbox_item).collect(),
            "No new questions... maybe you should start?",
        ),
        Tab::Sent => list(
            "Sent",
            buckets.sent.iter().map(render::sent_item).collect(),
            "Nothing waiting for an answer.",
        ),
        Tab::History => list(
            "Our memories",
            buckets.history.iter().map(|round| render::history_item(round, &ctx.nickname)).collect(),
            "No answered questions yet.",
        ),
    }
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn room(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Path(room_id): Path<Uuid>,
    Query(DashboardQuery { tab }): Query<DashboardQuery>,
) -> AppResult<Response> {
    let Some(ctx) = session::room_context(&session).await?.filter(|ctx| ctx.room_id == room_id) else {
        return Ok(Redirect::to("/").into_response());
    };
    let Some(room) = db::find_room(&db_pool, room_id).await? else {
        session::leave(&session).await;
        return Err(RoomError::RoomNotFound(room_id.to_string()))?;
    };

    let snapshot = rounds::snapshot(&db_pool, &ctx).await?;
    let active = |t: Tab| if t == tab { "active" } else { "" };

    let body = include_res!(str, "/pages/rooms/dashboard.html")
        .replace("{ask_active}", active(Tab::Ask))
        .replace("{inbox_active}", active(Tab::Inbox))
        .replace("{sent_active}", active(Tab::Sent))
        .replace("{history_active}", active(Tab::History))
        .replace("{inbox_count}", &snapshot.inbox_count.to_string())
        .replace("{room_id}", &room.id.to_string())
        .replace("{room_name}", &res::escape(&room.name))
        .replace("{nickname}", &res::escape(&ctx.nickname))
        .replace("{panel}", &panel(tab, &ctx, &snapshot));

    Ok(Html(body).into_response())
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn room_rounds(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Path(room_id): Path<Uuid>,
) -> AppResult<Json<Snapshot>> {
    let ctx = session::require_room(&session, room_id).await?;
    Ok(Json(rounds::snapshot(&db_pool, &ctx).await?))
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn ask(
    State(db_pool): State<SqlitePool>,
    State(feed): State<RoomFeed>,
    session: Session,
    Path(room_id): Path<Uuid>,

    Form(AskQuery { question_text }): Form<AskQuery>,
) -> AppResult<Response> {
    let ctx = session::require_room(&session, room_id).await?;
    rounds::ask(&db_pool, &feed, &ctx, &question_text).await?;

    Ok(Redirect::to(&format!("/r/{room_id}?tab=sent")).into_response())
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn reply(
    State(db_pool): State<SqlitePool>,
    State(feed): State<RoomFeed>,
    session: Session,
    Path((room_id, round_id)): Path<(Uuid, Uuid)>,

    Form(ReplyQuery { answer_text }): Form<ReplyQuery>,
) -> AppResult<Response> {
    let ctx = session::require_room(&session, room_id).await?;
    rounds::reply(&db_pool, &feed, &ctx, round_id, &answer_text).await?;

    Ok(Redirect::to(&format!("/r/{room_id}?tab=history")).into_response())
}
