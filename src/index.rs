use axum::{debug_handler, response::{Html, IntoResponse, Redirect, Response}};
use tower_sessions::Session;

use crate::{include_res, session, AppResult};

#[debug_handler]
pub async fn index(session: Session) -> AppResult<Response> {
    if let Some(ctx) = session::room_context(&session).await? {
        return Ok(Redirect::to(&format!("/r/{}", ctx.room_id)).into_response());
    }

    Ok(Html(include_res!(str, "/pages/index.html")).into_response())
}

#[debug_handler]
pub async fn leave(session: Session) -> Redirect {
    session::leave(&session).await;
    Redirect::to("/")
}
