mod new;
mod room;
mod ws;

use axum::{routing::{get, post}, Router};

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/new", post(new::new_room))
        .route("/join", post(new::join_room))
        .route("/{room_id}", get(room::room))
        .route("/{room_id}/rounds", get(room::room_rounds))
        .route("/{room_id}/ask", post(room::ask))
        .route("/{room_id}/rounds/{round_id}/reply", post(room::reply))
        .route("/{room_id}/ws", get(ws::room_ws))
}
