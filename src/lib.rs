pub mod appresult;
pub mod config;
pub mod db;
pub mod feed;
pub mod index;
pub mod res;
pub mod rooms;
pub mod rounds;
pub mod session;

use axum::{extract::FromRef, routing::get, Router};
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;
use tower_sessions::{cookie::SameSite, Expiry, MemoryStore, SessionManagerLayer};

pub use appresult::{AppError, AppResult, RoomError};
pub use config::Config;

#[derive(Clone, FromRef)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub feed: feed::RoomFeed,
}

impl AppState {
    pub async fn connect(config: &Config) -> AppResult<Self> {
        let db_pool = db::connect(&config.database_url, config.db_max_connections).await?;
        db::init(&db_pool).await?;

        Ok(AppState {
            db_pool,
            feed: feed::RoomFeed::new(config.feed_capacity),
        })
    }
}

pub fn app(app_state: AppState, config: &Config) -> Router {
    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(config.secure_cookies)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(config.session_idle));

    Router::new()
        .route("/", get(index::index))
        .route("/leave", get(index::leave))
        .route("/style.css", get(res::stylesheet))
        .nest("/r", rooms::router())
        .with_state(app_state)
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
}
