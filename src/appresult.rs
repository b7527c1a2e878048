use axum::{http::StatusCode, response::{IntoResponse, Response}};
use uuid::Uuid;

pub type AppResult<T> = Result<T, AppError>;
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

/// Failures a user can cause and fix by themselves.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    #[error("{0} must not be empty")]
    Empty(&'static str),
    #[error("room {0} does not exist")]
    RoomNotFound(String),
    #[error("round {0} does not exist")]
    RoundNotFound(Uuid),
    #[error("round {0} has already been answered")]
    AlreadyAnswered(Uuid),
    #[error("you can't answer your own question")]
    OwnQuestion,
    #[error("join a room first")]
    NoRoom,
}

impl RoomError {
    pub fn status(&self) -> StatusCode {
        use RoomError::*;
        match self {
            Empty(_) => StatusCode::BAD_REQUEST,
            RoomNotFound(_) | RoundNotFound(_) => StatusCode::NOT_FOUND,
            AlreadyAnswered(_) => StatusCode::CONFLICT,
            OwnQuestion => StatusCode::FORBIDDEN,
            NoRoom => StatusCode::UNAUTHORIZED,
        }
    }
}

impl AppError {
    pub fn room_error(&self) -> Option<&RoomError> {
        self.0.downcast_ref::<RoomError>()
    }

    /// What the person on the other end gets to read.
    pub fn user_message(&self) -> String {
        match self.room_error() {
            Some(err) => err.to_string(),
            None => "something went wrong, try again".to_owned(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let Some(err) = self.room_error() {
            return (err.status(), err.to_string()).into_response();
        }

        tracing::error!(error = %self.0, backtrace = %self.0.backtrace(), "request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, self.user_message()).into_response()
    }
}

impl From<String> for AppError {
    fn from(err: String) -> Self {
        Self(anyhow::Error::msg(err))
    }
}

impl From<&str> for AppError {
    fn from(err: &str) -> Self {
        Self(anyhow::Error::msg(err.to_owned()))
    }
}

macro_rules! apperr_impl {
    ($E:ty) => {
        impl From<$E> for AppError {
            fn from(err: $E) -> Self {
                Self(anyhow::Error::from(err))
            }
        }
    };
}

apperr_impl!(RoomError);
apperr_impl!(serde_json::Error);
apperr_impl!(sqlx::Error);
apperr_impl!(uuid::Error);
apperr_impl!(tower_sessions::session::Error);
