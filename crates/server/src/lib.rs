use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;
use sea_orm::SqlErr;

use serde::Serialize;
pub use server::{app, run_with_listener};

mod daily_meals;
mod genres;
mod interchange;
mod server;
mod subscriptions;
mod user;

pub enum ServerError {
    Engine(EngineError),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_) => StatusCode::CONFLICT,
        EngineError::InvalidCredentials(_) => StatusCode::UNAUTHORIZED,
        EngineError::Database(db_err) => match db_err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_))
            | Some(SqlErr::ForeignKeyConstraintViolation(_)) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        },
        EngineError::InvalidData(_) => StatusCode::INTERNAL_SERVER_ERROR,
        EngineError::InvalidName(_)
        | EngineError::InvalidAmount(_)
        | EngineError::InvalidCount(_)
        | EngineError::InvalidDate(_)
        | EngineError::InvalidSnapshot(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => match db_err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => "conflict: already present".to_string(),
            Some(SqlErr::ForeignKeyConstraintViolation(_)) => {
                "conflict: referenced row".to_string()
            }
            _ => {
                tracing::error!("database error: {db_err}");
                "internal server error".to_string()
            }
        },
        EngineError::InvalidData(detail) => {
            tracing::error!("corrupt row: {detail}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let ServerError::Engine(err) = self;
        let (status, error) = (status_for_engine_error(&err), message_for_engine_error(err));

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}
