use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;
use warbler_db::DbError;

const NOT_FOUND_PAGE: &str = include_str!("../templates/404.html");

#[derive(Debug, Error)]
pub enum AppError {
    #[error("not found")]
    NotFound,

    #[error(transparent)]
    Db(#[from] DbError),

    #[error("template error: {0}")]
    Template(#[from] tera::Error),

    #[error("session token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound => (StatusCode::NOT_FOUND, Html(NOT_FOUND_PAGE)).into_response(),
            other => {
                error!(error = ?other, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Html("<h1>Something went wrong.</h1>"),
                )
                    .into_response()
            }
        }
    }
}
