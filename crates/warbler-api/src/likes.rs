use axum::{
    Extension,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::info;

use crate::messages::message_views;
use crate::middleware::{CurrentUser, access_unauthorized};
use crate::templates::render;
use crate::users::profile_context;
use crate::{AppError, AppState, flash, redirect};

/// Like the message, or unlike it if already liked. Users cannot like
/// their own messages.
pub async fn toggle_like(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    jar: CookieJar,
    Path(message_id): Path<i64>,
) -> Result<Response, AppError> {
    let Some(user) = current.user() else {
        return Ok(access_unauthorized(jar));
    };

    let message = state.db.get_message(message_id)?.ok_or(AppError::NotFound)?;
    if message.user_id == user.id {
        let jar = flash::push(jar, "warning", "You cannot like your own message.");
        return Ok((jar, redirect("/")).into_response());
    }

    let liked = state.db.toggle_like(user.id, message_id)?;
    info!(message_id, user_id = user.id, liked, "like toggled");

    Ok(redirect("/"))
}

pub async fn show_likes(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    jar: CookieJar,
    Path(user_id): Path<i64>,
) -> Result<Response, AppError> {
    let Some(viewer) = current.user() else {
        return Ok(access_unauthorized(jar));
    };
    let user = state.db.get_user(user_id)?.ok_or(AppError::NotFound)?;
    let rows = state.db.liked_messages(user.id)?;

    let mut ctx = profile_context(&state, &user, Some(viewer))?;
    ctx.insert("messages", &message_views(&state, &rows, Some(viewer))?);
    render(&state, jar, &current, "users/likes.html", ctx)
}
