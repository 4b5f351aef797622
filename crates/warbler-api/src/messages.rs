use std::collections::HashSet;

use axum::{
    Extension, Form,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use tera::Context;
use tracing::{info, warn};
use validator::{Validate, ValidationErrors};

use warbler_db::models::{MessageRow, UserRow};
use warbler_types::api::MessageForm;
use warbler_types::models::Message;

use crate::middleware::{CurrentUser, access_unauthorized};
use crate::templates::{form_errors, render};
use crate::{AppError, AppState, AppStateInner, flash, redirect};

/// Rows to view models, marking the ones `viewer` has liked.
pub(crate) fn message_views(
    state: &AppStateInner,
    rows: &[MessageRow],
    viewer: Option<&UserRow>,
) -> Result<Vec<Message>, AppError> {
    let liked: HashSet<i64> = match viewer {
        Some(user) => state.db.liked_message_ids(user.id)?.into_iter().collect(),
        None => HashSet::new(),
    };
    Ok(rows
        .iter()
        .map(|row| row.to_view(liked.contains(&row.id)))
        .collect())
}

pub async fn new_message_form(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    if current.user().is_none() {
        return Ok(access_unauthorized(jar));
    }
    render_new(&state, jar, &current, &MessageForm::default(), None)
}

pub async fn create_message(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    jar: CookieJar,
    Form(form): Form<MessageForm>,
) -> Result<Response, AppError> {
    let Some(user) = current.user() else {
        return Ok(access_unauthorized(jar));
    };
    if let Err(errors) = form.validate() {
        return render_new(&state, jar, &current, &form, Some(&errors));
    }

    state.db.insert_message(user.id, &form.text)?;
    Ok(redirect(&format!("/users/{}", user.id)))
}

pub async fn show_message(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    jar: CookieJar,
    Path(message_id): Path<i64>,
) -> Result<Response, AppError> {
    let row = state.db.get_message(message_id)?.ok_or(AppError::NotFound)?;
    let message = message_views(&state, std::slice::from_ref(&row), current.user())?
        .pop()
        .ok_or(AppError::NotFound)?;

    let mut ctx = Context::new();
    ctx.insert("message", &message);
    render(&state, jar, &current, "messages/show.html", ctx)
}

/// Only the author may delete a message; anyone else is sent home.
pub async fn delete_message(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    jar: CookieJar,
    Path(message_id): Path<i64>,
) -> Result<Response, AppError> {
    let Some(user) = current.user() else {
        return Ok(access_unauthorized(jar));
    };

    let message = state.db.get_message(message_id)?.ok_or(AppError::NotFound)?;
    if message.user_id != user.id {
        warn!(
            message_id,
            user_id = user.id,
            owner_id = message.user_id,
            "refused delete of another user's message"
        );
        let jar = flash::push(
            jar,
            "danger",
            "Access unauthorized. You cannot delete another user's message.",
        );
        return Ok((jar, redirect("/")).into_response());
    }

    state.db.delete_message(message_id)?;
    info!(message_id, user_id = user.id, "message removed by author");
    Ok(redirect(&format!("/users/{}", user.id)))
}

fn render_new(
    state: &AppStateInner,
    jar: CookieJar,
    current: &CurrentUser,
    form: &MessageForm,
    errors: Option<&ValidationErrors>,
) -> Result<Response, AppError> {
    let mut ctx = Context::new();
    ctx.insert("form", form);
    ctx.insert("errors", &form_errors(&["text"], errors));
    render(state, jar, current, "messages/new.html", ctx)
}
