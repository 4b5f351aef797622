use std::collections::HashSet;

use axum::{
    Extension, Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use tera::Context;
use tracing::info;
use validator::{Validate, ValidationErrors};

use warbler_db::models::{ProfileUpdate, UserRow};
use warbler_types::api::{EditProfileForm, SearchQuery, non_empty};
use warbler_types::models::{User, UserCard};

use crate::messages::message_views;
use crate::middleware::{CurrentUser, access_unauthorized};
use crate::templates::{form_errors, render};
use crate::{AppError, AppState, AppStateInner, flash, redirect, session};

/// Messages shown on a profile page.
const PROFILE_MESSAGE_LIMIT: u32 = 100;

const PROFILE_FIELDS: &[&str] = &[
    "username",
    "email",
    "image_url",
    "header_image_url",
    "bio",
    "location",
    "password",
];

/// User cards, each marked with whether `viewer` follows that user.
pub(crate) fn user_cards(
    state: &AppStateInner,
    rows: &[UserRow],
    viewer: Option<&UserRow>,
) -> Result<Vec<UserCard>, AppError> {
    let followed: HashSet<i64> = match viewer {
        Some(user) => state.db.following_ids(user.id)?.into_iter().collect(),
        None => HashSet::new(),
    };
    Ok(rows
        .iter()
        .map(|row| UserCard {
            user: User::from(row),
            followed: followed.contains(&row.id),
        })
        .collect())
}

/// Context shared by every page under `/users/{id}`: the profile header,
/// its stats, and the follow state relative to the viewer.
pub(crate) fn profile_context(
    state: &AppStateInner,
    user: &UserRow,
    viewer: Option<&UserRow>,
) -> Result<Context, AppError> {
    let followed = match viewer {
        Some(v) => state.db.is_following(v.id, user.id)?,
        None => false,
    };

    let mut ctx = Context::new();
    ctx.insert("user", &User::from(user));
    ctx.insert("stats", &state.db.user_stats(user.id)?);
    ctx.insert("is_self", &viewer.is_some_and(|v| v.id == user.id));
    ctx.insert("followed", &followed);
    Ok(ctx)
}

pub async fn list_users(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    jar: CookieJar,
    Query(search): Query<SearchQuery>,
) -> Result<Response, AppError> {
    let q = search.q.as_deref().and_then(non_empty);
    let rows = state.db.search_users(q.as_deref())?;

    let mut ctx = Context::new();
    ctx.insert("cards", &user_cards(&state, &rows, current.user())?);
    ctx.insert("q", &q);
    render(&state, jar, &current, "users/index.html", ctx)
}

pub async fn show_user(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    jar: CookieJar,
    Path(user_id): Path<i64>,
) -> Result<Response, AppError> {
    let user = state.db.get_user(user_id)?.ok_or(AppError::NotFound)?;
    let rows = state.db.messages_by_user(user.id, PROFILE_MESSAGE_LIMIT)?;

    let mut ctx = profile_context(&state, &user, current.user())?;
    ctx.insert("messages", &message_views(&state, &rows, current.user())?);
    render(&state, jar, &current, "users/show.html", ctx)
}

pub async fn show_following(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    jar: CookieJar,
    Path(user_id): Path<i64>,
) -> Result<Response, AppError> {
    let Some(viewer) = current.user() else {
        return Ok(access_unauthorized(jar));
    };
    let user = state.db.get_user(user_id)?.ok_or(AppError::NotFound)?;
    let rows = state.db.following(user.id)?;

    let mut ctx = profile_context(&state, &user, Some(viewer))?;
    ctx.insert("cards", &user_cards(&state, &rows, Some(viewer))?);
    render(&state, jar, &current, "users/following.html", ctx)
}

pub async fn show_followers(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    jar: CookieJar,
    Path(user_id): Path<i64>,
) -> Result<Response, AppError> {
    let Some(viewer) = current.user() else {
        return Ok(access_unauthorized(jar));
    };
    let user = state.db.get_user(user_id)?.ok_or(AppError::NotFound)?;
    let rows = state.db.followers(user.id)?;

    let mut ctx = profile_context(&state, &user, Some(viewer))?;
    ctx.insert("cards", &user_cards(&state, &rows, Some(viewer))?);
    render(&state, jar, &current, "users/followers.html", ctx)
}

pub async fn follow(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    jar: CookieJar,
    Path(follow_id): Path<i64>,
) -> Result<Response, AppError> {
    let Some(user) = current.user() else {
        return Ok(access_unauthorized(jar));
    };
    let followed = state.db.get_user(follow_id)?.ok_or(AppError::NotFound)?;

    if followed.id == user.id {
        let jar = flash::push(jar, "warning", "You cannot follow yourself.");
        return Ok((jar, redirect(&format!("/users/{}/following", user.id))).into_response());
    }

    state.db.follow(user.id, followed.id)?;
    info!(follower = user.id, followed = followed.id, "follow");
    Ok(redirect(&format!("/users/{}/following", user.id)))
}

pub async fn stop_following(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    jar: CookieJar,
    Path(follow_id): Path<i64>,
) -> Result<Response, AppError> {
    let Some(user) = current.user() else {
        return Ok(access_unauthorized(jar));
    };

    if state.db.unfollow(user.id, follow_id)? {
        info!(follower = user.id, followed = follow_id, "unfollow");
    }
    Ok(redirect(&format!("/users/{}/following", user.id)))
}

pub async fn edit_profile_form(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let Some(user) = current.user() else {
        return Ok(access_unauthorized(jar));
    };

    let form = EditProfileForm {
        username: user.username.clone(),
        email: user.email.clone(),
        image_url: user.image_url.clone(),
        header_image_url: user.header_image_url.clone(),
        bio: user.bio.clone().unwrap_or_default(),
        location: user.location.clone().unwrap_or_default(),
        password: String::new(),
    };
    render_edit(&state, jar, &current, &form, None)
}

/// Saves profile changes once the current password checks out.
pub async fn edit_profile(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    jar: CookieJar,
    Form(form): Form<EditProfileForm>,
) -> Result<Response, AppError> {
    let Some(user) = current.user() else {
        return Ok(access_unauthorized(jar));
    };
    if let Err(errors) = form.validate() {
        return render_edit(&state, jar, &current, &form, Some(&errors));
    }

    if state.db.authenticate(&user.username, &form.password)?.is_none() {
        let jar = flash::push(jar, "danger", "Wrong password, please try again.");
        return Ok((jar, redirect("/")).into_response());
    }

    let update = ProfileUpdate {
        username: form.username.trim().to_string(),
        email: form.email.trim().to_string(),
        image_url: non_empty(&form.image_url),
        header_image_url: non_empty(&form.header_image_url),
        bio: non_empty(&form.bio),
        location: non_empty(&form.location),
    };
    match state.db.update_user(user.id, &update) {
        Ok(updated) => {
            info!(user_id = updated.id, "profile updated");
            let jar = flash::push(jar, "success", "Profile updated.");
            Ok((jar, redirect(&format!("/users/{}", updated.id))).into_response())
        }
        Err(e) if e.is_integrity() => {
            let jar = flash::push(jar, "danger", "Username or email already taken");
            render_edit(&state, jar, &current, &form, None)
        }
        Err(e) => Err(e.into()),
    }
}

/// Logs out and removes the account along with everything it owns.
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let Some(user) = current.user() else {
        return Ok(access_unauthorized(jar));
    };

    let jar = session::do_logout(jar);
    state.db.delete_user(user.id)?;
    Ok((jar, redirect("/signup")).into_response())
}

fn render_edit(
    state: &AppStateInner,
    jar: CookieJar,
    current: &CurrentUser,
    form: &EditProfileForm,
    errors: Option<&ValidationErrors>,
) -> Result<Response, AppError> {
    let mut ctx = Context::new();
    ctx.insert("form", form);
    ctx.insert("errors", &form_errors(PROFILE_FIELDS, errors));
    render(state, jar, current, "users/edit.html", ctx)
}
