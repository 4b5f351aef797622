//! Page rendering. Templates are compiled into the binary so the server and
//! the tests never depend on the working directory.

use std::collections::BTreeMap;

use axum::response::{Html, IntoResponse, Response};
use axum_extra::extract::cookie::CookieJar;
use tera::{Context, Tera};
use validator::ValidationErrors;

use warbler_types::api::field_errors;
use warbler_types::models::User;

use crate::middleware::CurrentUser;
use crate::{AppError, AppStateInner, flash};

const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../templates/base.html")),
    ("home.html", include_str!("../templates/home.html")),
    ("home-anon.html", include_str!("../templates/home-anon.html")),
    ("messages/_list.html", include_str!("../templates/messages/_list.html")),
    ("messages/new.html", include_str!("../templates/messages/new.html")),
    ("messages/show.html", include_str!("../templates/messages/show.html")),
    ("users/_cards.html", include_str!("../templates/users/_cards.html")),
    ("users/detail.html", include_str!("../templates/users/detail.html")),
    ("users/edit.html", include_str!("../templates/users/edit.html")),
    ("users/followers.html", include_str!("../templates/users/followers.html")),
    ("users/following.html", include_str!("../templates/users/following.html")),
    ("users/index.html", include_str!("../templates/users/index.html")),
    ("users/likes.html", include_str!("../templates/users/likes.html")),
    ("users/login.html", include_str!("../templates/users/login.html")),
    ("users/show.html", include_str!("../templates/users/show.html")),
    ("users/signup.html", include_str!("../templates/users/signup.html")),
];

pub fn load() -> tera::Result<Tera> {
    let mut tera = Tera::default();
    tera.add_raw_templates(TEMPLATES.iter().copied())?;
    Ok(tera)
}

/// Renders `name` with the pending flashes and the current user (`g_user`)
/// added to `ctx`. Drains the flash cookie.
pub fn render(
    state: &AppStateInner,
    jar: CookieJar,
    current: &CurrentUser,
    name: &str,
    mut ctx: Context,
) -> Result<Response, AppError> {
    let (jar, flashes) = flash::take(jar);
    ctx.insert("flashes", &flashes);
    ctx.insert("g_user", &current.user().map(User::from));

    let body = state.templates.render(name, &ctx)?;
    Ok((jar, Html(body)).into_response())
}

/// One entry per form field so templates can loop without existence checks.
pub fn form_errors(
    fields: &[&str],
    errors: Option<&ValidationErrors>,
) -> BTreeMap<String, Vec<String>> {
    let mut out: BTreeMap<String, Vec<String>> =
        fields.iter().map(|f| (f.to_string(), Vec::new())).collect();
    if let Some(errors) = errors {
        for (field, messages) in field_errors(errors) {
            out.entry(field).or_default().extend(messages);
        }
    }
    out
}
