use std::sync::Arc;

use axum::{
    Extension, Form,
    extract::State,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use tera::{Context, Tera};
use tracing::info;
use validator::{Validate, ValidationErrors};

use warbler_db::{Database, DbError};
use warbler_types::api::{LoginForm, SignupForm, non_empty};

use crate::middleware::CurrentUser;
use crate::templates::{form_errors, render};
use crate::{AppError, flash, redirect, session, templates};

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub session_secret: String,
    pub templates: Tera,
}

impl AppStateInner {
    pub fn new(db: Database, session_secret: impl Into<String>) -> Result<AppState, AppError> {
        Ok(Arc::new(Self {
            db,
            session_secret: session_secret.into(),
            templates: templates::load()?,
        }))
    }
}

const SIGNUP_FIELDS: &[&str] = &["username", "email", "password", "image_url"];
const LOGIN_FIELDS: &[&str] = &["username", "password"];

pub async fn signup_form(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    render_signup(&state, jar, &current, &SignupForm::default(), None)
}

/// Create the user, log them in and go home. A taken username or email
/// re-renders the form with a flash.
pub async fn signup(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    jar: CookieJar,
    Form(form): Form<SignupForm>,
) -> Result<Response, AppError> {
    if let Err(errors) = form.validate() {
        return render_signup(&state, jar, &current, &form, Some(&errors));
    }

    let image_url = non_empty(&form.image_url);
    match state
        .db
        .signup(&form.username, &form.email, &form.password, image_url.as_deref())
    {
        Ok(user) => {
            let jar = session::do_login(jar, &state.session_secret, &user)?;
            Ok((jar, redirect("/")).into_response())
        }
        Err(e) if e.is_integrity() => {
            let jar = flash::push(jar, "danger", "Username already taken");
            render_signup(&state, jar, &current, &form, None)
        }
        Err(DbError::Validation(msg)) => {
            let jar = flash::push(jar, "danger", msg);
            render_signup(&state, jar, &current, &form, None)
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn login_form(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    render_login(&state, jar, &current, &LoginForm::default(), None)
}

pub async fn login(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    if let Err(errors) = form.validate() {
        return render_login(&state, jar, &current, &form, Some(&errors));
    }

    match state.db.authenticate(&form.username, &form.password)? {
        Some(user) => {
            info!(user_id = user.id, "user logged in");
            let jar = session::do_login(jar, &state.session_secret, &user)?;
            let jar = flash::push(jar, "success", format!("Hello, {}!", user.username));
            Ok((jar, redirect("/")).into_response())
        }
        None => {
            let jar = flash::push(jar, "danger", "Invalid credentials.");
            render_login(&state, jar, &current, &form, None)
        }
    }
}

pub async fn logout(jar: CookieJar) -> Response {
    let jar = session::do_logout(jar);
    let jar = flash::push(jar, "success", "You have successfully logged out.");
    (jar, redirect("/login")).into_response()
}

fn render_signup(
    state: &AppStateInner,
    jar: CookieJar,
    current: &CurrentUser,
    form: &SignupForm,
    errors: Option<&ValidationErrors>,
) -> Result<Response, AppError> {
    let mut ctx = Context::new();
    ctx.insert("form", &SignupForm {
        password: String::new(),
        ..form.clone()
    });
    ctx.insert("errors", &form_errors(SIGNUP_FIELDS, errors));
    render(state, jar, current, "users/signup.html", ctx)
}

fn render_login(
    state: &AppStateInner,
    jar: CookieJar,
    current: &CurrentUser,
    form: &LoginForm,
    errors: Option<&ValidationErrors>,
) -> Result<Response, AppError> {
    let mut ctx = Context::new();
    ctx.insert("form", &LoginForm {
        password: String::new(),
        ..form.clone()
    });
    ctx.insert("errors", &form_errors(LOGIN_FIELDS, errors));
    render(state, jar, current, "users/login.html", ctx)
}
