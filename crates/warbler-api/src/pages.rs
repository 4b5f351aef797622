use axum::{Extension, extract::State, response::Response};
use axum_extra::extract::cookie::CookieJar;
use tera::Context;

use crate::messages::message_views;
use crate::middleware::CurrentUser;
use crate::templates::render;
use crate::{AppError, AppState};

/// Messages shown on the logged-in home page.
pub const TIMELINE_LIMIT: u32 = 100;

/// Landing page for visitors; timeline of own and followed users' messages
/// once logged in.
pub async fn homepage(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let Some(user) = current.user() else {
        return render(&state, jar, &current, "home-anon.html", Context::new());
    };

    let rows = state.db.home_timeline(user.id, TIMELINE_LIMIT)?;
    let mut ctx = Context::new();
    ctx.insert("messages", &message_views(&state, &rows, Some(user))?);
    ctx.insert("stats", &state.db.user_stats(user.id)?);
    render(&state, jar, &current, "home.html", ctx)
}

pub async fn not_found() -> AppError {
    AppError::NotFound
}
