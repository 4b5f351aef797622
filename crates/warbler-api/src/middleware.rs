use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::error;

use warbler_db::models::UserRow;

use crate::session::{self, CURR_USER_KEY};
use crate::{AppError, AppState, flash, redirect};

/// The logged-in user for this request, if any.
#[derive(Debug, Clone, Default)]
pub struct CurrentUser(pub Option<UserRow>);

impl CurrentUser {
    pub fn user(&self) -> Option<&UserRow> {
        self.0.as_ref()
    }
}

/// Resolve the session cookie to a user before any handler runs.
/// A bad token or a since-deleted user both read as logged out; a storage
/// failure ends the request with a 500.
pub async fn load_current_user(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Response {
    let claims = jar
        .get(CURR_USER_KEY)
        .and_then(|c| session::decode_token(&state.session_secret, c.value()));

    let user = match claims {
        Some(claims) => match state.db.get_user(claims.sub) {
            Ok(user) => user,
            Err(e) => {
                error!("Failed to load session user {}: {}", claims.sub, e);
                return AppError::from(e).into_response();
            }
        },
        None => None,
    };

    req.extensions_mut().insert(CurrentUser(user));
    next.run(req).await
}

/// Flash "Access unauthorized." and send the visitor home.
pub fn access_unauthorized(jar: CookieJar) -> Response {
    (flash::push(jar, "danger", "Access unauthorized."), redirect("/")).into_response()
}
