pub mod auth;
pub mod error;
pub mod flash;
pub mod likes;
pub mod messages;
pub mod middleware;
pub mod pages;
pub mod session;
pub mod templates;
pub mod users;

use axum::{
    Router,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};

pub use auth::{AppState, AppStateInner};
pub use error::AppError;

/// All Warbler routes, with the session loaded ahead of every handler.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(pages::homepage))
        .route("/signup", get(auth::signup_form).post(auth::signup))
        .route("/login", get(auth::login_form).post(auth::login))
        .route("/logout", get(auth::logout))
        .route("/users", get(users::list_users))
        .route("/users/profile", get(users::edit_profile_form).post(users::edit_profile))
        .route("/users/delete", post(users::delete_user))
        .route("/users/{user_id}", get(users::show_user))
        .route("/users/{user_id}/following", get(users::show_following))
        .route("/users/{user_id}/followers", get(users::show_followers))
        .route("/users/{user_id}/likes", get(likes::show_likes))
        .route("/users/follow/{follow_id}", post(users::follow))
        .route("/users/stop-following/{follow_id}", post(users::stop_following))
        .route("/users/add_like/{message_id}", post(likes::toggle_like))
        .route("/messages/new", get(messages::new_message_form).post(messages::create_message))
        .route("/messages/{message_id}", get(messages::show_message))
        .route("/messages/{message_id}/delete", post(messages::delete_message))
        .fallback(pages::not_found)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::load_current_user,
        ))
        .with_state(state)
}

/// `302 Found` to `location`.
pub fn redirect(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}
