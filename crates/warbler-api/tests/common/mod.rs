//! A small browser stand-in: keeps cookies between requests and can follow
//! redirects, so view tests read like a user clicking through the site.
#![allow(dead_code)]

use std::collections::BTreeMap;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use axum_extra::extract::cookie::Cookie;
use tower::ServiceExt;

use warbler_api::session::{CURR_USER_KEY, create_token};
use warbler_api::{AppState, AppStateInner, router};
use warbler_db::Database;
use warbler_db::models::{MessageRow, NewUser, UserRow};

pub const SECRET: &str = "test-secret";

pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub body: String,
}

pub struct TestClient {
    router: Router,
    cookies: BTreeMap<String, String>,
}

impl TestClient {
    pub fn new(state: AppState) -> Self {
        Self {
            router: router(state),
            cookies: BTreeMap::new(),
        }
    }

    /// Puts `user` in the session without going through `/login`.
    pub fn login_as(&mut self, user: &UserRow) {
        let token = create_token(SECRET, user).unwrap();
        self.cookies.insert(CURR_USER_KEY.to_string(), token);
    }

    pub fn has_session(&self) -> bool {
        self.cookies.contains_key(CURR_USER_KEY)
    }

    pub async fn get(&mut self, uri: &str) -> TestResponse {
        self.send(Method::GET, uri, None).await
    }

    pub async fn post(&mut self, uri: &str, form: &[(&str, &str)]) -> TestResponse {
        self.send(Method::POST, uri, Some(encode_form(form))).await
    }

    pub async fn get_follow(&mut self, uri: &str) -> TestResponse {
        let resp = self.get(uri).await;
        self.follow_redirects(resp).await
    }

    pub async fn post_follow(&mut self, uri: &str, form: &[(&str, &str)]) -> TestResponse {
        let resp = self.post(uri, form).await;
        self.follow_redirects(resp).await
    }

    async fn follow_redirects(&mut self, mut resp: TestResponse) -> TestResponse {
        for _ in 0..5 {
            match (resp.status, resp.location.clone()) {
                (StatusCode::FOUND, Some(location)) => resp = self.get(&location).await,
                _ => return resp,
            }
        }
        panic!("too many redirects");
    }

    async fn send(&mut self, method: Method, uri: &str, form: Option<String>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if !self.cookies.is_empty() {
            let cookie = self
                .cookies
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect::<Vec<_>>()
                .join("; ");
            builder = builder.header(header::COOKIE, cookie);
        }
        let body = match form {
            Some(form) => {
                builder = builder.header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
                Body::from(form)
            }
            None => Body::empty(),
        };

        let resp = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        for value in resp.headers().get_all(header::SET_COOKIE) {
            let cookie = Cookie::parse(value.to_str().unwrap()).unwrap();
            let removed = cookie.value().is_empty()
                || cookie.max_age().is_some_and(|age| age.is_zero());
            if removed {
                self.cookies.remove(cookie.name());
            } else {
                self.cookies
                    .insert(cookie.name().to_string(), cookie.value().to_string());
            }
        }

        let status = resp.status();
        let location = resp
            .headers()
            .get(header::LOCATION)
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = axum::body::to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
        TestResponse {
            status,
            location,
            body: String::from_utf8(bytes.to_vec()).unwrap(),
        }
    }
}

fn encode_form(form: &[(&str, &str)]) -> String {
    serde_urlencoded::to_string(form).unwrap()
}

/// The shared fixture: `testuser` (password "testuser") signed up normally,
/// `testuser2` inserted raw with id 1000, and message 2 owned by `testuser2`.
pub struct Fixture {
    pub state: AppState,
    pub client: TestClient,
    pub testuser: UserRow,
    pub user2: UserRow,
    pub msg2: MessageRow,
}

pub fn setup() -> Fixture {
    let db = Database::open_in_memory().unwrap();
    let testuser = db.signup("testuser", "test@test.com", "testuser", None).unwrap();
    let user2 = db
        .insert_user(NewUser {
            id: Some(1000),
            email: "test2@test.com".into(),
            username: "testuser2".into(),
            password: "HASHED_PASSWORD".into(),
            image_url: None,
        })
        .unwrap();
    let msg2 = db.insert_message_with_id(2, 1000, "Hola, como esta?").unwrap();

    let state = AppStateInner::new(db, SECRET).unwrap();
    Fixture {
        client: TestClient::new(state.clone()),
        state,
        testuser,
        user2,
        msg2,
    }
}
