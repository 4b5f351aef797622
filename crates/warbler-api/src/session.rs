use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use tracing::debug;

use warbler_db::models::UserRow;
use warbler_types::api::Claims;

use crate::AppError;

/// Cookie under which the logged-in user's session token is kept.
pub const CURR_USER_KEY: &str = "curr_user";

const SESSION_DAYS: i64 = 30;

pub fn create_token(secret: &str, user: &UserRow) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = Claims {
        sub: user.id,
        username: user.username.clone(),
        exp: (chrono::Utc::now() + chrono::Duration::days(SESSION_DAYS)).timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// `None` for a forged, expired or malformed token.
pub fn decode_token(secret: &str, token: &str) -> Option<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| debug!("rejected session token: {}", e))
    .ok()
}

pub fn do_login(jar: CookieJar, secret: &str, user: &UserRow) -> Result<CookieJar, AppError> {
    let token = create_token(secret, user)?;
    Ok(jar.add(
        Cookie::build((CURR_USER_KEY, token))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax),
    ))
}

pub fn do_logout(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(CURR_USER_KEY).path("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> UserRow {
        UserRow {
            id: 7,
            email: "test@test.com".into(),
            username: "testuser".into(),
            image_url: String::new(),
            header_image_url: String::new(),
            bio: None,
            location: None,
            password: String::new(),
        }
    }

    #[test]
    fn token_round_trips_with_same_secret() {
        let token = create_token("secret", &user()).unwrap();
        let claims = decode_token("secret", &token).unwrap();
        assert_eq!(claims.sub, 7);
        assert_eq!(claims.username, "testuser");
    }

    #[test]
    fn token_from_other_secret_is_rejected() {
        let token = create_token("secret", &user()).unwrap();
        assert!(decode_token("other", &token).is_none());
        assert!(decode_token("secret", "not.a.token").is_none());
    }

    #[test]
    fn expired_token_is_rejected() {
        let claims = Claims {
            sub: 7,
            username: "testuser".into(),
            exp: (chrono::Utc::now() - chrono::Duration::hours(1)).timestamp() as usize,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"secret"),
        )
        .unwrap();
        assert!(decode_token("secret", &token).is_none());
    }

    #[test]
    fn login_sets_cookie_and_logout_clears_it() {
        let jar = do_login(CookieJar::new(), "secret", &user()).unwrap();
        let token = jar.get(CURR_USER_KEY).unwrap().value().to_string();
        assert_eq!(decode_token("secret", &token).unwrap().sub, 7);

        let jar = do_logout(jar);
        assert!(jar.get(CURR_USER_KEY).is_none());
    }
}
