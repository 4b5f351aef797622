//! Database row types. These map directly to SQLite rows and stay distinct
//! from the warbler-types view models so the page layer never sees hashes.

use std::fmt;

use chrono::NaiveDateTime;
use warbler_types::models::{Author, Message, User};

#[derive(Debug, Clone, PartialEq)]
pub struct UserRow {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub image_url: String,
    pub header_image_url: String,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub password: String,
}

impl fmt::Display for UserRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<User #{}: {}, {}>", self.id, self.username, self.email)
    }
}

impl From<&UserRow> for User {
    fn from(row: &UserRow) -> Self {
        User {
            id: row.id,
            username: row.username.clone(),
            email: row.email.clone(),
            image_url: row.image_url.clone(),
            header_image_url: row.header_image_url.clone(),
            bio: row.bio.clone(),
            location: row.location.clone(),
        }
    }
}

/// A user insert that bypasses hashing. `password` is stored as given.
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub id: Option<i64>,
    pub email: String,
    pub username: String,
    pub password: String,
    pub image_url: Option<String>,
}

/// Editable profile fields. `None` image fields reset to the defaults.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub username: String,
    pub email: String,
    pub image_url: Option<String>,
    pub header_image_url: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MessageRow {
    pub id: i64,
    pub text: String,
    pub timestamp: String,
    pub user_id: i64,
    pub author_username: String,
    pub author_image_url: String,
}

impl MessageRow {
    /// Renders the stored timestamp as "16 October 2026".
    pub fn display_date(&self) -> String {
        NaiveDateTime::parse_from_str(&self.timestamp, "%Y-%m-%d %H:%M:%S%.f")
            .map(|ts| ts.format("%d %B %Y").to_string())
            .unwrap_or_else(|_| self.timestamp.clone())
    }

    pub fn to_view(&self, liked: bool) -> Message {
        Message {
            id: self.id,
            text: self.text.clone(),
            timestamp: self.display_date(),
            user: Author {
                id: self.user_id,
                username: self.author_username.clone(),
                image_url: self.author_image_url.clone(),
            },
            liked,
        }
    }
}
