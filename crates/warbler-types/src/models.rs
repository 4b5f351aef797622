use serde::{Deserialize, Serialize};

/// A user as rendered into pages. Never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub image_url: String,
    pub header_image_url: String,
    pub bio: Option<String>,
    pub location: Option<String>,
}

/// Counters shown on the user card and profile header.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserStats {
    pub messages: i64,
    pub following: i64,
    pub followers: i64,
    pub likes: i64,
}

/// The slice of the author a message card needs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Author {
    pub id: i64,
    pub username: String,
    pub image_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub id: i64,
    pub text: String,
    /// Display form, e.g. "16 October 2026".
    pub timestamp: String,
    pub user: Author,
    /// Whether the viewing user has liked this message.
    pub liked: bool,
}

/// A user card in the following/followers/search lists.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserCard {
    pub user: User,
    /// Whether the viewing user follows this one.
    pub followed: bool,
}

/// One pending flash message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Flash {
    pub category: String,
    pub message: String,
}

impl Flash {
    pub fn new(category: &str, message: impl Into<String>) -> Self {
        Self {
            category: category.to_string(),
            message: message.into(),
        }
    }
}
