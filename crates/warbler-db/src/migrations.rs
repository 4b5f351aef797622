use rusqlite::Connection;
use tracing::info;

use crate::Result;

pub const DEFAULT_IMAGE_URL: &str = "/static/images/default-pic.png";
pub const DEFAULT_HEADER_IMAGE_URL: &str = "/static/images/warbler-hero.jpg";

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id                  INTEGER PRIMARY KEY AUTOINCREMENT,
            email               TEXT NOT NULL UNIQUE CHECK (length(email) > 0),
            username            TEXT NOT NULL UNIQUE CHECK (length(username) > 0),
            image_url           TEXT NOT NULL DEFAULT '/static/images/default-pic.png',
            header_image_url    TEXT NOT NULL DEFAULT '/static/images/warbler-hero.jpg',
            bio                 TEXT,
            location            TEXT,
            password            TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS messages (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            text        TEXT NOT NULL CHECK (length(text) <= 140),
            timestamp   TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now')),
            user_id     INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_messages_user
            ON messages(user_id, timestamp);

        CREATE TABLE IF NOT EXISTS follows (
            user_being_followed_id  INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            user_following_id       INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            PRIMARY KEY (user_being_followed_id, user_following_id)
        );

        CREATE INDEX IF NOT EXISTS idx_follows_follower
            ON follows(user_following_id);

        CREATE TABLE IF NOT EXISTS likes (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id     INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            message_id  INTEGER NOT NULL REFERENCES messages(id) ON DELETE CASCADE,
            UNIQUE(user_id, message_id)
        );

        CREATE INDEX IF NOT EXISTS idx_likes_message
            ON likes(message_id);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
