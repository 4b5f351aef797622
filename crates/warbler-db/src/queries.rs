use rusqlite::{Connection, OptionalExtension, Row, params};
use tracing::{debug, info};
use validator::ValidateEmail;
use warbler_types::models::UserStats;

use crate::migrations::{DEFAULT_HEADER_IMAGE_URL, DEFAULT_IMAGE_URL};
use crate::models::{NewUser, ProfileUpdate, UserRow};
use crate::{Database, DbError, Result, password};

const USER_COLUMNS: &str =
    "u.id, u.email, u.username, u.image_url, u.header_image_url, u.bio, u.location, u.password";

impl Database {
    // -- Users --

    /// Hashes `password` and inserts a new user.
    pub fn signup(
        &self,
        username: &str,
        email: &str,
        password: &str,
        image_url: Option<&str>,
    ) -> Result<UserRow> {
        if password.is_empty() {
            return Err(DbError::Validation("password must not be empty".into()));
        }
        if !email.validate_email() {
            return Err(DbError::Validation(format!("invalid email address: {email}")));
        }

        let hashed = password::hash(password)?;
        let user = self.insert_user(NewUser {
            id: None,
            email: email.to_string(),
            username: username.to_string(),
            password: hashed,
            image_url: image_url.map(str::to_string),
        })?;

        info!(user_id = user.id, username = %user.username, "user signed up");
        Ok(user)
    }

    pub fn insert_user(&self, new: NewUser) -> Result<UserRow> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (id, email, username, image_url, password)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    new.id,
                    new.email,
                    new.username,
                    new.image_url.as_deref().unwrap_or(DEFAULT_IMAGE_URL),
                    new.password
                ],
            )?;
            let id = conn.last_insert_rowid();
            query_user_by_id(conn, id)?.ok_or(DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
        })
    }

    /// Returns the user when `username` exists and `password` matches its hash.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<Option<UserRow>> {
        let Some(user) = self.get_user_by_username(username)? else {
            debug!(username, "authenticate: unknown username");
            return Ok(None);
        };

        if password::verify(password, &user.password) {
            Ok(Some(user))
        } else {
            debug!(username, "authenticate: wrong password");
            Ok(None)
        }
    }

    pub fn get_user(&self, id: i64) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user_by_id(conn, id))
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {USER_COLUMNS} FROM users u WHERE u.username = ?1");
            Ok(conn.query_row(&sql, [username], user_from_row).optional()?)
        })
    }

    /// Users whose username contains `query`; every user when `query` is `None`.
    pub fn search_users(&self, query: Option<&str>) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| {
            let pattern = format!("%{}%", escape_like(query.unwrap_or("")));
            let sql = format!(
                "SELECT {USER_COLUMNS} FROM users u
                 WHERE u.username LIKE ?1 ESCAPE '\\'
                 ORDER BY u.username"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([pattern], user_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn update_user(&self, id: i64, update: &ProfileUpdate) -> Result<UserRow> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE users
                 SET username = ?1, email = ?2, image_url = ?3, header_image_url = ?4,
                     bio = ?5, location = ?6
                 WHERE id = ?7",
                params![
                    update.username,
                    update.email,
                    update.image_url.as_deref().unwrap_or(DEFAULT_IMAGE_URL),
                    update
                        .header_image_url
                        .as_deref()
                        .unwrap_or(DEFAULT_HEADER_IMAGE_URL),
                    update.bio,
                    update.location,
                    id
                ],
            )?;
            query_user_by_id(conn, id)?.ok_or(DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
        })
    }

    /// Deletes the user; messages, follow edges and likes go with it.
    pub fn delete_user(&self, id: i64) -> Result<bool> {
        let deleted =
            self.with_conn(|conn| Ok(conn.execute("DELETE FROM users WHERE id = ?1", [id])?))?;
        if deleted > 0 {
            info!(user_id = id, "user deleted");
        }
        Ok(deleted > 0)
    }

    pub fn user_stats(&self, id: i64) -> Result<UserStats> {
        self.with_conn(|conn| {
            Ok(conn.query_row(
                "SELECT
                    (SELECT COUNT(*) FROM messages WHERE user_id = ?1),
                    (SELECT COUNT(*) FROM follows WHERE user_following_id = ?1),
                    (SELECT COUNT(*) FROM follows WHERE user_being_followed_id = ?1),
                    (SELECT COUNT(*) FROM likes WHERE user_id = ?1)",
                [id],
                |row| {
                    Ok(UserStats {
                        messages: row.get(0)?,
                        following: row.get(1)?,
                        followers: row.get(2)?,
                        likes: row.get(3)?,
                    })
                },
            )?)
        })
    }

    // -- Follows --

    /// Records that `follower_id` follows `followed_id`. Repeating is a no-op.
    pub fn follow(&self, follower_id: i64, followed_id: i64) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT OR IGNORE INTO follows (user_being_followed_id, user_following_id)
                 VALUES (?1, ?2)",
                [followed_id, follower_id],
            )?;
            Ok(())
        })
    }

    /// Returns whether an edge was removed.
    pub fn unfollow(&self, follower_id: i64, followed_id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let removed = conn.execute(
                "DELETE FROM follows WHERE user_being_followed_id = ?1 AND user_following_id = ?2",
                [followed_id, follower_id],
            )?;
            Ok(removed > 0)
        })
    }

    /// Does `user_id` follow `other_id`?
    pub fn is_following(&self, user_id: i64, other_id: i64) -> Result<bool> {
        self.with_conn(|conn| edge_exists(conn, user_id, other_id))
    }

    /// Is `user_id` followed by `other_id`?
    pub fn is_followed_by(&self, user_id: i64, other_id: i64) -> Result<bool> {
        self.with_conn(|conn| edge_exists(conn, other_id, user_id))
    }

    /// Users that `user_id` follows.
    pub fn following(&self, user_id: i64) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {USER_COLUMNS} FROM users u
                 JOIN follows f ON f.user_being_followed_id = u.id
                 WHERE f.user_following_id = ?1
                 ORDER BY u.username"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([user_id], user_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Users that follow `user_id`.
    pub fn followers(&self, user_id: i64) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {USER_COLUMNS} FROM users u
                 JOIN follows f ON f.user_following_id = u.id
                 WHERE f.user_being_followed_id = ?1
                 ORDER BY u.username"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([user_id], user_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Ids of the users `user_id` follows.
    pub fn following_ids(&self, user_id: i64) -> Result<Vec<i64>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT user_being_followed_id FROM follows WHERE user_following_id = ?1",
            )?;
            let ids = stmt
                .query_map([user_id], |row| row.get(0))?
                .collect::<std::result::Result<Vec<i64>, _>>()?;
            Ok(ids)
        })
    }
}

/// `%` and `_` in a search term match themselves, not any character.
fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn edge_exists(conn: &Connection, follower_id: i64, followed_id: i64) -> Result<bool> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM follows WHERE user_following_id = ?1 AND user_being_followed_id = ?2",
            [follower_id, followed_id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

fn query_user_by_id(conn: &Connection, id: i64) -> Result<Option<UserRow>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users u WHERE u.id = ?1");
    Ok(conn.query_row(&sql, [id], user_from_row).optional()?)
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        email: row.get(1)?,
        username: row.get(2)?,
        image_url: row.get(3)?,
        header_image_url: row.get(4)?,
        bio: row.get(5)?,
        location: row.get(6)?,
        password: row.get(7)?,
    })
}
