use rusqlite::{Connection, OptionalExtension, Row, params};
use tracing::info;

use crate::models::MessageRow;
use crate::{Database, DbError, Result};

// JOIN users to fetch the author's name and avatar in a single query
const MESSAGE_SELECT: &str = "SELECT m.id, m.text, m.timestamp, m.user_id, u.username, u.image_url
     FROM messages m
     JOIN users u ON m.user_id = u.id";

impl Database {
    // -- Messages --

    pub fn insert_message(&self, user_id: i64, text: &str) -> Result<MessageRow> {
        let message = self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO messages (text, user_id) VALUES (?1, ?2)",
                params![text, user_id],
            )?;
            let id = conn.last_insert_rowid();
            query_message(conn, id)?.ok_or(DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
        })?;

        info!(message_id = message.id, user_id, "message created");
        Ok(message)
    }

    /// Inserts a message with a fixed id. Used to seed fixtures.
    pub fn insert_message_with_id(&self, id: i64, user_id: i64, text: &str) -> Result<MessageRow> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO messages (id, text, user_id) VALUES (?1, ?2, ?3)",
                params![id, text, user_id],
            )?;
            query_message(conn, id)?.ok_or(DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
        })
    }

    pub fn get_message(&self, id: i64) -> Result<Option<MessageRow>> {
        self.with_conn(|conn| query_message(conn, id))
    }

    /// Deletes the message and every like pointing at it.
    pub fn delete_message(&self, id: i64) -> Result<bool> {
        let deleted =
            self.with_conn(|conn| Ok(conn.execute("DELETE FROM messages WHERE id = ?1", [id])?))?;
        if deleted > 0 {
            info!(message_id = id, "message deleted");
        }
        Ok(deleted > 0)
    }

    /// The user's own messages, newest first.
    pub fn messages_by_user(&self, user_id: i64, limit: u32) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "{MESSAGE_SELECT}
                 WHERE m.user_id = ?1
                 ORDER BY m.timestamp DESC, m.id DESC
                 LIMIT ?2"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(params![user_id, limit], message_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Messages by `user_id` and everyone they follow, newest first.
    pub fn home_timeline(&self, user_id: i64, limit: u32) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "{MESSAGE_SELECT}
                 WHERE m.user_id = ?1
                    OR m.user_id IN (
                        SELECT user_being_followed_id FROM follows WHERE user_following_id = ?1
                    )
                 ORDER BY m.timestamp DESC, m.id DESC
                 LIMIT ?2"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(params![user_id, limit], message_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    // -- Likes --

    pub fn add_like(&self, user_id: i64, message_id: i64) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO likes (user_id, message_id) VALUES (?1, ?2)",
                [user_id, message_id],
            )?;
            Ok(())
        })
    }

    /// Toggle a like: removes it if present, inserts it if not.
    /// Returns true when the message is liked afterwards.
    pub fn toggle_like(&self, user_id: i64, message_id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let tx = conn.transaction()?;
            let removed = tx.execute(
                "DELETE FROM likes WHERE user_id = ?1 AND message_id = ?2",
                [user_id, message_id],
            )?;
            if removed == 0 {
                tx.execute(
                    "INSERT INTO likes (user_id, message_id) VALUES (?1, ?2)",
                    [user_id, message_id],
                )?;
            }
            tx.commit()?;
            Ok(removed == 0)
        })
    }

    /// Messages the user has liked, newest first.
    pub fn liked_messages(&self, user_id: i64) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "{MESSAGE_SELECT}
                 JOIN likes l ON l.message_id = m.id
                 WHERE l.user_id = ?1
                 ORDER BY m.timestamp DESC, m.id DESC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([user_id], message_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn liked_message_ids(&self, user_id: i64) -> Result<Vec<i64>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT message_id FROM likes WHERE user_id = ?1")?;
            let ids = stmt
                .query_map([user_id], |row| row.get(0))?
                .collect::<std::result::Result<Vec<i64>, _>>()?;
            Ok(ids)
        })
    }
}

fn query_message(conn: &Connection, id: i64) -> Result<Option<MessageRow>> {
    let sql = format!("{MESSAGE_SELECT} WHERE m.id = ?1");
    Ok(conn.query_row(&sql, [id], message_from_row).optional()?)
}

fn message_from_row(row: &Row<'_>) -> rusqlite::Result<MessageRow> {
    Ok(MessageRow {
        id: row.get(0)?,
        text: row.get(1)?,
        timestamp: row.get(2)?,
        user_id: row.get(3)?,
        author_username: row.get(4)?,
        author_image_url: row.get(5)?,
    })
}
