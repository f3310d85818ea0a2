// 💬 Comments - per-person threaded comments in SQLite
//
// Rows: { id, created_at, nickname, content, member_name, parent_id }
// parent_id = NULL is a top-level comment; otherwise it is a reply to a
// top-level comment on the same person (one level of nesting only).
//
// The password is write-only. It is stored as sha256(salt || password) with a
// random per-comment salt and is only ever used to authorize deletion.

use anyhow::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

pub const MAX_NICKNAME_CHARS: usize = 20;
pub const MAX_CONTENT_CHARS: usize = 1000;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Error, Debug)]
pub enum CommentError {
    #[error("{field} is required")]
    MissingField { field: &'static str },

    #[error("{field} is too long (max {max} characters)")]
    TooLong { field: &'static str, max: usize },

    #[error("Parent comment not found: {0}")]
    ParentNotFound(i64),

    #[error("Comment {0} cannot be replied to from here")]
    InvalidParent(i64),

    #[error("Comment not found: {0}")]
    NotFound(i64),

    #[error("Password does not match")]
    WrongPassword,

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

impl CommentError {
    /// Caller mistakes, as opposed to storage failures
    pub fn is_client_error(&self) -> bool {
        !matches!(self, CommentError::Database(_))
    }
}

pub type CommentResult<T> = std::result::Result<T, CommentError>;

// ============================================================================
// ROWS
// ============================================================================

/// A stored comment as returned to readers (no password material)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub nickname: String,
    pub content: String,
    pub member_name: String,
    pub parent_id: Option<i64>,
}

impl Comment {
    pub fn is_reply(&self) -> bool {
        self.parent_id.is_some()
    }
}

/// Write request
#[derive(Debug, Clone, Deserialize)]
pub struct NewComment {
    pub member_name: String,
    pub nickname: String,
    pub password: String,
    pub content: String,
    #[serde(default)]
    pub parent_id: Option<i64>,
}

impl NewComment {
    fn validate(&self) -> CommentResult<()> {
        required("member_name", &self.member_name)?;
        required("nickname", &self.nickname)?;
        required("password", &self.password)?;
        required("content", &self.content)?;

        if self.nickname.trim().chars().count() > MAX_NICKNAME_CHARS {
            return Err(CommentError::TooLong { field: "nickname", max: MAX_NICKNAME_CHARS });
        }
        if self.content.trim().chars().count() > MAX_CONTENT_CHARS {
            return Err(CommentError::TooLong { field: "content", max: MAX_CONTENT_CHARS });
        }
        Ok(())
    }
}

fn required(field: &'static str, value: &str) -> CommentResult<()> {
    if value.trim().is_empty() {
        Err(CommentError::MissingField { field })
    } else {
        Ok(())
    }
}

// ============================================================================
// PASSWORDS
// ============================================================================

fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Constant-time check of a password against a stored hex digest
fn verify_password(salt: &str, password: &str, stored_hash: &str) -> bool {
    use subtle::ConstantTimeEq;
    hash_password(salt, password).as_bytes().ct_eq(stored_hash.as_bytes()).into()
}

fn new_salt() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

// ============================================================================
// STORE
// ============================================================================

pub fn setup_comments(conn: &Connection) -> Result<()> {
    conn.pragma_update(None, "journal_mode", "WAL")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS comments (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            created_at TEXT NOT NULL,
            nickname TEXT NOT NULL,
            content TEXT NOT NULL,
            member_name TEXT NOT NULL,
            parent_id INTEGER,
            password_salt TEXT NOT NULL,
            password_hash TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_comments_member
         ON comments(member_name, created_at)",
        [],
    )?;

    Ok(())
}

/// Store a comment and return it as readers will see it
pub fn insert_comment(conn: &Connection, new: &NewComment) -> CommentResult<Comment> {
    new.validate()?;

    let member_name = new.member_name.trim();

    if let Some(parent_id) = new.parent_id {
        let parent: Option<(String, Option<i64>)> = conn
            .query_row(
                "SELECT member_name, parent_id FROM comments WHERE id = ?1",
                [parent_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        match parent {
            None => return Err(CommentError::ParentNotFound(parent_id)),
            Some((parent_member, grandparent)) => {
                if parent_member != member_name || grandparent.is_some() {
                    return Err(CommentError::InvalidParent(parent_id));
                }
            }
        }
    }

    let created_at = Utc::now();
    let salt = new_salt();
    let hash = hash_password(&salt, &new.password);

    conn.execute(
        "INSERT INTO comments (created_at, nickname, content, member_name, parent_id, password_salt, password_hash)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            created_at.to_rfc3339_opts(SecondsFormat::Micros, true),
            new.nickname.trim(),
            new.content.trim(),
            member_name,
            new.parent_id,
            salt,
            hash,
        ],
    )?;

    Ok(Comment {
        id: conn.last_insert_rowid(),
        created_at,
        nickname: new.nickname.trim().to_string(),
        content: new.content.trim().to_string(),
        member_name: member_name.to_string(),
        parent_id: new.parent_id,
    })
}

/// All comments for one person, oldest first. The name is trimmed the
/// same way `insert_comment` trims it.
pub fn list_comments(conn: &Connection, member_name: &str) -> CommentResult<Vec<Comment>> {
    let mut stmt = conn.prepare(
        "SELECT id, created_at, nickname, content, member_name, parent_id
         FROM comments
         WHERE member_name = ?1
         ORDER BY created_at ASC, id ASC",
    )?;

    let comments = stmt
        .query_map([member_name.trim()], |row| {
            let created_at: String = row.get(1)?;
            let created_at = DateTime::parse_from_rfc3339(&created_at)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Text, Box::new(e))
                })?;

            Ok(Comment {
                id: row.get(0)?,
                created_at,
                nickname: row.get(2)?,
                content: row.get(3)?,
                member_name: row.get(4)?,
                parent_id: row.get(5)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(comments)
}

/// Delete a comment (and its replies) if the password matches.
/// Returns the number of rows removed.
pub fn delete_comment(conn: &Connection, id: i64, password: &str) -> CommentResult<usize> {
    let stored: Option<(String, String)> = conn
        .query_row(
            "SELECT password_salt, password_hash FROM comments WHERE id = ?1",
            [id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;

    let (salt, hash) = stored.ok_or(CommentError::NotFound(id))?;
    if !verify_password(&salt, password, &hash) {
        return Err(CommentError::WrongPassword);
    }

    let removed = conn.execute("DELETE FROM comments WHERE id = ?1 OR parent_id = ?1", [id])?;
    Ok(removed)
}

pub fn count_comments(conn: &Connection, member_name: &str) -> CommentResult<i64> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM comments WHERE member_name = ?1",
        [member_name.trim()],
        |row| row.get(0),
    )?;
    Ok(count)
}

// ============================================================================
// THREADS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentThread {
    #[serde(flatten)]
    pub comment: Comment,
    pub replies: Vec<Comment>,
}

/// Group a flat, oldest-first list into top-level comments with their replies.
/// Replies whose parent is missing are dropped.
pub fn thread_comments(rows: Vec<Comment>) -> Vec<CommentThread> {
    let (top, replies): (Vec<Comment>, Vec<Comment>) = rows.into_iter().partition(|c| !c.is_reply());

    let mut threads: Vec<CommentThread> = top
        .into_iter()
        .map(|comment| CommentThread { comment, replies: Vec::new() })
        .collect();

    for reply in replies {
        if let Some(thread) = threads.iter_mut().find(|t| Some(t.comment.id) == reply.parent_id) {
            thread.replies.push(reply);
        }
    }

    threads
}

// ============================================================================
// TESTS
// ============================================================================
