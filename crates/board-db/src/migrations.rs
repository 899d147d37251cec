use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;

    if version < 1 {
        info!("Running migration v1 (messages, likes, comments)");
        conn.execute_batch(
            "
            BEGIN;

            CREATE TABLE messages (
                seq             INTEGER PRIMARY KEY AUTOINCREMENT,
                id              TEXT NOT NULL UNIQUE,
                body            TEXT NOT NULL,
                body_folded     TEXT NOT NULL,
                created_by      INTEGER NOT NULL,
                date            TEXT NOT NULL,
                hour            TEXT NOT NULL,
                likes           INTEGER NOT NULL DEFAULT 0 CHECK (likes >= 0),
                hashtags        TEXT,
                images          TEXT
            );

            CREATE INDEX idx_messages_chronological
                ON messages(date DESC, hour DESC, seq DESC);

            CREATE TABLE message_likes (
                seq         INTEGER PRIMARY KEY AUTOINCREMENT,
                message_id  TEXT NOT NULL REFERENCES messages(id) ON DELETE CASCADE,
                user_id     INTEGER NOT NULL,
                UNIQUE(message_id, user_id)
            );

            CREATE TABLE message_comments (
                seq           INTEGER PRIMARY KEY AUTOINCREMENT,
                message_id    TEXT NOT NULL REFERENCES messages(id) ON DELETE CASCADE,
                commented_by  INTEGER NOT NULL,
                text          TEXT NOT NULL,
                date          TEXT NOT NULL,
                hour          TEXT NOT NULL
            );

            CREATE INDEX idx_comments_message
                ON message_comments(message_id, seq);

            INSERT INTO schema_version (version) VALUES (1);

            COMMIT;
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
