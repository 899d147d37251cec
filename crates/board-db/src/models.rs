//! Database row types, mapped directly from SQLite rows.
//! Distinct from board-types models to keep the DB layer independent.

pub struct MessageRow {
    pub id: String,
    pub body: String,
    pub created_by: i64,
    pub date: String,
    pub hour: String,
    pub likes: i64,
    pub hashtags: Option<String>,
    pub images: Option<String>,
}

pub struct LikeRow {
    pub message_id: String,
    pub user_id: i64,
}

pub struct CommentRow {
    pub message_id: String,
    pub commented_by: i64,
    pub text: String,
    pub date: String,
    pub hour: String,
}
