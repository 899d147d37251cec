use std::collections::HashMap;

use anyhow::{Context, Result};
use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension, TransactionBehavior, params, params_from_iter};
use tracing::debug;

use board_types::models::{Comment, Message, MessageId, NewMessage, Stamp};

use crate::Database;
use crate::models::{CommentRow, LikeRow, MessageRow};
use crate::store::{Direction, Filter, FindOptions, MessageStore, Sort, SortField, Update, UpdateOp};

impl MessageStore for Database {
    fn find(&self, filter: &Filter, options: &FindOptions) -> Result<Vec<Message>> {
        self.with_conn(|conn| {
            // One read transaction so likes/comments match the message rows.
            let tx = conn.unchecked_transaction()?;

            let rows = query_messages(&tx, filter, options)?;
            let ids: Vec<String> = rows.iter().map(|r| r.id.clone()).collect();
            let likes = query_likes(&tx, &ids)?;
            let comments = query_comments(&tx, &ids)?;

            tx.commit()?;
            assemble(rows, likes, comments)
        })
    }

    fn insert_one(&self, doc: NewMessage) -> Result<MessageId> {
        let id = MessageId::new_v4();
        let hashtags = doc.hashtags.as_ref().map(serde_json::to_string).transpose()?;
        let images = doc.images.as_ref().map(serde_json::to_string).transpose()?;

        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO messages (id, body, body_folded, created_by, date, hour, likes, hashtags, images)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, ?7, ?8)",
                params![
                    id.to_string(),
                    doc.body,
                    fold_case(&doc.body),
                    doc.created_by,
                    doc.stamp.date_string(),
                    doc.stamp.hour_string(),
                    hashtags,
                    images,
                ],
            )?;
            Ok(())
        })?;

        debug!("Inserted message {}", id);
        Ok(id)
    }

    fn update_one(&self, filter: &Filter, update: &Update) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            let Some(id) = first_match(&tx, filter)? else {
                return Ok(false);
            };
            for op in update.ops() {
                apply_op(&tx, &id, op)?;
            }

            tx.commit()?;
            Ok(true)
        })
    }

    fn delete_one(&self, filter: &Filter) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            let Some(id) = first_match(&tx, filter)? else {
                return Ok(false);
            };
            // Likes and comments go with it via ON DELETE CASCADE
            tx.execute("DELETE FROM messages WHERE id = ?1", [&id])?;

            tx.commit()?;
            Ok(true)
        })
    }
}

// -- Filter / sort compilation --

/// Per-character lowercase fold. Unlike `str::to_lowercase`, a letter folds
/// the same way wherever it sits in a word (final sigma included), so folded
/// bodies and folded terms always agree.
fn fold_case(text: &str) -> String {
    text.chars().flat_map(char::to_lowercase).collect()
}

fn push_filter(filter: &Filter, sql: &mut String, params: &mut Vec<Value>) {
    match filter {
        Filter::All => sql.push('1'),
        Filter::Id(id) => {
            sql.push_str("m.id = ?");
            params.push(Value::Text(id.to_string()));
        }
        Filter::CreatedBy(author) => {
            sql.push_str("m.created_by = ?");
            params.push(Value::Integer(*author));
        }
        Filter::HashtagsContain(tag) => {
            sql.push_str("EXISTS (SELECT 1 FROM json_each(m.hashtags) AS t WHERE t.value = ?)");
            params.push(Value::Text(tag.clone()));
        }
        Filter::BodyContains(term) => {
            // instr() matches literally; no LIKE/GLOB metacharacters involved
            sql.push_str("instr(m.body_folded, ?) > 0");
            params.push(Value::Text(fold_case(term)));
        }
        Filter::NotLikedBy(user_id) => {
            sql.push_str(
                "NOT EXISTS (SELECT 1 FROM message_likes l WHERE l.message_id = m.id AND l.user_id = ?)",
            );
            params.push(Value::Integer(*user_id));
        }
        Filter::And(parts) if parts.is_empty() => sql.push('1'),
        Filter::And(parts) => {
            sql.push('(');
            for (i, part) in parts.iter().enumerate() {
                if i > 0 {
                    sql.push_str(" AND ");
                }
                push_filter(part, sql, params);
            }
            sql.push(')');
        }
    }
}

fn order_by(sort: &[Sort]) -> String {
    if sort.is_empty() {
        return String::new();
    }

    let terms: Vec<String> = sort
        .iter()
        .map(|s| {
            let column = match s.field {
                SortField::Date => "m.date",
                SortField::Hour => "m.hour",
                SortField::Inserted => "m.seq",
            };
            let direction = match s.direction {
                Direction::Asc => "ASC",
                Direction::Desc => "DESC",
            };
            format!("{} {}", column, direction)
        })
        .collect();

    format!(" ORDER BY {}", terms.join(", "))
}

fn placeholders(count: usize) -> String {
    (1..=count)
        .map(|i| format!("?{}", i))
        .collect::<Vec<_>>()
        .join(", ")
}

// -- Reads --

fn query_messages(conn: &Connection, filter: &Filter, options: &FindOptions) -> Result<Vec<MessageRow>> {
    let mut params = Vec::new();
    let mut sql = String::from(
        "SELECT m.id, m.body, m.created_by, m.date, m.hour, m.likes, m.hashtags, m.images
         FROM messages m
         WHERE ",
    );
    push_filter(filter, &mut sql, &mut params);
    sql.push_str(&order_by(&options.sort));
    if let Some(limit) = options.limit {
        sql.push_str(" LIMIT ?");
        params.push(Value::Integer(i64::from(limit)));
    }

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params_from_iter(&params), |row| {
            Ok(MessageRow {
                id: row.get(0)?,
                body: row.get(1)?,
                created_by: row.get(2)?,
                date: row.get(3)?,
                hour: row.get(4)?,
                likes: row.get(5)?,
                hashtags: row.get(6)?,
                images: row.get(7)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

/// Ids per `IN (...)` batch, well under SQLite's bound-parameter limit.
const ID_BATCH: usize = 500;

/// Batch-fetch likes for a set of message ids, in like order per message.
fn query_likes(conn: &Connection, message_ids: &[String]) -> Result<Vec<LikeRow>> {
    let mut rows = Vec::new();
    for batch in message_ids.chunks(ID_BATCH) {
        let sql = format!(
            "SELECT message_id, user_id FROM message_likes WHERE message_id IN ({}) ORDER BY seq",
            placeholders(batch.len())
        );
        let mut stmt = conn.prepare(&sql)?;
        let batch_rows = stmt
            .query_map(params_from_iter(batch), |row| {
                Ok(LikeRow {
                    message_id: row.get(0)?,
                    user_id: row.get(1)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        rows.extend(batch_rows);
    }

    Ok(rows)
}

/// Batch-fetch comments for a set of message ids, in append order per message.
fn query_comments(conn: &Connection, message_ids: &[String]) -> Result<Vec<CommentRow>> {
    let mut rows = Vec::new();
    for batch in message_ids.chunks(ID_BATCH) {
        let sql = format!(
            "SELECT message_id, commented_by, text, date, hour
             FROM message_comments
             WHERE message_id IN ({})
             ORDER BY seq",
            placeholders(batch.len())
        );
        let mut stmt = conn.prepare(&sql)?;
        let batch_rows = stmt
            .query_map(params_from_iter(batch), |row| {
                Ok(CommentRow {
                    message_id: row.get(0)?,
                    commented_by: row.get(1)?,
                    text: row.get(2)?,
                    date: row.get(3)?,
                    hour: row.get(4)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        rows.extend(batch_rows);
    }

    Ok(rows)
}

fn assemble(rows: Vec<MessageRow>, likes: Vec<LikeRow>, comments: Vec<CommentRow>) -> Result<Vec<Message>> {
    let mut liked_by: HashMap<String, Vec<i64>> = HashMap::new();
    for like in likes {
        liked_by.entry(like.message_id).or_default().push(like.user_id);
    }

    let mut comment_map: HashMap<String, Vec<Comment>> = HashMap::new();
    for row in comments {
        let stamp = Stamp::parse(&row.date, &row.hour)
            .with_context(|| format!("corrupt comment timestamp on message '{}'", row.message_id))?;
        comment_map
            .entry(row.message_id)
            .or_default()
            .push(Comment::new(row.commented_by, row.text, stamp));
    }

    rows.into_iter()
        .map(|row| {
            let id: MessageId = row
                .id
                .parse()
                .with_context(|| format!("corrupt message id '{}'", row.id))?;
            let stamp = Stamp::parse(&row.date, &row.hour)
                .with_context(|| format!("corrupt timestamp on message '{}'", row.id))?;
            let hashtags = row
                .hashtags
                .as_deref()
                .map(serde_json::from_str::<Vec<String>>)
                .transpose()
                .with_context(|| format!("corrupt hashtags on message '{}'", row.id))?;
            let images = row
                .images
                .as_deref()
                .map(serde_json::from_str::<Vec<String>>)
                .transpose()
                .with_context(|| format!("corrupt images on message '{}'", row.id))?;

            Ok(Message {
                liked_by: liked_by.remove(&row.id).unwrap_or_default(),
                comments: comment_map.remove(&row.id).unwrap_or_default(),
                id,
                body: row.body,
                created_by: row.created_by,
                date: stamp.date,
                hour: stamp.hour,
                likes: row.likes,
                hashtags,
                images,
            })
        })
        .collect()
}

// -- Writes --

fn first_match(conn: &Connection, filter: &Filter) -> Result<Option<String>> {
    let mut params = Vec::new();
    let mut sql = String::from("SELECT m.id FROM messages m WHERE ");
    push_filter(filter, &mut sql, &mut params);
    sql.push_str(" ORDER BY m.seq LIMIT 1");

    let id = conn
        .query_row(&sql, params_from_iter(&params), |row| row.get(0))
        .optional()?;
    Ok(id)
}

fn apply_op(conn: &Connection, id: &str, op: &UpdateOp) -> Result<()> {
    match op {
        UpdateOp::SetBody(body) => {
            conn.execute(
                "UPDATE messages SET body = ?1, body_folded = ?2 WHERE id = ?3",
                params![body, fold_case(body), id],
            )?;
        }
        UpdateOp::IncLikes(by) => {
            conn.execute(
                "UPDATE messages SET likes = likes + ?1 WHERE id = ?2",
                params![by, id],
            )?;
        }
        UpdateOp::PushLikedBy(user_id) => {
            conn.execute(
                "INSERT INTO message_likes (message_id, user_id) VALUES (?1, ?2)",
                params![id, user_id],
            )?;
        }
        UpdateOp::PushComment(comment) => {
            let stamp = Stamp {
                date: comment.date,
                hour: comment.hour,
            };
            conn.execute(
                "INSERT INTO message_comments (message_id, commented_by, text, date, hour)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    id,
                    comment.commented_by,
                    comment.text,
                    stamp.date_string(),
                    stamp.hour_string(),
                ],
            )?;
        }
    }
    Ok(())
}
