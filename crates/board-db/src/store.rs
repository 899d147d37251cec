use anyhow::Result;

use board_types::models::{Comment, Message, MessageId, NewMessage};

/// The document collection backing all message state.
///
/// Each call is independent and atomic on its own: `update_one` evaluates its
/// filter and applies every op of the update as one unit, so a conditional
/// update like "push like if not already liked" cannot race with itself.
pub trait MessageStore: Send + Sync {
    fn find(&self, filter: &Filter, options: &FindOptions) -> Result<Vec<Message>>;

    /// Persist a new message and return the id generated for it.
    fn insert_one(&self, doc: NewMessage) -> Result<MessageId>;

    /// Apply `update` to the first message matching `filter`.
    /// Returns false when nothing matched.
    fn update_one(&self, filter: &Filter, update: &Update) -> Result<bool>;

    /// Remove the first message matching `filter` together with its likes
    /// and comments. Returns false when nothing matched.
    fn delete_one(&self, filter: &Filter) -> Result<bool>;

    fn find_one(&self, filter: &Filter) -> Result<Option<Message>> {
        let options = FindOptions {
            sort: Vec::new(),
            limit: Some(1),
        };
        Ok(self.find(filter, &options)?.into_iter().next())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    All,
    Id(MessageId),
    CreatedBy(i64),
    /// Exact, case-sensitive membership in `hashtags`.
    HashtagsContain(String),
    /// Case-insensitive literal substring of `body`.
    BodyContains(String),
    NotLikedBy(i64),
    And(Vec<Filter>),
}

impl Filter {
    pub fn and(self, other: Filter) -> Filter {
        match self {
            Filter::And(mut parts) => {
                parts.push(other);
                Filter::And(parts)
            }
            Filter::All => other,
            first => Filter::And(vec![first, other]),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Date,
    Hour,
    /// Store insertion order.
    Inserted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    pub field: SortField,
    pub direction: Direction,
}

impl Sort {
    pub fn desc(field: SortField) -> Self {
        Self {
            field,
            direction: Direction::Desc,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindOptions {
    pub sort: Vec<Sort>,
    pub limit: Option<u32>,
}

impl FindOptions {
    /// Newest first: date, then time of day, then insertion order.
    pub fn chronological(limit: u32) -> Self {
        Self {
            sort: vec![
                Sort::desc(SortField::Date),
                Sort::desc(SortField::Hour),
                Sort::desc(SortField::Inserted),
            ],
            limit: Some(limit),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOp {
    SetBody(String),
    IncLikes(i64),
    PushLikedBy(i64),
    PushComment(Comment),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Update {
    ops: Vec<UpdateOp>,
}

impl Update {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_body(mut self, body: impl Into<String>) -> Self {
        self.ops.push(UpdateOp::SetBody(body.into()));
        self
    }

    pub fn inc_likes(mut self, by: i64) -> Self {
        self.ops.push(UpdateOp::IncLikes(by));
        self
    }

    pub fn push_liked_by(mut self, user_id: i64) -> Self {
        self.ops.push(UpdateOp::PushLikedBy(user_id));
        self
    }

    pub fn push_comment(mut self, comment: Comment) -> Self {
        self.ops.push(UpdateOp::PushComment(comment));
        self
    }

    pub fn ops(&self) -> &[UpdateOp] {
        &self.ops
    }
}
