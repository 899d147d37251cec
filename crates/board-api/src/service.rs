use std::sync::Arc;

use tracing::{debug, info, warn};

use board_db::{Filter, FindOptions, MessageStore, Update};
use board_types::api::{
    AddCommentRequest, CreateMessageRequest, CreateMessageResponse, StatusResponse,
    UpdateMessageRequest,
};
use board_types::models::{Comment, Message, MessageId, NewMessage};

use crate::clock::Clock;
use crate::error::{ServiceError, ServiceResult};

pub const DEFAULT_LIST_LIMIT: u32 = 20;
pub const DEFAULT_QUERY_LIMIT: u32 = 10;

/// Message board operations over an injected store.
///
/// Holds no state of its own between calls. Every operation validates its
/// input completely before touching the store, and every mutation is a
/// single store call.
#[derive(Clone)]
pub struct MessageService {
    store: Arc<dyn MessageStore>,
    clock: Arc<dyn Clock>,
}

impl MessageService {
    pub fn new(store: Arc<dyn MessageStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub fn list(&self, limit: Option<u32>) -> ServiceResult<Vec<Message>> {
        let limit = resolve_limit(limit, DEFAULT_LIST_LIMIT)?;
        let messages = self
            .store
            .find(&Filter::All, &FindOptions::chronological(limit))?;
        debug!("Listed {} messages (limit {})", messages.len(), limit);
        Ok(messages)
    }

    pub fn get(&self, id: &str) -> ServiceResult<Message> {
        let id = parse_id(id)?;
        self.store
            .find_one(&Filter::Id(id))?
            .ok_or_else(not_found)
    }

    pub fn create(&self, req: CreateMessageRequest) -> ServiceResult<CreateMessageResponse> {
        let body = require_text(req.body, "body cannot be empty")?;
        let created_by = req
            .created_by
            .ok_or_else(|| ServiceError::invalid("author id is required"))?;

        let id = self.store.insert_one(NewMessage {
            body,
            created_by,
            stamp: self.clock.now(),
            hashtags: req.hashtags,
            images: req.images,
        })?;

        info!("Message {} created by user {}", id, created_by);
        Ok(CreateMessageResponse {
            success: true,
            id,
            message: "message created".into(),
        })
    }

    /// Replaces the body only; stamps, likes and comments are left as they are.
    pub fn update(&self, id: &str, req: UpdateMessageRequest) -> ServiceResult<StatusResponse> {
        let id = parse_id(id)?;
        let body = require_text(req.body, "body cannot be empty")?;

        if !self.store.update_one(&Filter::Id(id), &Update::new().set_body(body))? {
            return Err(not_found());
        }

        info!("Message {} updated", id);
        Ok(StatusResponse::ok("message updated"))
    }

    pub fn delete(&self, id: &str) -> ServiceResult<StatusResponse> {
        let id = parse_id(id)?;

        if !self.store.delete_one(&Filter::Id(id))? {
            return Err(not_found());
        }

        info!("Message {} deleted", id);
        Ok(StatusResponse::ok("message deleted"))
    }

    /// Records a like from `user_id` at most once.
    ///
    /// The "not already liked" check is part of the update's filter, so the
    /// check and the increment/append happen as one store operation. The
    /// follow-up read only decides which error to report.
    pub fn like(&self, id: &str, user_id: Option<i64>) -> ServiceResult<StatusResponse> {
        let id = parse_id(id)?;
        let user_id = user_id.ok_or_else(|| ServiceError::invalid("user id is required"))?;

        let filter = Filter::Id(id).and(Filter::NotLikedBy(user_id));
        let update = Update::new().inc_likes(1).push_liked_by(user_id);
        if self.store.update_one(&filter, &update)? {
            info!("User {} liked message {}", user_id, id);
            return Ok(StatusResponse::ok("like added"));
        }

        match self.store.find_one(&Filter::Id(id))? {
            None => Err(not_found()),
            Some(_) => {
                warn!("User {} already liked message {}", user_id, id);
                Err(ServiceError::Conflict("user already liked this message".into()))
            }
        }
    }

    pub fn comment(&self, id: &str, req: AddCommentRequest) -> ServiceResult<StatusResponse> {
        let id = parse_id(id)?;
        let text = require_text(req.text, "comment text cannot be empty")?;
        let commented_by = req
            .commented_by
            .ok_or_else(|| ServiceError::invalid("comment author id is required"))?;

        let comment = Comment::new(commented_by, text, self.clock.now());
        if !self.store.update_one(&Filter::Id(id), &Update::new().push_comment(comment))? {
            return Err(not_found());
        }

        info!("User {} commented on message {}", commented_by, id);
        Ok(StatusResponse::ok("comment added"))
    }

    /// Case-insensitive literal substring search over message bodies.
    pub fn search(&self, term: Option<&str>, limit: Option<u32>) -> ServiceResult<Vec<Message>> {
        let term = term
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| ServiceError::invalid("search term is required"))?;
        let limit = resolve_limit(limit, DEFAULT_QUERY_LIMIT)?;

        let messages = self.store.find(
            &Filter::BodyContains(term.to_string()),
            &FindOptions::chronological(limit),
        )?;
        debug!("Search {:?} matched {} messages", term, messages.len());
        Ok(messages)
    }

    pub fn by_hashtag(&self, hashtag: &str, limit: Option<u32>) -> ServiceResult<Vec<Message>> {
        let limit = resolve_limit(limit, DEFAULT_QUERY_LIMIT)?;
        let messages = self.store.find(
            &Filter::HashtagsContain(hashtag.to_string()),
            &FindOptions::chronological(limit),
        )?;
        debug!("Hashtag {:?} matched {} messages", hashtag, messages.len());
        Ok(messages)
    }
}

fn parse_id(raw: &str) -> ServiceResult<MessageId> {
    raw.parse()
        .map_err(|_| ServiceError::invalid("invalid message id"))
}

fn not_found() -> ServiceError {
    ServiceError::NotFound("message not found".into())
}

/// Present and non-blank. The text is kept as supplied, not trimmed.
fn require_text(value: Option<String>, msg: &str) -> ServiceResult<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ServiceError::invalid(msg))
}

fn resolve_limit(limit: Option<u32>, default: u32) -> ServiceResult<u32> {
    match limit {
        None => Ok(default),
        Some(0) => Err(ServiceError::invalid("limit must be a positive integer")),
        Some(n) => Ok(n),
    }
}
