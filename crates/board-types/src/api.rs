use serde::{Deserialize, Serialize};

use crate::models::MessageId;

// -- Messages --

/// Required fields are `Option` so that their absence surfaces as a
/// validation error with a readable message instead of a decode failure.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct CreateMessageRequest {
    pub body: Option<String>,
    pub created_by: Option<i64>,
    pub hashtags: Option<Vec<String>>,
    pub images: Option<Vec<String>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateMessageResponse {
    pub success: bool,
    pub id: MessageId,
    pub message: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateMessageRequest {
    pub body: Option<String>,
}

/// Acknowledgement for mutations that return no entity.
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub success: bool,
    pub message: String,
}

impl StatusResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
}

// -- Queries --

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LimitQuery {
    pub limit: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SearchQuery {
    pub term: Option<String>,
    pub limit: Option<u32>,
}

// -- Likes --

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct LikeQuery {
    pub user_id: Option<i64>,
}

// -- Comments --

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct AddCommentRequest {
    pub commented_by: Option<i64>,
    pub text: Option<String>,
}
