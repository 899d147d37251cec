use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Store-generated message identifier. The textual form is a hyphenated UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(Uuid);

impl MessageId {
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidMessageId(pub String);

impl fmt::Display for InvalidMessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid message id: {:?}", self.0)
    }
}

impl std::error::Error for InvalidMessageId {}

impl FromStr for MessageId {
    type Err = InvalidMessageId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::try_parse(s)
            .map(Self)
            .map_err(|_| InvalidMessageId(s.to_string()))
    }
}

/// Calendar date and time-of-day captured once, at creation, at second precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Stamp {
    pub date: NaiveDate,
    pub hour: NaiveTime,
}

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const HOUR_FORMAT: &str = "%H:%M:%S";

impl Stamp {
    pub fn date_string(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }

    pub fn hour_string(&self) -> String {
        self.hour.format(HOUR_FORMAT).to_string()
    }

    pub fn parse(date: &str, hour: &str) -> Result<Self, chrono::ParseError> {
        Ok(Self {
            date: NaiveDate::parse_from_str(date, DATE_FORMAT)?,
            hour: NaiveTime::parse_from_str(hour, HOUR_FORMAT)?,
        })
    }
}

impl From<NaiveDateTime> for Stamp {
    fn from(at: NaiveDateTime) -> Self {
        let hour = at.time();
        Self {
            date: at.date(),
            hour: hour.with_nanosecond(0).unwrap_or(hour),
        }
    }
}

/// A feed post with its owned likes and comments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: MessageId,
    pub body: String,
    pub created_by: i64,
    pub date: NaiveDate,
    pub hour: NaiveTime,
    pub likes: i64,
    pub liked_by: Vec<i64>,
    pub comments: Vec<Comment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hashtags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
}

impl Message {
    pub fn stamp(&self) -> Stamp {
        Stamp {
            date: self.date,
            hour: self.hour,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub commented_by: i64,
    pub text: String,
    pub date: NaiveDate,
    pub hour: NaiveTime,
}

impl Comment {
    pub fn new(commented_by: i64, text: String, stamp: Stamp) -> Self {
        Self {
            commented_by,
            text,
            date: stamp.date,
            hour: stamp.hour,
        }
    }
}

/// Document handed to the store on insert. The store assigns the id;
/// likes, likedBy and comments always start empty.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMessage {
    pub body: String,
    pub created_by: i64,
    pub stamp: Stamp,
    pub hashtags: Option<Vec<String>>,
    pub images: Option<Vec<String>>,
}
