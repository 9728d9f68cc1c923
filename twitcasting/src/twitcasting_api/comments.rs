//! Comments on a movie.

use crate::twitcasting_api::parser::{Model, ModelKind, bind_nested};
use crate::twitcasting_api::types::{ApiHandle, ModelBase, epoch_seconds, numeric_id};
use crate::twitcasting_api::users::User;
use jiff::Timestamp;
use serde::Deserialize;
use serde_json::{Map, Value};

/// See: <https://apiv2-doc.twitcasting.tv/#comment-object>
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Comment {
    #[serde(deserialize_with = "numeric_id")]
    pub id: u64,
    #[serde(default)]
    pub message: String,
    /// Who wrote the comment.
    pub from_user: User,
    #[serde(deserialize_with = "epoch_seconds")]
    pub created: Timestamp,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
    #[serde(skip)]
    base: ModelBase,
}

impl Model for Comment {
    const KIND: ModelKind = ModelKind::Comment;

    fn bind(&mut self, api: &ApiHandle, raw: Map<String, Value>) {
        bind_nested(&mut self.from_user, api, raw.get("from_user"));
        self.base = ModelBase::new(api, raw);
    }
}

impl Comment {
    pub fn raw(&self) -> &Map<String, Value> {
        self.base.raw()
    }

    pub fn api(&self) -> &ApiHandle {
        self.base.api()
    }
}

/// One page of comments on a movie.
#[derive(Debug, Clone, PartialEq)]
pub struct CommentList {
    pub movie_id: String,
    /// Number of comments on the movie.
    pub all_count: u64,
    pub comments: Vec<Comment>,
}

/// The comment created by [`TwitCastingClient::post_comment`](crate::TwitCastingClient::post_comment).
#[derive(Debug, Clone, PartialEq)]
pub struct PostedComment {
    pub movie_id: String,
    pub all_count: u64,
    pub comment: Comment,
}
