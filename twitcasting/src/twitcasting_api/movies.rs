//! Movies (lives and their recordings).

use crate::error::Result;
use crate::twitcasting_api::comments::{Comment, CommentList, PostedComment};
use crate::twitcasting_api::parser::{Model, ModelKind};
use crate::twitcasting_api::types::{ApiHandle, ModelBase, Sns, epoch_seconds};
use crate::twitcasting_api::users::User;
use jiff::Timestamp;
use serde::Deserialize;
use serde_json::{Map, Value};
use tokio_stream::Stream;

/// A live, current or past.
///
/// See: <https://apiv2-doc.twitcasting.tv/#movie-object>
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Movie {
    pub id: String,
    /// Id of the broadcaster.
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub title: String,
    /// Telop.
    #[serde(default)]
    pub subtitle: Option<String>,
    /// Latest comment the broadcaster left on the live.
    #[serde(default)]
    pub last_owner_comment: Option<String>,
    /// Sub-category id.
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub is_live: bool,
    #[serde(default)]
    pub is_recorded: bool,
    #[serde(default)]
    pub comment_count: u64,
    #[serde(default)]
    pub large_thumbnail: String,
    #[serde(default)]
    pub small_thumbnail: String,
    #[serde(default)]
    pub country: String,
    /// Length in seconds.
    #[serde(default)]
    pub duration: u64,
    #[serde(deserialize_with = "epoch_seconds")]
    pub created: Timestamp,
    #[serde(default)]
    pub is_collabo: bool,
    #[serde(default)]
    pub is_protected: bool,
    #[serde(default)]
    pub max_view_count: u64,
    #[serde(default)]
    pub current_view_count: u64,
    #[serde(default)]
    pub total_view_count: u64,
    /// HLS playlist URL, when the live can be played over HLS.
    #[serde(default)]
    pub hls_url: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
    #[serde(skip)]
    base: ModelBase,
}

impl Model for Movie {
    const KIND: ModelKind = ModelKind::Movie;

    fn bind(&mut self, api: &ApiHandle, raw: Map<String, Value>) {
        self.base = ModelBase::new(api, raw);
    }
}

impl Movie {
    pub fn raw(&self) -> &Map<String, Value> {
        self.base.raw()
    }

    pub fn api(&self) -> &ApiHandle {
        self.base.api()
    }

    /// Comments on this movie, newest first.
    pub async fn comments(
        &self,
        offset: u32,
        limit: u32,
        slice_id: Option<u64>,
    ) -> Result<CommentList> {
        self.base
            .client()?
            .get_comments(&self.id, offset, limit, slice_id)
            .await
    }

    /// Every comment on this movie, loaded lazily page by page.
    pub fn all_comments(&self) -> Result<impl Stream<Item = Result<Comment>> + use<>> {
        Ok(self.base.client()?.comments_stream(&self.id))
    }

    pub async fn post_comment(&self, comment: &str, sns: Sns) -> Result<PostedComment> {
        self.base
            .client()?
            .post_comment(&self.id, comment, sns)
            .await
    }

    /// Deletes one of this movie's comments, returning its id.
    pub async fn delete_comment(&self, comment_id: u64) -> Result<String> {
        self.base
            .client()?
            .delete_comment(&self.id, comment_id)
            .await
    }
}

/// A movie together with its broadcaster and tags.
#[derive(Debug, Clone, PartialEq)]
pub struct MovieInfo {
    pub movie: Movie,
    pub broadcaster: User,
    pub tags: Vec<String>,
}

/// One page of a user's movies.
#[derive(Debug, Clone, PartialEq)]
pub struct MovieList {
    /// Number of movies across all pages.
    pub total_count: u64,
    pub movies: Vec<Movie>,
}

/// Where to push an RTMP stream for the authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RtmpUrl {
    pub enabled: bool,
    pub url: Option<String>,
    pub stream_key: Option<String>,
}

/// Where to push a WebM (WebSocket) stream for the authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WebmUrl {
    pub enabled: bool,
    pub url: Option<String>,
}
