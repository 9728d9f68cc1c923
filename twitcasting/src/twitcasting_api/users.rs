//! Users, supporters, and the calls that hang off a user.

use crate::error::Result;
use crate::twitcasting_api::movies::{Movie, MovieInfo, MovieList};
use crate::twitcasting_api::parser::{Model, ModelKind};
use crate::twitcasting_api::transport::Image;
use crate::twitcasting_api::types::{
    ApiHandle, ModelBase, SupporterSort, ThumbnailPosition, ThumbnailSize, epoch_seconds,
};
use jiff::Timestamp;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::ops::Deref;
use tokio_stream::Stream;

/// A TwitCasting user.
///
/// See: <https://apiv2-doc.twitcasting.tv/#user-object>
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct User {
    /// Numeric user id, as a string.
    pub id: String,
    /// The `@name` the user is known by.
    pub screen_id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Icon URL.
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub profile: String,
    #[serde(default)]
    pub level: u32,
    /// Id of the user's most recent live, if they have one.
    #[serde(default)]
    pub last_movie_id: Option<String>,
    #[serde(default)]
    pub is_live: bool,
    /// When the account was created.
    #[serde(deserialize_with = "epoch_seconds")]
    pub created: Timestamp,
    /// Fields this type does not model.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
    #[serde(skip)]
    base: ModelBase,
}

impl Model for User {
    const KIND: ModelKind = ModelKind::User;

    fn bind(&mut self, api: &ApiHandle, raw: Map<String, Value>) {
        self.base = ModelBase::new(api, raw);
    }
}

impl User {
    pub fn raw(&self) -> &Map<String, Value> {
        self.base.raw()
    }

    pub fn api(&self) -> &ApiHandle {
        self.base.api()
    }

    /// Thumbnail of this user's current live.
    pub async fn live_thumbnail_image(
        &self,
        size: ThumbnailSize,
        position: ThumbnailPosition,
    ) -> Result<Image> {
        self.base
            .client()?
            .get_live_thumbnail_image(&self.id, size, position)
            .await
    }

    /// This user's past lives, newest first.
    pub async fn movies(&self, offset: u32, limit: u32) -> Result<MovieList> {
        self.base
            .client()?
            .get_movies_by_user(&self.id, offset, limit)
            .await
    }

    /// Every past live of this user, loaded lazily page by page.
    ///
    /// The stream keeps the client alive until it is dropped.
    pub fn all_movies(&self) -> Result<impl Stream<Item = Result<Movie>> + use<>> {
        Ok(self.base.client()?.movies_by_user_stream(&self.id))
    }

    /// The live this user is broadcasting right now.
    pub async fn current_live(&self) -> Result<MovieInfo> {
        self.base.client()?.get_current_live(&self.id).await
    }

    /// Whether this user supports `target_user_id`.
    pub async fn supporting_status(&self, target_user_id: &str) -> Result<SupportingStatus> {
        self.base
            .client()?
            .get_supporting_status(&self.id, target_user_id)
            .await
    }

    /// Users this user supports.
    pub async fn supporting_list(&self, offset: u32, limit: u32) -> Result<SupporterList> {
        self.base
            .client()?
            .get_supporting_list(&self.id, offset, limit)
            .await
    }

    /// Users who support this user.
    pub async fn supporter_list(
        &self,
        offset: u32,
        limit: u32,
        sort: SupporterSort,
    ) -> Result<SupporterList> {
        self.base
            .client()?
            .get_supporter_list(&self.id, offset, limit, sort)
            .await
    }
}

/// A [`User`] as it appears in supporter lists, with their support points.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Supporter {
    /// Points earned in the current period.
    #[serde(default)]
    pub point: i64,
    #[serde(default)]
    pub total_point: i64,
    #[serde(flatten)]
    pub user: User,
}

impl Model for Supporter {
    const KIND: ModelKind = ModelKind::Supporter;

    fn bind(&mut self, api: &ApiHandle, raw: Map<String, Value>) {
        self.user.bind(api, raw);
    }
}

impl Deref for Supporter {
    type Target = User;

    fn deref(&self) -> &User {
        &self.user
    }
}

/// Result of [`TwitCastingClient::get_supporting_status`](crate::TwitCastingClient::get_supporting_status).
#[derive(Debug, Clone, PartialEq)]
pub struct SupportingStatus {
    pub is_supporting: bool,
    /// When the support started, if it exists.
    pub supported: Option<Timestamp>,
    pub target_user: User,
}

/// One page of a supporter or supporting list.
#[derive(Debug, Clone, PartialEq)]
pub struct SupporterList {
    /// Number of records across all pages.
    pub total: u64,
    pub users: Vec<Supporter>,
}
