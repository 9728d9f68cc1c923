//! The TwitCasting API client: configuration and one method per endpoint.

use crate::auth::Authorization;
use crate::error::{Error, Result};
use crate::twitcasting_api::categories::Category;
use crate::twitcasting_api::comments::{Comment, CommentList, PostedComment};
use crate::twitcasting_api::credentials::Credentials;
use crate::twitcasting_api::movies::{Movie, MovieInfo, MovieList, RtmpUrl, WebmUrl};
use crate::twitcasting_api::parser::{self, ModelKind, Parsed, parse_many, parse_one};
use crate::twitcasting_api::transport::{
    API_BASE_URL, ApiRequest, Image, Response, RetryPolicy, Transport,
};
use crate::twitcasting_api::types::{
    ApiHandle, Lang, LiveSearch, PagedStream, Sns, SupporterSort, ThumbnailPosition,
    ThumbnailSize, WebHookEvent, check_range, join_words, json_type, next_offset,
    optional_epoch_seconds,
};
use crate::twitcasting_api::users::{SupporterList, SupportingStatus, User};
use crate::twitcasting_api::webhooks::{WebHook, WebHookList, WebHookRegistration, WebHookRemoval};
use derive_builder::Builder;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio_stream::Stream;
use tracing::instrument;

/// Page size used by the pagination streams.
const STREAM_PAGE_SIZE: u32 = 50;

/// How HTTP connections are managed across calls.
#[derive(Debug, Clone, Default)]
pub enum Session {
    /// One connection pool, created with the client and reused by every call.
    #[default]
    Shared,
    /// A fresh connection pool for every call.
    PerRequest,
    /// Reuse a caller-provided HTTP client.
    Provided(reqwest::Client),
}

/// Settings for a [`TwitCastingClient`].
///
/// ```rust,no_run
/// use std::time::Duration;
/// use twitcasting::{Authorization, ClientConfig, TwitCastingClient};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ClientConfig::builder()
///     .authorization(Authorization::bearer("access token"))
///     .accept_encoding(true)
///     .timeout(Duration::from_secs(10))
///     .build()?;
/// let client = TwitCastingClient::new(config)?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Builder)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct ClientConfig {
    /// Credential sent with every request.
    #[builder(default)]
    authorization: Authorization,

    /// Ask the server to gzip responses.
    #[builder(default)]
    accept_encoding: bool,

    /// Upper bound on each individual attempt of a request.
    ///
    /// Retries each get their own timeout, so a call can take longer than this in total.
    #[builder(setter(strip_option), default)]
    timeout: Option<Duration>,

    #[builder(default)]
    session: Session,

    #[builder(default)]
    retry: RetryPolicy,

    /// Origin that relative endpoint paths are resolved against.
    #[builder(setter(into), default = "API_BASE_URL.to_string()")]
    base_url: String,
}

impl ClientConfig {
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }
}

impl ClientConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(url) = &self.base_url
            && !(url.starts_with("https://") || url.starts_with("http://"))
        {
            return Err(format!("base URL {url} is not an http(s) URL"));
        }
        if let Some(retry) = &self.retry
            && retry.max_attempts == 0
        {
            return Err("a retry policy needs at least one attempt".to_string());
        }
        Ok(())
    }
}

#[derive(Debug)]
pub(crate) struct ClientInner {
    transport: Transport,
}

/// Client for the TwitCasting API v2.
///
/// Cloning is cheap; clones share one connection pool. Entities returned by the client keep a
/// non-owning [`ApiHandle`] to it so they can make follow-up calls while the client is alive.
///
/// All endpoints are documented at <https://apiv2-doc.twitcasting.tv/>.
#[derive(Debug, Clone)]
pub struct TwitCastingClient {
    inner: Arc<ClientInner>,
}

impl TwitCastingClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let session = match config.session {
            Session::Shared => Some(Transport::build_http_client(config.accept_encoding)?),
            Session::PerRequest => None,
            Session::Provided(client) => Some(client),
        };
        let transport = Transport::new(
            config.base_url,
            config.authorization,
            config.accept_encoding,
            config.timeout,
            config.retry,
            session,
        );
        Ok(Self {
            inner: Arc::new(ClientInner { transport }),
        })
    }

    /// A client acting on behalf of the user who granted `access_token`.
    pub fn with_token(access_token: impl Into<String>) -> Result<Self> {
        Self::new(ClientConfig {
            authorization: Authorization::bearer(access_token),
            ..Self::default_config()
        })
    }

    /// A client acting as the application itself.
    pub fn with_app_credentials(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Result<Self> {
        Self::new(ClientConfig {
            authorization: Authorization::basic(client_id, client_secret),
            ..Self::default_config()
        })
    }

    fn default_config() -> ClientConfig {
        ClientConfig {
            authorization: Authorization::None,
            accept_encoding: false,
            timeout: None,
            session: Session::Shared,
            retry: RetryPolicy::default(),
            base_url: API_BASE_URL.to_string(),
        }
    }

    pub(crate) fn from_inner(inner: Arc<ClientInner>) -> Self {
        Self { inner }
    }

    /// A back-reference to this client, as held by the entities it returns.
    pub fn handle(&self) -> ApiHandle {
        ApiHandle::new(&self.inner)
    }

    /// Sends an arbitrary request and returns the decoded response.
    pub async fn send(&self, request: &ApiRequest) -> Result<Response> {
        self.inner.transport.execute(request).await
    }

    /// Sends an arbitrary request and parses the JSON response into the entity named by `tag`.
    ///
    /// With no tag the decoded JSON is returned as is. `Ok(None)` means the response body was
    /// empty. An unknown tag is rejected before anything is sent.
    #[instrument(skip(self, request), fields(path = request.path()))]
    pub async fn call(
        &self,
        request: ApiRequest,
        tag: Option<&str>,
        payload_list: bool,
    ) -> Result<Option<Parsed>> {
        if let Some(tag) = tag {
            tag.parse::<ModelKind>()?;
        }
        match self.send(&request).await? {
            Response::Empty => Ok(None),
            Response::Json(payload) => {
                parser::parse(&self.handle(), payload, tag, payload_list).map(Some)
            }
            Response::Image(_) => Err(Error::payload(
                request.path(),
                "got an image where JSON was expected",
            )),
        }
    }

    /// Sends `request` and returns its body as a JSON object.
    async fn object(&self, request: ApiRequest) -> Result<Map<String, Value>> {
        match self.send(&request).await? {
            Response::Json(Value::Object(object)) => Ok(object),
            Response::Json(other) => Err(Error::payload(
                request.path(),
                format!("expected an object, got {}", json_type(&other)),
            )),
            Response::Empty => Err(Error::payload(request.path(), "empty response")),
            Response::Image(_) => Err(Error::payload(
                request.path(),
                "got an image where JSON was expected",
            )),
        }
    }

    /// Returns information about a user.
    ///
    /// `user_id` may be either the numeric id or the screen id.
    ///
    /// # API Reference
    ///
    /// <https://apiv2-doc.twitcasting.tv/#get-user-info>
    #[instrument(skip(self))]
    pub async fn get_user_info(&self, user_id: &str) -> Result<User> {
        let res = self
            .object(ApiRequest::get(format!("/users/{user_id}")))
            .await?;
        let user: User = parse_one(&self.handle(), field(&res, "user", "user info")?)?;
        tracing::debug!(user_id = %user.id, screen_id = %user.screen_id, "fetched user");
        Ok(user)
    }

    /// Returns the application and user an access token belongs to.
    ///
    /// Only works with a user access token (not application credentials).
    ///
    /// # API Reference
    ///
    /// <https://apiv2-doc.twitcasting.tv/#verify-credentials>
    #[instrument(skip(self))]
    pub async fn verify_credentials(&self) -> Result<Credentials> {
        let res = self.object(ApiRequest::get("/verify_credentials")).await?;
        parse_one(&self.handle(), &Value::Object(res))
    }

    /// Returns a thumbnail of a user's current live.
    ///
    /// # API Reference
    ///
    /// <https://apiv2-doc.twitcasting.tv/#get-live-thumbnail-image>
    #[instrument(skip(self))]
    pub async fn get_live_thumbnail_image(
        &self,
        user_id: &str,
        size: ThumbnailSize,
        position: ThumbnailPosition,
    ) -> Result<Image> {
        let request = ApiRequest::get(format!("/users/{user_id}/live/thumbnail"))
            .query("size", size)
            .query("position", position);
        match self.send(&request).await? {
            Response::Image(image) => {
                tracing::debug!(bytes = image.bytes.len(), ext = %image.file_ext, "fetched thumbnail");
                Ok(image)
            }
            Response::Empty => Err(Error::payload("thumbnail", "empty response")),
            Response::Json(_) => Err(Error::payload("thumbnail", "expected image data, got JSON")),
        }
    }

    /// Returns a movie, its broadcaster, and its tags.
    ///
    /// # API Reference
    ///
    /// <https://apiv2-doc.twitcasting.tv/#get-movie-info>
    #[instrument(skip(self))]
    pub async fn get_movie_info(&self, movie_id: &str) -> Result<MovieInfo> {
        let res = self
            .object(ApiRequest::get(format!("/movies/{movie_id}")))
            .await?;
        self.movie_info(&res, "movie info")
    }

    fn movie_info(&self, res: &Map<String, Value>, context: &str) -> Result<MovieInfo> {
        let api = self.handle();
        Ok(MovieInfo {
            movie: parse_one(&api, field(res, "movie", context)?)?,
            broadcaster: parse_one(&api, field(res, "broadcaster", context)?)?,
            tags: optional_field(res, "tags", context)?.unwrap_or_default(),
        })
    }

    /// Returns a user's past lives, newest first.
    ///
    /// `limit` must be between 1 and 50.
    ///
    /// # API Reference
    ///
    /// <https://apiv2-doc.twitcasting.tv/#get-movies-by-user>
    #[instrument(skip(self))]
    pub async fn get_movies_by_user(
        &self,
        user_id: &str,
        offset: u32,
        limit: u32,
    ) -> Result<MovieList> {
        check_range("limit", limit, 1, 50)?;
        let request = ApiRequest::get(format!("/users/{user_id}/movies"))
            .query("offset", offset)
            .query("limit", limit);
        let res = self.object(request).await?;
        let list = MovieList {
            total_count: scalar(&res, "total_count", "movie list")?,
            movies: parse_many(&self.handle(), field(&res, "movies", "movie list")?)?,
        };
        tracing::debug!(
            total_count = list.total_count,
            returned_items = list.movies.len(),
            "fetched movies"
        );
        Ok(list)
    }

    /// All of a user's past lives, fetched page by page as the stream is consumed.
    pub fn movies_by_user_stream(
        &self,
        user_id: &str,
    ) -> impl Stream<Item = Result<Movie>> + use<> {
        let client = self.clone();
        let user_id = user_id.to_string();
        PagedStream::new(move |offset| {
            let client = client.clone();
            let user_id = user_id.clone();
            async move {
                let page = client
                    .get_movies_by_user(&user_id, offset, STREAM_PAGE_SIZE)
                    .await?;
                let next = next_offset(offset, page.movies.len(), page.total_count);
                Ok((VecDeque::from(page.movies), next))
            }
        })
    }

    /// Returns the live a user is currently broadcasting.
    ///
    /// Fails with an API error if the user is not live.
    ///
    /// # API Reference
    ///
    /// <https://apiv2-doc.twitcasting.tv/#get-current-live>
    #[instrument(skip(self))]
    pub async fn get_current_live(&self, user_id: &str) -> Result<MovieInfo> {
        let res = self
            .object(ApiRequest::get(format!("/users/{user_id}/current_live")))
            .await?;
        self.movie_info(&res, "current live")
    }

    /// Returns comments on a movie, newest first.
    ///
    /// `limit` must be between 1 and 50. With `slice_id`, only comments posted after that
    /// comment are returned.
    ///
    /// # API Reference
    ///
    /// <https://apiv2-doc.twitcasting.tv/#get-comments>
    #[instrument(skip(self))]
    pub async fn get_comments(
        &self,
        movie_id: &str,
        offset: u32,
        limit: u32,
        slice_id: Option<u64>,
    ) -> Result<CommentList> {
        check_range("limit", limit, 1, 50)?;
        let mut request = ApiRequest::get(format!("/movies/{movie_id}/comments"))
            .query("offset", offset)
            .query("limit", limit);
        if let Some(slice_id) = slice_id {
            request = request.query("slice_id", slice_id);
        }
        let res = self.object(request).await?;
        let list = CommentList {
            movie_id: scalar(&res, "movie_id", "comment list")?,
            all_count: scalar(&res, "all_count", "comment list")?,
            comments: parse_many(&self.handle(), field(&res, "comments", "comment list")?)?,
        };
        tracing::debug!(
            movie_id = %list.movie_id,
            all_count = list.all_count,
            returned_items = list.comments.len(),
            "fetched comments"
        );
        Ok(list)
    }

    /// All comments on a movie, fetched page by page as the stream is consumed.
    pub fn comments_stream(
        &self,
        movie_id: &str,
    ) -> impl Stream<Item = Result<Comment>> + use<> {
        let client = self.clone();
        let movie_id = movie_id.to_string();
        PagedStream::new(move |offset| {
            let client = client.clone();
            let movie_id = movie_id.clone();
            async move {
                let page = client
                    .get_comments(&movie_id, offset, STREAM_PAGE_SIZE, None)
                    .await?;
                let next = next_offset(offset, page.comments.len(), page.all_count);
                Ok((VecDeque::from(page.comments), next))
            }
        })
    }

    /// Posts a comment on a movie as the authenticated user.
    ///
    /// # API Reference
    ///
    /// <https://apiv2-doc.twitcasting.tv/#post-comment>
    #[instrument(skip(self, comment))]
    pub async fn post_comment(
        &self,
        movie_id: &str,
        comment: &str,
        sns: Sns,
    ) -> Result<PostedComment> {
        let length = comment.chars().count();
        if !(1..=140).contains(&length) {
            return Err(Error::invalid(format!(
                "a comment must be 1 to 140 characters long, got {length}"
            )));
        }
        let request = ApiRequest::post(format!("/movies/{movie_id}/comments"))
            .json(json!({ "comment": comment, "sns": sns.as_str() }));
        let res = self.object(request).await?;
        let posted = PostedComment {
            movie_id: scalar(&res, "movie_id", "posted comment")?,
            all_count: scalar(&res, "all_count", "posted comment")?,
            comment: parse_one(&self.handle(), field(&res, "comment", "posted comment")?)?,
        };
        tracing::debug!(movie_id, comment_id = posted.comment.id, "posted comment");
        Ok(posted)
    }

    /// Deletes a comment and returns its id.
    ///
    /// Only the comment's author or the movie's broadcaster can delete it.
    ///
    /// # API Reference
    ///
    /// <https://apiv2-doc.twitcasting.tv/#delete-comment>
    #[instrument(skip(self))]
    pub async fn delete_comment(&self, movie_id: &str, comment_id: u64) -> Result<String> {
        let request = ApiRequest::delete(format!("/movies/{movie_id}/comments/{comment_id}"));
        let res = self.object(request).await?;
        let value = field(&res, "comment_id", "deleted comment")?;
        // the id comes back as either a string or a number
        Ok(match value {
            Value::String(id) => id.clone(),
            other => other.to_string(),
        })
    }

    /// Returns whether `user_id` supports `target_user_id`.
    ///
    /// # API Reference
    ///
    /// <https://apiv2-doc.twitcasting.tv/#get-supporting-status>
    #[instrument(skip(self))]
    pub async fn get_supporting_status(
        &self,
        user_id: &str,
        target_user_id: &str,
    ) -> Result<SupportingStatus> {
        let request = ApiRequest::get(format!("/users/{user_id}/supporting_status"))
            .query("target_user_id", target_user_id);
        let res = self.object(request).await?;
        let supported = match res.get("supported") {
            Some(value) => optional_epoch_seconds(value)
                .map_err(|e| Error::payload("supporting status", format!("`supported`: {e}")))?,
            None => None,
        };
        Ok(SupportingStatus {
            is_supporting: scalar(&res, "is_supporting", "supporting status")?,
            supported,
            target_user: parse_one(
                &self.handle(),
                field(&res, "target_user", "supporting status")?,
            )?,
        })
    }

    /// Makes the authenticated user a supporter of each of `target_user_ids` (at most 20).
    ///
    /// Returns how many users were newly supported.
    ///
    /// # API Reference
    ///
    /// <https://apiv2-doc.twitcasting.tv/#support-user>
    #[instrument(skip(self))]
    pub async fn support_user<S: AsRef<str> + std::fmt::Debug>(
        &self,
        target_user_ids: &[S],
    ) -> Result<u64> {
        let res = self
            .object(support_request("/support", target_user_ids)?)
            .await?;
        scalar(&res, "added_count", "support")
    }

    /// Stops the authenticated user supporting each of `target_user_ids` (at most 20).
    ///
    /// Returns how many users were removed.
    ///
    /// # API Reference
    ///
    /// <https://apiv2-doc.twitcasting.tv/#unsupport-user>
    #[instrument(skip(self))]
    pub async fn unsupport_user<S: AsRef<str> + std::fmt::Debug>(
        &self,
        target_user_ids: &[S],
    ) -> Result<u64> {
        let res = self
            .object(support_request("/unsupport", target_user_ids)?)
            .await?;
        scalar(&res, "removed_count", "unsupport")
    }

    /// Returns the users `user_id` supports.
    ///
    /// `limit` must be between 1 and 20.
    ///
    /// # API Reference
    ///
    /// <https://apiv2-doc.twitcasting.tv/#supporting-list>
    #[instrument(skip(self))]
    pub async fn get_supporting_list(
        &self,
        user_id: &str,
        offset: u32,
        limit: u32,
    ) -> Result<SupporterList> {
        check_range("limit", limit, 1, 20)?;
        let request = ApiRequest::get(format!("/users/{user_id}/supporting"))
            .query("offset", offset)
            .query("limit", limit);
        let res = self.object(request).await?;
        self.supporter_list(&res, "supporting")
    }

    /// Returns the users who support `user_id`.
    ///
    /// `limit` must be between 1 and 20.
    ///
    /// # API Reference
    ///
    /// <https://apiv2-doc.twitcasting.tv/#supporter-list>
    #[instrument(skip(self))]
    pub async fn get_supporter_list(
        &self,
        user_id: &str,
        offset: u32,
        limit: u32,
        sort: SupporterSort,
    ) -> Result<SupporterList> {
        check_range("limit", limit, 1, 20)?;
        let request = ApiRequest::get(format!("/users/{user_id}/supporters"))
            .query("offset", offset)
            .query("limit", limit)
            .query("sort", sort);
        let res = self.object(request).await?;
        self.supporter_list(&res, "supporters")
    }

    fn supporter_list(&self, res: &Map<String, Value>, key: &str) -> Result<SupporterList> {
        Ok(SupporterList {
            total: scalar(res, "total", key)?,
            users: parse_many(&self.handle(), field(res, key, key)?)?,
        })
    }

    /// Returns the categories that currently have lives.
    ///
    /// # API Reference
    ///
    /// <https://apiv2-doc.twitcasting.tv/#get-categories>
    #[instrument(skip(self))]
    pub async fn get_categories(&self, lang: Lang) -> Result<Vec<Category>> {
        let res = self
            .object(ApiRequest::get("/categories").query("lang", lang))
            .await?;
        let categories: Vec<Category> =
            parse_many(&self.handle(), field(&res, "categories", "categories")?)?;
        tracing::debug!(returned_items = categories.len(), "fetched categories");
        Ok(categories)
    }

    /// Finds users matching all of `words`.
    ///
    /// `limit` must be between 1 and 50.
    ///
    /// # API Reference
    ///
    /// <https://apiv2-doc.twitcasting.tv/#search-users>
    #[instrument(skip(self))]
    pub async fn search_users<S: AsRef<str> + std::fmt::Debug>(
        &self,
        words: &[S],
        limit: u32,
        lang: Lang,
    ) -> Result<Vec<User>> {
        let words = join_words(words)?;
        check_range("limit", limit, 1, 50)?;
        let request = ApiRequest::get("/search/users")
            .query("words", words)
            .query("limit", limit)
            .query("lang", lang);
        let res = self.object(request).await?;
        parse_many(&self.handle(), field(&res, "users", "user search")?)
    }

    /// Finds lives that are on air right now.
    ///
    /// `limit` must be between 1 and 100.
    ///
    /// # API Reference
    ///
    /// <https://apiv2-doc.twitcasting.tv/#search-live-movies>
    #[instrument(skip(self))]
    pub async fn search_live_movies(
        &self,
        search: &LiveSearch,
        limit: u32,
        lang: Lang,
    ) -> Result<Vec<MovieInfo>> {
        let context = search.context()?;
        check_range("limit", limit, 1, 100)?;
        let mut request = ApiRequest::get("/search/lives")
            .query("type", search.search_type())
            .query("limit", limit)
            .query("lang", lang);
        if let Some(context) = context {
            request = request.query("context", context);
        }
        let res = self.object(request).await?;
        let Value::Array(items) = field(&res, "movies", "live search")? else {
            return Err(Error::payload("live search", "`movies` is not an array"));
        };
        items
            .iter()
            .filter_map(|item| match item {
                Value::Object(info) if !info.is_empty() => Some(info),
                _ => None,
            })
            .map(|info| self.movie_info(info, "live search"))
            .collect()
    }

    /// Lists the application's WebHooks, optionally only those for `user_id`.
    ///
    /// Requires application credentials. `limit` must be between 1 and 100; `limit` and
    /// `offset` are ignored when filtering by user.
    ///
    /// # API Reference
    ///
    /// <https://apiv2-doc.twitcasting.tv/#get-webhook-list>
    #[instrument(skip(self))]
    pub async fn get_webhook_list(
        &self,
        limit: u32,
        offset: u32,
        user_id: Option<&str>,
    ) -> Result<WebHookList> {
        let mut request = ApiRequest::get("/webhooks");
        if let Some(user_id) = user_id {
            request = request.query("user_id", user_id);
        } else {
            check_range("limit", limit, 1, 100)?;
            request = request.query("limit", limit).query("offset", offset);
        }
        let res = self.object(request).await?;
        let webhooks: Vec<WebHook> =
            parse_many(&self.handle(), field(&res, "webhooks", "webhook list")?)?;
        Ok(WebHookList {
            all_count: scalar(&res, "all_count", "webhook list")?,
            webhooks,
        })
    }

    /// Hooks `events` of `user_id`.
    ///
    /// The application must have a WebHook URL configured.
    ///
    /// # API Reference
    ///
    /// <https://apiv2-doc.twitcasting.tv/#register-webhook>
    #[instrument(skip(self))]
    pub async fn register_webhook(
        &self,
        user_id: &str,
        events: &[WebHookEvent],
    ) -> Result<WebHookRegistration> {
        let events = event_names(events)?;
        let request =
            ApiRequest::post("/webhooks").json(json!({ "user_id": user_id, "events": events }));
        let res = self.object(request).await?;
        decode(Value::Object(res), "webhook registration")
    }

    /// Removes the hooks on `events` of `user_id`.
    ///
    /// # API Reference
    ///
    /// <https://apiv2-doc.twitcasting.tv/#remove-webhook>
    #[instrument(skip(self))]
    pub async fn remove_webhook(
        &self,
        user_id: &str,
        events: &[WebHookEvent],
    ) -> Result<WebHookRemoval> {
        let mut request = ApiRequest::delete("/webhooks").query("user_id", user_id);
        for event in event_names(events)? {
            request = request.query("events[]", event);
        }
        let res = self.object(request).await?;
        decode(Value::Object(res), "webhook removal")
    }

    /// Returns the RTMP ingest URL and key of the authenticated user.
    ///
    /// # API Reference
    ///
    /// <https://apiv2-doc.twitcasting.tv/#get-rtmp-url>
    #[instrument(skip(self))]
    pub async fn get_rtmp_url(&self) -> Result<RtmpUrl> {
        let res = self.object(ApiRequest::get("/rtmp_url")).await?;
        decode(Value::Object(res), "rtmp url")
    }

    /// Returns the WebM (WebSocket) ingest URL of the authenticated user.
    ///
    /// # API Reference
    ///
    /// <https://apiv2-doc.twitcasting.tv/#get-webm-url>
    #[instrument(skip(self))]
    pub async fn get_webm_url(&self) -> Result<WebmUrl> {
        let res = self.object(ApiRequest::get("/webm_url")).await?;
        decode(Value::Object(res), "webm url")
    }
}

fn support_request<S: AsRef<str>>(path: &str, target_user_ids: &[S]) -> Result<ApiRequest> {
    if target_user_ids.is_empty() || target_user_ids.len() > 20 {
        return Err(Error::invalid(format!(
            "between 1 and 20 target users can be given at once, got {}",
            target_user_ids.len()
        )));
    }
    let ids: Vec<&str> = target_user_ids.iter().map(AsRef::as_ref).collect();
    Ok(ApiRequest::put(path).json(json!({ "target_user_ids": ids })))
}

fn event_names(events: &[WebHookEvent]) -> Result<Vec<&'static str>> {
    if events.is_empty() {
        return Err(Error::invalid("at least one WebHook event is required"));
    }
    Ok(events.iter().map(WebHookEvent::as_str).collect())
}

fn field<'a>(res: &'a Map<String, Value>, key: &str, context: &str) -> Result<&'a Value> {
    res.get(key)
        .ok_or_else(|| Error::payload(context, format!("missing `{key}`")))
}

fn scalar<T: DeserializeOwned>(res: &Map<String, Value>, key: &str, context: &str) -> Result<T> {
    T::deserialize(field(res, key, context)?)
        .map_err(|e| Error::payload(context, format!("`{key}`: {e}")))
}

fn optional_field<T: DeserializeOwned>(
    res: &Map<String, Value>,
    key: &str,
    context: &str,
) -> Result<Option<T>> {
    match res.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(_) => scalar(res, key, context).map(Some),
    }
}

fn decode<T: DeserializeOwned>(value: Value, context: &str) -> Result<T> {
    serde_json::from_value(value).map_err(|e| Error::payload(context, e))
}
