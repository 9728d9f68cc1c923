//! Shared types: the model base record, the client back-reference, request parameters, and
//! offset-based pagination.

use crate::error::{Error, Result};
use crate::twitcasting_api::client::{ClientInner, TwitCastingClient};
use jiff::Timestamp;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use std::collections::VecDeque;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::str::FromStr;
use std::sync::{Arc, Weak};
use std::task::{Context as TaskContext, Poll};
use tokio_stream::Stream;

/// A non-owning reference from a parsed entity back to the client that produced it.
///
/// It exists only so entities can issue follow-up calls (e.g. "this user's movies"). It never
/// keeps the client alive: once every [`TwitCastingClient`] clone is dropped, follow-up calls
/// fail with [`Error::ClientDropped`].
#[derive(Clone, Default)]
pub struct ApiHandle(Weak<ClientInner>);

impl ApiHandle {
    pub(crate) fn new(inner: &Arc<ClientInner>) -> Self {
        Self(Arc::downgrade(inner))
    }

    /// The client this handle points to, if it is still alive.
    pub fn client(&self) -> Result<TwitCastingClient> {
        self.0
            .upgrade()
            .map(TwitCastingClient::from_inner)
            .ok_or(Error::ClientDropped)
    }
}

impl fmt::Debug for ApiHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = if self.0.strong_count() > 0 {
            "live"
        } else {
            "detached"
        };
        write!(f, "ApiHandle({state})")
    }
}

/// State every entity carries besides its own fields.
///
/// Two bases compare equal when their payloads do; which client they point at is irrelevant.
#[derive(Clone, Default)]
pub struct ModelBase {
    api: ApiHandle,
    raw: Map<String, Value>,
}

impl ModelBase {
    pub(crate) fn new(api: &ApiHandle, raw: Map<String, Value>) -> Self {
        Self {
            api: api.clone(),
            raw,
        }
    }

    pub fn api(&self) -> &ApiHandle {
        &self.api
    }

    /// The payload the entity was parsed from, exactly as received.
    pub fn raw(&self) -> &Map<String, Value> {
        &self.raw
    }

    pub(crate) fn client(&self) -> Result<TwitCastingClient> {
        self.api.client()
    }
}

impl PartialEq for ModelBase {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl fmt::Debug for ModelBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelBase")
            .field("api", &self.api)
            .finish_non_exhaustive()
    }
}

/// JavaScript-style truthiness: `null`, `false`, `0`, `""`, `[]` and `{}` are all falsy.
pub(crate) fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

pub(crate) fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Unix epoch seconds to [`Timestamp`].
pub(crate) fn epoch_seconds<'de, D>(deserializer: D) -> Result<Timestamp, D::Error>
where
    D: Deserializer<'de>,
{
    let seconds = i64::deserialize(deserializer)?;
    Timestamp::from_second(seconds).map_err(D::Error::custom)
}

pub(crate) fn optional_epoch_seconds<'de, D>(deserializer: D) -> Result<Option<Timestamp>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<i64>::deserialize(deserializer)?
        .map(Timestamp::from_second)
        .transpose()
        .map_err(D::Error::custom)
}

/// Accepts an identifier sent either as a JSON number or as a string of digits.
pub(crate) fn numeric_id<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Number(u64),
        String(String),
    }

    match Id::deserialize(deserializer)? {
        Id::Number(n) => Ok(n),
        Id::String(s) => s
            .parse()
            .map_err(|_| D::Error::custom(format!("`{s}` is not a numeric id"))),
    }
}

macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($(#[$vmeta:meta])* $variant:ident => $value:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            /// The wire representation.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $value),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                match s {
                    $($value => Ok(Self::$variant),)+
                    other => Err(Error::invalid(format!(
                        "`{other}` is not a valid {}; expected one of: {}",
                        stringify!($name),
                        [$($value),+].join(", "),
                    ))),
                }
            }
        }
    };
}

string_enum! {
    /// Size of a live thumbnail.
    ThumbnailSize {
        Small => "small",
        Large => "large",
    }
}

string_enum! {
    /// Whether a live thumbnail is taken from the start of the live or the latest frame.
    ThumbnailPosition {
        Beginning => "beginning",
        Latest => "latest",
    }
}

string_enum! {
    /// Cross-posting of a comment to the user's linked SNS account.
    Sns {
        /// Do not cross-post.
        None => "none",
        /// Cross-post as a normal post.
        Normal => "normal",
        /// Cross-post as a reply to the broadcaster.
        Reply => "reply",
    }
}

string_enum! {
    /// Ordering of a supporter list.
    SupporterSort {
        /// By contribution.
        Ranking => "ranking",
        /// Most recent first.
        New => "new",
    }
}

string_enum! {
    Lang {
        Ja => "ja",
        En => "en",
    }
}

string_enum! {
    /// Events a WebHook can be registered for.
    WebHookEvent {
        LiveStart => "livestart",
        LiveEnd => "liveend",
    }
}

impl Default for ThumbnailSize {
    fn default() -> Self {
        Self::Small
    }
}

impl Default for ThumbnailPosition {
    fn default() -> Self {
        Self::Latest
    }
}

impl Default for Sns {
    fn default() -> Self {
        Self::None
    }
}

impl Default for SupporterSort {
    fn default() -> Self {
        Self::Ranking
    }
}

impl Default for Lang {
    fn default() -> Self {
        Self::Ja
    }
}

/// What to search live movies by.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LiveSearch {
    /// Lives tagged with all of these tags.
    Tag(Vec<String>),
    /// Lives matching all of these words.
    Word(Vec<String>),
    /// Lives in this sub-category (by id).
    Category(String),
    /// Newest lives.
    #[default]
    New,
    /// Recommended lives.
    Recommend,
}

impl LiveSearch {
    pub(crate) fn search_type(&self) -> &'static str {
        match self {
            Self::Tag(_) => "tag",
            Self::Word(_) => "word",
            Self::Category(_) => "category",
            Self::New => "new",
            Self::Recommend => "recommend",
        }
    }

    /// The `context` query parameter, if this search type takes one.
    pub(crate) fn context(&self) -> Result<Option<String>> {
        match self {
            Self::Tag(words) | Self::Word(words) => join_words(words).map(Some),
            Self::Category(id) if id.is_empty() => {
                Err(Error::invalid("a category search needs a sub-category id"))
            }
            Self::Category(id) => Ok(Some(id.clone())),
            Self::New | Self::Recommend => Ok(None),
        }
    }
}

/// Joins search words with spaces; the transport takes care of URL encoding.
pub(crate) fn join_words<S: AsRef<str>>(words: &[S]) -> Result<String> {
    let words: Vec<&str> = words
        .iter()
        .map(AsRef::as_ref)
        .filter(|w| !w.is_empty())
        .collect();
    if words.is_empty() {
        return Err(Error::invalid("at least one search word is required"));
    }
    Ok(words.join(" "))
}

pub(crate) fn check_range(name: &str, value: u32, min: u32, max: u32) -> Result<()> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(Error::invalid(format!(
            "{name} must be between {min} and {max}, got {value}"
        )))
    }
}

type OneFuturePage<'a, F, T> =
    Pin<Box<dyn Future<Output = Result<(F, (VecDeque<T>, Option<u32>))>> + 'a + Send>>;

/// A stream that walks an offset/limit list endpoint page by page.
///
/// The fetcher is called with the offset of the page to load and returns the page's items
/// together with the offset of the next page, or `None` once the list is exhausted.
pub struct PagedStream<'a, T, F> {
    /// Items of the most recently loaded page not yet yielded
    current_items: VecDeque<T>,
    /// The in-flight page request, if any
    pending_request: Option<OneFuturePage<'a, F, T>>,
    is_done: bool,
}

impl<'a, T, F> PagedStream<'a, T, F> {
    pub fn new<Fut>(fetcher: F) -> Self
    where
        F: Fn(u32) -> Fut,
        F: Send + 'a,
        Fut: Future<Output = Result<(VecDeque<T>, Option<u32>)>> + Send + 'a,
    {
        let first_page = async move {
            let results = fetcher(0).await?;
            Ok((fetcher, results))
        };
        Self {
            pending_request: Some(Box::pin(first_page)),
            current_items: VecDeque::new(),
            is_done: false,
        }
    }
}

impl<T: Unpin, F> Unpin for PagedStream<'_, T, F> {}

impl<'a, T: Unpin, F, Fut> Stream for PagedStream<'a, T, F>
where
    F: Fn(u32) -> Fut,
    F: Send + 'a,
    Fut: Future<Output = Result<(VecDeque<T>, Option<u32>)>> + Send + 'a,
{
    type Item = Result<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut TaskContext<'_>) -> Poll<Option<Self::Item>> {
        loop {
            if let Some(item) = self.current_items.pop_front() {
                return Poll::Ready(Some(Ok(item)));
            }
            if self.is_done {
                return Poll::Ready(None);
            }
            let Some(pending) = self.pending_request.as_mut() else {
                self.is_done = true;
                return Poll::Ready(None);
            };
            match pending.as_mut().poll(cx) {
                Poll::Ready(Ok((fetcher, (items, next)))) => {
                    self.current_items.extend(items);
                    if let Some(offset) = next {
                        // queued, but not polled until the current page is drained
                        self.pending_request = Some(Box::pin(async move {
                            let results = fetcher(offset).await?;
                            Ok((fetcher, results))
                        }));
                    } else {
                        self.is_done = true;
                        self.pending_request = None;
                    }
                }
                Poll::Ready(Err(e)) => {
                    self.pending_request = None;
                    self.is_done = true;
                    return Poll::Ready(Some(Err(e)));
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

/// Offset of the page after one that started at `offset` and returned `returned` of `total`
/// items.
pub(crate) fn next_offset(offset: u32, returned: usize, total: u64) -> Option<u32> {
    let returned = u32::try_from(returned).ok()?;
    let next = offset.checked_add(returned)?;
    (returned > 0 && u64::from(next) < total).then_some(next)
}
