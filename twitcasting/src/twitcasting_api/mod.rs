//! TwitCasting API v2 client library.
//!
//! The entry point is [`TwitCastingClient`]. Each endpoint is one async method on it, taking
//! plain arguments and returning typed entities:
//!
//! - [`User`] and [`Supporter`]: accounts and the people supporting them
//! - [`Movie`]: a live (current or past), usually paired with its broadcaster in a [`MovieInfo`]
//! - [`Comment`]: a comment posted on a movie
//! - [`Category`] and [`SubCategory`]: what lives are currently filed under
//! - [`App`], [`Credentials`], and [`WebHook`]: application-level information
//!
//! Entities remember the client that produced them through an [`ApiHandle`], so follow-up calls
//! can be made straight from a value (e.g. [`User::movies`]). The handle does not keep the client
//! alive; once every clone of the client is gone those calls fail with
//! [`Error::ClientDropped`](crate::Error::ClientDropped).
//!
//! Every entity also exposes the exact JSON object it was built from through `raw()`, and any
//! field not modeled by the struct lands in its `extra` map.
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use twitcasting::TwitCastingClient;
//! use twitcasting::twitcasting_api::Lang;
//! use tokio_stream::StreamExt;
//!
//! # async fn example() -> twitcasting::Result<()> {
//! let client = TwitCastingClient::with_token("access token")?;
//!
//! let user = client.get_user_info("twitcasting_jp").await?;
//! println!("{} ({}), level {}", user.name, user.screen_id, user.level);
//!
//! let mut movies = user.all_movies()?;
//! while let Some(movie) = movies.next().await {
//!     let movie = movie?;
//!     println!("{}: {}", movie.id, movie.title);
//! }
//!
//! for category in client.get_categories(Lang::En).await? {
//!     println!("{} has {} sub-categories", category.name, category.sub_categories.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod apps;
pub mod categories;
pub mod client;
pub mod comments;
pub mod credentials;
pub mod movies;
pub mod parser;
pub mod transport;
pub mod types;
pub mod users;
pub mod webhooks;

pub use client::{ClientConfig, ClientConfigBuilder, Session, TwitCastingClient};
pub use parser::{Entity, Model, ModelKind, Parsed, parse, parse_many, parse_one};
pub use transport::{API_BASE_URL, API_VERSION, ApiRequest, Image, Response, RetryPolicy};
pub use types::{
    ApiHandle, Lang, LiveSearch, PagedStream, Sns, SupporterSort, ThumbnailPosition,
    ThumbnailSize, WebHookEvent,
};

pub use apps::App;
pub use categories::{Category, SubCategory};
pub use comments::{Comment, CommentList, PostedComment};
pub use credentials::Credentials;
pub use movies::{Movie, MovieInfo, MovieList, RtmpUrl, WebmUrl};
pub use users::{Supporter, SupporterList, SupportingStatus, User};
pub use webhooks::{WebHook, WebHookList, WebHookRegistration, WebHookRemoval};
