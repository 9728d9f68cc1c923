//! A typed async client for the TwitCasting API v2.
//!
//! See [`twitcasting_api`] for an overview and [`oauth`] for obtaining access tokens.

pub mod auth;
pub mod error;
pub mod oauth;
pub mod twitcasting_api;

pub use auth::Authorization;
pub use error::{ApiError, Error, Result};
pub use twitcasting_api::{
    App, Category, ClientConfig, Comment, Credentials, Movie, MovieInfo, SubCategory, Supporter,
    TwitCastingClient, User, WebHook,
};
