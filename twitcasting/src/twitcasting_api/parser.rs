//! Turns decoded JSON payloads into domain entities.
//!
//! Every facade method knows which entity type each part of its response holds and asks for it
//! explicitly; nothing is inferred from the shape of the payload. The typed entry points are
//! [`parse_one`] and [`parse_many`]. [`parse`] is the dynamic variant keyed by a string tag,
//! used by [`TwitCastingClient::call`](crate::TwitCastingClient::call).

use crate::error::{Error, Result};
use crate::twitcasting_api::types::{ApiHandle, is_falsy, json_type};
use crate::twitcasting_api::{
    App, Category, Comment, Credentials, Movie, SubCategory, Supporter, User, WebHook,
};
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// The closed set of entity types a payload can be parsed into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelKind {
    User,
    Supporter,
    Movie,
    Comment,
    App,
    Category,
    SubCategory,
    WebHook,
    Credentials,
}

impl ModelKind {
    pub const ALL: [ModelKind; 9] = [
        ModelKind::User,
        ModelKind::Supporter,
        ModelKind::Movie,
        ModelKind::Comment,
        ModelKind::App,
        ModelKind::Category,
        ModelKind::SubCategory,
        ModelKind::WebHook,
        ModelKind::Credentials,
    ];

    /// The tag naming this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Supporter => "supporter",
            Self::Movie => "movie",
            Self::Comment => "comment",
            Self::App => "app",
            Self::Category => "category",
            Self::SubCategory => "sub_category",
            Self::WebHook => "webhook",
            Self::Credentials => "credentials",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelKind {
    type Err = Error;

    fn from_str(tag: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == tag)
            .ok_or_else(|| Error::UnknownModelKind(tag.to_string()))
    }
}

/// An entity type the parser can produce.
///
/// Entities deserialize their own fields with serde; [`Model::bind`] then attaches what serde
/// cannot know about: the client back-reference and the verbatim payload, for the entity and
/// for any entity nested inside it.
pub trait Model: DeserializeOwned {
    const KIND: ModelKind;

    fn bind(&mut self, api: &ApiHandle, raw: Map<String, Value>);
}

/// Parses a single object into `M`.
pub fn parse_one<M: Model>(api: &ApiHandle, payload: &Value) -> Result<M> {
    let Value::Object(raw) = payload else {
        return Err(Error::payload(
            M::KIND.as_str(),
            format!("expected an object, got {}", json_type(payload)),
        ));
    };
    let mut model = M::deserialize(payload).map_err(|e| Error::payload(M::KIND.as_str(), e))?;
    model.bind(api, raw.clone());
    Ok(model)
}

/// Parses every truthy element of an array into `M`, preserving order.
///
/// Falsy elements (`null`, `{}`, ...) are dropped rather than kept as placeholders.
pub fn parse_many<M: Model>(api: &ApiHandle, payload: &Value) -> Result<Vec<M>> {
    truthy_elements(M::KIND, payload)?
        .map(|item| parse_one(api, item))
        .collect()
}

fn truthy_elements(
    kind: ModelKind,
    payload: &Value,
) -> Result<impl Iterator<Item = &Value>> {
    let Value::Array(items) = payload else {
        return Err(Error::payload(
            kind.as_str(),
            format!("expected an array, got {}", json_type(payload)),
        ));
    };
    Ok(items.iter().filter(|item| !is_falsy(item)))
}

/// Attaches `api` and the nested payload to an entity that serde built as part of its parent.
pub(crate) fn bind_nested<M: Model>(model: &mut M, api: &ApiHandle, raw: Option<&Value>) {
    let raw = match raw {
        Some(Value::Object(raw)) => raw.clone(),
        _ => Map::new(),
    };
    model.bind(api, raw);
}

/// Like [`bind_nested`], for a list that was deserialized with [`truthy_list`].
pub(crate) fn bind_nested_list<M: Model>(models: &mut [M], api: &ApiHandle, raw: Option<&Value>) {
    let raw_items = match raw {
        Some(Value::Array(items)) => items.as_slice(),
        _ => &[],
    };
    let raw_items = raw_items.iter().filter(|item| !is_falsy(item));
    for (model, raw) in models.iter_mut().zip(raw_items) {
        bind_nested(model, api, Some(raw));
    }
}

/// Deserializes a nested entity list, skipping falsy elements.
pub(crate) fn truthy_list<'de, D, M>(deserializer: D) -> Result<Vec<M>, D::Error>
where
    D: Deserializer<'de>,
    M: DeserializeOwned,
{
    Vec::<Value>::deserialize(deserializer)?
        .into_iter()
        .filter(|item| !is_falsy(item))
        .map(|item| M::deserialize(item).map_err(D::Error::custom))
        .collect()
}

/// Any parsed entity.
#[derive(Debug, Clone, PartialEq)]
pub enum Entity {
    User(User),
    Supporter(Supporter),
    Movie(Movie),
    Comment(Comment),
    App(App),
    Category(Category),
    SubCategory(SubCategory),
    WebHook(WebHook),
    Credentials(Credentials),
}

impl Entity {
    pub fn kind(&self) -> ModelKind {
        match self {
            Self::User(_) => ModelKind::User,
            Self::Supporter(_) => ModelKind::Supporter,
            Self::Movie(_) => ModelKind::Movie,
            Self::Comment(_) => ModelKind::Comment,
            Self::App(_) => ModelKind::App,
            Self::Category(_) => ModelKind::Category,
            Self::SubCategory(_) => ModelKind::SubCategory,
            Self::WebHook(_) => ModelKind::WebHook,
            Self::Credentials(_) => ModelKind::Credentials,
        }
    }
}

/// Result of a dynamically tagged parse.
#[derive(Debug, Clone, PartialEq)]
pub enum Parsed {
    /// The payload, untouched, because no tag was given.
    Raw(Value),
    One(Entity),
    Many(Vec<Entity>),
}

fn parse_entity(api: &ApiHandle, kind: ModelKind, payload: &Value) -> Result<Entity> {
    Ok(match kind {
        ModelKind::User => Entity::User(parse_one(api, payload)?),
        ModelKind::Supporter => Entity::Supporter(parse_one(api, payload)?),
        ModelKind::Movie => Entity::Movie(parse_one(api, payload)?),
        ModelKind::Comment => Entity::Comment(parse_one(api, payload)?),
        ModelKind::App => Entity::App(parse_one(api, payload)?),
        ModelKind::Category => Entity::Category(parse_one(api, payload)?),
        ModelKind::SubCategory => Entity::SubCategory(parse_one(api, payload)?),
        ModelKind::WebHook => Entity::WebHook(parse_one(api, payload)?),
        ModelKind::Credentials => Entity::Credentials(parse_one(api, payload)?),
    })
}

/// Parses `payload` into the entity type named by `tag`.
///
/// With no tag the payload is returned unchanged. An unknown tag is an
/// [`Error::UnknownModelKind`]. With `payload_list` set, `payload` must be an array and each
/// truthy element becomes one entity.
pub fn parse(api: &ApiHandle, payload: Value, tag: Option<&str>, payload_list: bool) -> Result<Parsed> {
    let Some(tag) = tag else {
        return Ok(Parsed::Raw(payload));
    };
    let kind: ModelKind = tag.parse()?;
    if payload_list {
        truthy_elements(kind, &payload)?
            .map(|item| parse_entity(api, kind, item))
            .collect::<Result<_>>()
            .map(Parsed::Many)
    } else {
        parse_entity(api, kind, &payload).map(Parsed::One)
    }
}
