//! Applications registered with TwitCasting.

use crate::twitcasting_api::parser::{Model, ModelKind};
use crate::twitcasting_api::types::{ApiHandle, ModelBase};
use serde::Deserialize;
use serde_json::{Map, Value};

/// The application an access token was issued to.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct App {
    pub client_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub owner_user_id: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
    #[serde(skip)]
    base: ModelBase,
}

impl Model for App {
    const KIND: ModelKind = ModelKind::App;

    fn bind(&mut self, api: &ApiHandle, raw: Map<String, Value>) {
        self.base = ModelBase::new(api, raw);
    }
}

impl App {
    pub fn raw(&self) -> &Map<String, Value> {
        self.base.raw()
    }
}
