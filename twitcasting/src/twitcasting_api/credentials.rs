//! The owner of an access token, as reported by `verify_credentials`.

use crate::twitcasting_api::apps::App;
use crate::twitcasting_api::parser::{Model, ModelKind, bind_nested};
use crate::twitcasting_api::types::{ApiHandle, ModelBase};
use crate::twitcasting_api::users::User;
use serde::Deserialize;
use serde_json::{Map, Value};

/// Who an access token belongs to: the application it was issued to and the user who granted it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Credentials {
    pub app: App,
    pub user: User,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
    #[serde(skip)]
    base: ModelBase,
}

impl Model for Credentials {
    const KIND: ModelKind = ModelKind::Credentials;

    fn bind(&mut self, api: &ApiHandle, raw: Map<String, Value>) {
        bind_nested(&mut self.app, api, raw.get("app"));
        bind_nested(&mut self.user, api, raw.get("user"));
        self.base = ModelBase::new(api, raw);
    }
}

impl Credentials {
    pub fn raw(&self) -> &Map<String, Value> {
        self.base.raw()
    }
}
