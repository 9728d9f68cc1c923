//! WebHooks registered by an application.

use crate::twitcasting_api::parser::{Model, ModelKind};
use crate::twitcasting_api::types::{ApiHandle, ModelBase};
use serde::Deserialize;
use serde_json::{Map, Value};

/// A hook on one event of one user.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WebHook {
    pub user_id: String,
    /// `livestart` or `liveend`.
    pub event: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
    #[serde(skip)]
    base: ModelBase,
}

impl Model for WebHook {
    const KIND: ModelKind = ModelKind::WebHook;

    fn bind(&mut self, api: &ApiHandle, raw: Map<String, Value>) {
        self.base = ModelBase::new(api, raw);
    }
}

impl WebHook {
    pub fn raw(&self) -> &Map<String, Value> {
        self.base.raw()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WebHookList {
    /// Number of WebHooks registered for the application.
    pub all_count: u64,
    pub webhooks: Vec<WebHook>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WebHookRegistration {
    pub user_id: String,
    pub added_events: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WebHookRemoval {
    pub user_id: String,
    pub removed_events: Vec<String>,
}
