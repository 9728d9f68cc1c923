//! Live categories.

use crate::twitcasting_api::parser::{Model, ModelKind, bind_nested_list, truthy_list};
use crate::twitcasting_api::types::{ApiHandle, ModelBase};
use serde::Deserialize;
use serde_json::{Map, Value};

/// A top-level category and its sub-categories.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Category {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "truthy_list")]
    pub sub_categories: Vec<SubCategory>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
    #[serde(skip)]
    base: ModelBase,
}

impl Model for Category {
    const KIND: ModelKind = ModelKind::Category;

    fn bind(&mut self, api: &ApiHandle, raw: Map<String, Value>) {
        bind_nested_list(&mut self.sub_categories, api, raw.get("sub_categories"));
        self.base = ModelBase::new(api, raw);
    }
}

impl Category {
    pub fn raw(&self) -> &Map<String, Value> {
        self.base.raw()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SubCategory {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Number of lives currently in this sub-category.
    #[serde(default)]
    pub count: u64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
    #[serde(skip)]
    base: ModelBase,
}

impl Model for SubCategory {
    const KIND: ModelKind = ModelKind::SubCategory;

    fn bind(&mut self, api: &ApiHandle, raw: Map<String, Value>) {
        self.base = ModelBase::new(api, raw);
    }
}

impl SubCategory {
    pub fn raw(&self) -> &Map<String, Value> {
        self.base.raw()
    }
}
