//! Catalogue models: products and categories.

use serde::{Deserialize, Serialize};

use super::common::null_as_default;
use crate::cache::Resource;

/// A product as listed by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,

    pub price: f64,

    /// Image URLs, first one is the cover.
    #[serde(default, deserialize_with = "null_as_default")]
    pub images: Vec<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub stock: i64,

    #[serde(default)]
    pub category_id: Option<i64>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub colors: Vec<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub sizes: Vec<String>,

    #[serde(default)]
    pub created_at: Option<String>,
}

impl Product {
    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

impl Resource for Product {
    const NAME: &'static str = "products";

    fn id(&self) -> i64 {
        self.id
    }
}

/// Product create/update payload.
///
/// Colors, sizes and images travel as comma-separated strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductInput {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub stock: i64,
    pub category_id: Option<i64>,
    pub colors: String,
    pub sizes: String,
    pub images: String,
}

impl ProductInput {
    /// Copy with list fields trimmed, as the backend expects them.
    pub fn normalized(&self) -> Self {
        Self {
            colors: self.colors.trim().to_string(),
            sizes: self.sizes.trim().to_string(),
            images: self.images.trim().to_string(),
            ..self.clone()
        }
    }
}

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
}

impl Resource for Category {
    const NAME: &'static str = "categories";

    fn id(&self) -> i64 {
        self.id
    }
}

/// Category create/update payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryInput {
    pub name: String,
    pub description: String,
}
