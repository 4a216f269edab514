//! Shared response envelopes.

use serde::{Deserialize, Deserializer, Serialize};

/// Pagination block returned by listing endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    #[serde(default)]
    pub current_page: Option<u32>,

    #[serde(default = "default_total_pages")]
    pub total_pages: u32,

    #[serde(default)]
    pub total_items: Option<u64>,
}

/// Deserialize `null` as `T::default()`. Pair with `#[serde(default)]` to
/// also cover a missing key.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn default_total_pages() -> u32 {
    1
}

/// One page of a paginated listing.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub total_pages: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, page: u32, pagination: Option<Pagination>) -> Self {
        let total_pages = pagination.map_or(1, |p| p.total_pages.max(1));
        Self {
            items,
            page,
            total_pages,
        }
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}
