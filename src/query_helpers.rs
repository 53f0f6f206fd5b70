//! Pagination and block addressing for list endpoints.

use serde::{Deserialize, Serialize};

use crate::types::BlockHash;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 20;

/// Order of items in a paginated listing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// Page selection sent as `page`, `limit` and `sort_dir` query parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub sort_dir: SortDirection,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
            sort_dir: SortDirection::Asc,
        }
    }
}

impl Pagination {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page,
            limit,
            ..Self::default()
        }
    }

    pub fn sort_dir(mut self, sort_dir: SortDirection) -> Self {
        self.sort_dir = sort_dir;
        self
    }

    pub fn to_query(self) -> Vec<(String, String)> {
        vec![
            ("page".to_owned(), self.page.to_string()),
            ("limit".to_owned(), self.limit.to_string()),
            ("sort_dir".to_owned(), self.sort_dir.as_str().to_owned()),
        ]
    }
}

/// How to reference a specific block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BlockReference {
    /// The chain tip.
    Latest,
    Height(u64),
    Hash(BlockHash),
}

impl BlockReference {
    /// Path segment identifying the block.
    pub fn path_segment(&self) -> String {
        match self {
            Self::Latest => "latest".to_owned(),
            Self::Height(height) => height.to_string(),
            Self::Hash(hash) => hash.to_string(),
        }
    }
}

impl From<u64> for BlockReference {
    fn from(value: u64) -> Self {
        Self::Height(value)
    }
}

impl From<BlockHash> for BlockReference {
    fn from(value: BlockHash) -> Self {
        Self::Hash(value)
    }
}
