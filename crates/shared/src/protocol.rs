use serde::{Deserialize, Serialize};

/// Topic fired whenever the product-category collection changes remotely.
pub const PRODUCT_CATEGORY_LIST_MODIFICATION: &str = "productCategoryListModification";

pub const PRODUCT_CATEGORIES_PATH: &str = "/api/product-categories";
pub const PRODUCT_CATEGORIES_SEARCH_PATH: &str = "/api/_search/product-categories";

/// Free-text filter sent to the search endpoint as `?query=`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub query: String,
}

impl SearchQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
        }
    }
}
