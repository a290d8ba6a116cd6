use anyhow::{anyhow, Result};
use async_trait::async_trait;
use shared::{
    domain::{CategoryId, ProductCategory},
    protocol::SearchQuery,
};

pub mod controller;
pub mod delete_dialog;
pub mod error;
pub mod hub;
pub mod navigation;
pub mod rest;

pub use controller::{CategoryListController, ControllerState, ListEvent, LoadOutcome};
pub use delete_dialog::{AutoConfirm, ConfirmPrompt, ConfirmingDeleteDialog};
pub use error::ListError;
pub use hub::{ChangeEvent, EventHub, Subscription};
pub use navigation::NavigationContext;
pub use rest::ProductCategoryClient;

/// `query` and `search` return `None` when the response carried no body.
#[async_trait]
pub trait CategorySource: Send + Sync {
    async fn query(&self) -> Result<Option<Vec<ProductCategory>>>;
    async fn search(&self, query: &SearchQuery) -> Result<Option<Vec<ProductCategory>>>;
    async fn find(&self, id: CategoryId) -> Result<Option<ProductCategory>>;
    async fn delete(&self, id: CategoryId) -> Result<()>;
}

pub struct MissingCategorySource;

#[async_trait]
impl CategorySource for MissingCategorySource {
    async fn query(&self) -> Result<Option<Vec<ProductCategory>>> {
        Err(anyhow!("product category backend is unavailable"))
    }

    async fn search(&self, query: &SearchQuery) -> Result<Option<Vec<ProductCategory>>> {
        Err(anyhow!(
            "product category backend is unavailable for search '{}'",
            query.query
        ))
    }

    async fn find(&self, id: CategoryId) -> Result<Option<ProductCategory>> {
        Err(anyhow!(
            "product category backend is unavailable for category {id}"
        ))
    }

    async fn delete(&self, id: CategoryId) -> Result<()> {
        Err(anyhow!(
            "product category backend is unavailable for category {id}"
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Cancelled,
    Failed(String),
}

#[async_trait]
pub trait DeleteConfirmation: Send + Sync {
    async fn open(&self, category: &ProductCategory) -> DeleteOutcome;
}

pub struct MissingDeleteConfirmation;

#[async_trait]
impl DeleteConfirmation for MissingDeleteConfirmation {
    async fn open(&self, _category: &ProductCategory) -> DeleteOutcome {
        DeleteOutcome::Failed("delete confirmation is unavailable".to_string())
    }
}
