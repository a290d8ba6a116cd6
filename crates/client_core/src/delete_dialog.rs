use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use shared::domain::ProductCategory;
use tracing::{info, warn};

use crate::{CategorySource, DeleteConfirmation, DeleteOutcome};

#[async_trait]
pub trait ConfirmPrompt: Send + Sync {
    async fn confirm(&self, category: &ProductCategory) -> Result<bool>;
}

pub struct AutoConfirm;

#[async_trait]
impl ConfirmPrompt for AutoConfirm {
    async fn confirm(&self, _category: &ProductCategory) -> Result<bool> {
        Ok(true)
    }
}

pub struct ConfirmingDeleteDialog<P: ConfirmPrompt> {
    source: Arc<dyn CategorySource>,
    prompt: P,
}

impl<P: ConfirmPrompt> ConfirmingDeleteDialog<P> {
    pub fn new(source: Arc<dyn CategorySource>, prompt: P) -> Self {
        Self { source, prompt }
    }
}

#[async_trait]
impl<P: ConfirmPrompt> DeleteConfirmation for ConfirmingDeleteDialog<P> {
    async fn open(&self, category: &ProductCategory) -> DeleteOutcome {
        let Some(id) = category.id else {
            return DeleteOutcome::Failed("product category has no id".to_string());
        };

        match self.prompt.confirm(category).await {
            Ok(true) => {}
            Ok(false) => {
                info!(category_id = id.0, "delete: cancelled by operator");
                return DeleteOutcome::Cancelled;
            }
            Err(err) => {
                warn!(category_id = id.0, error = %err, "delete: confirmation prompt failed");
                return DeleteOutcome::Failed(format!("confirmation prompt failed: {err:#}"));
            }
        }

        match self.source.delete(id).await {
            Ok(()) => {
                info!(category_id = id.0, name = %category.name, "delete: product category removed");
                DeleteOutcome::Deleted
            }
            Err(err) => {
                warn!(category_id = id.0, error = %err, "delete: remote delete failed");
                DeleteOutcome::Failed(format!("{err:#}"))
            }
        }
    }
}
