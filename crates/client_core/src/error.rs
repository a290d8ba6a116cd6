use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListError {
    #[error("failed to load product categories{}: {reason}", search_suffix(.search))]
    LoadFailed {
        search: Option<String>,
        reason: String,
    },
    #[error("{operation} request failed: {reason}")]
    RequestFailed {
        operation: &'static str,
        reason: String,
    },
    #[error("product category has no id")]
    MissingIdentity,
}

impl ListError {
    pub fn load_failed(search: &str, err: &anyhow::Error) -> Self {
        Self::LoadFailed {
            search: (!search.is_empty()).then(|| search.to_string()),
            reason: format!("{err:#}"),
        }
    }

    /// Whether re-issuing the same request on demand can succeed.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::MissingIdentity)
    }
}

fn search_suffix(search: &Option<String>) -> String {
    match search {
        Some(term) => format!(" for search '{term}'"),
        None => String::new(),
    }
}
