use anyhow::Result;
use async_trait::async_trait;
use client_core::ConfirmPrompt;
use shared::domain::ProductCategory;
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};

pub struct StdinPrompt;

#[async_trait]
impl ConfirmPrompt for StdinPrompt {
    async fn confirm(&self, category: &ProductCategory) -> Result<bool> {
        let id = category
            .id
            .map_or_else(|| "?".to_string(), |id| id.to_string());
        let mut stdout = io::stdout();
        stdout
            .write_all(
                format!(
                    "Are you sure you want to delete Product Category {id} ({})? [y/N] ",
                    category.name
                )
                .as_bytes(),
            )
            .await?;
        stdout.flush().await?;

        let mut answer = String::new();
        BufReader::new(io::stdin()).read_line(&mut answer).await?;
        Ok(is_affirmative(&answer))
    }
}

fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::is_affirmative;

    #[test]
    fn only_explicit_yes_confirms() {
        assert!(is_affirmative("y\n"));
        assert!(is_affirmative(" YES "));
        assert!(!is_affirmative("\n"));
        assert!(!is_affirmative("no"));
    }
}
