use std::{path::PathBuf, sync::Arc};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    AutoConfirm, CategoryListController, CategorySource, ConfirmingDeleteDialog,
    DeleteConfirmation, DeleteOutcome, EventHub, NavigationContext, ProductCategoryClient,
};
use shared::domain::{CategoryId, ProductCategory};
use tracing_subscriber::EnvFilter;

mod config;
mod prompt;

use prompt::StdinPrompt;

#[derive(Parser, Debug)]
#[command(about = "Manage the store's product categories")]
struct Cli {
    /// Overrides the server url from the config file and environment.
    #[arg(long, global = true)]
    server_url: Option<String>,
    /// Bearer token sent with every request.
    #[arg(long, global = true)]
    token: Option<String>,
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    List {
        #[arg(long)]
        search: Option<String>,
        /// Route the list was opened from, e.g. `/product-category?search=shoes`.
        #[arg(long, conflicts_with = "search")]
        route: Option<String>,
    },
    Show {
        id: i64,
    },
    Delete {
        id: i64,
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let mut settings = config::load_settings(cli.config.as_deref())?;
    if let Some(server_url) = cli.server_url {
        settings.server_url = server_url;
    }
    if let Some(token) = cli.token {
        settings.auth_token = Some(token);
    }
    let server_url = config::normalize_server_url(&settings.server_url)?;
    tracing::info!(server_url = %server_url, "admin: using backend");

    let http = reqwest::Client::builder()
        .timeout(settings.request_timeout())
        .build()
        .context("failed to build http client")?;
    let mut client = ProductCategoryClient::with_http_client(http, server_url);
    if let Some(token) = settings.auth_token {
        client = client.with_auth_token(token);
    }
    let source: Arc<dyn CategorySource> = Arc::new(client);
    let hub = EventHub::new();

    match cli.command {
        Command::List { search, route } => {
            let navigation = list_navigation(search, route);
            let controller = CategoryListController::new(source, hub);
            controller.initialize(&navigation).await?;
            print_items(&controller).await;
            controller.teardown().await;
        }
        Command::Show { id } => {
            let category = source
                .find(CategoryId(id))
                .await?
                .ok_or_else(|| anyhow!("product category {id} not found"))?;
            print_category(&category);
        }
        Command::Delete { id, yes } => {
            let dialog: Arc<dyn DeleteConfirmation> = if yes {
                Arc::new(ConfirmingDeleteDialog::new(Arc::clone(&source), AutoConfirm))
            } else {
                Arc::new(ConfirmingDeleteDialog::new(Arc::clone(&source), StdinPrompt))
            };
            let controller = CategoryListController::new_with_delete_confirmation(
                Arc::clone(&source),
                hub,
                dialog,
            );
            controller.initialize(&NavigationContext::empty()).await?;

            let listed = controller
                .items()
                .await
                .unwrap_or_default()
                .into_iter()
                .find(|category| category.id == Some(CategoryId(id)));
            let target = match listed {
                Some(category) => category,
                None => source
                    .find(CategoryId(id))
                    .await?
                    .ok_or_else(|| anyhow!("product category {id} not found"))?,
            };

            match controller.request_delete(&target).await? {
                DeleteOutcome::Deleted => println!("Deleted product category {id}"),
                DeleteOutcome::Cancelled => println!("Delete cancelled"),
                DeleteOutcome::Failed(reason) => return Err(anyhow!("delete failed: {reason}")),
            }
            print_items(&controller).await;
            controller.teardown().await;
        }
    }

    Ok(())
}

fn list_navigation(search: Option<String>, route: Option<String>) -> NavigationContext {
    match (route, search) {
        (Some(route), _) => NavigationContext::parse(&route),
        (None, Some(term)) => NavigationContext::with_search(term),
        (None, None) => NavigationContext::empty(),
    }
}

async fn print_items(controller: &CategoryListController) {
    let items = controller.items().await.unwrap_or_default();
    let search = controller.search_term().await;
    if search.is_empty() {
        println!("{} product categories", items.len());
    } else {
        println!("{} product categories matching '{search}'", items.len());
    }
    for category in &items {
        print_category(category);
    }
}

fn print_category(category: &ProductCategory) {
    let id = CategoryListController::item_key(category)
        .map_or_else(|_| "-".to_string(), |id| id.to_string());
    match &category.description {
        Some(description) => println!("{id}\t{}\t{description}", category.name),
        None => println!("{id}\t{}", category.name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_navigation_prefers_route_then_search() {
        let routed = list_navigation(None, Some("/product-category?search=shoes".into()));
        assert_eq!(routed.search_term(), Some("shoes"));

        let searched = list_navigation(Some("hats".into()), None);
        assert_eq!(searched.search_term(), Some("hats"));

        assert_eq!(list_navigation(None, None).search_term(), None);
        assert_eq!(list_navigation(Some(String::new()), None).search_term(), None);
    }

    #[test]
    fn delete_command_parses_id_and_yes_flag() {
        let cli = Cli::try_parse_from([
            "admin_cli",
            "--server-url",
            "localhost:9000",
            "delete",
            "4",
            "--yes",
        ])
        .expect("parse");
        assert_eq!(cli.server_url.as_deref(), Some("localhost:9000"));
        assert!(matches!(cli.command, Command::Delete { id: 4, yes: true }));
    }

    #[test]
    fn list_rejects_route_together_with_search() {
        let parsed = Cli::try_parse_from([
            "admin_cli",
            "list",
            "--search",
            "shoes",
            "--route",
            "/product-category",
        ]);
        assert!(parsed.is_err());
    }
}
