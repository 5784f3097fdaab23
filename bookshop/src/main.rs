use bookshop::{CatalogConfig, CatalogService, telemetry};
use hookline::serde_json::{Map, json};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = CatalogConfig::load()?;
    telemetry::init_tracing(&config)?;

    let catalog = CatalogService::in_memory(config)?;

    let mut data = Map::new();
    data.insert("name".to_owned(), json!("Dune"));
    data.insert("status".to_owned(), json!("Open"));
    let book = catalog.create(data).await?;
    tracing::info!(%book, "created");

    let message = catalog.approve_book(book["id"].clone()).await?;
    tracing::info!("{message}");

    match catalog.update(book.as_object().cloned().unwrap_or_default()).await {
        Ok(outcome) => tracing::info!(%outcome, "updated"),
        Err(err) => tracing::warn!(status = err.status(), "{}", err.message()),
    }

    let count = catalog.book_count().await?;
    tracing::info!(count, "books in catalog");
    Ok(())
}
