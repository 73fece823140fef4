use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{error, info};

use ingredient_checker::config::AppConfig;
use ingredient_checker::observability::init_tracing;
use ingredient_checker::ocr::build_extractor;
use ingredient_checker::scanner::{IngredientScanner, ScanDocument};

const USAGE: &str = "Usage: ingredient-checker <image>... | ingredient-checker --text <ingredient list>";

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    let app_config = AppConfig::from_env()?;
    init_tracing(app_config.log_format)?;

    info!("Starting Ingredient Checker");

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() {
        anyhow::bail!(USAGE);
    }

    let engine_config = app_config.load_engine_config()?;
    let extractor = build_extractor(
        app_config.extraction_mode,
        &app_config.ocr,
        &engine_config.dictionaries,
        app_config.synthetic_seed,
    )
    .context("Failed to initialize text extractor")?;

    let scanner = Arc::new(
        IngredientScanner::new(engine_config, extractor)
            .context("Invalid ingredient configuration")?,
    );

    if args[0] == "--text" {
        let text = args[1..].join(" ");
        if text.trim().is_empty() {
            anyhow::bail!(USAGE);
        }
        print_document(None, &scanner.scan_text(&text).to_document())?;
        return Ok(());
    }

    info!(
        images = args.len(),
        extractor = scanner.extractor_name(),
        max_concurrent_scans = app_config.max_concurrent_scans,
        "Scanning images"
    );

    let semaphore = Arc::new(Semaphore::new(app_config.max_concurrent_scans));
    let mut handles = Vec::with_capacity(args.len());
    for arg in args {
        let image_path = PathBuf::from(arg);
        let scanner = Arc::clone(&scanner);
        let permit = Arc::clone(&semaphore)
            .acquire_owned()
            .await
            .context("Scan semaphore closed")?;

        handles.push(tokio::task::spawn_blocking(move || {
            let document = scanner.scan(&image_path).to_document();
            drop(permit);
            (image_path, document)
        }));
    }

    for handle in handles {
        match handle.await {
            Ok((image_path, document)) => print_document(Some(image_path.as_path()), &document)?,
            Err(e) => error!(error = %e, "Scan task panicked"),
        }
    }

    Ok(())
}

fn print_document(image: Option<&Path>, document: &ScanDocument) -> Result<()> {
    let output = serde_json::json!({
        "image": image.map(|path| path.display().to_string()),
        "result": document,
    });
    println!(
        "{}",
        serde_json::to_string_pretty(&output).context("Failed to serialize scan result")?
    );
    Ok(())
}
