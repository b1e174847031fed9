//! Labeled dish photo commands.

use std::path::PathBuf;

use anyhow::Context as _;
use bestdish_core::LabeledImage;
use bestdish_store::LabelStore;
use clap::Subcommand;

/// Sub-commands available under `labels`.
#[derive(Debug, Subcommand)]
pub enum LabelsCommands {
    /// List stored labeled photos
    List,
    /// Label a photo with a dish and the restaurant it came from
    Add {
        /// Dish name (e.g., "tea leaf salad")
        #[arg(long)]
        dish: String,
        /// Restaurant or address the dish came from
        #[arg(long)]
        location: String,
        /// Path to the image file
        #[arg(long)]
        image: PathBuf,
    },
}

pub(crate) async fn run_labels(store: &LabelStore, command: LabelsCommands) -> anyhow::Result<()> {
    match command {
        LabelsCommands::List => run_labels_list(store).await,
        LabelsCommands::Add {
            dish,
            location,
            image,
        } => run_labels_add(store, dish, location, &image).await,
    }
}

async fn run_labels_list(store: &LabelStore) -> anyhow::Result<()> {
    let images = store.load().await?;
    if images.is_empty() {
        println!("no labeled photos in {}", store.path().display());
        return Ok(());
    }

    println!("{:<38}{:<28}{:<10}LOCATION", "ID", "DISH", "BYTES");
    for image in &images {
        println!(
            "{:<38}{:<28}{:<10}{}",
            image.id,
            image.food_dish,
            image.image_data.len(),
            image.location
        );
    }
    Ok(())
}

async fn run_labels_add(
    store: &LabelStore,
    dish: String,
    location: String,
    image_path: &std::path::Path,
) -> anyhow::Result<()> {
    let dish = dish.trim().to_owned();
    anyhow::ensure!(!dish.is_empty(), "dish name must not be blank");

    let image_data = tokio::fs::read(image_path)
        .await
        .with_context(|| format!("failed to read image {}", image_path.display()))?;
    let image = LabeledImage::new(image_data, dish, location);
    let id = image.id;
    let total = store.append(image).await?;

    println!("saved {id} ({total} labeled photo(s) total)");
    Ok(())
}
