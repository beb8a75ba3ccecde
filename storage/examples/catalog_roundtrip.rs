use orienteer_core::{GenerationConfig, MapVariant, generate_world};
use orienteer_storage::models::MapDoc;
use orienteer_storage::{MapCatalog, StorageError};

#[tokio::main]
async fn main() -> Result<(), StorageError> {
    // Generate the forest park map
    let config = GenerationConfig::from_variant(MapVariant::ForestPark, 2025);
    let world = generate_world(&config);

    // Build the document
    let doc = MapDoc::from_world("forest-park-2025", &world);

    // Init storage
    let catalog = MapCatalog::init("mongodb://localhost:27017", "orienteer", "maps").await?;

    // Insert & read back, then regenerate from the stored config
    catalog.save(&doc).await?;
    let found = catalog.load("forest-park-2025").await?;
    let regenerated = generate_world(&found.generation_config());
    println!(
        "Round-trip {}: checksum {:016x}, {} checkpoints",
        if found.matches(&regenerated) { "verified" } else { "MISMATCH" },
        found.checksum(),
        found.checkpoint_count
    );

    // Clean up
    catalog.delete("forest-park-2025").await?;

    Ok(())
}
