#[test]
#[ignore = "needs a MongoDB server on localhost:27017"]
fn test_catalog_roundtrip() {
    // Bring things into scope
    use orienteer_core::{GenerationConfig, MapVariant, generate_world};
    use orienteer_storage::models::MapDoc;
    use orienteer_storage::{MapCatalog, StorageError};
    use tokio::runtime::Builder;

    // Build a single-threaded Tokio runtime
    let rt = Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to build Tokio runtime");

    // Run async workflow inside it
    rt.block_on(async {
        let mut config = GenerationConfig::from_variant(MapVariant::HillyTerrain, 42);
        config.segments = 48;
        let world = generate_world(&config);
        let doc = MapDoc::from_world("roundtrip-test", &world);

        // Initialize storage (MongoDB must be running)
        let catalog = MapCatalog::init("mongodb://localhost:27017", "orienteer_test", "maps")
            .await
            .expect("catalog init failed");

        // Saving twice replaces rather than duplicates
        catalog.save(&doc).await.expect("save failed");
        catalog.save(&doc).await.expect("second save failed");
        let names = catalog.list_names().await.expect("list failed");
        assert_eq!(names.iter().filter(|n| *n == "roundtrip-test").count(), 1);

        let found = catalog.load("roundtrip-test").await.expect("load failed");
        assert_eq!(found.generation_config(), config);
        assert!(found.matches(&generate_world(&found.generation_config())));

        // Clean up
        catalog.delete("roundtrip-test").await.expect("delete failed");
        assert!(matches!(
            catalog.load("roundtrip-test").await,
            Err(StorageError::NotFound(_))
        ));
    });
}
