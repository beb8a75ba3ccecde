//storage holds the MongoDB map catalogue & async CRUD

pub mod models;

use crate::models::MapDoc;
use bson::{Document, doc};
use futures_util::stream::TryStreamExt;
use mongodb::options::{ClientOptions, IndexOptions};
use mongodb::{Client, Collection, IndexModel};
use tracing::{debug, info};

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    #[error("malformed catalogue entry: {0}")]
    Field(#[from] bson::document::ValueAccessError),

    #[error("no map named '{0}' in the catalogue")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, StorageError>;

pub struct MapCatalog {
    col: Collection<MapDoc>,
}

impl MapCatalog {
    // Connect and make sure map names are unique
    pub async fn init(uri: &str, db_name: &str, col_name: &str) -> Result<Self> {
        let mut opts = ClientOptions::parse(uri).await?;
        opts.app_name = Some("orienteer".to_string());
        let client = Client::with_options(opts)?;
        let col = client.database(db_name).collection(col_name);

        let index_model = IndexModel::builder()
            .keys(doc! { "name": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        col.create_index(index_model).await?;

        info!(db = db_name, collection = col_name, "map catalogue ready");
        Ok(Self { col })
    }

    // Sorted names of every stored map
    pub async fn list_names(&self) -> Result<Vec<String>> {
        let raw: Collection<Document> = self.col.clone_with_type();
        let mut cursor = raw
            .find(doc! {})
            .projection(doc! { "name": 1 })
            .sort(doc! { "name": 1 })
            .await?;
        let mut names = Vec::new();
        while let Some(entry) = cursor.try_next().await? {
            names.push(entry.get_str("name")?.to_string());
        }
        Ok(names)
    }

    pub async fn load(&self, name: &str) -> Result<MapDoc> {
        self.col
            .find_one(doc! { "name": name })
            .await?
            .ok_or_else(|| StorageError::NotFound(name.to_string()))
    }

    // Insert, replacing any map with the same name
    pub async fn save(&self, map: &MapDoc) -> Result<()> {
        let mut replacement = map.clone();
        replacement.id = None;
        let result = self
            .col
            .replace_one(doc! { "name": &map.name }, replacement)
            .upsert(true)
            .await?;
        debug!(name = %map.name, replaced = result.matched_count, "map saved");
        Ok(())
    }

    pub async fn delete(&self, name: &str) -> Result<()> {
        let result = self.col.delete_one(doc! { "name": name }).await?;
        if result.deleted_count == 0 {
            return Err(StorageError::NotFound(name.to_string()));
        }
        debug!(name, "map deleted");
        Ok(())
    }
}
