use mongodb::bson::Document;
use mongodb::options::IndexOptions;
use mongodb::{Client, Collection, Database, IndexModel};
use std::error::Error;

pub const USERS_COLLECTION: &str = "users";

#[derive(Clone)]
pub struct MongoDB {
    db: Database,
}

impl MongoDB {
    pub async fn new(uri: &str) -> Result<Self, Box<dyn Error>> {
        let mut client_options = mongodb::options::ClientOptions::parse(uri).await?;

        // Pool pequeno: só a coleção de usuários passa por aqui
        client_options.max_pool_size = Some(10);
        client_options.min_pool_size = Some(1);
        client_options.max_idle_time = Some(std::time::Duration::from_secs(300));

        client_options.connect_timeout = Some(std::time::Duration::from_secs(5));
        client_options.server_selection_timeout = Some(std::time::Duration::from_secs(5));

        // Database name from the URI path, "triap" when absent
        let db_name = client_options
            .default_database
            .clone()
            .unwrap_or_else(|| "triap".to_string());

        let client = Client::with_options(client_options)?;

        let db = client.database(&db_name);

        // Test connection
        db.list_collection_names().await?;

        let mongodb = Self { db };
        mongodb.ensure_indexes().await?;

        Ok(mongodb)
    }

    /// Unique indexes on the users collection.
    ///
    /// `create_index` is a no-op for an identical existing index; any error
    /// (duplicate rows, missing privileges) aborts startup.
    async fn ensure_indexes(&self) -> Result<(), Box<dyn Error>> {
        log::info!("🔧 Creating database indexes...");

        let users = self.collection::<Document>(USERS_COLLECTION);

        for field in ["email", "user_id"] {
            if let Err(e) = users.create_index(unique_index(field)).await {
                log::error!("❌ Could not create unique index users({}): {}", field, e);
                return Err(format!("unique index users({}) unavailable: {}", field, e).into());
            }
            log::info!("   ✅ Index ready: users({}) unique", field);
        }

        log::info!("✅ Database indexes ready");

        Ok(())
    }

    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.db.collection(name)
    }
}

fn unique_index(field: &str) -> IndexModel {
    let mut keys = Document::new();
    keys.insert(field, 1);

    IndexModel::builder()
        .keys(keys)
        .options(IndexOptions::builder().unique(true).build())
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_mongodb_connection() {
        dotenv::dotenv().ok();
        let uri = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "mongodb://localhost:27017/triap_test".to_string());

        let db = MongoDB::new(&uri).await;
        assert!(db.is_ok());
    }

    #[test]
    fn test_unique_index_model() {
        let index = unique_index("email");
        assert_eq!(index.keys, doc! { "email": 1 });
        assert_eq!(index.options.and_then(|o| o.unique), Some(true));
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_duplicate_emails_block_startup() {
        dotenv::dotenv().ok();
        let uri = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "mongodb://localhost:27017/triap_index_test".to_string());

        let client = Client::with_uri_str(&uri).await.unwrap();
        let db = client.database("triap_index_test");
        db.drop().await.unwrap();

        let users = db.collection::<Document>(USERS_COLLECTION);
        users
            .insert_many(vec![
                doc! { "email": "dup@triap.com", "user_id": "a" },
                doc! { "email": "dup@triap.com", "user_id": "b" },
            ])
            .await
            .unwrap();

        let mongodb = MongoDB { db: db.clone() };
        assert!(mongodb.ensure_indexes().await.is_err());

        db.drop().await.unwrap();
    }
}
