use crate::config::{mask_uri, Endpoint};
use crate::error::{MigrateError, Result, Role};
use crate::store::{DocumentStore, StoreError};
use async_trait::async_trait;
use bson::{doc, Document};
use futures::TryStreamExt;
use mongodb::{Client, Collection, Database};
use tracing::{debug, info};

/// One connected mongodb endpoint, opened by [MongoStore::connect] and released by [DocumentStore::close].
#[derive(Debug)]
pub struct MongoStore {
    client: Client,
    db: Database,
    role: Role,
}

impl MongoStore {
    /// connect to `endpoint`, which plays `role` in migration.
    ///
    /// Database is the one named by `endpoint`, or the default database of its connection string,
    /// or `fallback_db` when connection string doesn't name one.
    ///
    /// mongodb client connects lazily, so a `ping` command is sent to make sure the endpoint is reachable.
    pub async fn connect(role: Role, endpoint: &Endpoint, fallback_db: &str) -> Result<MongoStore> {
        let connect_error = |detail| MigrateError::ConnectError {
            role,
            uri: mask_uri(endpoint.get_uri()),
            detail,
        };

        info!(%role, endpoint = %endpoint, "Connecting to mongodb...");
        let client = Client::with_uri_str(endpoint.get_uri())
            .await
            .map_err(connect_error)?;
        let db = database(&client, endpoint, fallback_db);
        if let Err(e) = db.run_command(doc! {"ping": 1}).await {
            client.shutdown().await;
            return Err(connect_error(e));
        }
        info!(%role, db = db.name(), "Connected.");
        Ok(MongoStore { client, db, role })
    }

    /// name of connected database.
    pub fn db_name(&self) -> &str {
        self.db.name()
    }

    fn coll(&self, name: &str) -> Collection<Document> {
        self.db.collection(name)
    }
}

fn database(client: &Client, endpoint: &Endpoint, fallback_db: &str) -> Database {
    match endpoint.get_db() {
        Some(name) => client.database(name),
        None => client
            .default_database()
            .unwrap_or_else(|| client.database(fallback_db)),
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn list_collection_names(&self) -> std::result::Result<Vec<String>, StoreError> {
        Ok(self.db.list_collection_names().await?)
    }

    async fn read_all(&self, coll: &str) -> std::result::Result<Vec<Document>, StoreError> {
        let cursor = self.coll(coll).find(doc! {}).await?;
        let docs: Vec<Document> = cursor.try_collect().await?;
        Ok(docs)
    }

    async fn count(&self, coll: &str) -> std::result::Result<u64, StoreError> {
        Ok(self.coll(coll).count_documents(doc! {}).await?)
    }

    async fn clear(&self, coll: &str) -> std::result::Result<u64, StoreError> {
        let result = self.coll(coll).delete_many(doc! {}).await?;
        Ok(result.deleted_count)
    }

    async fn insert_all(
        &self,
        coll: &str,
        docs: Vec<Document>,
    ) -> std::result::Result<u64, StoreError> {
        let result = self.coll(coll).insert_many(docs).await?;
        Ok(result.inserted_ids.len() as u64)
    }

    async fn close(self) {
        let role = self.role;
        self.client.shutdown().await;
        debug!(%role, "Connection closed.");
    }
}
