use crate::config::MigrateConfig;
use crate::db::MongoStore;
use crate::error::{MigrateError, Result, Role};
use crate::report::{CollectionOutcome, CollectionReport, MigrationReport};
use crate::store::{DocumentStore, Step, StoreError};
use crate::{DEFAULT_DATABASE, RESERVED_COLLECTIONS};
use chrono::Utc;
use std::future::Future;
use tracing::{debug, info};

/// true if collection `name` is mongodb internal metadata which should never be copied.
pub fn is_reserved_collection(name: &str) -> bool {
    RESERVED_COLLECTIONS.contains(&name)
}

/// A collection which would be copied by a migration run, returned by [Migrator::plan].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedCollection {
    /// collection name.
    pub name: String,
    /// documents in source collection.
    pub documents: u64,
}

impl PlannedCollection {
    /// empty source collections are skipped by migration.
    pub fn will_copy(&self) -> bool {
        self.documents > 0
    }
}

/// Copy all collections from `source` store to `destination` store.
///
/// Collections are processed one by one, in the order source lists them.  For each collection:
/// 1. read every document from source into memory.
/// 2. if nothing is read, go to next collection, destination is not touched.
/// 3. delete every document in destination collection with the same name.
/// 4. insert all read documents into destination in one batch.
///
/// The first error aborts the whole run.  Note that if insert fails after delete succeeded, the destination
/// collection is left empty, running again from the beginning is the only way to recover.
pub struct Migrator<'a, S, D> {
    source: &'a S,
    destination: &'a D,
}

impl<'a, S: DocumentStore, D: DocumentStore> Migrator<'a, S, D> {
    /// create a migrator which copies `source` into `destination`.
    pub fn new(source: &'a S, destination: &'a D) -> Self {
        Migrator {
            source,
            destination,
        }
    }

    /// Migrate every user collection.
    pub async fn run(&self) -> Result<MigrationReport> {
        let started_at = Utc::now();
        let (names, skipped_reserved) = self.user_collections().await?;
        info!(total = names.len(), "Begin to migrate collections.");

        let mut collections = Vec::with_capacity(names.len());
        for name in names {
            let outcome = self.migrate_collection(&name).await?;
            collections.push(CollectionReport { name, outcome });
        }

        Ok(MigrationReport {
            started_at,
            finished_at: Utc::now(),
            skipped_reserved,
            collections,
        })
    }

    /// List user collections along with their document count, nothing is written.
    pub async fn plan(&self) -> Result<Vec<PlannedCollection>> {
        let (names, _) = self.user_collections().await?;
        let mut planned = Vec::with_capacity(names.len());
        for name in names {
            let documents = self
                .source
                .count(&name)
                .await
                .map_err(|detail| collection_error(Step::Read, &name, detail))?;
            planned.push(PlannedCollection { name, documents });
        }
        Ok(planned)
    }

    // returns (collections to migrate, reserved collections skipped).
    async fn user_collections(&self) -> Result<(Vec<String>, Vec<String>)> {
        let names = self
            .source
            .list_collection_names()
            .await
            .map_err(|detail| MigrateError::ListError { detail })?;
        let (reserved, names): (Vec<String>, Vec<String>) =
            names.into_iter().partition(|n| is_reserved_collection(n));
        for coll in reserved.iter() {
            debug!(%coll, "Skip reserved collection.");
        }
        Ok((names, reserved))
    }

    async fn migrate_collection(&self, coll: &str) -> Result<CollectionOutcome> {
        let docs = self
            .source
            .read_all(coll)
            .await
            .map_err(|detail| collection_error(Step::Read, coll, detail))?;
        let read = docs.len() as u64;
        info!(%coll, read, "Read documents from source.");
        if docs.is_empty() {
            info!(%coll, "Source collection is empty, skipped.");
            return Ok(CollectionOutcome::SkippedEmpty);
        }

        let deleted = self
            .destination
            .clear(coll)
            .await
            .map_err(|detail| collection_error(Step::Clear, coll, detail))?;
        info!(%coll, deleted, "Destination collection cleared.");

        let inserted = self
            .destination
            .insert_all(coll, docs)
            .await
            .map_err(|detail| collection_error(Step::Insert, coll, detail))?;
        info!(%coll, inserted, "Documents inserted into destination.");

        Ok(CollectionOutcome::Copied {
            read,
            deleted,
            inserted,
        })
    }
}

fn collection_error(step: Step, coll: &str, detail: StoreError) -> MigrateError {
    MigrateError::CollectionError {
        step,
        coll: coll.to_string(),
        detail,
    }
}

/// Run a [Migrator] over `source` and `destination`, then close both of them whatever the result is.
pub async fn run_and_close<S: DocumentStore, D: DocumentStore>(
    source: S,
    destination: D,
) -> Result<MigrationReport> {
    let result = Migrator::new(&source, &destination).run().await;
    info!("Closing connections...");
    source.close().await;
    destination.close().await;
    result
}

/// Connect to both endpoints in `conf` and migrate all collections from source to destination.
///
/// Both connections are closed before return, on success or error.
pub async fn migrate(conf: &MigrateConfig) -> Result<MigrationReport> {
    info!(
        source = %conf.get_source(),
        destination = %conf.get_destination(),
        "Acadify migration starting."
    );
    let (source, destination) = connect(conf).await?;
    run_and_close(source, destination).await
}

/// Connect to both endpoints in `conf` and list what [migrate] would copy, without writing anything.
pub async fn dry_run(conf: &MigrateConfig) -> Result<Vec<PlannedCollection>> {
    let (source, destination) = connect(conf).await?;
    let result = Migrator::new(&source, &destination).plan().await;
    source.close().await;
    destination.close().await;
    result
}

async fn connect(conf: &MigrateConfig) -> Result<(MongoStore, MongoStore)> {
    let source = MongoStore::connect(Role::Source, conf.get_source(), DEFAULT_DATABASE).await?;
    // destination uri without database uses the same database name as source.
    let fallback_db = source.db_name().to_string();
    let destination =
        MongoStore::connect(Role::Destination, conf.get_destination(), &fallback_db);
    with_destination(source, destination).await
}

// pair an opened `source` with `destination` once it connects, `source` is closed if it doesn't.
async fn with_destination<S, D, F>(source: S, destination: F) -> Result<(S, D)>
where
    S: DocumentStore,
    F: Future<Output = Result<D>>,
{
    match destination.await {
        Ok(destination) => Ok((source, destination)),
        Err(e) => {
            source.close().await;
            Err(e)
        }
    }
}
