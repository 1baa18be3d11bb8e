//! Migration against live mongodb servers, run with `cargo test -- --ignored`.
//!
//! Servers are picked by `SYNCER_TEST_SOURCE` and `SYNCER_TEST_TARGET` at build time.
use acadify_migrate::{dry_run, migrate, CollectionOutcome, Endpoint, MigrateConfig};
use bson::{doc, Document};
use futures::TryStreamExt;
use mongodb::{Client, Database};

const SOURCE_DB: &str = "migrate_test_source";
const TARGET_DB: &str = "migrate_test_target";

struct Context {
    conf: MigrateConfig,
    source_db: Database,
    target_db: Database,
}

impl Context {
    async fn new() -> Self {
        let src_uri = option_env!("SYNCER_TEST_SOURCE").unwrap_or("mongodb://localhost:27017");
        let target_uri = option_env!("SYNCER_TEST_TARGET").unwrap_or("mongodb://localhost:27018");
        let source_db = Client::with_uri_str(src_uri)
            .await
            .unwrap()
            .database(SOURCE_DB);
        let target_db = Client::with_uri_str(target_uri)
            .await
            .unwrap()
            .database(TARGET_DB);
        source_db.drop().await.unwrap();
        target_db.drop().await.unwrap();

        Context {
            conf: MigrateConfig::new(
                Endpoint::new(src_uri, SOURCE_DB),
                Endpoint::new(target_uri, TARGET_DB),
            ),
            source_db,
            target_db,
        }
    }

    async fn docs(db: &Database, coll: &str) -> Vec<Document> {
        let mut docs: Vec<Document> = db
            .collection::<Document>(coll)
            .find(doc! {})
            .await
            .unwrap()
            .try_collect()
            .await
            .unwrap();
        docs.sort_by_key(|d| d.get_i32("_id").unwrap_or_default());
        docs
    }

    async fn cleanup(self) {
        self.source_db.drop().await.unwrap();
        self.target_db.drop().await.unwrap();
    }
}

#[tokio::test]
#[ignore = "needs running mongodb servers"]
async fn test_migrate_end_to_end() {
    let context = Context::new().await;
    // setup.
    let doc_a = doc! {"_id": 1, "name": "ada"};
    let doc_b = doc! {"_id": 2, "name": "grace"};
    context
        .source_db
        .collection::<Document>("users")
        .insert_many(vec![doc_a.clone(), doc_b.clone()])
        .await
        .unwrap();
    context.source_db.create_collection("logs").await.unwrap();
    context
        .target_db
        .collection::<Document>("users")
        .insert_one(doc! {"_id": 3, "name": "old"})
        .await
        .unwrap();
    context
        .target_db
        .collection::<Document>("stale")
        .insert_one(doc! {"_id": 4, "x": true})
        .await
        .unwrap();

    // plan doesn't write.
    let planned = dry_run(&context.conf).await.unwrap();
    assert_eq!(planned.iter().filter(|p| p.will_copy()).count(), 1);
    assert_eq!(Context::docs(&context.target_db, "users").await.len(), 1);

    // execute.
    let report = migrate(&context.conf).await.unwrap();

    // check result in target database.
    assert_eq!(
        report.get("users").unwrap().outcome,
        CollectionOutcome::Copied {
            read: 2,
            deleted: 1,
            inserted: 2
        }
    );
    assert_eq!(
        Context::docs(&context.target_db, "users").await,
        vec![doc_a, doc_b]
    );
    assert_eq!(
        Context::docs(&context.target_db, "stale").await,
        vec![doc! {"_id": 4, "x": true}]
    );
    let target_colls = context.target_db.list_collection_names().await.unwrap();
    assert!(!target_colls.contains(&"logs".to_string()));

    context.cleanup().await;
}

#[tokio::test]
#[ignore = "needs running mongodb servers"]
async fn test_unreachable_destination() {
    let src_uri = option_env!("SYNCER_TEST_SOURCE").unwrap_or("mongodb://localhost:27017");
    let conf = MigrateConfig::new(
        Endpoint::new(src_uri, SOURCE_DB),
        Endpoint::new(
            "mongodb://127.0.0.1:1/?serverSelectionTimeoutMS=500",
            TARGET_DB,
        ),
    );

    let err = migrate(&conf).await.unwrap_err();
    assert!(matches!(
        err,
        acadify_migrate::MigrateError::ConnectError {
            role: acadify_migrate::Role::Destination,
            ..
        }
    ));
}
