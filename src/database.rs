use mongodb::bson::{self, Document};
use mongodb::options::{Collation, CollationStrength, FindOneAndUpdateOptions, ReturnDocument};
use mongodb::{Collection, Database as MongoDb};

use crate::campaign::db::{CampaignStore, MongoCampaignStore};
use crate::channel::db::{ChannelStore, MongoChannelStore};
use crate::error::Error;

pub mod memory;

pub use memory::MemoryDatabase;

const CHANNELS: &str = "channels";
const CAMPAIGNS: &str = "campaigns";
const COUNTERS: &str = "counters";
const COLLATION_LOCALE: &str = "en";

/// Name ordering ignores case, so listings read `apple, Banana, cherry`.
/// The `by_name` indexes are built with the same collation.
pub fn name_collation() -> Collation {
    Collation::builder()
        .locale(COLLATION_LOCALE.to_string())
        .strength(CollationStrength::Secondary)
        .build()
}

pub trait Database: Send + Sync {
    fn channels(&self) -> &dyn ChannelStore;
    fn campaigns(&self) -> &dyn CampaignStore;
}

#[derive(Debug, Clone)]
pub struct MongoDatabase {
    channels: MongoChannelStore,
    campaigns: MongoCampaignStore,
}

impl MongoDatabase {
    pub fn new(db: MongoDb) -> MongoDatabase {
        let counters = db.collection::<Document>(COUNTERS);
        MongoDatabase {
            channels: MongoChannelStore::new(db.collection(CHANNELS), counters.clone()),
            campaigns: MongoCampaignStore::new(db.collection(CAMPAIGNS), counters),
        }
    }

    #[tracing::instrument(skip(db))]
    pub async fn initialize(db: MongoDb) -> Result<MongoDatabase, Error> {
        db.run_command(bson::doc! { "ping": 1 }, None).await?;

        db.run_command(
            bson::doc! {
                "createIndexes": CHANNELS,
                "indexes": [
                    {
                        "key": { "name": 1, "_id": 1 },
                        "name": "by_name",
                        "collation": { "locale": COLLATION_LOCALE, "strength": 2 },
                    },
                ]
            },
            None,
        )
        .await?;

        db.run_command(
            bson::doc! {
                "createIndexes": CAMPAIGNS,
                "indexes": [
                    {
                        "key": { "name": 1, "_id": 1 },
                        "name": "by_name",
                        "collation": { "locale": COLLATION_LOCALE, "strength": 2 },
                    },
                    { "key": { "channel_id": 1 }, "name": "by_channel_id" },
                ]
            },
            None,
        )
        .await?;

        Ok(MongoDatabase::new(db))
    }
}

impl Database for MongoDatabase {
    fn channels(&self) -> &dyn ChannelStore {
        &self.channels
    }

    fn campaigns(&self) -> &dyn CampaignStore {
        &self.campaigns
    }
}

/// Atomically bumps and returns the named sequence in the counters
/// collection, creating it on first use.
#[tracing::instrument(skip(counters))]
pub async fn next_sequence(counters: &Collection<Document>, name: &str) -> Result<i64, Error> {
    let options = FindOneAndUpdateOptions::builder()
        .upsert(true)
        .return_document(ReturnDocument::After)
        .build();

    let counter = counters
        .find_one_and_update(
            bson::doc! { "_id": name },
            bson::doc! { "$inc": { "seq": 1_i64 } },
            options,
        )
        .await?
        .ok_or_else(|| Error::ExistentialState(format!("counter {} was not upserted", name)))?;

    counter
        .get_i64("seq")
        .map_err(|err| Error::ExistentialState(format!("counter {} is malformed: {}", name, err)))
}
