use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{self, Document};
use mongodb::options::FindOptions;
use mongodb::Collection;

use crate::database::{name_collation, next_sequence};
use crate::error::Error;

use super::{Channel, ChannelFields, ChannelId};

const SEQUENCE: &str = "channels";

#[async_trait]
pub trait ChannelStore: Send + Sync {
    async fn insert_channel(&self, fields: ChannelFields) -> Result<Channel, Error>;

    async fn fetch_channels(&self) -> Result<Vec<Channel>, Error>;

    async fn fetch_channel_by_id(&self, channel_id: ChannelId) -> Result<Option<Channel>, Error>;

    /// Returns `false` if no channel with that id is stored.
    async fn update_channel(&self, channel: &Channel) -> Result<bool, Error>;

    /// Removes the channel row only; dependent campaigns are the caller's
    /// concern.
    async fn delete_channel(&self, channel_id: ChannelId) -> Result<bool, Error>;
}

#[derive(Debug, Clone)]
pub struct MongoChannelStore {
    channels: Collection<Channel>,
    counters: Collection<Document>,
}

impl MongoChannelStore {
    pub fn new(channels: Collection<Channel>, counters: Collection<Document>) -> MongoChannelStore {
        MongoChannelStore { channels, counters }
    }
}

#[async_trait]
impl ChannelStore for MongoChannelStore {
    #[tracing::instrument(skip(self))]
    async fn insert_channel(&self, fields: ChannelFields) -> Result<Channel, Error> {
        let id = next_sequence(&self.counters, SEQUENCE).await?;
        let channel = fields.into_channel(ChannelId::new(id));

        self.channels.insert_one(&channel, None).await?;

        Ok(channel)
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_channels(&self) -> Result<Vec<Channel>, Error> {
        let options = FindOptions::builder()
            .sort(bson::doc! { "name": 1, "_id": 1 })
            .collation(name_collation())
            .build();

        let channels: Vec<Channel> = self
            .channels
            .find(bson::doc! {}, options)
            .await?
            .try_collect()
            .await?;

        Ok(channels)
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_channel_by_id(&self, channel_id: ChannelId) -> Result<Option<Channel>, Error> {
        let channel = self
            .channels
            .find_one(bson::doc! { "_id": channel_id }, None)
            .await?;

        Ok(channel)
    }

    #[tracing::instrument(skip(self))]
    async fn update_channel(&self, channel: &Channel) -> Result<bool, Error> {
        let result = self
            .channels
            .replace_one(bson::doc! { "_id": channel.id }, channel, None)
            .await?;

        Ok(result.matched_count > 0)
    }

    #[tracing::instrument(skip(self))]
    async fn delete_channel(&self, channel_id: ChannelId) -> Result<bool, Error> {
        let result = self
            .channels
            .delete_one(bson::doc! { "_id": channel_id }, None)
            .await?;

        Ok(result.deleted_count > 0)
    }
}
