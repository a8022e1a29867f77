use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{self, Document};
use mongodb::options::FindOptions;
use mongodb::Collection;

use crate::channel::ChannelId;
use crate::database::{name_collation, next_sequence};
use crate::error::Error;

use super::{Campaign, CampaignFields, CampaignId};

const SEQUENCE: &str = "campaigns";

#[async_trait]
pub trait CampaignStore: Send + Sync {
    async fn insert_campaign(&self, fields: CampaignFields) -> Result<Campaign, Error>;

    async fn fetch_campaigns(&self) -> Result<Vec<Campaign>, Error>;

    async fn fetch_campaign_by_id(
        &self,
        campaign_id: CampaignId,
    ) -> Result<Option<Campaign>, Error>;

    async fn update_campaign(&self, campaign: &Campaign) -> Result<bool, Error>;

    async fn delete_campaign(&self, campaign_id: CampaignId) -> Result<bool, Error>;

    async fn delete_campaigns_by_channel(&self, channel_id: ChannelId) -> Result<u64, Error>;
}

#[derive(Debug, Clone)]
pub struct MongoCampaignStore {
    campaigns: Collection<Campaign>,
    counters: Collection<Document>,
}

impl MongoCampaignStore {
    pub fn new(
        campaigns: Collection<Campaign>,
        counters: Collection<Document>,
    ) -> MongoCampaignStore {
        MongoCampaignStore {
            campaigns,
            counters,
        }
    }
}

#[async_trait]
impl CampaignStore for MongoCampaignStore {
    #[tracing::instrument(skip(self))]
    async fn insert_campaign(&self, fields: CampaignFields) -> Result<Campaign, Error> {
        let id = next_sequence(&self.counters, SEQUENCE).await?;
        let campaign = fields.into_campaign(CampaignId::new(id));

        self.campaigns.insert_one(&campaign, None).await?;

        Ok(campaign)
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_campaigns(&self) -> Result<Vec<Campaign>, Error> {
        let options = FindOptions::builder()
            .sort(bson::doc! { "name": 1, "_id": 1 })
            .collation(name_collation())
            .build();

        let campaigns: Vec<Campaign> = self
            .campaigns
            .find(bson::doc! {}, options)
            .await?
            .try_collect()
            .await?;

        Ok(campaigns)
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_campaign_by_id(
        &self,
        campaign_id: CampaignId,
    ) -> Result<Option<Campaign>, Error> {
        let campaign = self
            .campaigns
            .find_one(bson::doc! { "_id": campaign_id }, None)
            .await?;

        Ok(campaign)
    }

    #[tracing::instrument(skip(self))]
    async fn update_campaign(&self, campaign: &Campaign) -> Result<bool, Error> {
        let result = self
            .campaigns
            .replace_one(bson::doc! { "_id": campaign.id }, campaign, None)
            .await?;

        Ok(result.matched_count > 0)
    }

    #[tracing::instrument(skip(self))]
    async fn delete_campaign(&self, campaign_id: CampaignId) -> Result<bool, Error> {
        let result = self
            .campaigns
            .delete_one(bson::doc! { "_id": campaign_id }, None)
            .await?;

        Ok(result.deleted_count > 0)
    }

    #[tracing::instrument(skip(self))]
    async fn delete_campaigns_by_channel(&self, channel_id: ChannelId) -> Result<u64, Error> {
        let result = self
            .campaigns
            .delete_many(bson::doc! { "channel_id": channel_id }, None)
            .await?;

        Ok(result.deleted_count)
    }
}
