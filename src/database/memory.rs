use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::campaign::db::CampaignStore;
use crate::campaign::{Campaign, CampaignFields, CampaignId};
use crate::channel::db::ChannelStore;
use crate::channel::{Channel, ChannelFields, ChannelId};
use crate::error::Error;

use super::Database;

/// Process-local backend. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryDatabase {
    channels: MemoryChannelStore,
    campaigns: MemoryCampaignStore,
}

impl MemoryDatabase {
    pub fn new() -> MemoryDatabase {
        MemoryDatabase::default()
    }
}

impl Database for MemoryDatabase {
    fn channels(&self) -> &dyn ChannelStore {
        &self.channels
    }

    fn campaigns(&self) -> &dyn CampaignStore {
        &self.campaigns
    }
}

#[derive(Debug)]
struct Table<T> {
    last_id: i64,
    rows: BTreeMap<i64, T>,
}

impl<T> Default for Table<T> {
    fn default() -> Table<T> {
        Table {
            last_id: 0,
            rows: BTreeMap::new(),
        }
    }
}

impl<T> Table<T> {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }
}

// Case-insensitive first, matching the collation used by the Mongo backend.
fn by_name(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

fn lock<T>(table: &Mutex<Table<T>>) -> Result<MutexGuard<'_, Table<T>>, Error> {
    table
        .lock()
        .map_err(|_| Error::ExistentialState("memory table lock was poisoned".into()))
}

#[derive(Debug, Default)]
pub struct MemoryChannelStore {
    table: Mutex<Table<Channel>>,
}

#[async_trait]
impl ChannelStore for MemoryChannelStore {
    #[tracing::instrument(skip(self))]
    async fn insert_channel(&self, fields: ChannelFields) -> Result<Channel, Error> {
        let mut table = lock(&self.table)?;
        let id = table.next_id();
        let channel = fields.into_channel(ChannelId::new(id));
        table.rows.insert(id, channel.clone());

        Ok(channel)
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_channels(&self) -> Result<Vec<Channel>, Error> {
        let table = lock(&self.table)?;
        let mut channels: Vec<Channel> = table.rows.values().cloned().collect();
        channels.sort_by(|a, b| by_name(&a.name, &b.name).then(a.id.cmp(&b.id)));

        Ok(channels)
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_channel_by_id(&self, channel_id: ChannelId) -> Result<Option<Channel>, Error> {
        let table = lock(&self.table)?;

        Ok(table.rows.get(&channel_id.get()).cloned())
    }

    #[tracing::instrument(skip(self))]
    async fn update_channel(&self, channel: &Channel) -> Result<bool, Error> {
        let mut table = lock(&self.table)?;
        match table.rows.get_mut(&channel.id.get()) {
            Some(row) => {
                *row = channel.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    #[tracing::instrument(skip(self))]
    async fn delete_channel(&self, channel_id: ChannelId) -> Result<bool, Error> {
        let mut table = lock(&self.table)?;

        Ok(table.rows.remove(&channel_id.get()).is_some())
    }
}

#[derive(Debug, Default)]
pub struct MemoryCampaignStore {
    table: Mutex<Table<Campaign>>,
}

#[async_trait]
impl CampaignStore for MemoryCampaignStore {
    #[tracing::instrument(skip(self))]
    async fn insert_campaign(&self, fields: CampaignFields) -> Result<Campaign, Error> {
        let mut table = lock(&self.table)?;
        let id = table.next_id();
        let campaign = fields.into_campaign(CampaignId::new(id));
        table.rows.insert(id, campaign.clone());

        Ok(campaign)
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_campaigns(&self) -> Result<Vec<Campaign>, Error> {
        let table = lock(&self.table)?;
        let mut campaigns: Vec<Campaign> = table.rows.values().cloned().collect();
        campaigns.sort_by(|a, b| by_name(&a.name, &b.name).then(a.id.cmp(&b.id)));

        Ok(campaigns)
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_campaign_by_id(
        &self,
        campaign_id: CampaignId,
    ) -> Result<Option<Campaign>, Error> {
        let table = lock(&self.table)?;

        Ok(table.rows.get(&campaign_id.get()).cloned())
    }

    #[tracing::instrument(skip(self))]
    async fn update_campaign(&self, campaign: &Campaign) -> Result<bool, Error> {
        let mut table = lock(&self.table)?;
        match table.rows.get_mut(&campaign.id.get()) {
            Some(row) => {
                *row = campaign.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    #[tracing::instrument(skip(self))]
    async fn delete_campaign(&self, campaign_id: CampaignId) -> Result<bool, Error> {
        let mut table = lock(&self.table)?;

        Ok(table.rows.remove(&campaign_id.get()).is_some())
    }

    #[tracing::instrument(skip(self))]
    async fn delete_campaigns_by_channel(&self, channel_id: ChannelId) -> Result<u64, Error> {
        let mut table = lock(&self.table)?;
        let before = table.rows.len();
        table
            .rows
            .retain(|_, campaign| campaign.channel_id != channel_id);

        Ok((before - table.rows.len()) as u64)
    }
}
