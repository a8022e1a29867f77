use serde::{Deserialize, Serialize};

use crate::channel::{BidType, ChannelId};
use crate::typedid::{TypedId, TypedIdMarker};

pub mod db;
pub mod endpoints;
pub mod manager;
pub mod validation;
pub use endpoints::*;

pub type CampaignId = TypedId<Campaign>;

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Campaign {
    #[serde(rename = "_id")]
    pub id: CampaignId,
    pub name: String,
    pub channel_id: ChannelId,
    pub bid: f64,
    pub bid_type: BidType,
}

impl TypedIdMarker for Campaign {
    fn tag() -> &'static str {
        "CPN"
    }
}

/// A campaign that passed validation against its channel and is waiting
/// for an id.
#[derive(Clone, Debug, PartialEq)]
pub struct CampaignFields {
    pub name: String,
    pub channel_id: ChannelId,
    pub bid: f64,
    pub bid_type: BidType,
}

impl CampaignFields {
    pub fn into_campaign(self, id: CampaignId) -> Campaign {
        Campaign {
            id,
            name: self.name,
            channel_id: self.channel_id,
            bid: self.bid,
            bid_type: self.bid_type,
        }
    }
}
