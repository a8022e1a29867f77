use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::typedid::{TypedId, TypedIdMarker};

pub mod db;
pub mod endpoints;
pub mod manager;
pub use endpoints::*;

pub type ChannelId = TypedId<Channel>;

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Channel {
    #[serde(rename = "_id")]
    pub id: ChannelId,
    pub name: String,
    pub slug: String,
    pub bid_types: Vec<BidType>,
}

impl TypedIdMarker for Channel {
    fn tag() -> &'static str {
        "CHN"
    }
}

/// A validated channel that has not been given an id yet.
#[derive(Clone, Debug, PartialEq)]
pub struct ChannelFields {
    pub name: String,
    pub slug: String,
    pub bid_types: Vec<BidType>,
}

impl ChannelFields {
    pub fn into_channel(self, id: ChannelId) -> Channel {
        Channel {
            id,
            name: self.name,
            slug: self.slug,
            bid_types: self.bid_types,
        }
    }
}

/// The pricing models a channel can allow.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BidType {
    Cpc,
    Cpm,
    Cpa,
    Cpv,
    Cpi,
}

impl BidType {
    pub const ALL: [BidType; 5] = [
        BidType::Cpc,
        BidType::Cpm,
        BidType::Cpa,
        BidType::Cpv,
        BidType::Cpi,
    ];

    pub fn code(self) -> &'static str {
        match self {
            BidType::Cpc => "CPC",
            BidType::Cpm => "CPM",
            BidType::Cpa => "CPA",
            BidType::Cpv => "CPV",
            BidType::Cpi => "CPI",
        }
    }
}

impl Display for BidType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownBidType(pub String);

/// Exact match against the uppercase codes; callers that accept other
/// casings must normalize first.
impl FromStr for BidType {
    type Err = UnknownBidType;
    fn from_str(s: &str) -> Result<BidType, UnknownBidType> {
        BidType::ALL
            .iter()
            .copied()
            .find(|bid_type| bid_type.code() == s)
            .ok_or_else(|| UnknownBidType(s.to_string()))
    }
}
