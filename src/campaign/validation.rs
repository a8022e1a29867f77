//! The rule tying a campaign's bid type to the bid types its channel
//! allows. It runs on every campaign write, with the effective channel and
//! bid type after any stored values have been merged in.

use crate::channel::{BidType, Channel};
use crate::error::Error;

/// Uppercases `bid_type` and checks it against `channel.bid_types`.
///
/// Codes that are not a known bid type at all fail the same way as known
/// codes the channel does not allow.
pub fn normalize_bid_type(channel: &Channel, bid_type: &str) -> Result<BidType, Error> {
    bid_type
        .to_uppercase()
        .parse::<BidType>()
        .ok()
        .filter(|normalized| channel.bid_types.contains(normalized))
        .ok_or_else(|| Error::BidTypeNotAllowed {
            channel_id: channel.id,
            bid_type: bid_type.to_string(),
            allowed_bid_types: channel.bid_types.clone(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::ChannelId;

    fn tv() -> Channel {
        Channel {
            id: ChannelId::new(1),
            name: "TV".into(),
            slug: "tv".into(),
            bid_types: vec![BidType::Cpm, BidType::Cpc],
        }
    }

    #[test]
    fn accepts_any_casing_and_normalizes() {
        let channel = tv();
        assert_eq!(normalize_bid_type(&channel, "CPM"), Ok(BidType::Cpm));
        assert_eq!(normalize_bid_type(&channel, "cpm"), Ok(BidType::Cpm));
        assert_eq!(normalize_bid_type(&channel, "cPc"), Ok(BidType::Cpc));
    }

    #[test]
    fn rejects_known_code_the_channel_does_not_allow() {
        let channel = tv();
        assert_eq!(
            normalize_bid_type(&channel, "cpa"),
            Err(Error::BidTypeNotAllowed {
                channel_id: channel.id,
                bid_type: "cpa".into(),
                allowed_bid_types: vec![BidType::Cpm, BidType::Cpc],
            })
        );
    }

    #[test]
    fn rejects_unknown_code_as_not_allowed() {
        let channel = tv();
        for raw in &["CPZZ", "", "C", "cpm "] {
            let result = normalize_bid_type(&channel, raw);
            assert!(
                matches!(result, Err(Error::BidTypeNotAllowed { .. })),
                "{:?} was not rejected as a bid type",
                raw
            );
        }
    }
}
