use crate::database::Database;
use crate::error::Error;
use crate::validation::{FieldErrors, WriteMode};

use super::validation::normalize_bid_type;
use super::{Campaign, CampaignFields, CampaignId, CampaignPayload};

/// Resolves the effective field values (payload first, then `fallback`),
/// checks them field by field and finally applies the bid type rule against
/// the effective channel.
#[tracing::instrument(skip(db))]
pub async fn prepare_campaign(
    db: &dyn Database,
    payload: CampaignPayload,
    fallback: Option<&Campaign>,
) -> Result<CampaignFields, Error> {
    let mut errors = FieldErrors::new();

    let name = errors.label(
        "name",
        payload.name.or_else(|| fallback.map(|c| c.name.clone())),
    );

    let channel_id = errors.required(
        "channel",
        payload.channel.or_else(|| fallback.map(|c| c.channel_id)),
    );
    let channel = match channel_id {
        Some(channel_id) => {
            let channel = db.channels().fetch_channel_by_id(channel_id).await?;
            if channel.is_none() {
                errors.push(
                    "channel",
                    format!("Channel {} does not exist.", channel_id.get()),
                );
            }
            channel
        }
        None => None,
    };

    let bid = errors.required("bid", payload.bid.or_else(|| fallback.map(|c| c.bid)));

    let bid_type = errors.not_blank(
        "bid_type",
        payload
            .bid_type
            .or_else(|| fallback.map(|c| c.bid_type.code().to_string())),
    );

    let (name, channel, bid, bid_type) = match (name, channel, bid, bid_type) {
        (Some(name), Some(channel), Some(bid), Some(bid_type)) => (name, channel, bid, bid_type),
        _ => return Err(errors.into_error()),
    };

    let bid_type = normalize_bid_type(&channel, &bid_type)?;

    Ok(CampaignFields {
        name,
        channel_id: channel.id,
        bid,
        bid_type,
    })
}

#[tracing::instrument(skip(db))]
pub async fn create_campaign(
    db: &dyn Database,
    payload: CampaignPayload,
) -> Result<Campaign, Error> {
    let fields = prepare_campaign(db, payload, None).await?;

    db.campaigns().insert_campaign(fields).await
}

#[tracing::instrument(skip(db))]
pub async fn get_campaigns(db: &dyn Database) -> Result<Vec<Campaign>, Error> {
    let campaigns = db.campaigns().fetch_campaigns().await?;

    Ok(campaigns)
}

#[tracing::instrument(skip(db))]
pub async fn get_campaign_by_id(
    db: &dyn Database,
    campaign_id: CampaignId,
) -> Result<Option<Campaign>, Error> {
    let campaign = db.campaigns().fetch_campaign_by_id(campaign_id).await?;

    Ok(campaign)
}

#[tracing::instrument(skip(db))]
pub async fn expect_campaign_by_id(
    db: &dyn Database,
    campaign_id: CampaignId,
) -> Result<Campaign, Error> {
    let campaign = db
        .campaigns()
        .fetch_campaign_by_id(campaign_id)
        .await?
        .ok_or(Error::CampaignNotFound { campaign_id })?;

    Ok(campaign)
}

#[tracing::instrument(skip(db))]
pub async fn update_campaign(
    db: &dyn Database,
    campaign_id: CampaignId,
    payload: CampaignPayload,
    mode: WriteMode,
) -> Result<Campaign, Error> {
    let existing = expect_campaign_by_id(db, campaign_id).await?;
    let fallback = match mode {
        WriteMode::Replace => None,
        WriteMode::Partial => Some(&existing),
    };

    let campaign = prepare_campaign(db, payload, fallback)
        .await?
        .into_campaign(campaign_id);

    if !db.campaigns().update_campaign(&campaign).await? {
        return Err(Error::CampaignNotFound { campaign_id });
    }

    Ok(campaign)
}

#[tracing::instrument(skip(db))]
pub async fn delete_campaign(db: &dyn Database, campaign_id: CampaignId) -> Result<(), Error> {
    if !db.campaigns().delete_campaign(campaign_id).await? {
        return Err(Error::CampaignNotFound { campaign_id });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::{self, BidType, Channel, ChannelId, ChannelPayload};
    use crate::database::MemoryDatabase;
    use crate::validation::FieldError;

    async fn create_test_channel(db: &MemoryDatabase, name: &str, bid_types: &[&str]) -> Channel {
        let payload = ChannelPayload {
            name: Some(name.to_string()),
            slug: Some(name.to_lowercase()),
            bid_types: Some(bid_types.iter().map(|code| code.to_string()).collect()),
        };

        channel::manager::create_channel(db, payload).await.unwrap()
    }

    fn payload(name: &str, channel_id: ChannelId, bid_type: &str) -> CampaignPayload {
        CampaignPayload {
            name: Some(name.to_string()),
            channel: Some(channel_id),
            bid: Some(1.0),
            bid_type: Some(bid_type.to_string()),
        }
    }

    #[tokio::test]
    async fn create_campaign_normalizes_bid_type() {
        let db = MemoryDatabase::new();
        let tv = create_test_channel(&db, "TV", &["CPM", "CPC"]).await;

        let campaign = create_campaign(&db, payload("Spot A", tv.id, "cpm"))
            .await
            .unwrap();

        assert_eq!(campaign.bid_type, BidType::Cpm);
        assert_eq!(campaign.channel_id, tv.id);
        let stored = get_campaign_by_id(&db, campaign.id).await.unwrap().unwrap();
        assert_eq!(stored.bid_type, BidType::Cpm);
    }

    #[tokio::test]
    async fn create_campaign_rejects_unknown_code_without_writing() {
        let db = MemoryDatabase::new();
        let tv = create_test_channel(&db, "TV", &["CPM", "CPC"]).await;

        let result = create_campaign(&db, payload("Spot A", tv.id, "CPZZ")).await;

        assert_eq!(
            result.unwrap_err(),
            Error::BidTypeNotAllowed {
                channel_id: tv.id,
                bid_type: "CPZZ".into(),
                allowed_bid_types: vec![BidType::Cpm, BidType::Cpc],
            }
        );
        assert!(get_campaigns(&db).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_campaign_rejects_bid_type_the_channel_does_not_allow() {
        let db = MemoryDatabase::new();
        let tv = create_test_channel(&db, "TV", &["CPM"]).await;

        let result = create_campaign(&db, payload("Spot A", tv.id, "cpi")).await;

        assert!(matches!(
            result.unwrap_err(),
            Error::BidTypeNotAllowed { .. }
        ));
        assert!(get_campaigns(&db).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_campaign_rejects_unknown_channel() {
        let db = MemoryDatabase::new();

        let result = create_campaign(&db, payload("Spot A", ChannelId::new(30), "CPM")).await;

        assert_eq!(
            result.unwrap_err(),
            Error::InvalidFields {
                fields: vec![FieldError {
                    field: "channel".into(),
                    message: "Channel 30 does not exist.".into(),
                }]
            }
        );
        assert!(get_campaigns(&db).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_campaign_requires_every_field() {
        let db = MemoryDatabase::new();

        let result = create_campaign(&db, CampaignPayload::default()).await;

        let fields = match result.unwrap_err() {
            Error::InvalidFields { fields } => fields,
            other => panic!("unexpected error: {:?}", other),
        };
        let names: Vec<&str> = fields.iter().map(|f| f.field.as_str()).collect();
        assert_eq!(names, vec!["name", "channel", "bid", "bid_type"]);
    }

    #[tokio::test]
    async fn update_rejects_disallowed_bid_type_and_keeps_stored_campaign() {
        let db = MemoryDatabase::new();
        let tv = create_test_channel(&db, "TV", &["CPM", "CPC"]).await;
        let campaign = create_campaign(&db, payload("Spot A", tv.id, "cpm"))
            .await
            .unwrap();

        let result = update_campaign(
            &db,
            campaign.id,
            payload("Spot A", tv.id, "CPA"),
            WriteMode::Replace,
        )
        .await;

        assert!(matches!(
            result.unwrap_err(),
            Error::BidTypeNotAllowed { .. }
        ));
        assert_eq!(
            get_campaign_by_id(&db, campaign.id).await.unwrap(),
            Some(campaign)
        );
    }

    #[tokio::test]
    async fn same_replace_twice_gives_same_state() {
        let db = MemoryDatabase::new();
        let tv = create_test_channel(&db, "TV", &["CPM", "CPC"]).await;
        let campaign = create_campaign(&db, payload("Spot A", tv.id, "cpm"))
            .await
            .unwrap();

        let mut update = payload("Spot B", tv.id, "cpc");
        update.bid = Some(3.0);
        let first = update_campaign(&db, campaign.id, update.clone(), WriteMode::Replace)
            .await
            .unwrap();
        let second = update_campaign(&db, campaign.id, update, WriteMode::Replace)
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(
            get_campaign_by_id(&db, campaign.id).await.unwrap(),
            Some(second)
        );
    }

    #[tokio::test]
    async fn partial_update_revalidates_stored_bid_type() {
        let db = MemoryDatabase::new();
        let tv = create_test_channel(&db, "TV", &["CPM", "CPC"]).await;
        let campaign = create_campaign(&db, payload("Spot A", tv.id, "CPM"))
            .await
            .unwrap();

        // shrinking the channel leaves the stored campaign untouched
        let shrink = ChannelPayload {
            bid_types: Some(vec!["CPC".into()]),
            ..Default::default()
        };
        channel::manager::update_channel(&db, tv.id, shrink, WriteMode::Partial)
            .await
            .unwrap();
        assert_eq!(
            get_campaign_by_id(&db, campaign.id).await.unwrap(),
            Some(campaign.clone())
        );

        // but the next write checks the stored bid type again
        let rename = CampaignPayload {
            name: Some("Spot B".into()),
            ..Default::default()
        };
        let result = update_campaign(&db, campaign.id, rename, WriteMode::Partial).await;

        assert_eq!(
            result.unwrap_err(),
            Error::BidTypeNotAllowed {
                channel_id: tv.id,
                bid_type: "CPM".into(),
                allowed_bid_types: vec![BidType::Cpc],
            }
        );
    }

    #[tokio::test]
    async fn partial_update_keeps_unmentioned_fields() {
        let db = MemoryDatabase::new();
        let tv = create_test_channel(&db, "TV", &["CPM", "CPC"]).await;
        let campaign = create_campaign(&db, payload("Spot A", tv.id, "CPM"))
            .await
            .unwrap();

        let rebid = CampaignPayload {
            bid: Some(2.5),
            ..Default::default()
        };
        let updated = update_campaign(&db, campaign.id, rebid, WriteMode::Partial)
            .await
            .unwrap();

        assert_eq!(updated.name, "Spot A");
        assert_eq!(updated.channel_id, tv.id);
        assert_eq!(updated.bid, 2.5);
        assert_eq!(updated.bid_type, BidType::Cpm);
    }

    #[tokio::test]
    async fn moving_channel_checks_against_the_new_channel() {
        let db = MemoryDatabase::new();
        let tv = create_test_channel(&db, "TV", &["CPM", "CPC"]).await;
        let radio = create_test_channel(&db, "Radio", &["CPI"]).await;
        let campaign = create_campaign(&db, payload("Spot A", tv.id, "CPM"))
            .await
            .unwrap();

        let move_only = CampaignPayload {
            channel: Some(radio.id),
            ..Default::default()
        };
        let result = update_campaign(&db, campaign.id, move_only, WriteMode::Partial).await;
        assert_eq!(
            result.unwrap_err(),
            Error::BidTypeNotAllowed {
                channel_id: radio.id,
                bid_type: "CPM".into(),
                allowed_bid_types: vec![BidType::Cpi],
            }
        );

        let move_and_rebid = CampaignPayload {
            channel: Some(radio.id),
            bid_type: Some("cpi".into()),
            ..Default::default()
        };
        let moved = update_campaign(&db, campaign.id, move_and_rebid, WriteMode::Partial)
            .await
            .unwrap();

        assert_eq!(moved.channel_id, radio.id);
        assert_eq!(moved.bid_type, BidType::Cpi);
    }

    #[tokio::test]
    async fn update_unknown_campaign_is_not_found() {
        let db = MemoryDatabase::new();
        let tv = create_test_channel(&db, "TV", &["CPM"]).await;
        let campaign_id = CampaignId::new(30);

        let result = update_campaign(
            &db,
            campaign_id,
            payload("Spot A", tv.id, "CPM"),
            WriteMode::Replace,
        )
        .await;

        assert_eq!(result.unwrap_err(), Error::CampaignNotFound { campaign_id });
        assert!(get_campaigns(&db).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_campaign_leaves_channel_in_place() {
        let db = MemoryDatabase::new();
        let tv = create_test_channel(&db, "TV", &["CPM"]).await;
        let campaign = create_campaign(&db, payload("Spot A", tv.id, "CPM"))
            .await
            .unwrap();

        delete_campaign(&db, campaign.id).await.unwrap();

        assert_eq!(get_campaign_by_id(&db, campaign.id).await.unwrap(), None);
        assert!(channel::manager::get_channel_by_id(&db, tv.id)
            .await
            .unwrap()
            .is_some());
        assert_eq!(
            delete_campaign(&db, campaign.id).await.unwrap_err(),
            Error::CampaignNotFound {
                campaign_id: campaign.id
            }
        );
    }
}
