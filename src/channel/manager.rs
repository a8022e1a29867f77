use crate::database::Database;
use crate::error::Error;
use crate::validation::{FieldErrors, WriteMode};

use super::{BidType, Channel, ChannelFields, ChannelId, ChannelPayload, UnknownBidType};

/// Checks the payload field by field. With a `fallback`, absent fields are
/// taken from it instead of being reported as missing.
pub fn prepare_channel(
    payload: ChannelPayload,
    fallback: Option<&Channel>,
) -> Result<ChannelFields, Error> {
    let mut errors = FieldErrors::new();

    let name = errors.label(
        "name",
        payload.name.or_else(|| fallback.map(|c| c.name.clone())),
    );
    let slug = errors.label(
        "slug",
        payload.slug.or_else(|| fallback.map(|c| c.slug.clone())),
    );
    let bid_types = match payload.bid_types {
        Some(codes) => decode_bid_types(&mut errors, codes),
        None => errors.required("bid_types", fallback.map(|c| c.bid_types.clone())),
    };

    match (name, slug, bid_types) {
        (Some(name), Some(slug), Some(bid_types)) => Ok(ChannelFields {
            name,
            slug,
            bid_types,
        }),
        _ => Err(errors.into_error()),
    }
}

fn decode_bid_types(errors: &mut FieldErrors, codes: Vec<String>) -> Option<Vec<BidType>> {
    if codes.is_empty() {
        errors.push("bid_types", "This list may not be empty.");
        return None;
    }

    let mut bid_types = Vec::with_capacity(codes.len());
    let mut valid = true;
    for code in codes {
        match code.parse::<BidType>() {
            Ok(bid_type) => {
                if !bid_types.contains(&bid_type) {
                    bid_types.push(bid_type);
                }
            }
            Err(UnknownBidType(code)) => {
                errors.push("bid_types", format!("\"{}\" is not a valid choice.", code));
                valid = false;
            }
        }
    }

    if valid {
        Some(bid_types)
    } else {
        None
    }
}

#[tracing::instrument(skip(db))]
pub async fn create_channel(db: &dyn Database, payload: ChannelPayload) -> Result<Channel, Error> {
    let fields = prepare_channel(payload, None)?;

    db.channels().insert_channel(fields).await
}

#[tracing::instrument(skip(db))]
pub async fn get_channels(db: &dyn Database) -> Result<Vec<Channel>, Error> {
    let channels = db.channels().fetch_channels().await?;

    Ok(channels)
}

#[tracing::instrument(skip(db))]
pub async fn get_channel_by_id(
    db: &dyn Database,
    channel_id: ChannelId,
) -> Result<Option<Channel>, Error> {
    let channel = db.channels().fetch_channel_by_id(channel_id).await?;

    Ok(channel)
}

#[tracing::instrument(skip(db))]
pub async fn expect_channel_by_id(
    db: &dyn Database,
    channel_id: ChannelId,
) -> Result<Channel, Error> {
    let channel = db
        .channels()
        .fetch_channel_by_id(channel_id)
        .await?
        .ok_or(Error::ChannelNotFound { channel_id })?;

    Ok(channel)
}

/// Campaigns already under the channel are left alone even if the new
/// bid types no longer include theirs.
#[tracing::instrument(skip(db))]
pub async fn update_channel(
    db: &dyn Database,
    channel_id: ChannelId,
    payload: ChannelPayload,
    mode: WriteMode,
) -> Result<Channel, Error> {
    let existing = expect_channel_by_id(db, channel_id).await?;
    let fallback = match mode {
        WriteMode::Replace => None,
        WriteMode::Partial => Some(&existing),
    };

    let channel = prepare_channel(payload, fallback)?.into_channel(channel_id);

    if !db.channels().update_channel(&channel).await? {
        return Err(Error::ChannelNotFound { channel_id });
    }

    Ok(channel)
}

/// Deletes the channel and then every campaign that references it.
/// Returns how many campaigns went with it.
#[tracing::instrument(skip(db))]
pub async fn delete_channel(db: &dyn Database, channel_id: ChannelId) -> Result<u64, Error> {
    if !db.channels().delete_channel(channel_id).await? {
        return Err(Error::ChannelNotFound { channel_id });
    }

    let removed = db
        .campaigns()
        .delete_campaigns_by_channel(channel_id)
        .await?;
    tracing::info!(%channel_id, removed, "deleted channel and its campaigns");

    Ok(removed)
}
