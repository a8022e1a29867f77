use actix_web::web::{Data, Json, Path};
use actix_web::{delete, get, patch, post, put, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::database::Database;
use crate::error::Error;
use crate::validation::WriteMode;

use super::{manager, BidType, Channel, ChannelId};

/// Incoming channel fields. Everything is optional here so that missing
/// fields are reported per field instead of as a parse failure.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ChannelPayload {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub bid_types: Option<Vec<String>>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChannelBody {
    pub id: ChannelId,
    pub name: String,
    pub slug: String,
    pub bid_types: Vec<BidType>,
}

impl ChannelBody {
    pub fn render(channel: Channel) -> ChannelBody {
        ChannelBody {
            id: channel.id,
            name: channel.name,
            slug: channel.slug,
            bid_types: channel.bid_types,
        }
    }
}

#[post("/channels/")]
#[tracing::instrument(skip(db))]
pub async fn create_channel(
    db: Data<Box<dyn Database>>,
    body: Json<ChannelPayload>,
) -> Result<HttpResponse, Error> {
    let channel = manager::create_channel(&***db, body.into_inner()).await?;

    Ok(HttpResponse::Created().json(ChannelBody::render(channel)))
}

#[get("/channels/")]
#[tracing::instrument(skip(db))]
pub async fn get_channels(db: Data<Box<dyn Database>>) -> Result<Json<Vec<ChannelBody>>, Error> {
    let channels = manager::get_channels(&***db).await?;

    let body = channels.into_iter().map(ChannelBody::render).collect();

    Ok(Json(body))
}

#[get("/channels/{channel_id}/")]
#[tracing::instrument(skip(db))]
pub async fn get_channel_by_id(
    db: Data<Box<dyn Database>>,
    params: Path<ChannelId>,
) -> Result<Json<ChannelBody>, Error> {
    let channel_id = params.into_inner();
    let channel = manager::get_channel_by_id(&***db, channel_id)
        .await?
        .ok_or(Error::ChannelNotFound { channel_id })?;

    Ok(Json(ChannelBody::render(channel)))
}

#[put("/channels/{channel_id}/")]
#[tracing::instrument(skip(db))]
pub async fn replace_channel(
    db: Data<Box<dyn Database>>,
    params: Path<ChannelId>,
    body: Json<ChannelPayload>,
) -> Result<Json<ChannelBody>, Error> {
    let channel_id = params.into_inner();
    let channel =
        manager::update_channel(&***db, channel_id, body.into_inner(), WriteMode::Replace).await?;

    Ok(Json(ChannelBody::render(channel)))
}

#[patch("/channels/{channel_id}/")]
#[tracing::instrument(skip(db))]
pub async fn patch_channel(
    db: Data<Box<dyn Database>>,
    params: Path<ChannelId>,
    body: Json<ChannelPayload>,
) -> Result<Json<ChannelBody>, Error> {
    let channel_id = params.into_inner();
    let channel =
        manager::update_channel(&***db, channel_id, body.into_inner(), WriteMode::Partial).await?;

    Ok(Json(ChannelBody::render(channel)))
}

#[delete("/channels/{channel_id}/")]
#[tracing::instrument(skip(db))]
pub async fn delete_channel(
    db: Data<Box<dyn Database>>,
    params: Path<ChannelId>,
) -> Result<HttpResponse, Error> {
    let channel_id = params.into_inner();
    manager::delete_channel(&***db, channel_id).await?;

    Ok(HttpResponse::NoContent().finish())
}
