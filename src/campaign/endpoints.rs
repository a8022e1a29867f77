use actix_web::web::{Data, Json, Path};
use actix_web::{delete, get, patch, post, put, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::channel::{BidType, ChannelId};
use crate::database::Database;
use crate::error::Error;
use crate::validation::WriteMode;

use super::{manager, Campaign, CampaignId};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CampaignPayload {
    pub name: Option<String>,
    pub channel: Option<ChannelId>,
    pub bid: Option<f64>,
    pub bid_type: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CampaignBody {
    pub id: CampaignId,
    pub name: String,
    pub channel: ChannelId,
    pub bid: f64,
    pub bid_type: BidType,
}

impl CampaignBody {
    pub fn render(campaign: Campaign) -> CampaignBody {
        CampaignBody {
            id: campaign.id,
            name: campaign.name,
            channel: campaign.channel_id,
            bid: campaign.bid,
            bid_type: campaign.bid_type,
        }
    }
}

#[post("/campaigns/")]
#[tracing::instrument(skip(db))]
pub async fn create_campaign(
    db: Data<Box<dyn Database>>,
    body: Json<CampaignPayload>,
) -> Result<HttpResponse, Error> {
    let campaign = manager::create_campaign(&***db, body.into_inner()).await?;

    Ok(HttpResponse::Created().json(CampaignBody::render(campaign)))
}

#[get("/campaigns/")]
#[tracing::instrument(skip(db))]
pub async fn get_campaigns(db: Data<Box<dyn Database>>) -> Result<Json<Vec<CampaignBody>>, Error> {
    let campaigns = manager::get_campaigns(&***db).await?;

    let body = campaigns.into_iter().map(CampaignBody::render).collect();

    Ok(Json(body))
}

#[get("/campaigns/{campaign_id}/")]
#[tracing::instrument(skip(db))]
pub async fn get_campaign_by_id(
    db: Data<Box<dyn Database>>,
    params: Path<CampaignId>,
) -> Result<Json<CampaignBody>, Error> {
    let campaign_id = params.into_inner();
    let campaign = manager::get_campaign_by_id(&***db, campaign_id)
        .await?
        .ok_or(Error::CampaignNotFound { campaign_id })?;

    Ok(Json(CampaignBody::render(campaign)))
}

#[put("/campaigns/{campaign_id}/")]
#[tracing::instrument(skip(db))]
pub async fn replace_campaign(
    db: Data<Box<dyn Database>>,
    params: Path<CampaignId>,
    body: Json<CampaignPayload>,
) -> Result<Json<CampaignBody>, Error> {
    let campaign_id = params.into_inner();
    let campaign =
        manager::update_campaign(&***db, campaign_id, body.into_inner(), WriteMode::Replace)
            .await?;

    Ok(Json(CampaignBody::render(campaign)))
}

#[patch("/campaigns/{campaign_id}/")]
#[tracing::instrument(skip(db))]
pub async fn patch_campaign(
    db: Data<Box<dyn Database>>,
    params: Path<CampaignId>,
    body: Json<CampaignPayload>,
) -> Result<Json<CampaignBody>, Error> {
    let campaign_id = params.into_inner();
    let campaign =
        manager::update_campaign(&***db, campaign_id, body.into_inner(), WriteMode::Partial)
            .await?;

    Ok(Json(CampaignBody::render(campaign)))
}

#[delete("/campaigns/{campaign_id}/")]
#[tracing::instrument(skip(db))]
pub async fn delete_campaign(
    db: Data<Box<dyn Database>>,
    params: Path<CampaignId>,
) -> Result<HttpResponse, Error> {
    let campaign_id = params.into_inner();
    manager::delete_campaign(&***db, campaign_id).await?;

    Ok(HttpResponse::NoContent().finish())
}
