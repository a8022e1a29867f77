use actix_web::web::{Json, JsonConfig, PathConfig, ServiceConfig};
use actix_web::{get, HttpResponse};
use serde::Serialize;

use crate::error::Error;
use crate::{campaign, channel};

#[derive(Clone, Debug, Serialize)]
pub struct ApiRootBody {
    pub channels: &'static str,
    pub campaigns: &'static str,
}

#[get("/")]
#[tracing::instrument]
pub async fn api_root() -> Json<ApiRootBody> {
    Json(ApiRootBody {
        channels: "/channels/",
        campaigns: "/campaigns/",
    })
}

/// The full route table. The database handle is expected to be registered
/// as `Data<Box<dyn Database>>` by the caller.
pub fn configure(cfg: &mut ServiceConfig) {
    cfg.app_data(JsonConfig::default().error_handler(|err, _req| {
        // format json errors with custom format
        Error::InvalidJson(err).into()
    }))
    .app_data(PathConfig::default().error_handler(|err, _req| {
        // format path errors with custom format
        Error::InvalidPath(err).into()
    }))
    .service(api_root)
    .service(channel::endpoints::create_channel)
    .service(channel::endpoints::get_channels)
    .service(channel::endpoints::get_channel_by_id)
    .service(channel::endpoints::replace_channel)
    .service(channel::endpoints::patch_channel)
    .service(channel::endpoints::delete_channel)
    .service(campaign::endpoints::create_campaign)
    .service(campaign::endpoints::get_campaigns)
    .service(campaign::endpoints::get_campaign_by_id)
    .service(campaign::endpoints::replace_campaign)
    .service(campaign::endpoints::patch_campaign)
    .service(campaign::endpoints::delete_campaign);
}

pub async fn path_not_found() -> Result<HttpResponse, Error> {
    Err(Error::PathNotFound)
}
