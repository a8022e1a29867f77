use std::fmt::{Debug, Display};
use std::io::Error as IoError;

use actix_web::error::{JsonPayloadError, PathError};
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use config::ConfigError;
use derivative::Derivative;
use mongodb::error::Error as DatabaseError;
use serde::{Serialize, Serializer};

use crate::campaign::CampaignId;
use crate::channel::{BidType, ChannelId};
use crate::validation::FieldError;

#[derive(Debug, Serialize, Derivative)]
#[derivative(PartialEq)]
#[serde(untagged)]
pub enum Error {
    // 400
    #[serde(serialize_with = "display")]
    InvalidJson(#[derivative(PartialEq = "ignore")] JsonPayloadError),
    #[serde(serialize_with = "display")]
    InvalidPath(#[derivative(PartialEq = "ignore")] PathError),
    InvalidFields {
        fields: Vec<FieldError>,
    },
    BidTypeNotAllowed {
        channel_id: ChannelId,
        bid_type: String,
        allowed_bid_types: Vec<BidType>,
    },

    // 404
    PathNotFound,
    ChannelNotFound {
        channel_id: ChannelId,
    },
    CampaignNotFound {
        campaign_id: CampaignId,
    },

    // 500
    ExistentialState(String),
    #[serde(serialize_with = "display")]
    FailedDatabaseCall(#[derivative(PartialEq = "ignore")] DatabaseError),
    #[serde(serialize_with = "display")]
    InvalidConfig(#[derivative(PartialEq = "ignore")] ConfigError),
    #[serde(serialize_with = "display")]
    IoError(#[derivative(PartialEq = "ignore")] IoError),
}

impl Error {
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::InvalidJson(_) => "E4001000",
            Error::InvalidPath(_) => "E4001001",
            Error::InvalidFields { .. } => "E4001002",
            Error::BidTypeNotAllowed { .. } => "E4001003",
            Error::PathNotFound => "E4041000",
            Error::ChannelNotFound { .. } => "E4041001",
            Error::CampaignNotFound { .. } => "E4041002",
            Error::ExistentialState(_) => "E5001000",
            Error::FailedDatabaseCall(_) => "E5001001",
            Error::InvalidConfig(_) => "E5001002",
            Error::IoError(_) => "E5001003",
        }
    }

    pub fn error_message(&self) -> &'static str {
        match self {
            Error::InvalidJson(_) => "The given json could not be parsed",
            Error::InvalidPath(_) => "The given path could not be parsed",
            Error::InvalidFields { .. } => "One or more fields are invalid",
            Error::BidTypeNotAllowed { .. } => {
                "Please specify one of the bid types that belongs to the selected channel"
            }
            Error::PathNotFound => "The requested path was not found",
            Error::ChannelNotFound { .. } => "The requested channel was not found",
            Error::CampaignNotFound { .. } => "The requested campaign was not found",
            Error::ExistentialState(_) => "The server detected an invalid state",
            Error::FailedDatabaseCall(_) => {
                "An error occurred when communicating with the database"
            }
            Error::InvalidConfig(_) => "The server configuration could not be loaded",
            Error::IoError(_) => "An error occurred during an I/O operation",
        }
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidJson(_) => StatusCode::BAD_REQUEST,
            Error::InvalidPath(_) => StatusCode::BAD_REQUEST,
            Error::InvalidFields { .. } => StatusCode::BAD_REQUEST,
            Error::BidTypeNotAllowed { .. } => StatusCode::BAD_REQUEST,
            Error::PathNotFound => StatusCode::NOT_FOUND,
            Error::ChannelNotFound { .. } => StatusCode::NOT_FOUND,
            Error::CampaignNotFound { .. } => StatusCode::NOT_FOUND,
            Error::ExistentialState(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::FailedDatabaseCall(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::InvalidConfig(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::IoError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        #[derive(Serialize)]
        struct Dummy<'a> {
            error_code: &'static str,
            error_message: &'static str,
            error_meta: &'a Error,
        }

        if self.status_code().is_server_error() {
            tracing::error!(error_code = self.error_code(), "{}", self);
        }

        HttpResponse::build(self.status_code()).json(&Dummy {
            error_code: self.error_code(),
            error_message: self.error_message(),
            error_meta: self,
        })
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        Debug::fmt(self, f)
    }
}

impl From<DatabaseError> for Error {
    fn from(error: DatabaseError) -> Error {
        Error::FailedDatabaseCall(error)
    }
}

impl From<ConfigError> for Error {
    fn from(error: ConfigError) -> Error {
        Error::InvalidConfig(error)
    }
}

impl From<IoError> for Error {
    fn from(error: IoError) -> Error {
        Error::IoError(error)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::InvalidJson(err) => Some(err),
            Error::InvalidPath(err) => Some(err),
            Error::FailedDatabaseCall(err) => Some(err),
            Error::InvalidConfig(err) => Some(err),
            Error::IoError(err) => Some(err),
            _ => None,
        }
    }
}

fn display<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    T: Display,
    S: Serializer,
{
    serializer.collect_str(value)
}

#[cfg(test)]
mod tests {
    use actix_web::body::to_bytes;

    use super::*;

    #[actix_web::test]
    async fn renders_code_message_and_meta() {
        let error = Error::BidTypeNotAllowed {
            channel_id: ChannelId::new(3),
            bid_type: "cpa".into(),
            allowed_bid_types: vec![BidType::Cpm, BidType::Cpc],
        };

        let response = error.error_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = to_bytes(response.into_body()).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error_code"], "E4001003");
        assert_eq!(body["error_meta"]["channel_id"], 3);
        assert_eq!(body["error_meta"]["bid_type"], "cpa");
        assert_eq!(
            body["error_meta"]["allowed_bid_types"],
            serde_json::json!(["CPM", "CPC"])
        );
    }

    #[test]
    fn not_found_errors_map_to_404() {
        let error = Error::CampaignNotFound {
            campaign_id: CampaignId::new(30),
        };
        assert_eq!(error.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(Error::PathNotFound.status_code(), StatusCode::NOT_FOUND);
    }
}
