use actix_web::body::MessageBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::middleware::{NormalizePath, TrailingSlash};
use actix_web::web::{self, Data};
use actix_web::{App, HttpServer};
use mongodb::Client;
use tracing::info;
use tracing_actix_web::TracingLogger;

pub mod campaign;
pub mod channel;
pub mod config;
pub mod database;
pub mod error;
pub mod routes;
pub mod typedid;
pub mod validation;

use crate::config::{AppConfig, Backend};
use crate::database::{Database, MemoryDatabase, MongoDatabase};
use crate::error::Error;

pub async fn connect(config: &AppConfig) -> Result<Box<dyn Database>, Error> {
    match config.database.backend {
        Backend::Mongo => {
            info!("connecting to db: {}", config.database.uri);
            let db = Client::with_uri_str(&config.database.uri)
                .await?
                .database(&config.database.name);
            let db = MongoDatabase::initialize(db).await?;
            Ok(Box::new(db))
        }
        Backend::Memory => {
            info!("using in-memory db");
            Ok(Box::new(MemoryDatabase::new()))
        }
    }
}

/// The full application: route table, trailing-slash normalization, request
/// tracing and the JSON 404 fallback.
pub fn app(
    db: Data<Box<dyn Database>>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Response = ServiceResponse<impl MessageBody>,
        Config = (),
        InitError = (),
        Error = actix_web::Error,
    >,
> {
    App::new()
        .app_data(db)
        .wrap(NormalizePath::new(TrailingSlash::Always))
        .wrap(TracingLogger::default())
        .configure(routes::configure)
        .default_service(web::to(routes::path_not_found))
}

pub async fn run(config: AppConfig) -> Result<(), Error> {
    let db = Data::new(connect(&config).await?);

    let address = (config.server.host.clone(), config.server.port);
    info!("listening on {}:{}", address.0, address.1);

    HttpServer::new(move || app(db.clone()))
        .bind(address)?
        .run()
        .await?;

    Ok(())
}
