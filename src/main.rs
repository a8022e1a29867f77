use config::ConfigError;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;

use bids_server::config::AppConfig;
use bids_server::error::Error;

#[actix_web::main]
async fn main() -> Result<(), Error> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    let level = config.log.level.parse::<Level>().map_err(|_| {
        ConfigError::Message(format!("unknown log level: {}", config.log.level))
    })?;

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_span_events(FmtSpan::NEW)
        .compact()
        .init();

    bids_server::run(config).await
}
