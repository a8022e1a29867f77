use actix_web::test::TestRequest;
use serde_json::Value;

/// Builds the full application on top of a fresh in-memory database.
macro_rules! init_app {
    () => {
        actix_web::test::init_service(bids_server::app(actix_web::web::Data::new(
            Box::new(bids_server::database::MemoryDatabase::new())
                as Box<dyn bids_server::database::Database>,
        )))
        .await
    };
}

pub fn post(uri: &str, body: Value) -> TestRequest {
    TestRequest::post().uri(uri).set_json(body)
}

pub fn put(uri: &str, body: Value) -> TestRequest {
    TestRequest::put().uri(uri).set_json(body)
}

pub fn patch(uri: &str, body: Value) -> TestRequest {
    TestRequest::patch().uri(uri).set_json(body)
}
