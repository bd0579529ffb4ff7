pub mod api_docs;
pub mod auth_scheme;
pub mod forward;
pub mod gateway_config;
pub mod http_client;
pub mod metrics;
pub mod signer;
pub mod std_logger;

use actix_web::web;

pub fn service_routes(config: &mut web::ServiceConfig) {
  config
    .route("/metrics", web::get().to(metrics::export))
    .service(
      web::scope("/docs")
        .route("", web::get().to(api_docs::swagger_page))
        .route("/openapi.json", web::get().to(api_docs::openapi_document))
        .default_service(web::route().to(api_docs::not_found)),
    )
    .route(
      "/api/v2/specification/list",
      web::get().to(api_docs::specification_list),
    )
    .default_service(web::route().to(forward::passthrough));
}
