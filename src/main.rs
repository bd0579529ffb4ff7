use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use clap::Parser;
use log::info;
use passthrough_gateway::forward::AppState;
use passthrough_gateway::gateway_config::GatewayConfig;
use passthrough_gateway::std_logger::StdLogger;
use passthrough_gateway::{http_client, metrics, service_routes};
use std::io::{ErrorKind, Result};

static LOGGER: StdLogger = StdLogger::new("passthrough-gateway");

#[actix_web::main]
async fn main() -> Result<()> {
  let config = GatewayConfig::parse();

  if log::set_logger(&LOGGER).is_ok() {
    log::set_max_level(config.log_level);
  }

  let client = http_client::build(http_client::DEFAULT_TIMEOUT)
    .map_err(|error| std::io::Error::new(ErrorKind::Other, error))?;
  let state = web::Data::new(AppState::new(&config, client));

  info!(
    "auth type '{}' resolved to the {} scheme",
    config.auth_type(),
    state.scheme.label()
  );
  info!(
    "Running passthrough-gateway on port {}, forwarding to '{}'",
    config.port, state.server_url
  );

  HttpServer::new(move || {
    App::new()
      .app_data(state.clone())
      .wrap(
        Cors::default()
          .allow_any_origin()
          .allow_any_method()
          .allow_any_header()
          .send_wildcard(),
      )
      .wrap(metrics::RequestMetrics)
      .configure(service_routes)
  })
  .workers(config.workers)
  .bind((config.bind, config.port))?
  .run()
  .await
}
