use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{dev, HttpResponse};
use futures_core::future::LocalBoxFuture;
use futures_util::future::{ok, Ready};
use log::error;
use once_cell::sync::Lazy;
use prometheus::{
  opts, register_histogram_vec, register_int_counter_vec, Encoder, HistogramVec, IntCounterVec,
  TextEncoder,
};

pub static TOTAL_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
  register_int_counter_vec!(
    opts!("http_requests_total", "Number of get requests."),
    &["path"]
  )
  .expect("Failed to register http_requests_total")
});

pub static RESPONSE_STATUS: Lazy<IntCounterVec> = Lazy::new(|| {
  register_int_counter_vec!(
    opts!("response_status", "Status of HTTP response"),
    &["status"]
  )
  .expect("Failed to register response_status")
});

pub static HTTP_RESPONSE_TIME: Lazy<HistogramVec> = Lazy::new(|| {
  register_histogram_vec!(
    "http_response_time_seconds",
    "Duration of HTTP requests",
    &["path"]
  )
  .expect("Failed to register http_response_time_seconds")
});

pub fn render() -> Result<String, prometheus::Error> {
  let mut buffer = Vec::new();
  TextEncoder::new().encode(&prometheus::gather(), &mut buffer)?;

  Ok(String::from_utf8_lossy(&buffer).into_owned())
}

pub async fn export() -> HttpResponse {
  match render() {
    Ok(body) => HttpResponse::Ok()
      .content_type("text/plain; version=0.0.4")
      .body(body),
    Err(err) => {
      error!("metrics rendering failed: {}", err);
      HttpResponse::InternalServerError().finish()
    }
  }
}

pub struct RequestMetrics;

impl<S, B> Transform<S, ServiceRequest> for RequestMetrics
where
  S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error>,
  S::Future: 'static,
  B: 'static,
{
  type Response = ServiceResponse<B>;
  type Error = actix_web::Error;
  type Transform = RequestMetricsService<S>;
  type InitError = ();
  type Future = Ready<Result<Self::Transform, Self::InitError>>;

  fn new_transform(&self, service: S) -> Self::Future {
    ok(RequestMetricsService { service })
  }
}

pub struct RequestMetricsService<S> {
  service: S,
}

impl<S, B> Service<ServiceRequest> for RequestMetricsService<S>
where
  S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error>,
  S::Future: 'static,
  B: 'static,
{
  type Response = ServiceResponse<B>;
  type Error = actix_web::Error;
  type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

  dev::forward_ready!(service);

  fn call(&self, request: ServiceRequest) -> Self::Future {
    let path = request.path().to_string();
    let timer = HTTP_RESPONSE_TIME.with_label_values(&[&path]).start_timer();
    let next = self.service.call(request);

    Box::pin(async move {
      let response = next.await?;

      RESPONSE_STATUS
        .with_label_values(&[response.status().as_str()])
        .inc();
      TOTAL_REQUESTS.with_label_values(&[&path]).inc();
      timer.observe_duration();

      Ok(response)
    })
  }
}
