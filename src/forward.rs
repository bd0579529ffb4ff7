use crate::auth_scheme::{AuthScheme, SigningInput};
use crate::gateway_config::GatewayConfig;
use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse, ResponseError};
use bytes::Bytes;
use futures_core::Stream;
use futures_util::StreamExt;
use log::{debug, error};
use reqwest::header::{
  HeaderMap, HeaderName, HeaderValue, ACCEPT_ENCODING, CONNECTION, CONTENT_LENGTH, CONTENT_TYPE,
  HOST, TRANSFER_ENCODING,
};
use reqwest::{Client, Method};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

// Recomputed by the outbound client from the new target and body.
const SKIPPED_HEADERS: [HeaderName; 4] = [HOST, CONTENT_LENGTH, TRANSFER_ENCODING, CONNECTION];

pub struct AppState {
  pub server_url: String,
  pub server_host: String,
  pub scheme: AuthScheme,
  pub client: Client,
}

impl AppState {
  pub fn new(config: &GatewayConfig, client: Client) -> AppState {
    AppState {
      server_url: config.server_url(),
      server_host: config.server_host(),
      scheme: config.auth_scheme(),
      client,
    }
  }
}

#[derive(Debug, Error)]
pub enum ForwardError {
  #[error(transparent)]
  Transport(#[from] reqwest::Error),
  #[error(transparent)]
  InvalidBody(#[from] serde_json::Error),
  #[error("empty response")]
  EmptyResponse,
}

pub struct RequestContext {
  pub method: Method,
  pub uri: String,
  pub path: String,
  pub query: String,
  pub params: Vec<(String, String)>,
  pub headers: HeaderMap,
  pub body: Option<Value>,
}

impl RequestContext {
  pub fn read(request: &HttpRequest, payload: &Bytes) -> RequestContext {
    let uri = request
      .uri()
      .path_and_query()
      .map(|target| target.as_str().to_string())
      .unwrap_or_else(|| request.uri().path().to_string());
    let params = url::form_urlencoded::parse(request.query_string().as_bytes())
      .into_owned()
      .collect();
    let mut headers = HeaderMap::new();

    for (name, value) in request.headers() {
      headers.append(name.clone(), value.clone());
    }

    // The first JSON value wins and trailing bytes are ignored. A body of
    // literal null is indistinguishable from no body downstream.
    let body = serde_json::Deserializer::from_slice(payload)
      .into_iter::<Value>()
      .next()
      .and_then(Result::ok)
      .filter(|value| !value.is_null());

    RequestContext {
      method: request.method().clone(),
      uri,
      path: request.uri().path().to_string(),
      query: request.query_string().to_string(),
      params,
      headers,
      body,
    }
  }
}

pub struct OutboundCall {
  pub method: Method,
  pub url: String,
  pub headers: HeaderMap,
  pub body: Option<Value>,
}

pub struct NormalizedResult {
  pub payload: Value,
  pub status: StatusCode,
}

pub fn build_outbound_call(context: &RequestContext, state: &AppState) -> OutboundCall {
  let mut url = format!("{}{}", state.server_url, context.uri);

  if !context.uri.contains('?') && !context.query.is_empty() {
    url.push('?');
    url.push_str(&context.query);
  }

  let mut headers = HeaderMap::new();

  for (name, value) in context.headers.iter() {
    if SKIPPED_HEADERS.contains(name) || value.as_bytes().is_empty() {
      continue;
    }

    headers.append(name.clone(), value.clone());
  }

  if !headers.contains_key(CONTENT_TYPE) {
    headers.insert(
      CONTENT_TYPE,
      HeaderValue::from_static("application/json; charset=utf-8"),
    );
  }

  headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("identity"));

  state.scheme.apply(
    &mut headers,
    &SigningInput {
      method: context.method.as_str(),
      host: &state.server_host,
      uri: &context.path,
      params: &context.params,
    },
  );

  OutboundCall {
    method: context.method.clone(),
    url,
    headers,
    body: context.body.clone(),
  }
}

pub async fn execute(client: &Client, call: OutboundCall) -> Result<NormalizedResult, ForwardError> {
  let OutboundCall {
    method,
    url,
    headers,
    body,
  } = call;
  let mut builder = client.request(method, url.as_str()).headers(headers);

  if let Some(body) = &body {
    builder = builder.body(serde_json::to_vec(body)?);
  }

  let response = builder.send().await?;
  let status = response.status();
  let text = response.text().await?;

  if text.is_empty() {
    return Err(ForwardError::EmptyResponse);
  }

  match serde_json::from_str::<Value>(&text) {
    Ok(payload) => Ok(NormalizedResult { payload, status }),
    Err(_) => Ok(NormalizedResult {
      payload: Value::String(text),
      status: StatusCode::OK,
    }),
  }
}

pub async fn passthrough(
  request: HttpRequest,
  mut payload: web::Payload,
  state: web::Data<AppState>,
) -> HttpResponse {
  if request.method() == Method::OPTIONS {
    return HttpResponse::Ok().finish();
  }

  // Read off the raw stream; the Bytes extractor caps bodies at 256 KiB.
  let (size, _) = payload.size_hint();
  let mut buffer: Vec<u8> = Vec::with_capacity(size);

  while let Some(chunk) = payload.next().await {
    match chunk {
      Ok(bytes) => buffer.append(&mut bytes.to_vec()),
      Err(err) => {
        error!("reading the {} {} body failed: {}", request.method(), request.uri(), err);
        return respond_with_error(err.status_code(), &err.to_string());
      }
    }
  }

  let body = Bytes::from(buffer);
  let context = RequestContext::read(&request, &body);
  let call = build_outbound_call(&context, &state);

  debug!("forwarding {} {}", call.method, call.url);

  match execute(&state.client, call).await {
    Ok(result) => respond_with_json(result.status, &result.payload),
    Err(err) => {
      error!("forwarding {} {} failed: {}", context.method, context.uri, err);
      respond_with_error(StatusCode::INTERNAL_SERVER_ERROR, &err.to_string())
    }
  }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
  error: &'a str,
}

fn respond_with_json(status: StatusCode, payload: &impl Serialize) -> HttpResponse {
  HttpResponse::build(status).json(payload)
}

fn respond_with_error(status: StatusCode, message: &str) -> HttpResponse {
  respond_with_json(status, &ErrorBody { error: message })
}
