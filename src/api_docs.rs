use actix_web::HttpResponse;
use serde_json::json;

const OPENAPI_DOCUMENT: &str = include_str!("../docs/openapi.json");

const SWAGGER_PAGE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Passthrough Gateway API</title>
  <link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css">
</head>
<body>
  <div id="swagger-ui"></div>
  <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
  <script>
    window.onload = () => {
      SwaggerUIBundle({ url: "/docs/openapi.json", dom_id: "#swagger-ui" });
    };
  </script>
</body>
</html>
"##;

pub async fn swagger_page() -> HttpResponse {
  HttpResponse::Ok()
    .content_type("text/html; charset=utf-8")
    .body(SWAGGER_PAGE)
}

pub async fn openapi_document() -> HttpResponse {
  HttpResponse::Ok()
    .content_type("application/json")
    .body(OPENAPI_DOCUMENT)
}

pub async fn not_found() -> HttpResponse {
  HttpResponse::NotFound().finish()
}

pub async fn specification_list() -> HttpResponse {
  HttpResponse::Ok().json(json!({
    "SERVER_URL": "Base URL of the upstream REST server, https is assumed when no scheme is given",
    "AUTH_TYPE": "Credential scheme: NONE, API_KEY, BASIC_AUTH, BEARER_TOKEN, HMAC, OAUTH2 or MERAKI",
    "API_KEY": "Key sent for the API_KEY scheme",
    "API_KEY_HEADER_NAME": "Header carrying the api key, Authorization Bearer is used when unset",
    "USERNAME": "Basic auth user name",
    "PASSWORD": "Basic auth password",
    "BEARER_TOKEN": "Token for the BEARER_TOKEN scheme",
    "IKEY": "Integration key for the HMAC scheme",
    "SKEY": "Secret key for the HMAC scheme",
    "ACCESS_TOKEN": "OAuth2 access token, sent as a bearer credential",
    "REFRESH_TOKEN": "OAuth2 refresh token, carried but never exchanged",
    "EXPIRES_AT": "OAuth2 access token expiry, informational only"
  }))
}
