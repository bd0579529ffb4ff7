use crate::signer;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::Utc;
use log::warn;
use reqwest::header::{
  HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE, DATE,
};
use std::str::FromStr;

pub const MERAKI_API_KEY_HEADER: &str = "X-Cisco-Meraki-API-Key";
pub const RFC1123Z_FORMAT: &str = "%a, %d %b %Y %H:%M:%S %z";

pub struct SigningInput<'a> {
  pub method: &'a str,
  pub host: &'a str,
  pub uri: &'a str,
  pub params: &'a [(String, String)],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthScheme {
  None,
  ApiKey {
    key: String,
    header_name: Option<String>,
  },
  BasicAuth {
    username: String,
    password: String,
  },
  BearerToken {
    token: String,
  },
  Hmac {
    ikey: String,
    skey: String,
  },
  OAuth2 {
    access_token: String,
    refresh_token: String,
    expires_at: String,
  },
}

impl AuthScheme {
  pub fn label(&self) -> &'static str {
    match self {
      AuthScheme::None => "unauthenticated passthrough",
      AuthScheme::ApiKey { .. } => "api key",
      AuthScheme::BasicAuth { .. } => "basic auth",
      AuthScheme::BearerToken { .. } => "bearer token",
      AuthScheme::Hmac { .. } => "hmac signature",
      AuthScheme::OAuth2 { .. } => "oauth2",
    }
  }

  pub fn apply(&self, headers: &mut HeaderMap, request: &SigningInput<'_>) {
    match self {
      AuthScheme::None => {}
      AuthScheme::ApiKey { key, header_name } => match header_name {
        Some(name) if !name.is_empty() => insert_named(headers, name, key),
        _ => insert_bearer(headers, key),
      },
      AuthScheme::BasicAuth { username, password } => {
        let token = BASE64.encode(format!("{}:{}", username, password));
        insert_value(headers, AUTHORIZATION, &format!("Basic {}", token));
      }
      AuthScheme::BearerToken { token } => insert_bearer(headers, token),
      AuthScheme::Hmac { ikey, skey } => {
        let date = Utc::now().format(RFC1123Z_FORMAT).to_string();
        let authorization = signer::sign(
          ikey,
          skey,
          request.method,
          request.host,
          request.uri,
          &date,
          request.params,
        );

        insert_value(headers, DATE, &date);
        insert_value(headers, AUTHORIZATION, &authorization);
      }
      AuthScheme::OAuth2 { access_token, .. } => {
        insert_bearer(headers, access_token);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
      }
    }
  }
}

fn insert_named(headers: &mut HeaderMap, name: &str, value: &str) {
  match (HeaderName::from_str(name), HeaderValue::from_str(value)) {
    (Ok(name), Ok(value)) => {
      headers.insert(name, value);
    }
    _ => warn!("credential header '{}' skipped, not a valid header", name),
  }
}

fn insert_value(headers: &mut HeaderMap, name: HeaderName, value: &str) {
  match HeaderValue::from_str(value) {
    Ok(value) => {
      headers.insert(name, value);
    }
    Err(_) => warn!("credential header '{}' skipped, not a valid value", name),
  }
}

fn insert_bearer(headers: &mut HeaderMap, token: &str) {
  insert_value(headers, AUTHORIZATION, &format!("Bearer {}", token));
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::DateTime;

  fn request<'a>() -> SigningInput<'a> {
    SigningInput {
      method: "GET",
      host: "api.example.com",
      uri: "/v1/items",
      params: &[],
    }
  }

  fn applied(scheme: AuthScheme) -> HeaderMap {
    let mut headers = HeaderMap::new();
    scheme.apply(&mut headers, &request());
    headers
  }

  #[test]
  fn test_none_adds_nothing() {
    assert!(applied(AuthScheme::None).is_empty());
  }

  #[test]
  fn test_api_key_uses_configured_header() {
    let headers = applied(AuthScheme::ApiKey {
      key: "12345678".to_string(),
      header_name: Some("x-test-header".to_string()),
    });

    assert_eq!(headers.get("x-test-header").unwrap(), "12345678");
    assert!(!headers.contains_key(AUTHORIZATION));
  }

  #[test]
  fn test_api_key_falls_back_to_bearer() {
    let headers = applied(AuthScheme::ApiKey {
      key: "12345678".to_string(),
      header_name: None,
    });

    assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer 12345678");
  }

  #[test]
  fn test_api_key_empty_header_name_falls_back_to_bearer() {
    let headers = applied(AuthScheme::ApiKey {
      key: "12345678".to_string(),
      header_name: Some(String::new()),
    });

    assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer 12345678");
  }

  #[test]
  fn test_api_key_invalid_header_name_is_skipped() {
    let headers = applied(AuthScheme::ApiKey {
      key: "12345678".to_string(),
      header_name: Some("not a header".to_string()),
    });

    assert!(headers.is_empty());
  }

  #[test]
  fn test_basic_auth_encodes_credentials() {
    let headers = applied(AuthScheme::BasicAuth {
      username: "foo".to_string(),
      password: "bar".to_string(),
    });

    assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Basic Zm9vOmJhcg==");
  }

  #[test]
  fn test_bearer_token() {
    let headers = applied(AuthScheme::BearerToken {
      token: "token-1".to_string(),
    });

    assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer token-1");
  }

  #[test]
  fn test_hmac_sets_date_and_signature() {
    let headers = applied(AuthScheme::Hmac {
      ikey: "DIWJ8X6AEYOR5OMC6TQ1".to_string(),
      skey: "Zh5eGmUq9zpfQnyUIu5OL9iWoMMv5ZNmk3zLJ4Ep".to_string(),
    });

    let date = headers.get(DATE).unwrap().to_str().unwrap();
    assert!(DateTime::parse_from_str(date, RFC1123Z_FORMAT).is_ok());

    let authorization = headers.get(AUTHORIZATION).unwrap().to_str().unwrap();
    assert!(authorization.starts_with("Basic "));
  }

  #[test]
  fn test_oauth2_forces_json_headers() {
    let headers = applied(AuthScheme::OAuth2 {
      access_token: "at-1".to_string(),
      refresh_token: "rt-1".to_string(),
      expires_at: "2030-01-01".to_string(),
    });

    assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer at-1");
    assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/json");
    assert_eq!(headers.get(ACCEPT).unwrap(), "application/json");
  }
}
