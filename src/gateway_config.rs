use crate::auth_scheme::{AuthScheme, MERAKI_API_KEY_HEADER};
use clap::Parser;
use log::LevelFilter;
use url::Url;

const DEFAULT_PORT: u16 = 8010;
const DEFAULT_WORKER_COUNT: usize = 4;
const DEFAULT_BIND: &str = "0.0.0.0";

#[derive(Parser, Debug, Clone)]
#[command(
  name = "passthrough-gateway",
  version,
  about = "Forwards REST calls to a configured upstream with credentials attached"
)]
pub struct GatewayConfig {
  #[arg(long, env = "SERVER_URL", default_value = "")]
  pub server_url: String,

  #[arg(long, env = "AUTH_TYPE", default_value = "")]
  pub auth_type: String,

  #[arg(long, env = "API_KEY", hide_env_values = true)]
  pub api_key: Option<String>,

  #[arg(long, env = "API_KEY_HEADER_NAME")]
  pub api_key_header_name: Option<String>,

  #[arg(long, env = "USERNAME")]
  pub username: Option<String>,

  #[arg(long, env = "PASSWORD", hide_env_values = true)]
  pub password: Option<String>,

  #[arg(long, env = "BEARER_TOKEN", hide_env_values = true)]
  pub bearer_token: Option<String>,

  #[arg(long, env = "IKEY", hide_env_values = true)]
  pub ikey: Option<String>,

  #[arg(long, env = "SKEY", hide_env_values = true)]
  pub skey: Option<String>,

  #[arg(long, env = "ACCESS_TOKEN", hide_env_values = true)]
  pub access_token: Option<String>,

  #[arg(long, env = "REFRESH_TOKEN", hide_env_values = true)]
  pub refresh_token: Option<String>,

  #[arg(long, env = "EXPIRES_AT")]
  pub expires_at: Option<String>,

  #[arg(long, env = "HTTP_BIND", default_value = DEFAULT_BIND)]
  pub bind: String,

  #[arg(long, env = "HTTP_PORT", default_value_t = DEFAULT_PORT)]
  pub port: u16,

  #[arg(long, env = "HTTP_WORKER_COUNT", default_value_t = DEFAULT_WORKER_COUNT)]
  pub workers: usize,

  #[arg(long, env = "LOG_LEVEL", default_value = "info")]
  pub log_level: LevelFilter,
}

impl GatewayConfig {
  pub fn auth_type(&self) -> String {
    self
      .auth_type
      .to_uppercase()
      .replace(' ', "_")
      .replace("%20", "_")
      .replace('-', "_")
  }

  pub fn server_url(&self) -> String {
    let trimmed = self.server_url.strip_suffix('/').unwrap_or(&self.server_url);

    match Url::parse(trimmed) {
      Err(url::ParseError::RelativeUrlWithoutBase) => format!("https://{}", trimmed),
      _ => trimmed.to_string(),
    }
  }

  pub fn server_host(&self) -> String {
    match Url::parse(&self.server_url()) {
      Ok(parsed) => match (parsed.host_str(), parsed.port()) {
        (Some(host), Some(port)) => format!("{}:{}", host, port),
        (Some(host), None) => host.to_string(),
        (None, _) => String::new(),
      },
      Err(_) => String::new(),
    }
  }

  pub fn auth_scheme(&self) -> AuthScheme {
    match self.auth_type().as_str() {
      "API_KEY" => AuthScheme::ApiKey {
        key: self.api_key.clone().unwrap_or_default(),
        header_name: self.api_key_header_name.clone(),
      },
      "MERAKI" => AuthScheme::ApiKey {
        key: self.api_key.clone().unwrap_or_default(),
        header_name: Some(MERAKI_API_KEY_HEADER.to_string()),
      },
      "BASIC_AUTH" => AuthScheme::BasicAuth {
        username: self.username.clone().unwrap_or_default(),
        password: self.password.clone().unwrap_or_default(),
      },
      "BEARER_TOKEN" => AuthScheme::BearerToken {
        token: self.bearer_token.clone().unwrap_or_default(),
      },
      "HMAC" => AuthScheme::Hmac {
        ikey: self.ikey.clone().unwrap_or_default(),
        skey: self.skey.clone().unwrap_or_default(),
      },
      "OAUTH2" => AuthScheme::OAuth2 {
        access_token: self.access_token.clone().unwrap_or_default(),
        refresh_token: self.refresh_token.clone().unwrap_or_default(),
        expires_at: self.expires_at.clone().unwrap_or_default(),
      },
      _ => AuthScheme::None,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn config(args: &[&str]) -> GatewayConfig {
    GatewayConfig::try_parse_from([&["passthrough-gateway"], args].concat()).unwrap()
  }

  #[test]
  fn test_auth_type_is_normalized() {
    assert_eq!(config(&["--auth-type", "api key"]).auth_type(), "API_KEY");
    assert_eq!(config(&["--auth-type", "Basic-Auth"]).auth_type(), "BASIC_AUTH");
    assert_eq!(
      config(&["--auth-type", "bearer%20token"]).auth_type(),
      "BEARER_TOKEN"
    );
    assert_eq!(config(&["--auth-type", "hmac"]).auth_type(), "HMAC");
  }

  #[test]
  fn test_server_url_defaults_to_https() {
    let parsed = config(&["--server-url", "command.example.com"]);

    assert_eq!(parsed.server_url(), "https://command.example.com");
  }

  #[test]
  fn test_server_url_keeps_explicit_scheme() {
    let parsed = config(&["--server-url", "http://localhost:9999"]);

    assert_eq!(parsed.server_url(), "http://localhost:9999");
  }

  #[test]
  fn test_server_url_trims_trailing_slash() {
    let parsed = config(&["--server-url", "https://api.example.com/"]);

    assert_eq!(parsed.server_url(), "https://api.example.com");
  }

  #[test]
  fn test_server_host_includes_port() {
    assert_eq!(
      config(&["--server-url", "http://localhost:9999"]).server_host(),
      "localhost:9999"
    );
    assert_eq!(
      config(&["--server-url", "https://api.example.com/v1"]).server_host(),
      "api.example.com"
    );
  }

  #[test]
  fn test_server_host_empty_when_unset() {
    assert_eq!(config(&[]).server_host(), "");
  }

  #[test]
  fn test_scheme_resolution_api_key() {
    let parsed = config(&[
      "--auth-type",
      "api key",
      "--api-key",
      "12345678",
      "--api-key-header-name",
      "x-test-header",
    ]);

    assert_eq!(
      parsed.auth_scheme(),
      AuthScheme::ApiKey {
        key: "12345678".to_string(),
        header_name: Some("x-test-header".to_string()),
      }
    );
  }

  #[test]
  fn test_scheme_resolution_meraki_alias() {
    let parsed = config(&["--auth-type", "meraki", "--api-key", "k1"]);

    assert_eq!(
      parsed.auth_scheme(),
      AuthScheme::ApiKey {
        key: "k1".to_string(),
        header_name: Some(MERAKI_API_KEY_HEADER.to_string()),
      }
    );
  }

  #[test]
  fn test_scheme_resolution_basic_auth() {
    let parsed = config(&[
      "--auth-type",
      "basic auth",
      "--username",
      "foo",
      "--password",
      "bar",
    ]);

    assert_eq!(
      parsed.auth_scheme(),
      AuthScheme::BasicAuth {
        username: "foo".to_string(),
        password: "bar".to_string(),
      }
    );
  }

  #[test]
  fn test_scheme_resolution_unrecognized_tag_forwards_unmodified() {
    assert_eq!(config(&["--auth-type", "kerberos"]).auth_scheme(), AuthScheme::None);
    assert_eq!(config(&["--auth-type", "NONE"]).auth_scheme(), AuthScheme::None);
  }

  #[test]
  fn test_missing_credentials_resolve_to_empty_strings() {
    let parsed = config(&["--auth-type", "hmac"]);

    assert_eq!(
      parsed.auth_scheme(),
      AuthScheme::Hmac {
        ikey: String::new(),
        skey: String::new(),
      }
    );
  }

  #[test]
  fn test_listen_defaults() {
    let parsed = config(&[]);

    assert_eq!(parsed.port, 8010);
    assert_eq!(parsed.bind, "0.0.0.0");
    assert_eq!(parsed.workers, 4);
  }

  #[test]
  fn test_log_level_flag_parses() {
    assert_eq!(config(&["--log-level", "warn"]).log_level, LevelFilter::Warn);
    assert_eq!(config(&["--log-level", "DEBUG"]).log_level, LevelFilter::Debug);
  }
}
