use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use hmac::{Hmac, Mac};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use sha2::Sha512;
use std::collections::BTreeMap;

type HmacSha512 = Hmac<Sha512>;

// Everything outside [A-Za-z0-9-._~] is escaped with uppercase hex, so a
// space becomes %20, never +.
const QUERY_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
  .remove(b'-')
  .remove(b'_')
  .remove(b'.')
  .remove(b'~');

fn encode_component(value: &str) -> String {
  utf8_percent_encode(value, QUERY_ENCODE_SET).to_string()
}

pub fn canon_params(params: &[(String, String)]) -> String {
  let mut grouped: BTreeMap<&str, Vec<&str>> = BTreeMap::new();

  for (key, value) in params {
    grouped.entry(key.as_str()).or_default().push(value.as_str());
  }

  let mut pairs = Vec::with_capacity(params.len());

  for (key, mut values) in grouped {
    values.sort_unstable();

    for value in values {
      pairs.push(format!("{}={}", encode_component(key), encode_component(value)));
    }
  }

  pairs.join("&")
}

// A verifier rebuilds the same five lines, so order and casing must match
// byte for byte. The uri line is taken as given.
pub fn canonicalize(
  method: &str,
  host: &str,
  uri: &str,
  params: &[(String, String)],
  date: &str,
) -> String {
  [
    date.to_owned(),
    method.to_uppercase(),
    host.to_lowercase(),
    uri.to_owned(),
    canon_params(params),
  ]
  .join("\n")
}

pub fn sign(
  ikey: &str,
  skey: &str,
  method: &str,
  host: &str,
  uri: &str,
  date: &str,
  params: &[(String, String)],
) -> String {
  let canon = canonicalize(method, host, uri, params, date);
  let mut mac =
    HmacSha512::new_from_slice(skey.as_bytes()).expect("HMAC can accept any key length");
  mac.update(canon.as_bytes());

  let digest = hex::encode(mac.finalize().into_bytes());

  format!("Basic {}", BASE64.encode(format!("{}:{}", ikey, digest)))
}
