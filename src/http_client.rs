use reqwest::redirect::Policy;
use reqwest::Client;
use std::time::Duration;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

pub fn build(timeout: Duration) -> Result<Client, reqwest::Error> {
  reqwest::ClientBuilder::new()
    .timeout(timeout)
    .redirect(Policy::limited(5))
    .build()
}
