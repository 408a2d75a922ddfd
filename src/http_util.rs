use std::time::Duration;

use anyhow::anyhow;
use once_cell::sync::Lazy;
use reqwest::Client;
use scraper::Selector;
use url::Url;

pub const USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:109.0) Gecko/20100101 Firefox/119.0";

static HTTP_CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .user_agent(USER_AGENT)
        .cookie_store(true)
        .use_rustls_tls()
        .connect_timeout(Duration::from_secs(60))
        .build()
        .expect("Failed to build http client")
});

pub fn http_client() -> &'static Client {
    &HTTP_CLIENT
}

pub fn s(selector: &str) -> Selector {
    Selector::parse(selector).unwrap()
}

/// Downloads `url` as text. Unsuccessful statuses are returned as errors, so callers can
/// inspect [`reqwest::Error::status`].
pub async fn fetch_document(url: &str) -> reqwest::Result<String> {
    http_client()
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await
}

pub fn normalize_url(url: &str, base: &str) -> anyhow::Result<String> {
    let base = Url::parse(base)?;
    let url = base
        .join(url)
        .map_err(|e| anyhow!("Couldn't resolve {url} against {base}: {e}"))?;
    Ok(url.into())
}
