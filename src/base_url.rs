use std::time::SystemTime;

use anyhow::{anyhow, Context};
use scraper::Html;
use tokio::sync::RwLock;
use tracing::*;

use crate::http_util::{fetch_document, normalize_url, s};
use crate::utils::expiry_time;

const MANIFEST: &str = "manifest.js";

/// The directory payload documents are served from.
///
/// Its path contains a build timestamp that changes every so often, so it is read from
/// the site's home page and kept until it expires or is refreshed.
pub struct BaseUrl {
    site: String,
    cached: RwLock<Option<CachedBaseUrl>>,
}

struct CachedBaseUrl {
    url: String,
    expires_at: SystemTime,
}

impl BaseUrl {
    pub fn new(site: &str) -> Self {
        BaseUrl {
            site: site.to_owned(),
            cached: RwLock::new(None),
        }
    }

    pub fn site(&self) -> &str {
        &self.site
    }

    pub async fn url_for(&self, slug: &str, force_refresh: bool) -> anyhow::Result<String> {
        let base = self.get(force_refresh).await?;
        Ok(format!("{base}{}", slug.trim_start_matches('/')))
    }

    pub async fn get(&self, force_refresh: bool) -> anyhow::Result<String> {
        if !force_refresh {
            if let Some(url) = self.cached_url().await {
                return Ok(url);
            }
        }

        let mut wstate = self.cached.write().await;
        if !force_refresh {
            if let Some(cached) = wstate.as_ref().filter(|c| c.is_valid()) {
                return Ok(cached.url.clone());
            }
        }
        let url = self.discover().await?;
        debug!("New jsonp base url: {url}");
        *wstate = Some(CachedBaseUrl {
            url: url.clone(),
            expires_at: expiry_time(),
        });
        Ok(url)
    }

    async fn cached_url(&self) -> Option<String> {
        let rstate = self.cached.read().await;
        match rstate.as_ref() {
            Some(cached) if cached.is_valid() => Some(cached.url.clone()),
            Some(_) => {
                warn!("Base url of {} has expired", self.site);
                None
            }
            None => None,
        }
    }

    async fn discover(&self) -> anyhow::Result<String> {
        info!("Looking up the jsonp base url at {}", self.site);
        let html = fetch_document(&self.site)
            .await
            .with_context(|| format!("Failed to load {}", self.site))?;
        let href = find_manifest(&html)
            .ok_or_else(|| anyhow!("Couldn't find {MANIFEST} in {}", self.site))?;
        let prefix = href.strip_suffix(MANIFEST).unwrap_or(&href);
        normalize_url(prefix, &self.site)
    }
}

impl CachedBaseUrl {
    fn is_valid(&self) -> bool {
        self.expires_at > SystemTime::now()
    }
}

fn find_manifest(html: &str) -> Option<String> {
    let doc = Html::parse_document(html);
    let href = doc
        .select(&s(r#"link[as="script"][href$="manifest.js"]"#))
        .find_map(|link| link.value().attr("href"))
        .map(ToOwned::to_owned);
    href
}
