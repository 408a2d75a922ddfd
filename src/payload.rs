use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use axum::extract::{Path, Query, State};
use axum::Json;
use nuxt_jsonp::JsonpError;
use reqwest::StatusCode;
use serde_json::{json, Value};
use tracing::*;

use crate::base_url::BaseUrl;
use crate::error::HttpError;
use crate::http_util::fetch_document;

pub const NUXT_MARKER: &str = "__NUXT_";

/// Number of leading chars searched for the marker.
const MARKER_WINDOW: usize = 16;

/// Decodes `document` as a full jsonp payload when `marker` appears near its start,
/// otherwise as a simple object literal.
pub fn decode_document(document: &str, marker: &str) -> Result<Value, JsonpError> {
    let head = document
        .char_indices()
        .nth(MARKER_WINDOW)
        .map_or(document, |(idx, _)| &document[..idx]);
    if head.contains(marker) {
        nuxt_jsonp::parse(document)
    } else {
        nuxt_jsonp::parse_simple(document)
    }
}

pub fn decode_optional(document: Option<&str>, marker: &str) -> Result<Value, JsonpError> {
    match document {
        Some(document) => decode_document(document, marker),
        None => Err(JsonpError::Structure("document")),
    }
}

/// Retrieves and decodes payload documents.
pub struct Payloads {
    base_url: BaseUrl,
    marker: String,
}

impl Payloads {
    pub fn new(base_url: BaseUrl, marker: &str) -> Self {
        Payloads {
            base_url,
            marker: marker.to_owned(),
        }
    }

    pub fn base_url(&self) -> &BaseUrl {
        &self.base_url
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    #[instrument(skip(self))]
    pub async fn get_jsonp(&self, path: &str) -> anyhow::Result<Value> {
        let url = self.base_url.url_for(path, false).await?;
        let (url, document) = match fetch_document(&url).await {
            Ok(document) => (url, document),
            Err(e) if e.status() == Some(StatusCode::NOT_FOUND) => {
                // The timestamp in the base url is outdated once the site has been rebuilt.
                warn!("{url} was not found, refreshing the base url");
                let url = self.base_url.url_for(path, true).await?;
                let document = fetch_document(&url)
                    .await
                    .with_context(|| format!("Failed to fetch {url}"))?;
                (url, document)
            }
            Err(e) => return Err(e).with_context(|| format!("Failed to fetch {url}")),
        };

        let start = Instant::now();
        let value = decode_document(&document, &self.marker)
            .with_context(|| format!("Failed to decode {url}"))?;
        debug!(
            "Decoded {} bytes from {url} in {:?}",
            document.len(),
            start.elapsed()
        );
        Ok(value)
    }
}

pub async fn payload(
    State(payloads): State<Arc<Payloads>>,
    Path(path): Path<String>,
) -> Result<Json<Value>, HttpError> {
    info!("Loading payload: {path}");
    Ok(Json(payloads.get_jsonp(&path).await?))
}

pub async fn decode(
    State(payloads): State<Arc<Payloads>>,
    Query(query_param): Query<HashMap<String, bool>>,
    body: String,
) -> Result<Json<Value>, HttpError> {
    let &simple = query_param.get("simple").unwrap_or(&false);
    let document = Some(body.as_str()).filter(|b| !b.trim().is_empty());
    info!("Decoding {} bytes (simple: {simple})", body.len());
    let value = match document {
        Some(document) if simple => nuxt_jsonp::parse_simple(document),
        _ => decode_optional(document, payloads.marker()),
    };
    Ok(Json(value.context("Failed to decode the request body")?))
}

pub async fn base_url(
    State(payloads): State<Arc<Payloads>>,
    Query(query_param): Query<HashMap<String, bool>>,
) -> Result<Json<Value>, HttpError> {
    let &refresh = query_param.get("refresh").unwrap_or(&false);
    let url = payloads.base_url().get(refresh).await?;
    Ok(Json(json!({ "base_url": url })))
}
