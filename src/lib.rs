use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::*;

use crate::base_url::BaseUrl;
use crate::payload::Payloads;

pub mod base_url;
mod error;
mod http_util;
pub mod payload;
mod utils;

pub fn start_server(
    site: &str,
    marker: &str,
    async_threads: usize,
    port: u16,
) -> anyhow::Result<()> {
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(async_threads)
        .enable_all()
        .build()?;
    info!("Created tokio runtime with {async_threads} async-workers");

    let payloads = Arc::new(Payloads::new(BaseUrl::new(site), marker));
    rt.block_on(_start_server(payloads, port))
}

async fn _start_server(payloads: Arc<Payloads>, port: u16) -> anyhow::Result<()> {
    let address = SocketAddr::from(([0, 0, 0, 0], port));
    info!(
        "Listening for http requests at '{address}', payloads from {}",
        payloads.base_url().site()
    );
    let listener = TcpListener::bind(address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;
    axum::serve(listener, router(payloads))
        .await
        .context("Starting cinetree server failed")
}

pub fn router(payloads: Arc<Payloads>) -> Router {
    Router::new()
        .route("/payload/*path", get(payload::payload))
        .route("/decode", post(payload::decode))
        .route("/base_url", get(payload::base_url))
        .layer(TraceLayer::new_for_http())
        .with_state(payloads)
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use serde_json::{json, Value};
    use tokio::net::TcpListener;

    use super::router;
    use crate::base_url::BaseUrl;
    use crate::http_util::http_client;
    use crate::payload::Payloads;

    async fn serve() -> String {
        let payloads = Arc::new(Payloads::new(BaseUrl::new("http://127.0.0.1:9/"), "x0"));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, router(payloads)).await.ok() });
        format!("http://{address}")
    }

    async fn post(url: &str, body: &str) -> anyhow::Result<(u16, Value)> {
        let response = http_client().post(url).body(body.to_owned()).send().await?;
        let status = response.status().as_u16();
        Ok((status, serde_json::from_str(&response.text().await?)?))
    }

    #[tokio::test]
    async fn test_decode_route() -> anyhow::Result<()> {
        let server = serve().await;
        let (status, body) = post(
            &format!("{server}/decode"),
            r#"x0(function(a,b){return {t:a,n:b}})("Hello, \"world\"",42)"#,
        )
        .await?;
        assert_eq!(status, 200);
        assert_eq!(body, json!({"t": "Hello, \"world\"", "n": 42}));

        let (status, body) =
            post(&format!("{server}/decode?simple=true"), "x0 = {a:[1,2]}").await?;
        assert_eq!(status, 200);
        assert_eq!(body, json!({"a": [1, 2]}));
        Ok(())
    }

    #[tokio::test]
    async fn test_decode_route_errors() -> anyhow::Result<()> {
        let server = serve().await;
        let (status, body) = post(&format!("{server}/decode"), "").await?;
        assert_eq!(status, 422);
        assert_eq!(body["kind"], "structural");

        let (status, body) = post(
            &format!("{server}/decode"),
            "x0(function(a){return {t:a}}(1,,2))",
        )
        .await?;
        assert_eq!(status, 422);
        assert_eq!(body["kind"], "arguments");

        let (status, body) = post(&format!("{server}/decode"), "{a:b}").await?;
        assert_eq!(status, 422);
        assert_eq!(body["kind"], "final");
        Ok(())
    }

    #[tokio::test]
    async fn test_unreachable_site() -> anyhow::Result<()> {
        let server = serve().await;
        let response = http_client()
            .get(format!("{server}/base_url"))
            .send()
            .await?;
        assert_eq!(response.status().as_u16(), 500);
        let body: Value = serde_json::from_str(&response.text().await?)?;
        assert!(body["kind"].is_null());
        Ok(())
    }
}
