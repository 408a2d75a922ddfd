use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use nuxt_jsonp::JsonpError;
use serde_json::json;
use tracing::info;

pub struct HttpError {
    inner: anyhow::Error,
}

impl From<anyhow::Error> for HttpError {
    fn from(inner: anyhow::Error) -> Self {
        HttpError { inner }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let kind = self.inner.downcast_ref::<JsonpError>().map(JsonpError::kind);
        let status = if kind.is_some() {
            StatusCode::UNPROCESSABLE_ENTITY
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        let json = json!({
            "error": format!("{:#}", self.inner),
            "kind": kind.map(|k| k.as_str()),
            "stack": self.inner.backtrace().to_string(),
        });
        info!("Returning http error: {json}");
        let response = serde_json::to_string_pretty(&json)
            .unwrap_or_else(|_| format!("Something is wrong: {:#}", self.inner));
        (status, response).into_response()
    }
}
