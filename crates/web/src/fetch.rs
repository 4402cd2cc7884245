//! Relay client on top of the browser `fetch` API.

use async_trait::async_trait;
use chat::{RelayClient, parse_reply};
use proto::{RelayError, RelayRequest};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Headers, Request, RequestInit, Response};

/// POSTs `{message, context}` to the relay URL with `fetch`.
pub struct FetchRelayClient {
    url: String,
}

impl FetchRelayClient {
    /// Client for the relay at `url` (absolute or page-relative).
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    async fn post(&self, request: &RelayRequest) -> Result<(u16, String), JsValue> {
        let body = serde_json::to_string(request)
            .map_err(|e| JsValue::from_str(&format!("JSON error: {e}")))?;

        let headers = Headers::new()?;
        headers.set("Content-Type", "application/json")?;
        let init = RequestInit::new();
        init.set_method("POST");
        init.set_headers(&headers);
        init.set_body(&JsValue::from_str(&body));
        let req = Request::new_with_str_and_init(&self.url, &init)?;

        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let response: Response = JsFuture::from(window.fetch_with_request(&req))
            .await?
            .dyn_into()?;
        let status = response.status();
        let text = JsFuture::from(response.text()?).await?;
        Ok((status, text.as_string().unwrap_or_default()))
    }
}

#[async_trait(?Send)]
impl RelayClient for FetchRelayClient {
    async fn send(&self, request: &RelayRequest) -> Result<String, RelayError> {
        let (status, body) = self
            .post(request)
            .await
            .map_err(|e| RelayError::Transport(format!("{e:?}")))?;
        parse_reply(status, &body)
    }
}
