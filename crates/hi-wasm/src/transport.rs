//! `Transport` over the page's `AN` fragment-update helper.
//!
//! `AN.post(url, data)` and `AN.get(url)` issue the request and render
//! whatever HTML/JSON comes back into the page. They return immediately;
//! only a synchronous throw is reported here.

use hi_editor::host::{GeometryPayload, Transport};
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = AN, js_name = post, catch)]
    fn an_post(url: &str, data: &JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(js_namespace = AN, js_name = get, catch)]
    fn an_get(url: &str) -> Result<(), JsValue>;
}

#[derive(Debug, Default)]
pub struct AntinodeTransport;

impl Transport for AntinodeTransport {
    fn post(&mut self, url: &str, payload: &GeometryPayload) -> Result<(), String> {
        let json = serde_json::to_string(payload).map_err(|e| format!("serialize: {e}"))?;
        let data = js_sys::JSON::parse(&json).map_err(|e| format!("JSON.parse: {e:?}"))?;
        log::debug!("POST {url} {json}");
        an_post(url, &data).map_err(|e| format!("POST {url}: {e:?}"))
    }

    fn get(&mut self, url: &str) -> Result<(), String> {
        log::debug!("GET {url}");
        an_get(url).map_err(|e| format!("GET {url}: {e:?}"))
    }
}
