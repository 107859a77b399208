//! Typed wrappers around the browser APIs the apps need: `fetch` and
//! `requestAnimationFrame`.

use aero_core::{AeroError, Result};
use aero_render::transition::FrameClock;
use aero_utils::compression::{decode_text, is_gzip_name};
use js_sys::{ArrayBuffer, Promise, Uint8Array};
use std::future::Future;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, Response};

fn js_reason(value: JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}

/// GET `url` and return its body as text. Bodies of `.gz` URLs are gunzipped.
pub async fn fetch_text(url: &str) -> Result<String> {
    let fail = |reason: String| AeroError::Fetch {
        url: url.to_string(),
        reason,
    };
    let window = web_sys::window().ok_or_else(|| fail("no window".to_string()))?;

    let opts = RequestInit::new();
    opts.set_method("GET");
    let request = Request::new_with_str_and_init(url, &opts).map_err(|e| fail(js_reason(e)))?;

    let response = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(|e| fail(js_reason(e)))?;
    let response: Response = response.dyn_into().map_err(|e| fail(js_reason(e)))?;
    if !response.ok() {
        return Err(AeroError::HttpStatus {
            url: url.to_string(),
            status: response.status(),
        });
    }

    let buffer = response.array_buffer().map_err(|e| fail(js_reason(e)))?;
    let buffer: ArrayBuffer = JsFuture::from(buffer)
        .await
        .map_err(|e| fail(js_reason(e)))?
        .dyn_into()
        .map_err(|e| fail(js_reason(e)))?;
    let bytes = Uint8Array::new(&buffer).to_vec();
    decode_text(&bytes, is_gzip_name(url)).map_err(|e| AeroError::Decode(format!("{}: {}", url, e)))
}

/// [`fetch_text`] that logs and swallows failures.
pub async fn fetch_optional(url: &str) -> Option<String> {
    match fetch_text(url).await {
        Ok(text) => Some(text),
        Err(e) => {
            log::warn!("{}", e);
            None
        }
    }
}

/// Resolves with the timestamp of the next animation frame, in ms.
pub async fn next_animation_frame() -> f64 {
    let promise = Promise::new(&mut |resolve, _reject| {
        let Some(window) = web_sys::window() else {
            let _ = resolve.call1(&JsValue::NULL, &JsValue::from_f64(0.0));
            return;
        };
        let callback = Closure::once_into_js(move |ts: f64| {
            let _ = resolve.call1(&JsValue::NULL, &JsValue::from_f64(ts));
        });
        let _ = window.request_animation_frame(callback.unchecked_ref());
    });
    JsFuture::from(promise)
        .await
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0)
}

/// Frame clock backed by `requestAnimationFrame`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserClock;

impl FrameClock for BrowserClock {
    fn next_frame(&mut self) -> impl Future<Output = f64> {
        next_animation_frame()
    }
}
