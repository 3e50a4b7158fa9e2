//! 静的ファイルのfetch

use crate::error::FetchError;
use crate::utils::log_trace::log_debug;
use serde::de::DeserializeOwned;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, Response};

async fn fetch_response(url: &str) -> Result<Response, FetchError> {
    let opts = RequestInit::new();
    opts.set_method("GET");

    let request = Request::new_with_str_and_init(url, &opts)
        .map_err(|e| FetchError::Request(format!("{:?}", e)))?;

    let window = web_sys::window().ok_or(FetchError::NoWindow)?;
    let resp_value = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(|e| FetchError::Network(format!("{:?}", e)))?;

    let resp: Response = resp_value
        .dyn_into()
        .map_err(|_| FetchError::Network("Responseへの変換失敗".to_string()))?;

    if !resp.ok() {
        return Err(FetchError::Status {
            status: resp.status(),
            url: url.to_string(),
        });
    }
    Ok(resp)
}

/// レスポンス本体をバイト列で取得
pub async fn fetch_bytes(url: &str) -> Result<Vec<u8>, FetchError> {
    let resp = fetch_response(url).await?;
    let promise = resp
        .array_buffer()
        .map_err(|e| FetchError::Body(format!("{:?}", e)))?;
    let buffer = JsFuture::from(promise)
        .await
        .map_err(|e| FetchError::Body(format!("{:?}", e)))?;
    Ok(js_sys::Uint8Array::new(&buffer).to_vec())
}

/// 候補URLを順に試し、最初に成功したものを返す
pub async fn fetch_first(urls: &[String]) -> Option<(String, Vec<u8>)> {
    for url in urls {
        match fetch_bytes(url).await {
            Ok(bytes) => return Some((url.clone(), bytes)),
            Err(e) => log_debug("fetch", &format!("{} をスキップ: {}", url, e)),
        }
    }
    None
}

pub async fn fetch_json<T: DeserializeOwned>(url: &str) -> Result<T, FetchError> {
    let resp = fetch_response(url).await?;
    let promise = resp
        .json()
        .map_err(|e| FetchError::Body(format!("{:?}", e)))?;
    let json = JsFuture::from(promise)
        .await
        .map_err(|e| FetchError::Json(format!("{:?}", e)))?;
    serde_wasm_bindgen::from_value(json).map_err(|e| FetchError::Json(e.to_string()))
}
