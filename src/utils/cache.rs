//! LocalStorageキャッシュ管理

use crate::utils::url_params::RedirectParams;

const REDIRECT_PARAMS_KEY: &str = "redirectParams";

/// クリック時のリダイレクトパラメータを保存
/// （サーバー側でクエリが落ちる場合の控え）
pub fn save_redirect_params(params: &RedirectParams) {
    if let Some(window) = web_sys::window() {
        if let Ok(Some(storage)) = window.local_storage() {
            if let Ok(json) = serde_json::to_string(params) {
                let _ = storage.set_item(REDIRECT_PARAMS_KEY, &json);
            }
        }
    }
}

pub fn load_redirect_params() -> Option<RedirectParams> {
    let window = web_sys::window()?;
    let storage = window.local_storage().ok()??;
    let json = storage.get_item(REDIRECT_PARAMS_KEY).ok()??;
    serde_json::from_str(&json).ok()
}

pub fn clear_redirect_params() {
    if let Some(window) = web_sys::window() {
        if let Ok(Some(storage)) = window.local_storage() {
            let _ = storage.remove_item(REDIRECT_PARAMS_KEY);
        }
    }
}
