//! URLパラメータとリダイレクトURL

use serde::{Deserialize, Serialize};
use wasm_bindgen::JsValue;

/// `?a=1&b=2` / `#a=1` を (キー, 値) に分解
pub fn parse_query(query: &str) -> Vec<(String, String)> {
    query
        .trim_start_matches(&['?', '#'][..])
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode(key), decode(value))
        })
        .collect()
}

pub fn get_param<'a>(pairs: &'a [(String, String)], name: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
        .filter(|value| !value.is_empty())
}

/// 値を差し替えたクエリ文字列（先頭の `?` 付き）
pub fn with_param(query: &str, name: &str, value: &str) -> String {
    let mut pairs = parse_query(query);
    match pairs.iter_mut().find(|(key, _)| key == name) {
        Some(pair) => pair.1 = value.to_string(),
        None => pairs.push((name.to_string(), value.to_string())),
    }
    let joined: Vec<String> = pairs
        .iter()
        .map(|(k, v)| format!("{}={}", encode(k), encode(v)))
        .collect();
    format!("?{}", joined.join("&"))
}

#[cfg(target_arch = "wasm32")]
fn decode(value: &str) -> String {
    let plus_as_space = value.replace('+', " ");
    js_sys::decode_uri_component(&plus_as_space)
        .ok()
        .and_then(|s| s.as_string())
        .unwrap_or(plus_as_space)
}

#[cfg(not(target_arch = "wasm32"))]
fn decode(value: &str) -> String {
    value.replace('+', " ")
}

#[cfg(target_arch = "wasm32")]
pub fn encode(value: &str) -> String {
    js_sys::encode_uri_component(value)
        .as_string()
        .unwrap_or_else(|| value.to_string())
}

#[cfg(not(target_arch = "wasm32"))]
pub fn encode(value: &str) -> String {
    value.replace('%', "%25").replace('&', "%26").replace('=', "%3D").replace(' ', "%20")
}

// ============================================
// ブラウザのURL
// ============================================

/// 現在のクエリ文字列
pub fn current_query() -> String {
    web_sys::window()
        .and_then(|w| w.location().search().ok())
        .unwrap_or_default()
}

pub fn current_hash() -> String {
    web_sys::window()
        .and_then(|w| w.location().hash().ok())
        .unwrap_or_default()
}

pub fn current_pathname() -> String {
    web_sys::window()
        .and_then(|w| w.location().pathname().ok())
        .unwrap_or_default()
}

/// ページ遷移なしで region_id を書き換える
pub fn replace_region_param(region_id: &str) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let query = with_param(&current_query(), "region_id", region_id);
    let url = format!("{}{}{}", current_pathname(), query, current_hash());
    if let Ok(history) = window.history() {
        let _ = history.replace_state_with_url(&JsValue::NULL, "", Some(&url));
    }
}

pub fn navigate_to(url: &str) {
    if let Some(window) = web_sys::window() {
        let _ = window.location().set_href(url);
    }
}

// ============================================
// リダイレクト
// ============================================

pub const REDIRECT_PAGE: &str = "./redirect.html";

/// redirect.html に渡すパラメータ
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedirectParams {
    pub clinic_id: String,
    pub rank: String,
    pub region_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utm_creative: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gclid: Option<String>,
}

impl RedirectParams {
    /// 広告パラメータは元ページのクエリから引き継ぐ
    pub fn new(clinic_id: &str, rank: u32, region_id: &str, page_query: &[(String, String)]) -> Self {
        Self {
            clinic_id: clinic_id.to_string(),
            rank: rank.to_string(),
            region_id: region_id.to_string(),
            utm_creative: get_param(page_query, "utm_creative").map(str::to_string),
            gclid: get_param(page_query, "gclid").map(str::to_string),
        }
    }

    /// clinic_id が無ければ None
    pub fn from_pairs(pairs: &[(String, String)]) -> Option<Self> {
        let clinic_id = get_param(pairs, "clinic_id")?;
        Some(Self {
            clinic_id: clinic_id.to_string(),
            rank: get_param(pairs, "rank").unwrap_or("1").to_string(),
            region_id: get_param(pairs, "region_id").unwrap_or_default().to_string(),
            utm_creative: get_param(pairs, "utm_creative").map(str::to_string),
            gclid: get_param(pairs, "gclid").map(str::to_string),
        })
    }

    /// クエリ → ハッシュの順に探す
    pub fn from_location(query: &str, hash: &str) -> Option<Self> {
        Self::from_pairs(&parse_query(query)).or_else(|| Self::from_pairs(&parse_query(hash)))
    }

    pub fn rank_number(&self) -> u32 {
        self.rank.trim().parse().ok().filter(|&n| n > 0).unwrap_or(1)
    }

    pub fn redirect_url(&self) -> String {
        let mut url = format!(
            "{}?clinic_id={}&rank={}",
            REDIRECT_PAGE,
            encode(&self.clinic_id),
            encode(&self.rank)
        );
        if !self.region_id.is_empty() {
            url.push_str(&format!("&region_id={}", encode(&self.region_id)));
        }
        if let Some(utm) = &self.utm_creative {
            url.push_str(&format!("&utm_creative={}", encode(utm)));
        }
        if let Some(gclid) = &self.gclid {
            url.push_str(&format!("&gclid={}", encode(gclid)));
        }
        url
    }

    /// 遷移先URLのプレースホルダーを埋める
    pub fn fill_placeholders(&self, url: &str) -> String {
        url.replace("[ADID_PLACEHOLDER]", self.utm_creative.as_deref().unwrap_or(""))
            .replace("[GCLID_PLACEHOLDER]", self.gclid.as_deref().unwrap_or(""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_query_strips_prefix_and_keeps_empty_values() {
        let pairs = parse_query("?region_id=013&gclid=&flag");
        assert_eq!(get_param(&pairs, "region_id"), Some("013"));
        assert_eq!(get_param(&pairs, "gclid"), None);
        assert_eq!(pairs.len(), 3);
        assert!(parse_query("").is_empty());
    }

    #[test]
    fn with_param_replaces_or_appends() {
        assert_eq!(with_param("?region_id=013&gclid=x", "region_id", "027"), "?region_id=027&gclid=x");
        assert_eq!(with_param("", "region_id", "027"), "?region_id=027");
    }

    #[test]
    fn redirect_url_forwards_ad_params() {
        let page = parse_query("?region_id=13&utm_creative=cr01&gclid=abc");
        let params = RedirectParams::new("5", 2, "013", &page);
        assert_eq!(
            params.redirect_url(),
            "./redirect.html?clinic_id=5&rank=2&region_id=013&utm_creative=cr01&gclid=abc"
        );
    }

    #[test]
    fn redirect_params_from_hash_when_query_empty() {
        let params = RedirectParams::from_location("", "#clinic_id=3&rank=4").unwrap();
        assert_eq!(params.clinic_id, "3");
        assert_eq!(params.rank_number(), 4);
        assert!(RedirectParams::from_location("?rank=1", "").is_none());
    }

    #[test]
    fn placeholders_are_filled() {
        let params = RedirectParams {
            clinic_id: "1".into(),
            rank: "x".into(),
            utm_creative: Some("cr".into()),
            ..Default::default()
        };
        assert_eq!(params.rank_number(), 1);
        assert_eq!(
            params.fill_placeholders("https://a/?p2=[ADID_PLACEHOLDER]&p3=[GCLID_PLACEHOLDER]"),
            "https://a/?p2=cr&p3="
        );
    }

    #[test]
    fn stored_json_round_trip_accepts_string_rank() {
        let stored = r#"{"clinic_id":"2","rank":"3","region_id":"013"}"#;
        let params: RedirectParams = serde_json::from_str(stored).unwrap();
        assert_eq!(params.rank_number(), 3);
        assert_eq!(params.gclid, None);
    }
}
