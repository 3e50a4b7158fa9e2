//! ユーティリティモジュール

pub mod cache;
pub mod fetch;
pub mod log_trace;
pub mod url_params;

// 共通ヘルパー

/// `<deco>…</deco>` を装飾用の span に変換
pub fn process_deco_tags(text: &str) -> String {
    const OPEN: &str = "<deco>";
    const CLOSE: &str = "</deco>";

    let mut result = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find(OPEN) {
        let after_open = &rest[start + OPEN.len()..];
        let Some(end) = after_open.find(CLOSE) else {
            break;
        };
        result.push_str(&rest[..start]);
        result.push_str("<span class=\"deco-text\">");
        result.push_str(&after_open[..end]);
        result.push_str("</span>");
        rest = &after_open[end + CLOSE.len()..];
    }
    result.push_str(rest);
    result
}

/// `<br>` 区切りのタグ文字列（先頭の `#` は除く）
pub fn split_feature_tags(text: &str) -> Vec<String> {
    text.split("<br>")
        .map(|tag| tag.trim().trim_start_matches('#').trim())
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}
