//! エラー型

use thiserror::Error;

/// データ読み込みエラー
///
/// 必須テーブル（地域・クリニック・ランキング）で発生した場合のみ
/// 画面まで伝播し、エラー表示になる。
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LoadError {
    #[error("{resource} を読み込めませんでした")]
    ResourceNotFound { resource: String },
}

/// 1つのURLに対するfetchの失敗
///
/// 候補URLを順に試すループの中で吸収される。
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("windowがありません")]
    NoWindow,
    #[error("Request作成失敗: {0}")]
    Request(String),
    #[error("fetch失敗: {0}")]
    Network(String),
    #[error("HTTPエラー: {status} ({url})")]
    Status { status: u16, url: String },
    #[error("レスポンス読み込み失敗: {0}")]
    Body(String),
    #[error("JSONパース失敗: {0}")]
    Json(String),
}
