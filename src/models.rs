//! データ構造体モジュール

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

// ============================================
// 地域
// ============================================

/// 正規化済みの地域ID
///
/// 数字のみの入力は3桁ゼロ埋めに揃える（"13" / "013" / "0013" → "013"）。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RegionId(String);

impl RegionId {
    pub const NATIONWIDE: &'static str = "000";

    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        if raw.chars().all(|c| c.is_ascii_digit()) {
            let id = raw
                .parse::<u64>()
                .map(|n| format!("{:03}", n))
                .unwrap_or_else(|_| raw.to_string());
            Some(Self(id))
        } else {
            Some(Self(raw.to_string()))
        }
    }

    pub fn nationwide() -> Self {
        Self(Self::NATIONWIDE.to_string())
    }

    pub fn is_nationwide(&self) -> bool {
        self.0 == Self::NATIONWIDE
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub id: RegionId,
    pub name: String,
}

impl Region {
    pub const NATIONWIDE_NAME: &'static str = "全国";

    /// 地域テーブルに無くても使える全国版
    pub fn nationwide() -> Self {
        Self {
            id: RegionId::nationwide(),
            name: Self::NATIONWIDE_NAME.to_string(),
        }
    }

    pub fn is_nationwide(&self) -> bool {
        self.id.is_nationwide() || self.name.trim() == Self::NATIONWIDE_NAME
    }
}

// ============================================
// クリニック・ランキング
// ============================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clinic {
    pub id: String,
    pub name: String,
    pub code: String,
}

/// ランキングの順位（`no1` → 1）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RankPosition(pub u32);

impl RankPosition {
    /// `noN` 形式の列名を解釈する
    pub fn from_column(column: &str) -> Option<Self> {
        let digits = column.trim().strip_prefix("no")?;
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok().filter(|&n| n > 0).map(Self)
    }

    pub fn number(self) -> u32 {
        self.0
    }
}

/// 「該当なし」を表すランキングのセル値
pub const RANK_SENTINEL: &str = "-";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ranking {
    pub region_id: RegionId,
    /// 順位の昇順に並んだ (順位, クリニックID)
    pub ranks: Vec<(RankPosition, String)>,
}

impl Ranking {
    /// 同じ順位が再設定された場合は後勝ち
    pub fn set(&mut self, position: RankPosition, clinic_id: String) {
        match self.ranks.binary_search_by_key(&position, |(p, _)| *p) {
            Ok(idx) => self.ranks[idx].1 = clinic_id,
            Err(idx) => self.ranks.insert(idx, (position, clinic_id)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }
}

// ============================================
// 店舗
// ============================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Store {
    pub id: String,
    pub clinic_name: String,
    pub store_name: String,
    pub address: String,
    pub zipcode: String,
    pub access: String,
    /// 住所から推定した地域（読み込み後に設定）
    pub region_id: Option<RegionId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreView {
    pub region_id: RegionId,
    /// `"<クリニックコード>_stores"` → 店舗IDトークン
    pub clinic_stores: HashMap<String, Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Campaign {
    pub id: String,
    pub region_id: Option<RegionId>,
    pub clinic_id: String,
    pub title: String,
    pub header_text: String,
    pub logo_src: String,
    pub logo_alt: String,
    pub description: String,
    pub cta_text: String,
    pub cta_url: String,
    pub footer_text: String,
}

// ============================================
// クリニック別テキスト（clinic-texts.csv）
// ============================================

/// clinic-texts.csv の list_name 列による行の分類
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListKind {
    /// 比較表の列。番号は比較表ヘッダーの番号
    Comparison(Option<u32>),
    Detail,
    Tags,
    Meta,
    /// 旧形式: list_name がクリニックコードの行
    CodeAlias(&'static str),
    Other,
}

const LEGACY_CODE_NAMES: &[(&str, &str)] = &[
    ("ohmyteeth", "Oh my teeth"),
    ("invisalign", "インビザライン"),
    ("kireilign", "キレイライン矯正"),
    ("zenyum", "ゼニュム"),
    ("wesmile", "ウィスマイル"),
];

impl ListKind {
    pub fn parse(list_name: &str) -> Self {
        if let Some(rest) = list_name.strip_prefix("comparison") {
            ListKind::Comparison(rest.parse().ok())
        } else if list_name.starts_with("detail") {
            ListKind::Detail
        } else if list_name.starts_with("tags") {
            ListKind::Tags
        } else if list_name.starts_with("meta") {
            ListKind::Meta
        } else if let Some((_, name)) = LEGACY_CODE_NAMES.iter().find(|(code, _)| *code == list_name) {
            ListKind::CodeAlias(name)
        } else {
            ListKind::Other
        }
    }
}

/// 詳細セクションの表に出す項目
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DetailKey {
    Cost,
    Duration,
    Range,
    Hours,
    Stores,
    OfficialSite,
    Other(String),
}

impl DetailKey {
    /// CSVの項目名から。特徴タグは表に出さないので None
    pub fn from_field(field_name: &str) -> Option<Self> {
        let key = match field_name {
            "費用" => DetailKey::Cost,
            "目安期間" => DetailKey::Duration,
            "矯正範囲" => DetailKey::Range,
            "営業時間" => DetailKey::Hours,
            "店舗" => DetailKey::Stores,
            "特徴タグ" => return None,
            other => DetailKey::Other(other.to_string()),
        };
        Some(key)
    }

    /// 詳細表の見出し
    pub fn label(&self) -> &str {
        match self {
            DetailKey::Cost => "費用",
            DetailKey::Duration => "目安期間",
            DetailKey::Range => "矯正範囲",
            DetailKey::Hours => "営業時間",
            DetailKey::Stores => "店舗",
            DetailKey::OfficialSite => "公式サイト",
            DetailKey::Other(name) => name,
        }
    }
}

pub const DETAIL_PREFIX: &str = "詳細_";
pub const OFFICIAL_SITE_FIELD: &str = "公式サイトURL";

/// 1クリニック分の項目。CSVの行順を保持する
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClinicTextRecord {
    keys: Vec<String>,
    values: HashMap<String, String>,
}

impl ClinicTextRecord {
    /// 既存キーへの再設定は位置を変えずに値だけ上書き
    pub fn insert(&mut self, key: String, value: String) {
        if !self.values.contains_key(&key) {
            self.keys.push(key.clone());
        }
        self.values.insert(key, value);
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClinicTextTable {
    /// 比較表ヘッダー番号 → 表示名（= 項目名）
    pub comparison_headers: BTreeMap<u32, String>,
    /// 詳細表の項目 → CSVの項目名
    pub detail_fields: Vec<(DetailKey, String)>,
    /// ヘッダー行のクリニック名順
    pub clinic_names: Vec<String>,
    pub records: HashMap<String, ClinicTextRecord>,
}

impl ClinicTextTable {
    pub fn record(&self, clinic_name: &str) -> Option<&ClinicTextRecord> {
        self.records.get(clinic_name)
    }

    pub fn set_detail_field(&mut self, key: DetailKey, field_name: String) {
        match self.detail_fields.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = field_name,
            None => self.detail_fields.push((key, field_name)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// サイト共通テキスト（site-common-texts）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommonTexts {
    values: HashMap<String, String>,
}

impl CommonTexts {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: String, value: String) {
        self.values.insert(key, value);
    }

    /// 上書き（後から読んだ方が勝つ）
    pub fn merge(&mut self, other: impl IntoIterator<Item = (String, String)>) {
        self.values.extend(other);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

// ============================================
// 画面状態
// ============================================

/// ページ全体の状態
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PageState {
    #[default]
    Uninitialized,
    Loading,
    Ready,
    ReRendering,
    Error(String),
}

/// 状態を進めるきっかけ
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageEvent {
    LoadStarted,
    LoadFailed(String),
    RenderStarted,
    Rendered,
    RenderFailed(String),
}

impl PageState {
    /// Ready ⇄ ReRendering。初回の描画中は Loading のまま
    pub fn next(&self, event: PageEvent) -> PageState {
        match (self, event) {
            (_, PageEvent::LoadStarted) => PageState::Loading,
            (_, PageEvent::LoadFailed(message)) | (_, PageEvent::RenderFailed(message)) => PageState::Error(message),
            (PageState::Loading | PageState::Uninitialized, PageEvent::RenderStarted) => self.clone(),
            (_, PageEvent::RenderStarted) => PageState::ReRendering,
            (_, PageEvent::Rendered) => PageState::Ready,
        }
    }

    pub fn is_busy(&self) -> bool {
        matches!(self, PageState::Loading | PageState::ReRendering)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_id_padded_and_unpadded_are_equal() {
        assert_eq!(RegionId::parse("13"), RegionId::parse("013"));
        assert_eq!(RegionId::parse(" 0013 "), RegionId::parse("013"));
        assert_eq!(RegionId::parse("13").unwrap().as_str(), "013");
        assert_eq!(RegionId::parse("0").unwrap().as_str(), "000");
        assert!(RegionId::parse("0").unwrap().is_nationwide());
        assert_eq!(RegionId::parse("  "), None);
    }

    #[test]
    fn rank_position_sorts_numerically() {
        let mut ranking = Ranking {
            region_id: RegionId::nationwide(),
            ranks: Vec::new(),
        };
        for column in ["no10", "no2", "no9", "no1"] {
            let position = RankPosition::from_column(column).unwrap();
            ranking.set(position, column.to_string());
        }
        let order: Vec<u32> = ranking.ranks.iter().map(|(p, _)| p.number()).collect();
        assert_eq!(order, vec![1, 2, 9, 10]);
        assert_eq!(RankPosition::from_column("note"), None);
        assert_eq!(RankPosition::from_column("no"), None);
    }

    #[test]
    fn list_kind_classification() {
        assert_eq!(ListKind::parse("comparison3"), ListKind::Comparison(Some(3)));
        assert_eq!(ListKind::parse("detail_1"), ListKind::Detail);
        assert_eq!(ListKind::parse("tags"), ListKind::Tags);
        assert_eq!(ListKind::parse("meta13"), ListKind::Meta);
        assert_eq!(ListKind::parse("zenyum"), ListKind::CodeAlias("ゼニュム"));
        assert_eq!(ListKind::parse("review"), ListKind::Other);
    }

    #[test]
    fn region_change_passes_through_rerendering() {
        let ready = PageState::Ready;
        let busy = ready.next(PageEvent::RenderStarted);
        assert_eq!(busy, PageState::ReRendering);
        assert!(busy.is_busy());
        assert_eq!(busy.next(PageEvent::Rendered), PageState::Ready);
    }

    #[test]
    fn first_render_stays_loading_until_rendered() {
        let loading = PageState::Uninitialized.next(PageEvent::LoadStarted);
        assert_eq!(loading, PageState::Loading);
        assert_eq!(loading.next(PageEvent::RenderStarted), PageState::Loading);
        assert_eq!(loading.next(PageEvent::Rendered), PageState::Ready);
        assert_eq!(
            loading.next(PageEvent::LoadFailed("x".into())),
            PageState::Error("x".into())
        );
        // エラー表示中からの再試行
        let error = PageState::Error("x".into());
        assert_eq!(error.next(PageEvent::RenderStarted), PageState::ReRendering);
        assert!(!PageState::Ready.is_busy());
    }

    #[test]
    fn text_record_keeps_first_position() {
        let mut record = ClinicTextRecord::default();
        record.insert("a".into(), "1".into());
        record.insert("b".into(), "2".into());
        record.insert("a".into(), "3".into());
        assert_eq!(record.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(record.get("a"), Some("3"));
    }
}
