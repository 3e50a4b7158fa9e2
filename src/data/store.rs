//! 読み込み済みデータと参照系
//!
//! 起動時に一度だけ組み立て、以降は読み取り専用（共通テキストの上書きを除く）。
//! 参照系はすべて total で、見つからなければ呼び出し側のデフォルトを返す。

use std::collections::BTreeMap;

use crate::config::SiteConfig;
use crate::models::{
    Campaign, Clinic, ClinicTextRecord, ClinicTextTable, CommonTexts, Ranking, Region, RegionId,
    Store, StoreView,
};
use crate::utils::log_trace::{log_info, log_warn};

pub const DEFAULT_REVIEW_LABELS: [&str; 3] = ["コスパ", "スタッフ", "サービス"];
const MAX_REVIEW_LABELS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Review {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, Default)]
pub struct SiteData {
    pub config: SiteConfig,
    pub regions: Vec<Region>,
    pub clinics: Vec<Clinic>,
    pub rankings: BTreeMap<RegionId, Ranking>,
    pub stores: Vec<Store>,
    pub store_views: BTreeMap<RegionId, StoreView>,
    pub campaigns: Vec<Campaign>,
    pub clinic_texts: ClinicTextTable,
    pub common_texts: CommonTexts,
}

impl SiteData {
    pub fn default_region_id(&self) -> RegionId {
        RegionId::parse(&self.config.default_region_id).unwrap_or_else(RegionId::nationwide)
    }

    // ============================================
    // 地域
    // ============================================

    /// 表示する地域IDを決める
    ///
    /// ランキングのある既知の地域 → そのまま、全国 → "000"、
    /// 振り替え表にあれば振り替え先、それ以外はデフォルト地域。
    pub fn map_region_id(&self, raw: &str) -> RegionId {
        let default = self.default_region_id();
        let Some(id) = RegionId::parse(raw) else {
            log_warn("region", &format!("地域IDが空です。{} を使用します", default));
            return default;
        };

        if self.regions.iter().any(|r| r.id == id) {
            if self.rankings.contains_key(&id) {
                return id;
            }
            log_info("region", &format!("地域 {} にはランキングが無いため振り替えます", id));
        }

        if id.is_nationwide() {
            return id;
        }

        if let Some(target) = self
            .config
            .region_overrides
            .get(id.as_str())
            .and_then(|t| RegionId::parse(t))
        {
            log_info("region", &format!("地域 {} → {}", id, target));
            return target;
        }

        log_warn("region", &format!("不明な地域ID {}、{} にフォールバックします", raw, default));
        default
    }

    /// 地域テーブルから取得。全国はテーブルに無くても返す
    pub fn region_by_id(&self, id: &RegionId) -> Option<Region> {
        let found = self.regions.iter().find(|r| r.id == *id).cloned();
        if found.is_none() && id.is_nationwide() {
            return Some(Region::nationwide());
        }
        found
    }

    pub fn region_name(&self, raw: &str) -> String {
        RegionId::parse(raw)
            .and_then(|id| self.region_by_id(&id))
            .map(|r| r.name)
            .unwrap_or_default()
    }

    /// 住所に地域名が含まれる最初の地域（テーブル順）
    pub fn region_id_from_address(&self, address: &str) -> Option<RegionId> {
        if address.is_empty() {
            return None;
        }
        self.regions
            .iter()
            .find(|r| !r.name.is_empty() && address.contains(r.name.as_str()))
            .map(|r| r.id.clone())
    }

    pub fn associate_stores(&mut self) {
        let region_ids: Vec<Option<RegionId>> = self
            .stores
            .iter()
            .map(|store| self.region_id_from_address(&store.address))
            .collect();
        for (store, region_id) in self.stores.iter_mut().zip(region_ids) {
            store.region_id = region_id;
        }
    }

    // ============================================
    // ランキング・クリニック
    // ============================================

    /// 地域のランキング。無ければデフォルト地域のランキング
    pub fn ranking_for_region(&self, raw: &str) -> Option<&Ranking> {
        let mapped = self.map_region_id(raw);
        if let Some(ranking) = self.rankings.get(&mapped) {
            return Some(ranking);
        }
        let default = self.default_region_id();
        log_warn(
            "region",
            &format!("地域 {}（{}）のランキングが無いため {} を使用します", raw, mapped, default),
        );
        self.rankings.get(&default)
    }

    pub fn clinic_by_id(&self, clinic_id: &str) -> Option<&Clinic> {
        self.clinics.iter().find(|c| c.id == clinic_id)
    }

    pub fn clinic_code_by_id(&self, clinic_id: &str) -> Option<&str> {
        self.clinic_by_id(clinic_id).map(|c| c.code.as_str())
    }

    // ============================================
    // クリニック別テキスト
    // ============================================

    /// クリニックコード → clinic-texts.csv 上のクリニック名
    fn text_clinic_name<'a>(&'a self, code: &'a str) -> Option<&'a str> {
        if let Some(name) = self.config.clinic_aliases.get(code) {
            return Some(name.as_str());
        }
        if let Some(clinic) = self.clinics.iter().find(|c| c.code == code) {
            return Some(clinic.name.as_str());
        }
        self.clinic_texts.records.contains_key(code).then_some(code)
    }

    fn text_record(&self, code: &str) -> Option<&ClinicTextRecord> {
        self.text_clinic_name(code)
            .and_then(|name| self.clinic_texts.record(name))
    }

    /// `comparisonN` を比較表ヘッダーの項目名に置き換える
    fn resolve_item_key<'a>(&'a self, key: &'a str) -> &'a str {
        key.strip_prefix("comparison")
            .and_then(|n| n.parse::<u32>().ok())
            .and_then(|n| self.clinic_texts.comparison_headers.get(&n))
            .map(String::as_str)
            .unwrap_or(key)
    }

    pub fn get_clinic_text(&self, code: &str, key: &str, default: &str) -> String {
        let key = self.resolve_item_key(key);
        self.text_record(code)
            .and_then(|record| record.get(key))
            .filter(|value| !value.is_empty())
            .unwrap_or(default)
            .to_string()
    }

    pub fn clinic_rating(&self, code: &str, default: f64) -> f64 {
        self.get_clinic_text(code, "総合評価", "")
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|r| r.is_finite() && *r > 0.0)
            .unwrap_or(default)
    }

    /// 口コミタブのラベル（`口コミNタイトル（ラベル）` の括弧内、初出順、最大3つ）
    ///
    /// 項目名だけを見る。該当する項目が無ければ既定のラベル。
    pub fn review_tab_labels(&self, code: &str) -> Vec<String> {
        let record = self.text_record(code).or_else(|| {
            self.clinic_texts
                .clinic_names
                .first()
                .and_then(|name| self.clinic_texts.record(name))
        });

        let mut labels: Vec<String> = Vec::new();
        if let Some(record) = record {
            for label in record.keys().filter_map(review_label) {
                if !labels.iter().any(|l| l == label) {
                    labels.push(label.to_string());
                }
            }
        }

        if labels.is_empty() {
            return DEFAULT_REVIEW_LABELS.iter().map(|s| s.to_string()).collect();
        }
        labels.truncate(MAX_REVIEW_LABELS);
        labels
    }

    pub fn reviews_by_label(&self, code: &str, label: &str) -> Vec<Review> {
        let lookup = |kind: &str, n: usize| {
            let full = self.get_clinic_text(code, &format!("口コミ{}{}（{}）", n, kind, label), "");
            if full.is_empty() {
                self.get_clinic_text(code, &format!("口コミ{}{}({})", n, kind, label), "")
            } else {
                full
            }
        };

        (1..=3)
            .map(|n| Review {
                title: lookup("タイトル", n),
                content: lookup("内容", n),
            })
            .filter(|r| !r.title.is_empty() || !r.content.is_empty())
            .collect()
    }

    // ============================================
    // 店舗
    // ============================================

    pub fn store_view(&self, mapped: &RegionId) -> Option<&StoreView> {
        self.store_views.get(mapped)
    }

    /// IDに一致する店舗（店舗テーブルの順）
    pub fn stores_by_ids(&self, ids: &[String]) -> Vec<&Store> {
        self.stores
            .iter()
            .filter(|store| ids.iter().any(|id| *id == store.id))
            .collect()
    }

    /// ランキングに載っているクリニックの、その地域の店舗
    pub fn stores_for_ranked_clinics(&self, raw: &str) -> Vec<&Store> {
        let mapped = self.map_region_id(raw);
        let Some(view) = self.store_view(&mapped) else {
            log_warn("store", &format!("地域 {}（{}）の店舗ビューがありません", raw, mapped));
            return Vec::new();
        };
        let Some(ranking) = self.ranking_for_region(raw) else {
            return Vec::new();
        };

        let ids: Vec<String> = ranking
            .ranks
            .iter()
            .filter_map(|(_, clinic_id)| self.clinic_by_id(clinic_id))
            .flat_map(|clinic| store_tokens(view, &clinic.code))
            .collect();
        self.stores_by_ids(&ids)
    }

    // ============================================
    // キャンペーン・共通テキスト
    // ============================================

    /// 地域指定のキャンペーンを優先し、無ければ地域指定なしのもの
    pub fn campaign_for(&self, region: &RegionId, clinic_id: &str) -> Option<&Campaign> {
        let for_clinic = || self.campaigns.iter().filter(move |c| c.clinic_id == clinic_id);
        for_clinic()
            .find(|c| c.region_id.as_ref() == Some(region))
            .or_else(|| for_clinic().find(|c| c.region_id.is_none()))
    }

    /// `{{KEY}}` を置換した共通テキスト
    pub fn common_text(&self, key: &str, default: &str, placeholders: &[(&str, &str)]) -> String {
        let mut text = match self.common_texts.get(key) {
            Some(value) if !value.is_empty() => value.to_string(),
            _ => default.to_string(),
        };
        for (name, value) in placeholders {
            text = text.replace(&format!("{{{{{}}}}}", name), value);
        }
        text
    }

    pub fn apply_common_override(&mut self, entries: Vec<(String, String)>) {
        self.common_texts.merge(entries);
    }
}

/// `{code}_stores` の店舗ID。`a/b` 形式はここでも分割する
pub fn store_tokens(view: &StoreView, code: &str) -> Vec<String> {
    view.clinic_stores
        .get(&format!("{}_stores", code))
        .map(|tokens| {
            tokens
                .iter()
                .flat_map(|t| t.split('/'))
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// `口コミ1タイトル（コスパ）` / `口コミ1タイトル(コスパ)` → `コスパ`
fn review_label(key: &str) -> Option<&str> {
    let rest = key.strip_prefix("口コミ")?;
    let rest = rest.strip_prefix(|c: char| ('1'..='3').contains(&c))?;
    let rest = rest.strip_prefix("タイトル")?;
    let label = rest
        .strip_prefix('（')
        .and_then(|r| r.strip_suffix('）'))
        .or_else(|| rest.strip_prefix('(').and_then(|r| r.strip_suffix(')')))?;
    (!label.is_empty()).then_some(label)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::data::csv::CsvTable;
    use crate::data::loader::{parse_clinic_texts, parse_clinics, parse_rankings, parse_regions, parse_store_views, parse_stores};
    use crate::utils::log_trace::{clear_logs, recent_logs, LogLevel};

    pub(crate) fn sample_data() -> SiteData {
        let regions = parse_regions(&CsvTable::from_text(
            "parameter_no,region\n0,全国\n1,北海道\n13,東京\n27,大阪\n",
        ));
        let clinics = parse_clinics(&CsvTable::from_text(
            "clinic_id,clinic_name,code\n1,ディオクリニック,dio\n2,ClinicA,clinica\n5,エミナルクリニック,eminal\n",
        ));
        let rankings = parse_rankings(&CsvTable::from_text(
            "parameter_no,no1,no2,no3,no4,no5,no6,no7\n0,1,2,5,-,-,-,-\n13,5,-,2,1,9,-,-\n27,2,1,,,,,\n",
        ));
        let stores = parse_stores(&CsvTable::from_text(
            "store_id,clinic_name,store_name,Zipcode,adress,access\n\
             dio_001,ディオクリニック,新宿院,160-0022,東京都新宿区新宿3-1,新宿駅徒歩3分\n\
             dio_002,ディオクリニック,銀座院,104-0061,東京都中央区銀座5-2,\n\
             eminal_001,エミナルクリニック,梅田院,530-0001,大阪府大阪市北区梅田1-1,梅田駅徒歩5分\n\
             eminal_002,エミナルクリニック,渋谷院,150-0002,東京都渋谷区渋谷2-1,渋谷駅徒歩1分\n",
        ));
        let store_views = parse_store_views(&CsvTable::from_text(
            "parameter_no,dio_stores,eminal_stores,clinica_stores\n13,dio_001/dio_002,eminal_002,-\n27,-,eminal_001,\n",
        ));
        let clinic_texts = parse_clinic_texts(
            "list_name,項目名,備考,ClinicA,ディオクリニック,エミナルクリニック\n\
             comparison1,総合評価,,4.9,4.6,abc\n\
             comparison2,料金,,<deco>安い</deco>,普通,\n\
             review,口コミ1タイトル（スタッフ）,,丁寧,,\n\
             review,口コミ1内容（スタッフ）,,説明が丁寧,,\n\
             review,口コミ2タイトル(特典),,割引,,\n\
             review,口コミ3タイトル（スタッフ）,,,,\n\
             review,口コミ3内容（スタッフ）,,親切,,\n",
        );

        let mut data = SiteData {
            config: SiteConfig::default(),
            regions,
            clinics,
            rankings,
            stores,
            store_views,
            campaigns: Vec::new(),
            clinic_texts,
            common_texts: CommonTexts::default(),
        };
        data.associate_stores();
        data
    }

    #[test]
    fn padded_and_unpadded_region_ids_map_the_same() {
        let data = sample_data();
        assert_eq!(data.map_region_id("13"), data.map_region_id("013"));
        assert_eq!(data.map_region_id("13").as_str(), "013");
    }

    #[test]
    fn unknown_region_falls_back_with_warning() {
        let data = sample_data();
        clear_logs();
        assert_eq!(data.map_region_id("014").as_str(), "013");
        let warnings = recent_logs(LogLevel::Warn);
        assert!(warnings.iter().any(|w| w.category == "region" && w.message.contains("014")));
    }

    #[test]
    fn region_without_ranking_uses_override() {
        let data = sample_data();
        assert_eq!(data.map_region_id("001").as_str(), "013");
        assert_eq!(data.map_region_id("000").as_str(), "000");
        assert_eq!(data.map_region_id("27").as_str(), "027");
    }

    #[test]
    fn map_region_id_is_idempotent() {
        let data = sample_data();
        for raw in ["0", "1", "13", "014", "27", "abc", ""] {
            let once = data.map_region_id(raw);
            assert_eq!(data.map_region_id(once.as_str()), once, "raw = {:?}", raw);
        }
    }

    #[test]
    fn nationwide_region_is_synthesized() {
        let mut data = sample_data();
        data.regions.retain(|r| !r.id.is_nationwide());
        assert_eq!(data.region_name("000"), "全国");
        assert_eq!(data.region_name("13"), "東京");
        assert_eq!(data.region_name("99"), "");
    }

    #[test]
    fn comparison_key_resolves_through_headers() {
        let data = sample_data();
        assert_eq!(data.get_clinic_text("ClinicA", "comparison1", ""), "4.9");
        assert_eq!(data.get_clinic_text("clinica", "comparison1", ""), "4.9");
        assert_eq!(data.get_clinic_text("dio", "総合評価", ""), "4.6");
    }

    #[test]
    fn clinic_text_is_total() {
        let data = sample_data();
        assert_eq!(data.get_clinic_text("unknown", "総合評価", "x"), "x");
        assert_eq!(data.get_clinic_text("dio", "無い項目", "d"), "d");
        assert_eq!(data.get_clinic_text("eminal", "料金", "空欄"), "空欄");
        assert_eq!(data.get_clinic_text("", "", ""), "");
    }

    #[test]
    fn rating_falls_back_on_garbage() {
        let data = sample_data();
        assert_eq!(data.clinic_rating("clinica", 4.5), 4.9);
        assert_eq!(data.clinic_rating("eminal", 4.5), 4.5);
        assert_eq!(data.clinic_rating("unknown", 4.0), 4.0);
    }

    #[test]
    fn review_labels_first_seen_order() {
        let data = sample_data();
        assert_eq!(data.review_tab_labels("clinica"), vec!["スタッフ", "特典"]);
        // 値が空でも項目名があればラベルになる
        assert_eq!(data.review_tab_labels("dio"), vec!["スタッフ", "特典"]);
        // 解決できないコードは先頭のクリニック
        assert_eq!(data.review_tab_labels("unknown"), vec!["スタッフ", "特典"]);
    }

    #[test]
    fn review_labels_default_without_review_rows() {
        let mut data = sample_data();
        data.clinic_texts = parse_clinic_texts(
            "list_name,項目名,備考,ClinicA\n\
             comparison1,総合評価,,4.9\n",
        );
        assert_eq!(data.review_tab_labels("clinica"), DEFAULT_REVIEW_LABELS.to_vec());
    }

    #[test]
    fn review_labels_capped_at_three() {
        let mut data = sample_data();
        data.clinic_texts = parse_clinic_texts(
            "list_name,項目名,備考,ClinicA\n\
             review,口コミ1タイトル（a）,,\n\
             review,口コミ1タイトル（b）,,\n\
             review,口コミ2タイトル（c）,,\n\
             review,口コミ3タイトル（d）,,\n",
        );
        assert_eq!(data.review_tab_labels("clinica"), vec!["a", "b", "c"]);
    }

    #[test]
    fn reviews_accept_both_paren_styles() {
        let data = sample_data();
        let staff = data.reviews_by_label("clinica", "スタッフ");
        assert_eq!(staff.len(), 2);
        assert_eq!(staff[0].title, "丁寧");
        assert_eq!(staff[1].title, "");
        assert_eq!(staff[1].content, "親切");
        let perks = data.reviews_by_label("clinica", "特典");
        assert_eq!(perks, vec![Review { title: "割引".into(), content: String::new() }]);
    }

    #[test]
    fn stores_get_region_from_address() {
        let data = sample_data();
        let umeda = data.stores.iter().find(|s| s.id == "eminal_001").unwrap();
        assert_eq!(umeda.region_id.as_ref().map(RegionId::as_str), Some("027"));
        let shinjuku = data.stores.iter().find(|s| s.id == "dio_001").unwrap();
        assert_eq!(shinjuku.region_id.as_ref().map(RegionId::as_str), Some("013"));
    }

    #[test]
    fn ranked_clinic_stores_in_table_order() {
        let data = sample_data();
        let ids: Vec<&str> = data
            .stores_for_ranked_clinics("13")
            .iter()
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(ids, vec!["dio_001", "dio_002", "eminal_002"]);
        assert!(data.stores_for_ranked_clinics("000").is_empty());
    }

    #[test]
    fn ranking_falls_back_to_default_region() {
        let mut data = sample_data();
        data.rankings.remove(&RegionId::nationwide());
        let ranking = data.ranking_for_region("000").unwrap();
        assert_eq!(ranking.region_id.as_str(), "013");
    }

    #[test]
    fn common_text_placeholders() {
        let mut data = sample_data();
        data.apply_common_override(vec![("MVSVGテキスト2".into(), "厳選{{RANK_COUNT}}院".into())]);
        assert_eq!(data.common_text("MVSVGテキスト2", "", &[("RANK_COUNT", "3")]), "厳選3院");
        assert_eq!(data.common_text("無い", "既定", &[]), "既定");
    }

    #[test]
    fn campaign_prefers_region_specific() {
        let mut data = sample_data();
        let tokyo = RegionId::parse("13").unwrap();
        data.campaigns = vec![
            Campaign { id: "c1".into(), clinic_id: "1".into(), ..Default::default() },
            Campaign { id: "c2".into(), clinic_id: "1".into(), region_id: Some(tokyo.clone()), ..Default::default() },
        ];
        assert_eq!(data.campaign_for(&tokyo, "1").map(|c| c.id.as_str()), Some("c2"));
        let osaka = RegionId::parse("27").unwrap();
        assert_eq!(data.campaign_for(&osaka, "1").map(|c| c.id.as_str()), Some("c1"));
        assert!(data.campaign_for(&tokyo, "2").is_none());
    }
}
