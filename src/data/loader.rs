//! データ読み込み
//!
//! CSVの取得・デコード・パースを行い、[`SiteData`] を組み立てる。
//! 地域・クリニック・ランキングは必須。それ以外は読めなければ空のまま続行する。

use std::collections::{BTreeMap, HashMap};

use crate::config::{DataFile, SiteConfig};
use crate::data::csv::{self, CsvTable, COMMON_TEXT_REPLACEMENT_THRESHOLD, REPLACEMENT_THRESHOLD};
use crate::data::store::SiteData;
use crate::error::{FetchError, LoadError};
use crate::models::{
    Campaign, Clinic, ClinicTextRecord, ClinicTextTable, CommonTexts, DetailKey, ListKind,
    RankPosition, Ranking, Region, RegionId, Store, StoreView, DETAIL_PREFIX, OFFICIAL_SITE_FIELD,
    RANK_SENTINEL,
};
use crate::utils::fetch::{fetch_bytes, fetch_first, fetch_json};
use crate::utils::log_trace::{log_info, log_info_with_data, log_warn};

const SITE_CONFIG_URL: &str = "./site-config.json";

// ============================================
// テーブル変換
// ============================================

pub fn parse_regions(table: &CsvTable) -> Vec<Region> {
    let mut regions: Vec<Region> = Vec::new();
    for record in table.records() {
        let Some(id) = RegionId::parse(record.get("parameter_no")) else {
            continue;
        };
        if regions.iter().any(|r| r.id == id) {
            continue;
        }
        regions.push(Region {
            id,
            name: record.get("region").to_string(),
        });
    }
    regions
}

pub fn parse_clinics(table: &CsvTable) -> Vec<Clinic> {
    table
        .records()
        .filter(|record| !record.get("clinic_id").is_empty())
        .map(|record| Clinic {
            id: record.get("clinic_id").to_string(),
            name: record.get("clinic_name").to_string(),
            code: record.get("code").to_string(),
        })
        .collect()
}

pub fn parse_stores(table: &CsvTable) -> Vec<Store> {
    table
        .records()
        .filter(|record| !record.get("store_id").is_empty())
        .map(|record| {
            // 元シートの列名は "adress"
            let address = match record.get("adress") {
                "" => record.get("address"),
                value => value,
            };
            Store {
                id: record.get("store_id").to_string(),
                clinic_name: record.get("clinic_name").to_string(),
                store_name: record.get("store_name").to_string(),
                address: address.to_string(),
                zipcode: record.get("Zipcode").to_string(),
                access: record.get("access").to_string(),
                region_id: None,
            }
        })
        .collect()
}

/// 地域ごとにまとめる。"-" と空欄は除外
pub fn parse_rankings(table: &CsvTable) -> BTreeMap<RegionId, Ranking> {
    let mut rankings: BTreeMap<RegionId, Ranking> = BTreeMap::new();
    for record in table.records() {
        let Some(region_id) = RegionId::parse(record.get("parameter_no")) else {
            continue;
        };
        let ranking = rankings.entry(region_id.clone()).or_insert_with(|| Ranking {
            region_id,
            ranks: Vec::new(),
        });
        for (column, value) in record.columns() {
            let Some(position) = RankPosition::from_column(column) else {
                continue;
            };
            if value.is_empty() || value == RANK_SENTINEL {
                continue;
            }
            ranking.set(position, value.to_string());
        }
    }
    rankings
}

pub fn parse_store_views(table: &CsvTable) -> BTreeMap<RegionId, StoreView> {
    let mut views = BTreeMap::new();
    for record in table.records() {
        let Some(region_id) = RegionId::parse(record.get("parameter_no")) else {
            continue;
        };
        let clinic_stores: HashMap<String, Vec<String>> = record
            .columns()
            .filter(|(column, value)| {
                column.ends_with("_stores") && !value.is_empty() && *value != RANK_SENTINEL
            })
            .map(|(column, value)| {
                let tokens = value.split('/').map(|t| t.trim().to_string()).collect();
                (column.to_string(), tokens)
            })
            .collect();
        views.insert(
            region_id.clone(),
            StoreView {
                region_id,
                clinic_stores,
            },
        );
    }
    views
}

pub fn parse_campaigns(table: &CsvTable) -> Vec<Campaign> {
    table
        .records()
        .map(|record| Campaign {
            id: record.get("campaign_id").to_string(),
            region_id: RegionId::parse(record.get("region_id")),
            clinic_id: record.get("clinic_id").to_string(),
            title: record.get("title").to_string(),
            header_text: record.get("header_text").to_string(),
            logo_src: record.get("logo_src").to_string(),
            logo_alt: record.get("logo_alt").to_string(),
            description: record.get("description").to_string(),
            cta_text: record.get("cta_text").to_string(),
            cta_url: record.get("cta_url").to_string(),
            footer_text: record.get("footer_text").to_string(),
        })
        .collect()
}

/// clinic-texts.csv
///
/// 1行目: `list_name, 項目名, 目的・注意事項, <クリニック名...>`
pub fn parse_clinic_texts(text: &str) -> ClinicTextTable {
    let mut records = csv::parse_records(text).into_iter();
    let Some(header) = records.next() else {
        return ClinicTextTable::default();
    };

    let mut table = ClinicTextTable::default();
    // 空のクリニック名列は飛ばすが、列位置は保持する
    let columns: Vec<(usize, String)> = header
        .iter()
        .enumerate()
        .skip(3)
        .map(|(idx, name)| (idx, name.trim().to_string()))
        .filter(|(_, name)| !name.is_empty())
        .collect();
    for (_, name) in &columns {
        table.clinic_names.push(name.clone());
        table.records.insert(name.clone(), ClinicTextRecord::default());
    }

    let cell = |row: &[String], idx: usize| row.get(idx).map(|v| v.trim().to_string()).unwrap_or_default();

    for row in records {
        let list_name = cell(&row, 0);
        let field_name = cell(&row, 1);
        if list_name.is_empty() || field_name.is_empty() {
            continue;
        }

        let key = match ListKind::parse(&list_name) {
            ListKind::Comparison(number) => {
                if let Some(n) = number {
                    table.comparison_headers.insert(n, field_name.clone());
                }
                field_name
            }
            ListKind::Detail => {
                if let Some(detail_key) = DetailKey::from_field(&field_name) {
                    table.set_detail_field(detail_key, field_name.clone());
                }
                format!("{}{}", DETAIL_PREFIX, field_name)
            }
            ListKind::Tags => format!("{}{}", DETAIL_PREFIX, field_name),
            ListKind::CodeAlias(clinic_name) => {
                if let Some(record) = table.records.get_mut(clinic_name) {
                    record.insert(field_name, cell(&row, 3));
                }
                continue;
            }
            ListKind::Meta | ListKind::Other => field_name,
        };

        for (idx, name) in &columns {
            if let Some(record) = table.records.get_mut(name) {
                record.insert(key.clone(), cell(&row, *idx));
            }
        }
    }

    table.set_detail_field(DetailKey::OfficialSite, OFFICIAL_SITE_FIELD.to_string());
    table
}

/// site-common-texts.csv（1列目=キー, 3列目=値）
pub fn parse_common_texts(text: &str) -> CommonTexts {
    let mut texts = CommonTexts::default();
    for row in csv::parse_records(text).into_iter().skip(1) {
        if row.len() < 3 {
            continue;
        }
        let key = row[0].trim();
        if key.is_empty() {
            continue;
        }
        texts.insert(key.to_string(), row[2].trim().to_string());
    }
    texts
}

/// 共通テキスト上書きJSON（フラットなオブジェクト）
pub fn parse_common_override(bytes: &[u8]) -> Result<Vec<(String, String)>, FetchError> {
    let value: serde_json::Map<String, serde_json::Value> =
        serde_json::from_slice(bytes).map_err(|e| FetchError::Json(e.to_string()))?;
    Ok(value
        .into_iter()
        .filter_map(|(key, value)| match value {
            serde_json::Value::String(s) => Some((key, s)),
            serde_json::Value::Number(n) => Some((key, n.to_string())),
            serde_json::Value::Bool(b) => Some((key, b.to_string())),
            _ => None,
        })
        .collect())
}

// ============================================
// 読み込み
// ============================================

pub struct DataLoader {
    config: SiteConfig,
}

impl DataLoader {
    pub fn new(config: SiteConfig) -> Self {
        Self { config }
    }

    /// site-config.json があれば読む。無ければデフォルト設定
    pub async fn load_config() -> SiteConfig {
        match fetch_json::<SiteConfig>(SITE_CONFIG_URL).await {
            Ok(config) => {
                log_info("data-loader", "site-config.json を読み込みました");
                config
            }
            Err(_) => SiteConfig::default(),
        }
    }

    async fn load_text(&self, file: DataFile, threshold: usize) -> Result<String, LoadError> {
        let candidates = self.config.candidates(file);
        match fetch_first(&candidates).await {
            Some((url, bytes)) => {
                log_info("data-loader", &format!("{} を読み込みました", url));
                Ok(csv::decode_text(&bytes, threshold))
            }
            None => Err(LoadError::ResourceNotFound {
                resource: file.file_name().to_string(),
            }),
        }
    }

    pub async fn load_csv(&self, file: DataFile) -> Result<CsvTable, LoadError> {
        let text = self.load_text(file, REPLACEMENT_THRESHOLD).await?;
        Ok(CsvTable::from_text(&text))
    }

    pub async fn load_regions(&self) -> Result<Vec<Region>, LoadError> {
        Ok(parse_regions(&self.load_csv(DataFile::Regions).await?))
    }

    pub async fn load_clinics(&self) -> Result<Vec<Clinic>, LoadError> {
        Ok(parse_clinics(&self.load_csv(DataFile::Clinics).await?))
    }

    pub async fn load_rankings(&self) -> Result<BTreeMap<RegionId, Ranking>, LoadError> {
        Ok(parse_rankings(&self.load_csv(DataFile::Rankings).await?))
    }

    pub async fn load_store_views(&self) -> Result<BTreeMap<RegionId, StoreView>, LoadError> {
        Ok(parse_store_views(&self.load_csv(DataFile::StoreViews).await?))
    }

    pub async fn load_stores(&self) -> Result<Vec<Store>, LoadError> {
        Ok(parse_stores(&self.load_csv(DataFile::Stores).await?))
    }

    pub async fn load_campaigns(&self) -> Result<Vec<Campaign>, LoadError> {
        Ok(parse_campaigns(&self.load_csv(DataFile::Campaigns).await?))
    }

    pub async fn load_clinic_texts(&self) -> Result<ClinicTextTable, LoadError> {
        let text = self.load_text(DataFile::ClinicTexts, REPLACEMENT_THRESHOLD).await?;
        Ok(parse_clinic_texts(&text))
    }

    pub async fn load_common_texts(&self) -> Result<CommonTexts, LoadError> {
        let text = self
            .load_text(DataFile::CommonTexts, COMMON_TEXT_REPLACEMENT_THRESHOLD)
            .await?;
        Ok(parse_common_texts(&text))
    }

    /// 共通テキストの上書き。無い・壊れている場合は None
    pub async fn load_common_override(&self) -> Option<Vec<(String, String)>> {
        let bytes = fetch_bytes(&self.config.common_override_url).await.ok()?;
        match parse_common_override(&bytes) {
            Ok(entries) => Some(entries),
            Err(e) => {
                log_warn("data-loader", &format!("共通テキスト上書きJSONを読めません: {}", e));
                None
            }
        }
    }

    /// 全データを順番に読み込む
    pub async fn init(&self) -> Result<SiteData, LoadError> {
        let regions = self.load_regions().await?;
        let clinics = self.load_clinics().await?;
        let rankings = self.load_rankings().await?;

        let store_views = optional(self.load_store_views().await);
        let stores = optional(self.load_stores().await);
        let campaigns = optional(self.load_campaigns().await);
        let common_texts = optional(self.load_common_texts().await);
        let clinic_texts = optional(self.load_clinic_texts().await);

        let mut data = SiteData {
            config: self.config.clone(),
            regions,
            clinics,
            rankings,
            stores,
            store_views,
            campaigns,
            clinic_texts,
            common_texts,
        };
        data.associate_stores();

        log_info_with_data(
            "data-loader",
            "データ読み込み完了",
            serde_json::json!({
                "regions": data.regions.len(),
                "clinics": data.clinics.len(),
                "rankings": data.rankings.len(),
                "stores": data.stores.len(),
                "clinicTexts": data.clinic_texts.clinic_names.len(),
            }),
        );
        Ok(data)
    }
}

fn optional<T: Default>(result: Result<T, LoadError>) -> T {
    result.unwrap_or_else(|e| {
        log_warn("data-loader", &format!("{}（空のまま続行）", e));
        T::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rankings_drop_sentinel_and_group_by_region() {
        let table = CsvTable::from_text("parameter_no,no1,no2,no3\n13,5,-,2\n27,1,,\n");
        let rankings = parse_rankings(&table);
        let tokyo = &rankings[&RegionId::parse("013").unwrap()];
        let ids: Vec<&str> = tokyo.ranks.iter().map(|(_, id)| id.as_str()).collect();
        assert_eq!(ids, vec!["5", "2"]);
        assert_eq!(tokyo.ranks[1].0, RankPosition(3));
        assert_eq!(rankings[&RegionId::parse("27").unwrap()].ranks.len(), 1);
    }

    #[test]
    fn regions_are_padded_and_unique() {
        let table = CsvTable::from_text("parameter_no,region\n13,東京\n013,重複\n1,北海道\n");
        let regions = parse_regions(&table);
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0].id.as_str(), "013");
        assert_eq!(regions[0].name, "東京");
        assert_eq!(regions[1].id.as_str(), "001");
    }

    #[test]
    fn stores_read_misspelled_address_column() {
        let table = CsvTable::from_text(
            "store_id,clinic_name,store_name,Zipcode,adress,access\ndio_001,ディオクリニック,銀座院,104-0061,東京都中央区銀座,銀座駅徒歩1分\n",
        );
        let stores = parse_stores(&table);
        assert_eq!(stores[0].address, "東京都中央区銀座");
        assert_eq!(stores[0].zipcode, "104-0061");
        assert_eq!(stores[0].region_id, None);
    }

    #[test]
    fn store_views_split_tokens() {
        let table = CsvTable::from_text("parameter_no,dio_stores,sbc_stores\n13,dio_001/dio_002,-\n");
        let views = parse_store_views(&table);
        let view = &views[&RegionId::parse("13").unwrap()];
        assert_eq!(view.clinic_stores["dio_stores"], vec!["dio_001", "dio_002"]);
        assert!(!view.clinic_stores.contains_key("sbc_stores"));
    }

    #[test]
    fn clinic_texts_classify_rows() {
        let csv = "\
list_name,項目名,備考,ClinicA,ClinicB
comparison1,総合評価,,4.9,4.2
detail,費用,,\"10,000円\",20000円
detail,特徴タグ,,#医療<br>#痩身,
tags,キャンペーン,,あり,なし
meta,総合評価テキスト,,高評価,
review,口コミ1タイトル（コスパ）,,安い,
ohmyteeth,遷移先URL（1位）,,https://example.com,
,空リスト,,x,y
";
        let table = parse_clinic_texts(csv);
        assert_eq!(table.clinic_names, vec!["ClinicA", "ClinicB"]);
        assert_eq!(table.comparison_headers.get(&1).map(String::as_str), Some("総合評価"));

        let a = table.record("ClinicA").unwrap();
        assert_eq!(a.get("総合評価"), Some("4.9"));
        assert_eq!(a.get("詳細_費用"), Some("10,000円"));
        assert_eq!(a.get("詳細_キャンペーン"), Some("あり"));
        assert_eq!(a.get("総合評価テキスト"), Some("高評価"));
        assert_eq!(a.get("口コミ1タイトル（コスパ）"), Some("安い"));
        assert_eq!(a.get("遷移先URL（1位）"), None);
        assert_eq!(a.get("空リスト"), None);

        let keys: Vec<&DetailKey> = table.detail_fields.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![&DetailKey::Cost, &DetailKey::OfficialSite]);
    }

    #[test]
    fn common_texts_use_first_and_third_columns() {
        let texts = parse_common_texts("項目,説明,値\nサイト名,サイトのタイトル,医療ダイエット比較.com\n短い行,x\n");
        assert_eq!(texts.get("サイト名"), Some("医療ダイエット比較.com"));
        assert_eq!(texts.len(), 1);
    }

    #[test]
    fn common_override_keeps_scalars() {
        let entries =
            parse_common_override(r#"{"サイト名":"上書き","件数":5,"入れ子":{"a":1}}"#.as_bytes()).unwrap();
        assert!(entries.contains(&("サイト名".to_string(), "上書き".to_string())));
        assert!(entries.contains(&("件数".to_string(), "5".to_string())));
        assert_eq!(entries.len(), 2);
        assert!(parse_common_override(b"not json").is_err());
    }
}
