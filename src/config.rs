//! サイト設定
//!
//! `site-config.json` があれば読み込み、無い項目はデフォルト値を使う。

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 読み込み対象のデータファイル
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFile {
    Regions,
    Clinics,
    Stores,
    Rankings,
    StoreViews,
    Campaigns,
    ClinicTexts,
    CommonTexts,
}

impl DataFile {
    pub fn file_name(self) -> &'static str {
        match self {
            DataFile::Regions => "出しわけSS - region.csv",
            DataFile::Clinics => "出しわけSS - items.csv",
            DataFile::Stores => "出しわけSS - stores.csv",
            DataFile::Rankings => "出しわけSS - ranking.csv",
            DataFile::StoreViews => "出しわけSS - store_view.csv",
            DataFile::Campaigns => "出しわけSS - campaigns.csv",
            DataFile::ClinicTexts => "clinic-texts.csv",
            DataFile::CommonTexts => "site-common-texts.csv",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct SiteConfig {
    /// サイト固有データ（ランキング・テキスト）
    pub data_path: String,
    /// 旧配置のランキングデータ
    pub region_data_path: String,
    /// 全サイト共通データ（地域・クリニック・店舗）
    pub common_data_path: String,
    /// 共通テキストの上書きJSON
    pub common_override_url: String,
    /// 店舗画像の既定パスの起点
    pub images_path: String,
    /// region_id 未指定・解決不能時の地域
    pub default_region_id: String,
    /// ランキングが無い地域の振り替え先
    pub region_overrides: BTreeMap<String, String>,
    /// クリニックコード → clinic-texts.csv 上のクリニック名
    pub clinic_aliases: BTreeMap<String, String>,
    /// 遷移先URLがどこにも無い場合のURL
    pub fallback_clinic_url: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        let region_overrides = [("001", "013")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        let clinic_aliases = [
            ("tcb", "TCB"),
            ("TCB", "TCB"),
            ("luna", "LUNAビューティークリニック"),
            ("LUNAビューティークリニック", "LUNAビューティークリニック"),
            ("rize", "リゼクリニック"),
            ("リゼクリニック", "リゼクリニック"),
            ("shinagawa", "品川美容外科"),
            ("品川美容外科", "品川美容外科"),
            ("seishin", "聖心美容クリニック"),
            ("聖心美容クリニック", "聖心美容クリニック"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Self {
            data_path: "./data/".to_string(),
            region_data_path: "./data/ranking/".to_string(),
            common_data_path: "../common_data/data/".to_string(),
            common_override_url: "../../../common_data/data/site-common-texts.json".to_string(),
            images_path: "/images".to_string(),
            default_region_id: "013".to_string(),
            region_overrides,
            clinic_aliases,
            fallback_clinic_url: "https://sss.ac01.l-ad.net/cl/p1a64143O61e70f7/?bid=a6640dkh37648h88&param2=[ADID_PLACEHOLDER]&param3=[GCLID_PLACEHOLDER]".to_string(),
        }
    }
}

impl SiteConfig {
    /// 読み込み候補URL（新配置 → 旧配置の順）
    pub fn candidates(&self, file: DataFile) -> Vec<String> {
        let name = file.file_name();
        match file {
            DataFile::Rankings => vec![
                format!("{}{}", self.data_path, name),
                format!("{}{}", self.region_data_path, name),
            ],
            DataFile::Regions | DataFile::Clinics | DataFile::Stores | DataFile::StoreViews => {
                vec![format!("{}{}", self.common_data_path, name)]
            }
            DataFile::ClinicTexts => vec![
                format!("{}{}", self.data_path, name),
                format!("{}clinic_text/{}", self.data_path, name),
            ],
            DataFile::CommonTexts => vec![
                format!("{}{}", self.data_path, name),
                format!("{}appeal_text/{}", self.data_path, name),
            ],
            DataFile::Campaigns => vec![format!("{}{}", self.data_path, name)],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranking_candidates_prefer_new_layout() {
        let config = SiteConfig::default();
        let urls = config.candidates(DataFile::Rankings);
        assert_eq!(urls.len(), 2);
        assert_eq!(urls[0], "./data/出しわけSS - ranking.csv");
        assert_eq!(urls[1], "./data/ranking/出しわけSS - ranking.csv");
    }

    #[test]
    fn shared_tables_come_from_common_data() {
        let config = SiteConfig::default();
        assert_eq!(
            config.candidates(DataFile::Clinics),
            vec!["../common_data/data/出しわけSS - items.csv".to_string()]
        );
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: SiteConfig =
            serde_json::from_str(r#"{"defaultRegionId":"027","dataPath":"/lp/data/"}"#).unwrap();
        assert_eq!(config.default_region_id, "027");
        assert_eq!(config.data_path, "/lp/data/");
        assert_eq!(config.region_overrides.get("001").map(String::as_str), Some("013"));
    }
}
