//! 表示モデルの組み立て
//!
//! 選択中の地域を保持し、[`SiteData`] の参照系から画面1枚分の [`PageModel`] を作る。
//! コンポーネントはここで作ったモデルを描画するだけで、データには直接触れない。

use crate::data::store::{store_tokens, Review, SiteData};
use crate::models::{Clinic, DetailKey, Ranking, Region, RegionId, Store, DETAIL_PREFIX, OFFICIAL_SITE_FIELD};
use crate::utils::log_trace::{log_debug, log_info};
use crate::utils::url_params::{get_param, RedirectParams};
use crate::utils::{process_deco_tags, split_feature_tags};

pub const MAX_RANKED: usize = 5;
pub const VISIBLE_STORES: usize = 3;
pub const DEFAULT_RATING: f64 = 4.5;

pub const NO_RANKING_MESSAGE: &str = "この地域のランキングデータはありません";
pub const NO_STORES_MESSAGE: &str = "この地域には店舗がありません";
pub const NO_STORE_INFO_MESSAGE: &str = "店舗情報がありません";
pub const NO_DISCLAIMERS_MESSAGE: &str = "注意事項はありません。";

const DEFAULT_SITE_NAME: &str = "医療ダイエット比較.com";
const DEFAULT_RANK_REGION_TEXT: &str = "で人気の脂肪溶解注射はココ！";
const DEFAULT_PUSH_MESSAGE: &str = "人気のクリニック";
const DEFAULT_ACCESS: &str = "主要駅より徒歩圏内";
const DEFAULT_HOURS: &str = "10:00〜19:00";
const DEFAULT_FEATURE_TAGS: &str = "# 医療ダイエット<br># 医療痩身<br># リバウンド防止";

const RANK_FORM_KEYS: [&str; 3] = ["直フォームの遷移先URL", "直フォーム遷移先URL", "直フォームURL"];
const FORM_KEYS: [&str; 7] = [
    "直フォームURL",
    "直フォーム遷移先URL",
    "無料相談フォームURL",
    "予約フォームURL",
    "フォームURL",
    "問い合わせフォームURL",
    "CTA直リンクURL",
];

// ============================================
// 表示モデル
// ============================================

/// 星評価（5つ星、端数は1つだけ部分表示）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StarRating {
    pub full: u32,
    /// 部分表示する星の塗り割合（%）
    pub partial: Option<u32>,
    pub empty: u32,
}

impl StarRating {
    pub fn new(score: f64) -> Self {
        let score = if score.is_finite() { score.clamp(0.0, 5.0) } else { 0.0 };
        let full = score.floor() as u32;
        let percent = ((score - score.floor()) * 100.0).round() as u32;
        let partial = (percent > 0 && percent < 100).then_some(percent);
        let empty = 5 - score.ceil() as u32;
        Self { full, partial, empty }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Medal {
    Gold,
    Silver,
    Bronze,
}

impl Medal {
    pub fn for_rank(rank: u32) -> Option<Self> {
        match rank {
            1 => Some(Medal::Gold),
            2 => Some(Medal::Silver),
            3 => Some(Medal::Bronze),
            _ => None,
        }
    }

    pub fn class(self) -> &'static str {
        match self {
            Medal::Gold => "gold-medal",
            Medal::Silver => "silver-medal",
            Medal::Bronze => "bronze-medal",
        }
    }
}

/// redirect.html 経由の計測リンク
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackingLink {
    pub href: String,
    /// クリック時に localStorage に控える
    pub params: RedirectParams,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankingCard {
    pub rank: u32,
    pub clinic_id: String,
    pub clinic_name: String,
    pub rating: f64,
    pub stars: StarRating,
    pub medal: Option<Medal>,
    pub logo_src: String,
    pub push_message_html: String,
    pub link: TrackingLink,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonTab {
    Overview,
    Treatment,
    Service,
}

impl ComparisonTab {
    pub const ALL: [ComparisonTab; 3] = [ComparisonTab::Overview, ComparisonTab::Treatment, ComparisonTab::Service];

    pub fn id(self) -> &'static str {
        match self {
            ComparisonTab::Overview => "tab1",
            ComparisonTab::Treatment => "tab2",
            ComparisonTab::Service => "tab3",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ComparisonTab::Overview => "総合",
            ComparisonTab::Treatment => "施術内容",
            ComparisonTab::Service => "サービス",
        }
    }

    pub fn fields(self) -> [&'static str; 5] {
        match self {
            ComparisonTab::Overview => ["クリニック名", "comparison1", "comparison2", "comparison3", "公式サイト"],
            ComparisonTab::Treatment => ["クリニック名", "comparison4", "comparison5", "comparison6", "公式サイト"],
            ComparisonTab::Service => ["クリニック名", "comparison7", "comparison8", "comparison9", "公式サイト"],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ComparisonCell {
    Clinic { name: String, logo_src: String, link: TrackingLink },
    Rating { score: String, stars: StarRating },
    OfficialSite { link: TrackingLink, detail_anchor: String },
    Text { html: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonRow {
    pub rank: u32,
    pub clinic_id: String,
    pub clinic_name: String,
    pub cells: Vec<ComparisonCell>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonTable {
    pub tab: ComparisonTab,
    pub headers: Vec<String>,
    pub rows: Vec<ComparisonRow>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreEntry {
    pub name: String,
    pub address: String,
    pub access: String,
    pub hours: String,
    pub image_src: String,
    pub map_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreList {
    pub heading: String,
    pub visible: Vec<StoreEntry>,
    pub hidden: Vec<StoreEntry>,
    /// 店舗が無いときの表示
    pub placeholder: Option<&'static str>,
}

impl StoreList {
    pub fn more_label(&self) -> Option<String> {
        (!self.hidden.is_empty()).then(|| format!("他{}件のクリニックを見る", self.hidden.len()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailRow {
    pub label: String,
    pub value_html: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailPoint {
    pub title_html: String,
    pub description_html: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewTab {
    pub label: String,
    pub reviews: Vec<Review>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CampaignBox {
    pub header: String,
    pub logo_src: String,
    pub logo_alt: String,
    pub description_html: String,
    pub microcopy_html: String,
    pub cta_text: String,
    pub cta_href: String,
    pub footer_html: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClinicDetail {
    pub rank: u32,
    pub anchor_id: String,
    pub clinic_id: String,
    pub clinic_name: String,
    pub title_html: String,
    pub subtitle_html: String,
    pub banner_src: String,
    pub features: Vec<String>,
    pub price_rows: Vec<DetailRow>,
    pub points: Vec<DetailPoint>,
    pub stores: StoreList,
    pub review_tabs: Vec<ReviewTab>,
    pub campaign: CampaignBox,
    pub disclaimers: Vec<String>,
    pub official_link: TrackingLink,
    pub direct_form_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    pub region_name: String,
    pub is_nationwide: bool,
    pub site_name: String,
    pub mv_region: String,
    pub detail_region: String,
    /// 全国のときは非表示
    pub comparison_region: Option<String>,
    pub rank_region: String,
    pub rank_count: usize,
    pub mv_svg_text2: String,
    pub comparison_title: String,
    pub comparison_subtitle_html: String,
    pub copyright: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FooterLink {
    pub clinic_name: String,
    pub link: TrackingLink,
}

/// 1位クリニックのおすすめ枠
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirstChoice {
    pub rank: u32,
    pub clinic_id: String,
    pub clinic_name: String,
    pub banner_src: String,
    pub points: Vec<DetailPoint>,
    pub logo_src: String,
    pub campaign_html: String,
    pub achievement_text: String,
    pub cta_text: String,
    pub link: TrackingLink,
    /// 公式サイトリンクに表示するURL文字列
    pub official_url_text: String,
    pub disclaimer_title: String,
    pub disclaimer_html: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClinicDisclaimer {
    pub clinic_name: String,
    /// 開閉用の要素IDに使う
    pub slug: String,
    pub lines: Vec<String>,
}

/// 比較表の注意事項（クリニック名順）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComparisonDisclaimers {
    pub items: Vec<ClinicDisclaimer>,
    pub placeholder: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageModel {
    pub requested_region: String,
    pub region: Region,
    pub mapped_region: RegionId,
    pub text: PageText,
    pub ranking: Vec<RankingCard>,
    pub comparison: Vec<ComparisonTable>,
    pub details: Vec<ClinicDetail>,
    pub footer: Vec<FooterLink>,
    pub first_choice: Option<FirstChoice>,
    pub comparison_disclaimers: ComparisonDisclaimers,
    pub empty_message: Option<&'static str>,
}

impl PageModel {
    pub fn comparison_for(&self, tab: ComparisonTab) -> Option<&ComparisonTable> {
        self.comparison.iter().find(|t| t.tab == tab)
    }
}

// ============================================
// ViewBinder
// ============================================

pub struct ViewBinder {
    data: SiteData,
    current_region: Option<String>,
    /// 元ページのクエリ（utm_creative / gclid の引き継ぎ用）
    page_query: Vec<(String, String)>,
}

impl ViewBinder {
    pub fn new(data: SiteData, page_query: Vec<(String, String)>) -> Self {
        Self {
            data,
            current_region: None,
            page_query,
        }
    }

    pub fn data(&self) -> &SiteData {
        &self.data
    }

    pub fn current_region(&self) -> Option<&str> {
        self.current_region.as_deref()
    }

    /// URLの region_id（無ければデフォルト地域）
    pub fn initial_region(&self) -> String {
        get_param(&self.page_query, "region_id")
            .map(str::to_string)
            .unwrap_or_else(|| self.data.config.default_region_id.clone())
    }

    pub fn apply_common_override(&mut self, entries: Vec<(String, String)>) {
        log_info("view-binder", &format!("共通テキストを{}件上書き", entries.len()));
        self.data.apply_common_override(entries);
    }

    /// 地域を切り替えてページ全体を組み直す
    pub fn select_region(&mut self, raw: &str) -> PageModel {
        self.current_region = Some(raw.trim().to_string());
        self.render_page()
    }

    /// 現在の地域で組み直す（共通テキスト上書き後など）
    pub fn render_page(&self) -> PageModel {
        let raw = self.current_region.clone().unwrap_or_else(|| self.initial_region());
        let mapped = self.data.map_region_id(&raw);
        let region = self.display_region(&raw, &mapped);
        let ranking = self.data.ranking_for_region(&raw);

        let (cards, comparison, details, footer, first_choice, disclaimers, valid_count): (
            Vec<RankingCard>,
            Vec<ComparisonTable>,
            Vec<ClinicDetail>,
            Vec<FooterLink>,
            Option<FirstChoice>,
            ComparisonDisclaimers,
            usize,
        ) = match ranking {
            Some(ranking) => (
                self.render_ranking(ranking),
                ComparisonTab::ALL
                    .iter()
                    .map(|tab| self.render_comparison_table(ranking, *tab))
                    .collect(),
                self.ranked_clinics(ranking)
                    .into_iter()
                    .filter_map(|(rank, clinic)| self.render_clinic_detail(&clinic.id, &raw, rank))
                    .collect(),
                self.footer_links(ranking),
                self.first_choice(ranking),
                self.comparison_disclaimers(ranking),
                ranking.ranks.len(),
            ),
            None => (
                Vec::new(),
                Vec::new(),
                Vec::new(),
                Vec::new(),
                None,
                ComparisonDisclaimers::default(),
                0,
            ),
        };

        let empty_message = cards.is_empty().then_some(NO_RANKING_MESSAGE);
        log_debug(
            "view-binder",
            &format!("地域 {} → {}（{}件）", raw, mapped, cards.len()),
        );

        PageModel {
            text: self.page_text(&region, &raw, valid_count),
            requested_region: raw,
            region,
            mapped_region: mapped,
            ranking: cards,
            comparison,
            details,
            footer,
            first_choice,
            comparison_disclaimers: disclaimers,
            empty_message,
        }
    }

    /// 画面に出す地域（"000" は全国、見つからなければデフォルト地域）
    fn display_region(&self, raw: &str, mapped: &RegionId) -> Region {
        if RegionId::parse(raw).is_some_and(|id| id.is_nationwide()) {
            return Region::nationwide();
        }
        self.data
            .region_by_id(mapped)
            .or_else(|| self.data.region_by_id(&self.data.default_region_id()))
            .unwrap_or_else(|| Region {
                id: mapped.clone(),
                name: String::new(),
            })
    }

    /// 表示対象の (順位, クリニック)。不明なクリニックを除いて先頭5件
    fn ranked_clinics<'a>(&'a self, ranking: &'a Ranking) -> Vec<(u32, &'a Clinic)> {
        ranking
            .ranks
            .iter()
            .filter_map(|(position, clinic_id)| match self.data.clinic_by_id(clinic_id) {
                Some(clinic) => Some((position.number(), clinic)),
                None => {
                    log_debug("view-binder", &format!("クリニックID {} はクリニック表にありません", clinic_id));
                    None
                }
            })
            .take(MAX_RANKED)
            .collect()
    }

    fn link_region(&self) -> String {
        self.current_region
            .as_deref()
            .and_then(RegionId::parse)
            .unwrap_or_else(|| self.data.default_region_id())
            .to_string()
    }

    pub fn tracking_link(&self, clinic_id: &str, rank: u32) -> TrackingLink {
        let params = RedirectParams::new(clinic_id, rank, &self.link_region(), &self.page_query);
        TrackingLink {
            href: params.redirect_url(),
            params,
        }
    }

    fn logo_src(&self, code: &str, key: &str) -> String {
        self.data.get_clinic_text(
            code,
            key,
            &format!("../common_data/images/clinics/{0}/{0}-logo.webp", code),
        )
    }

    // ============================================
    // ランキング
    // ============================================

    pub fn render_ranking(&self, ranking: &Ranking) -> Vec<RankingCard> {
        self.ranked_clinics(ranking)
            .into_iter()
            .map(|(rank, clinic)| {
                let rating = self.data.clinic_rating(&clinic.code, DEFAULT_RATING);
                let push = self.data.get_clinic_text(&clinic.code, "ランキングプッシュメッセージ", DEFAULT_PUSH_MESSAGE);
                RankingCard {
                    rank,
                    clinic_id: clinic.id.clone(),
                    clinic_name: clinic.name.clone(),
                    rating,
                    stars: StarRating::new(rating),
                    medal: Medal::for_rank(rank),
                    logo_src: self.logo_src(&clinic.code, "ロゴ画像パス"),
                    push_message_html: process_deco_tags(&push),
                    link: self.tracking_link(&clinic.id, rank),
                }
            })
            .collect()
    }

    pub fn footer_links(&self, ranking: &Ranking) -> Vec<FooterLink> {
        self.ranked_clinics(ranking)
            .into_iter()
            .map(|(rank, clinic)| FooterLink {
                clinic_name: clinic.name.clone(),
                link: self.tracking_link(&clinic.id, rank),
            })
            .collect()
    }

    /// 先頭のクリニックのおすすめ枠
    pub fn first_choice(&self, ranking: &Ranking) -> Option<FirstChoice> {
        let (rank, clinic) = self.ranked_clinics(ranking).into_iter().next()?;
        let code = clinic.code.as_str();
        let text = |key: &str, default: &str| self.data.get_clinic_text(code, key, default);

        let logo_src = [text("meta13", ""), text("クリニックロゴ画像パス", "")]
            .into_iter()
            .find(|path| !path.is_empty())
            .unwrap_or_else(|| format!("../common_data/images/clinics/{0}/{0}-logo.webp", code));
        let disclaimer = text("INFORMATION確認事項", "");

        Some(FirstChoice {
            rank,
            clinic_id: clinic.id.clone(),
            clinic_name: clinic.name.clone(),
            banner_src: text(
                "詳細バナー画像パス",
                &format!("../common_data/images/clinics/{0}/{0}_detail_bnr.webp", code),
            ),
            points: (1..=3)
                .map(|n| DetailPoint {
                    title_html: text(&format!("POINT{}タイトル", n), ""),
                    description_html: process_deco_tags(&text(&format!("POINT{}内容", n), "")),
                })
                .collect(),
            logo_src,
            campaign_html: process_deco_tags(&text("INFORMATIONキャンペーンテキスト", "")),
            achievement_text: text("INFORMATIONサブテキスト", ""),
            cta_text: format!("{}の公式サイト", clinic.name),
            link: self.tracking_link(&clinic.id, rank),
            official_url_text: text(OFFICIAL_SITE_FIELD, "#"),
            disclaimer_title: format!("{}の確認事項", clinic.name),
            disclaimer_html: (!disclaimer.is_empty()).then_some(disclaimer),
        })
    }

    /// `比較表の注意事項` を持つクリニックの一覧。表示対象が居るのに1件も無ければ案内文
    pub fn comparison_disclaimers(&self, ranking: &Ranking) -> ComparisonDisclaimers {
        let mut clinics = self.ranked_clinics(ranking);
        if clinics.is_empty() {
            return ComparisonDisclaimers::default();
        }
        clinics.sort_by(|(_, a), (_, b)| a.name.cmp(&b.name));

        let items: Vec<ClinicDisclaimer> = clinics
            .into_iter()
            .filter_map(|(_, clinic)| {
                let text = self.data.get_clinic_text(&clinic.code, "比較表の注意事項", "");
                let lines: Vec<String> = text
                    .split('\n')
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .map(str::to_string)
                    .collect();
                (!lines.is_empty()).then(|| ClinicDisclaimer {
                    clinic_name: clinic.name.clone(),
                    slug: clinic.code.to_lowercase().split_whitespace().collect(),
                    lines,
                })
            })
            .collect();

        let placeholder = items.is_empty().then_some(NO_DISCLAIMERS_MESSAGE);
        ComparisonDisclaimers { items, placeholder }
    }

    // ============================================
    // 比較表
    // ============================================

    fn comparison_header(&self, field: &str) -> String {
        match field {
            "クリニック名" => "クリニック".to_string(),
            "公式サイト" => "公式サイト".to_string(),
            _ => field
                .strip_prefix("comparison")
                .and_then(|n| n.parse::<u32>().ok())
                .and_then(|n| self.data.clinic_texts.comparison_headers.get(&n).cloned())
                .unwrap_or_else(|| field.to_string()),
        }
    }

    pub fn render_comparison_table(&self, ranking: &Ranking, tab: ComparisonTab) -> ComparisonTable {
        let fields = tab.fields();
        let headers = fields.iter().map(|f| self.comparison_header(f)).collect();

        let rows = self
            .ranked_clinics(ranking)
            .into_iter()
            .map(|(rank, clinic)| {
                let cells = fields
                    .iter()
                    .map(|field| self.comparison_cell(clinic, rank, field))
                    .collect();
                ComparisonRow {
                    rank,
                    clinic_id: clinic.id.clone(),
                    clinic_name: clinic.name.clone(),
                    cells,
                }
            })
            .collect();

        ComparisonTable { tab, headers, rows }
    }

    fn comparison_cell(&self, clinic: &Clinic, rank: u32, field: &str) -> ComparisonCell {
        let code = clinic.code.as_str();
        match field {
            "クリニック名" => ComparisonCell::Clinic {
                name: clinic.name.clone(),
                logo_src: self.logo_src(code, "クリニックロゴ画像パス"),
                link: self.tracking_link(&clinic.id, rank),
            },
            "comparison1" => {
                let score = self.data.get_clinic_text(code, field, &DEFAULT_RATING.to_string());
                let value = score.trim().parse().unwrap_or(DEFAULT_RATING);
                ComparisonCell::Rating {
                    score,
                    stars: StarRating::new(value),
                }
            }
            "公式サイト" => ComparisonCell::OfficialSite {
                link: self.tracking_link(&clinic.id, rank),
                detail_anchor: format!("#clinic{}", rank),
            },
            _ => ComparisonCell::Text {
                html: process_deco_tags(&self.data.get_clinic_text(code, field, "")),
            },
        }
    }

    // ============================================
    // 詳細
    // ============================================

    pub fn render_clinic_detail(&self, clinic_id: &str, raw_region: &str, rank: u32) -> Option<ClinicDetail> {
        let clinic = self.data.clinic_by_id(clinic_id)?;
        let code = clinic.code.as_str();
        let text = |key: &str, default: &str| self.data.get_clinic_text(code, key, default);

        let price_rows = self
            .data
            .clinic_texts
            .detail_fields
            .iter()
            .map(|(key, field)| {
                let value = if field == OFFICIAL_SITE_FIELD || *key == DetailKey::OfficialSite {
                    text(field, "")
                } else {
                    text(&format!("{}{}", DETAIL_PREFIX, field), "")
                };
                DetailRow {
                    label: key.label().to_string(),
                    value_html: process_deco_tags(&value),
                }
            })
            .collect();

        let points = (1..=3)
            .map(|n| DetailPoint {
                title_html: process_deco_tags(&text(&format!("POINT{}タイトル", n), &format!("ポイント{}", n))),
                description_html: process_deco_tags(&text(&format!("POINT{}内容", n), &format!("詳細説明{}", n))),
            })
            .collect();

        let review_tabs = self
            .data
            .review_tab_labels(code)
            .into_iter()
            .map(|label| ReviewTab {
                reviews: self.data.reviews_by_label(code, &label),
                label,
            })
            .collect();

        let official_link = self.tracking_link(&clinic.id, rank);
        let disclaimers = text("INFORMATION確認事項", "")
            .split("<br>")
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        Some(ClinicDetail {
            rank,
            anchor_id: format!("clinic{}", rank),
            clinic_id: clinic.id.clone(),
            clinic_name: clinic.name.clone(),
            title_html: process_deco_tags(&text("詳細タイトル", "医療痩せプログラム")),
            subtitle_html: process_deco_tags(&text("詳細サブタイトル", "効果的な痩身治療")),
            banner_src: text(
                "詳細バナー画像パス",
                &format!("../common_data/images/clinics/{0}/{0}_detail_bnr.webp", code),
            ),
            features: split_feature_tags(&text("詳細_特徴タグ", DEFAULT_FEATURE_TAGS)),
            price_rows,
            points,
            stores: self.store_list(clinic, raw_region),
            review_tabs,
            campaign: self.campaign_box(clinic, raw_region, &official_link),
            disclaimers,
            direct_form_url: self.direct_form_url(&clinic.id, rank),
            official_link,
        })
    }

    /// キャンペーン表に行があればそれを、無ければクリニック別テキストを使う
    fn campaign_box(&self, clinic: &Clinic, raw_region: &str, official: &TrackingLink) -> CampaignBox {
        let code = clinic.code.as_str();
        let text = |key: &str, default: &str| self.data.get_clinic_text(code, key, default);
        let default_logo = format!("../common_data/images/clinics/{0}/{0}-logo.webp", code);
        let mapped = self.data.map_region_id(raw_region);

        if let Some(campaign) = self.data.campaign_for(&mapped, &clinic.id) {
            let or = |value: &str, default: &str| {
                if value.is_empty() { default.to_string() } else { value.to_string() }
            };
            return CampaignBox {
                header: or(&campaign.header_text, "INFORMATION!"),
                logo_src: or(&campaign.logo_src, &default_logo),
                logo_alt: or(&campaign.logo_alt, &clinic.name),
                description_html: process_deco_tags(&campaign.description),
                microcopy_html: process_deco_tags(&campaign.title),
                cta_text: or(&campaign.cta_text, "キャンペーンの詳細を見る"),
                cta_href: or(&campaign.cta_url, &official.href),
                footer_html: process_deco_tags(&campaign.footer_text),
            };
        }

        CampaignBox {
            header: text("キャンペーンヘッダー", "INFORMATION!"),
            logo_src: default_logo,
            logo_alt: clinic.name.clone(),
            description_html: process_deco_tags(&text("INFORMATIONキャンペーンテキスト", "")),
            microcopy_html: process_deco_tags(&text("INFORMATIONサブテキスト", "")),
            cta_text: text("CTAボタンテキスト", "キャンペーンの詳細を見る"),
            cta_href: official.href.clone(),
            footer_html: String::new(),
        }
    }

    // ============================================
    // 店舗
    // ============================================

    /// 地域の store_view から `{code}_stores` を引き、店舗表から取り出す
    pub fn resolve_store_list(&self, code: &str, raw_region: &str) -> Vec<&Store> {
        let mapped = self.data.map_region_id(raw_region);
        let Some(view) = self.data.store_view(&mapped) else {
            return Vec::new();
        };
        self.data.stores_by_ids(&store_tokens(view, code))
    }

    fn store_list(&self, clinic: &Clinic, raw_region: &str) -> StoreList {
        let region_name = self.data.region_name(raw_region);
        let nationwide = RegionId::parse(raw_region).is_some_and(|id| id.is_nationwide())
            || region_name == Region::NATIONWIDE_NAME;
        let heading = if nationwide || region_name.is_empty() {
            format!("{}の店舗", clinic.name)
        } else {
            format!("{}の【{}】の店舗", clinic.name, region_name)
        };

        if clinic.code.is_empty() {
            return StoreList {
                heading,
                visible: Vec::new(),
                hidden: Vec::new(),
                placeholder: Some(NO_STORE_INFO_MESSAGE),
            };
        }

        let mut entries: Vec<StoreEntry> = self
            .resolve_store_list(&clinic.code, raw_region)
            .into_iter()
            .enumerate()
            .map(|(idx, store)| self.store_entry(&clinic.code, store, idx + 1))
            .collect();

        let placeholder = entries.is_empty().then_some(NO_STORES_MESSAGE);
        let hidden = entries.split_off(entries.len().min(VISIBLE_STORES));
        StoreList {
            heading,
            visible: entries,
            hidden,
            placeholder,
        }
    }

    fn store_entry(&self, code: &str, store: &Store, number: usize) -> StoreEntry {
        let fallback_image = format!(
            "{0}/clinics/{1}/{1}_clinic/clinic_image_{2:03}.webp",
            self.data.config.images_path.trim_end_matches('/'),
            code,
            number
        );
        let or = |value: &str, default: &str| {
            if value.is_empty() { default.to_string() } else { value.to_string() }
        };
        StoreEntry {
            name: or(&store.store_name, "店舗名不明"),
            address: or(&store.address, "住所情報なし"),
            access: or(&store.access, DEFAULT_ACCESS),
            hours: self.data.get_clinic_text(code, "営業時間", DEFAULT_HOURS),
            image_src: self.data.get_clinic_text(code, "店舗画像パス", &fallback_image),
            map_url: map_embed_url(&store.address),
        }
    }

    // ============================================
    // 検索・テキスト・URL
    // ============================================

    /// サイドバー検索。名前の部分一致（大文字小文字無視）と、地域指定時はその地域の店舗の有無
    pub fn matches_search(&self, clinic_name: &str, term: &str, region_filter: &str) -> bool {
        let term = term.trim().to_lowercase();
        if !term.is_empty() && !clinic_name.to_lowercase().contains(&term) {
            return false;
        }
        if region_filter.trim().is_empty() {
            return true;
        }
        self.data
            .stores_for_ranked_clinics(region_filter)
            .iter()
            .any(|store| store.clinic_name == clinic_name)
    }

    pub fn page_text(&self, region: &Region, raw: &str, valid_count: usize) -> PageText {
        let is_nationwide = RegionId::parse(raw).is_some_and(|id| id.is_nationwide()) || region.is_nationwide();
        let name = region.name.clone();
        let base = self.data.common_text("ランキング地域名テキスト", DEFAULT_RANK_REGION_TEXT, &[]);
        let site_name = self.data.common_text("サイト名", DEFAULT_SITE_NAME, &[]);
        let rank_count = if valid_count == 0 { MAX_RANKED } else { valid_count.min(MAX_RANKED) };
        let comparison_base = self.data.common_text("比較表タイトル", "で人気の脂肪溶解注射", &[]);

        let (mv_region, detail_region, comparison_region, rank_region, comparison_title) = if is_nationwide {
            (
                "最新".to_string(),
                "[最新版] 人気のクリニック".to_string(),
                None,
                format!("いま{}", base.strip_prefix('で').unwrap_or(&base)),
                comparison_base.strip_prefix('で').unwrap_or(&comparison_base).to_string(),
            )
        } else {
            (
                name.clone(),
                format!("{}で人気のクリニック", name),
                Some(name.clone()),
                format!("{}{}", name, base),
                format!("{}{}", name, comparison_base),
            )
        };

        PageText {
            region_name: name,
            is_nationwide,
            mv_region,
            detail_region,
            comparison_region,
            rank_region,
            rank_count,
            mv_svg_text2: self.data.common_text(
                "MVSVGテキスト2",
                "ランキング",
                &[("RANK_COUNT", &rank_count.to_string())],
            ),
            comparison_title,
            comparison_subtitle_html: process_deco_tags(&self.data.common_text(
                "比較表サブタイトル",
                "クリニックを<span class=\"pink-text\">徹底比較</span>",
                &[],
            )),
            copyright: format!("© 2025 {}", site_name),
            site_name,
        }
    }

    /// 直フォームURL（順位別 → 共通 → 計測リンク）
    pub fn direct_form_url(&self, clinic_id: &str, rank: u32) -> String {
        if let Some(code) = self.data.clinic_code_by_id(clinic_id) {
            let ranked = RANK_FORM_KEYS.iter().map(|key| format!("{}（{}位）", key, rank));
            let common = FORM_KEYS.iter().map(|key| key.to_string());
            for key in ranked.chain(common) {
                let value = self.data.get_clinic_text(code, &key, "");
                let value = value.trim();
                if !value.is_empty() {
                    return value.to_string();
                }
            }
        }
        self.tracking_link(clinic_id, rank).href
    }

    /// redirect.html での最終遷移先
    pub fn destination_url(&self, params: &RedirectParams) -> String {
        let rank = params.rank_number();
        let url = self
            .data
            .clinic_code_by_id(&params.clinic_id)
            .map(|code| {
                let ranked = self.data.get_clinic_text(code, &format!("遷移先URL（{}位）", rank), "");
                if ranked.is_empty() {
                    self.data.get_clinic_text(code, "遷移先URL（1位）", "")
                } else {
                    ranked
                }
            })
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| self.data.config.fallback_clinic_url.clone());
        params.fill_placeholders(&url)
    }
}

/// Google マップ埋め込みURL
pub fn map_embed_url(address: &str) -> Option<String> {
    if address.trim().is_empty() {
        return None;
    }
    Some(format!(
        "https://maps.google.com/maps?q={}&output=embed&z=16",
        crate::utils::url_params::encode(address)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::store::tests::sample_data;
    use crate::models::Campaign;
    use crate::utils::url_params::parse_query;

    fn binder() -> ViewBinder {
        ViewBinder::new(sample_data(), parse_query("?region_id=13&gclid=g1"))
    }

    #[test]
    fn star_rating_parts() {
        assert_eq!(StarRating::new(4.5), StarRating { full: 4, partial: Some(50), empty: 0 });
        assert_eq!(StarRating::new(3.0), StarRating { full: 3, partial: None, empty: 2 });
        assert_eq!(StarRating::new(9.0), StarRating { full: 5, partial: None, empty: 0 });
        assert_eq!(StarRating::new(f64::NAN), StarRating { full: 0, partial: None, empty: 5 });
    }

    #[test]
    fn sentinel_and_gaps_give_two_cards() {
        let b = binder();
        let mut ranking = Ranking { region_id: RegionId::nationwide(), ranks: Vec::new() };
        ranking.set(crate::models::RankPosition(1), "5".into());
        ranking.set(crate::models::RankPosition(3), "2".into());
        let cards = b.render_ranking(&ranking);
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].rank, 1);
        assert_eq!(cards[1].rank, 3);
        assert_eq!(cards[0].medal, Some(Medal::Gold));
        assert_eq!(cards[1].medal, Some(Medal::Bronze));
    }

    #[test]
    fn ranking_capped_at_five() {
        let mut data = sample_data();
        data.clinics = (1..=8)
            .map(|i| Clinic { id: i.to_string(), name: format!("C{}", i), code: format!("c{}", i) })
            .collect();
        let b = ViewBinder::new(data, Vec::new());
        let mut ranking = Ranking { region_id: RegionId::nationwide(), ranks: Vec::new() };
        for i in 1..=8u32 {
            ranking.set(crate::models::RankPosition(i), i.to_string());
        }
        let cards = b.render_ranking(&ranking);
        assert_eq!(cards.len(), MAX_RANKED);
        assert_eq!(cards.last().map(|c| c.rank), Some(5));
    }

    #[test]
    fn select_region_is_idempotent() {
        let mut b = binder();
        let first = b.select_region("13");
        let second = b.select_region("13");
        assert_eq!(first, second);
        let padded = b.select_region("013");
        assert_eq!(first.ranking, padded.ranking);
        assert_eq!(first.mapped_region, padded.mapped_region);
    }

    #[test]
    fn tokyo_page_contents() {
        let mut b = binder();
        let page = b.select_region("13");
        assert_eq!(page.region.name, "東京");
        // no5 の "9" は不明なクリニック
        let ids: Vec<&str> = page.ranking.iter().map(|c| c.clinic_id.as_str()).collect();
        assert_eq!(ids, vec!["5", "2", "1"]);
        assert_eq!(page.details.len(), 3);
        assert_eq!(page.footer.len(), 3);
        assert_eq!(page.comparison.len(), 3);
        assert_eq!(page.text.rank_region, "東京で人気の脂肪溶解注射はココ！");
        assert_eq!(page.text.rank_count, 4);
        assert!(page.empty_message.is_none());
        assert!(page.ranking[0].link.href.contains("gclid=g1"));
        assert!(page.ranking[0].link.href.contains("region_id=013"));
    }

    #[test]
    fn unknown_region_shows_default_region() {
        let mut b = binder();
        let page = b.select_region("014");
        assert_eq!(page.mapped_region.as_str(), "013");
        assert_eq!(page.region.name, "東京");
        assert_eq!(page.requested_region, "014");
    }

    #[test]
    fn nationwide_labels() {
        let mut b = binder();
        let page = b.select_region("000");
        assert!(page.text.is_nationwide);
        assert_eq!(page.text.mv_region, "最新");
        assert_eq!(page.text.detail_region, "[最新版] 人気のクリニック");
        assert_eq!(page.text.comparison_region, None);
        assert_eq!(page.text.rank_region, "いま人気の脂肪溶解注射はココ！");
        assert_eq!(page.text.copyright, "© 2025 医療ダイエット比較.com");
    }

    #[test]
    fn comparison_headers_and_cells() {
        let b = binder();
        let ranking = b.data().rankings[&RegionId::parse("13").unwrap()].clone();
        let table = b.render_comparison_table(&ranking, ComparisonTab::Overview);
        assert_eq!(table.headers, vec!["クリニック", "総合評価", "料金", "comparison3", "公式サイト"]);

        let clinic_a = table.rows.iter().find(|r| r.clinic_name == "ClinicA").unwrap();
        assert_eq!(
            clinic_a.cells[1],
            ComparisonCell::Rating { score: "4.9".into(), stars: StarRating::new(4.9) }
        );
        assert_eq!(
            clinic_a.cells[2],
            ComparisonCell::Text { html: "<span class=\"deco-text\">安い</span>".into() }
        );
        match &clinic_a.cells[4] {
            ComparisonCell::OfficialSite { detail_anchor, .. } => assert_eq!(detail_anchor, "#clinic3"),
            other => panic!("unexpected cell {:?}", other),
        }
    }

    #[test]
    fn store_list_splits_visible_and_hidden() {
        let mut data = sample_data();
        let extra: Vec<Store> = (3..=5)
            .map(|i| Store {
                id: format!("dio_00{}", i),
                clinic_name: "ディオクリニック".into(),
                store_name: format!("{}号院", i),
                address: String::new(),
                zipcode: String::new(),
                access: String::new(),
                region_id: None,
            })
            .collect();
        data.stores.extend(extra);
        data.store_views
            .get_mut(&RegionId::parse("13").unwrap())
            .unwrap()
            .clinic_stores
            .insert("dio_stores".into(), vec!["dio_001/dio_002".into(), "dio_003".into(), "dio_004/dio_005".into()]);
        let b = ViewBinder::new(data, Vec::new());

        let detail = b.render_clinic_detail("1", "13", 3).unwrap();
        assert_eq!(detail.stores.heading, "ディオクリニックの【東京】の店舗");
        assert_eq!(detail.stores.visible.len(), 3);
        assert_eq!(detail.stores.hidden.len(), 2);
        assert_eq!(detail.stores.more_label().as_deref(), Some("他2件のクリニックを見る"));
        let hidden = &detail.stores.hidden[0];
        assert_eq!(hidden.access, "主要駅より徒歩圏内");
        assert_eq!(hidden.address, "住所情報なし");
        assert_eq!(hidden.map_url, None);
        assert_eq!(hidden.image_src, "/images/clinics/dio/dio_clinic/clinic_image_004.webp");
        assert_eq!(detail.stores.visible[0].hours, "10:00〜19:00");
    }

    #[test]
    fn detail_defaults_and_reviews() {
        let b = binder();
        let detail = b.render_clinic_detail("2", "13", 2).unwrap();
        assert_eq!(detail.anchor_id, "clinic2");
        assert_eq!(detail.title_html, "医療痩せプログラム");
        assert_eq!(detail.features, vec!["医療ダイエット", "医療痩身", "リバウンド防止"]);
        assert_eq!(detail.points[2].title_html, "ポイント3");
        assert_eq!(detail.banner_src, "../common_data/images/clinics/clinica/clinica_detail_bnr.webp");
        let labels: Vec<&str> = detail.review_tabs.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(labels, vec!["スタッフ", "特典"]);
        assert_eq!(detail.stores.placeholder, Some(NO_STORES_MESSAGE));
        assert_eq!(detail.price_rows.len(), 1);
        assert_eq!(detail.price_rows[0].label, "公式サイト");
        assert_eq!(detail.campaign.header, "INFORMATION!");
        assert!(b.render_clinic_detail("404", "13", 1).is_none());
    }

    #[test]
    fn campaign_table_overrides_texts() {
        let mut data = sample_data();
        data.campaigns.push(Campaign {
            id: "c1".into(),
            clinic_id: "1".into(),
            header_text: "春の特典".into(),
            description: "<deco>半額</deco>".into(),
            ..Default::default()
        });
        let b = ViewBinder::new(data, Vec::new());
        let detail = b.render_clinic_detail("1", "13", 1).unwrap();
        assert_eq!(detail.campaign.header, "春の特典");
        assert_eq!(detail.campaign.description_html, "<span class=\"deco-text\">半額</span>");
        assert_eq!(detail.campaign.cta_href, detail.official_link.href);
    }

    #[test]
    fn search_by_name_and_region() {
        let b = binder();
        assert!(b.matches_search("ディオクリニック", "ディオ", ""));
        assert!(b.matches_search("ClinicA", "clinica", ""));
        assert!(!b.matches_search("ClinicA", "dio", ""));
        assert!(b.matches_search("ディオクリニック", "", "13"));
        assert!(!b.matches_search("ディオクリニック", "", "27"));
        assert!(b.matches_search("エミナルクリニック", "エミナル", "13"));
        // 大阪のランキングにエミナルはいない
        assert!(!b.matches_search("エミナルクリニック", "", "27"));
    }

    #[test]
    fn direct_form_url_prefers_rank_specific() {
        let mut data = sample_data();
        let record = data.clinic_texts.records.get_mut("ClinicA").unwrap();
        record.insert("直フォームURL".into(), "https://form.example/common".into());
        record.insert("直フォーム遷移先URL（2位）".into(), " https://form.example/rank2 ".into());
        let b = ViewBinder::new(data, Vec::new());
        assert_eq!(b.direct_form_url("2", 2), "https://form.example/rank2");
        assert_eq!(b.direct_form_url("2", 1), "https://form.example/common");
        assert!(b.direct_form_url("1", 1).starts_with("./redirect.html?clinic_id=1&rank=1"));
    }

    #[test]
    fn destination_url_falls_back() {
        let mut data = sample_data();
        data.clinic_texts
            .records
            .get_mut("ClinicA")
            .unwrap()
            .insert("遷移先URL（1位）".into(), "https://clinic.example/?a=[ADID_PLACEHOLDER]".into());
        let b = ViewBinder::new(data, Vec::new());
        let params = RedirectParams {
            clinic_id: "2".into(),
            rank: "3".into(),
            utm_creative: Some("cr9".into()),
            ..Default::default()
        };
        assert_eq!(b.destination_url(&params), "https://clinic.example/?a=cr9");
        let unknown = RedirectParams { clinic_id: "404".into(), ..Default::default() };
        assert!(b.destination_url(&unknown).starts_with("https://sss.ac01.l-ad.net/"));
    }

    #[test]
    fn unknown_clinics_only_shows_no_ranking_message() {
        let mut data = sample_data();
        data.clinics.clear();
        let mut b = ViewBinder::new(data, Vec::new());
        let page = b.select_region("13");
        assert!(page.ranking.is_empty());
        assert!(page.details.is_empty());
        assert_eq!(page.first_choice, None);
        assert_eq!(page.empty_message, Some(NO_RANKING_MESSAGE));
    }

    #[test]
    fn empty_ranking_table_shows_no_ranking_message() {
        let mut data = sample_data();
        data.rankings.clear();
        let mut b = ViewBinder::new(data, Vec::new());
        let page = b.select_region("13");
        assert!(page.ranking.is_empty());
        assert!(page.comparison.is_empty());
        assert_eq!(page.comparison_disclaimers, ComparisonDisclaimers::default());
        assert_eq!(page.empty_message, Some(NO_RANKING_MESSAGE));
    }

    #[test]
    fn first_choice_is_top_ranked_clinic() {
        let mut data = sample_data();
        let record = data.clinic_texts.records.get_mut("エミナルクリニック").unwrap();
        record.insert("POINT1タイトル".into(), "痛みが少ない".into());
        record.insert("INFORMATION確認事項".into(), "※自由診療".into());
        record.insert("クリニックロゴ画像パス".into(), "/logo/eminal.png".into());
        let mut b = ViewBinder::new(data, Vec::new());

        let first = b.select_region("13").first_choice.unwrap();
        assert_eq!(first.clinic_id, "5");
        assert_eq!(first.rank, 1);
        assert_eq!(first.points[0].title_html, "痛みが少ない");
        assert_eq!(first.points[1].title_html, "");
        assert_eq!(first.logo_src, "/logo/eminal.png");
        assert_eq!(first.banner_src, "../common_data/images/clinics/eminal/eminal_detail_bnr.webp");
        assert_eq!(first.cta_text, "エミナルクリニックの公式サイト");
        assert_eq!(first.official_url_text, "#");
        assert_eq!(first.disclaimer_title, "エミナルクリニックの確認事項");
        assert_eq!(first.disclaimer_html.as_deref(), Some("※自由診療"));
        assert!(first.link.href.starts_with("./redirect.html?clinic_id=5&rank=1"));

        let osaka = b.select_region("27").first_choice.unwrap();
        assert_eq!(osaka.clinic_name, "ClinicA");
        assert_eq!(osaka.logo_src, "../common_data/images/clinics/clinica/clinica-logo.webp");
        assert_eq!(osaka.disclaimer_html, None);
    }

    #[test]
    fn comparison_disclaimers_sorted_by_name() {
        let mut data = sample_data();
        for (name, text) in [
            ("ディオクリニック", "※料金は税込\n\n  ※初回のみ  "),
            ("ClinicA", "※要予約"),
        ] {
            data.clinic_texts
                .records
                .get_mut(name)
                .unwrap()
                .insert("比較表の注意事項".into(), text.into());
        }
        let mut b = ViewBinder::new(data, Vec::new());

        let notes = b.select_region("13").comparison_disclaimers;
        assert_eq!(notes.placeholder, None);
        let names: Vec<&str> = notes.items.iter().map(|i| i.clinic_name.as_str()).collect();
        assert_eq!(names, vec!["ClinicA", "ディオクリニック"]);
        assert_eq!(notes.items[0].slug, "clinica");
        assert_eq!(notes.items[1].lines, vec!["※料金は税込", "※初回のみ"]);
    }

    #[test]
    fn comparison_disclaimers_placeholder_when_none() {
        let mut b = binder();
        let notes = b.select_region("13").comparison_disclaimers;
        assert!(notes.items.is_empty());
        assert_eq!(notes.placeholder, Some(NO_DISCLAIMERS_MESSAGE));
    }

    #[test]
    fn common_override_rerenders_site_name() {
        let mut b = binder();
        b.select_region("13");
        b.apply_common_override(vec![("サイト名".into(), "新サイト".into())]);
        assert_eq!(b.render_page().text.copyright, "© 2025 新サイト");
    }
}
