//! ランキングページ
//!
//! 読み込み → 初回描画 → 共通テキスト上書きの反映、の順で進む。
//! 地域の切り替えは [`SiteContext::change_region`] 経由。

use leptos::*;

use crate::binder::{ComparisonTab, PageModel, ViewBinder};
use crate::components::{
    ClinicDetailList, ClinicSearch, ComparisonDisclaimerList, ComparisonTables, FirstChoiceBox,
    RankingList, RegionSelector, SiteFooter,
};
use crate::data::DataLoader;
use crate::models::{PageEvent, PageState, RegionId};
use crate::utils::log_trace::log_error_with_data;
use crate::utils::url_params::{current_query, parse_query};
use crate::{SiteContext, LOAD_FAILED_MESSAGE};

#[component]
pub fn RankingPage() -> impl IntoView {
    let ctx = use_context::<SiteContext>().expect("SiteContext not found");

    let load = move |region: Option<&'static str>| {
        spawn_local(async move {
            ctx.advance(PageEvent::LoadStarted);
            let loader = DataLoader::new(DataLoader::load_config().await);
            match loader.init().await {
                Ok(data) => {
                    ctx.start(ViewBinder::new(data, parse_query(&current_query())), region);
                    // 初回描画の後に上書きを反映
                    if let Some(entries) = loader.load_common_override().await {
                        ctx.apply_common_override(entries);
                    }
                }
                Err(e) => {
                    log_error_with_data(
                        "page",
                        "初期化に失敗しました",
                        serde_json::json!({ "error": e.to_string() }),
                    );
                    ctx.advance(PageEvent::LoadFailed(e.to_string()));
                    ctx.show_error(LOAD_FAILED_MESSAGE);
                }
            }
        });
    };
    load(None);

    // データがあれば全国で描き直し、無ければ読み込み直して全国を表示
    let retry = move |_| {
        if ctx.binder.with_value(Option::is_some) {
            ctx.change_region(RegionId::NATIONWIDE);
        } else {
            ctx.error.set(None);
            load(Some(RegionId::NATIONWIDE));
        }
    };

    view! {
        <div class="ranking-page" class:busy=move || ctx.state.with(PageState::is_busy)>
            {move || ctx.error.get().map(|message| view! {
                <div class="error-message">
                    <span>{message}</span>
                    <button class="retry-btn" on:click=retry>"再試行"</button>
                </div>
            })}

            {move || match ctx.state.get() {
                PageState::Uninitialized | PageState::Loading => view! {
                    <div class="loading">"読み込み中..."</div>
                }
                .into_view(),
                PageState::Error(_) if ctx.page.with(Option::is_none) => view! {
                    <div class="load-error">
                        <p>{LOAD_FAILED_MESSAGE}</p>
                        <button class="retry-btn" on:click=retry>"再試行"</button>
                    </div>
                }
                .into_view(),
                _ => ctx.page.get().map(|page| view! { <PageBody page=page/> }).into_view(),
            }}
        </div>
    }
}

#[component]
fn PageBody(page: PageModel) -> impl IntoView {
    let tables: Vec<_> = ComparisonTab::ALL
        .iter()
        .filter_map(|tab| page.comparison_for(*tab).cloned())
        .collect();
    let text = page.text;
    let header_name = text.site_name.clone();

    view! {
        <header class="site-header">
            <div class="site-name">{header_name}</div>
            <RegionSelector/>
        </header>

        <section class="main-visual">
            <p class="mv-region">{text.mv_region}</p>
            <p class="mv-svg-text2">{text.mv_svg_text2}</p>
        </section>

        <section class="ranking-section">
            <h2 class="rank-region">{text.rank_region}</h2>
            <RankingList cards=page.ranking empty_message=page.empty_message/>
        </section>

        <section class="comparison">
            <h2 class="comparison-title">
                {text.comparison_region.map(|name| view! { <span class="comparison-region">{name}</span> })}
                {text.comparison_title}
            </h2>
            <p class="comparison-subtitle" inner_html=text.comparison_subtitle_html></p>
            <ComparisonTables tables=tables/>
            <ComparisonDisclaimerList disclaimers=page.comparison_disclaimers/>
        </section>

        {page.first_choice.map(|choice| view! { <FirstChoiceBox choice=choice/> })}

        <section class="clinic-details-section">
            <h2 class="detail-region">{text.detail_region}</h2>
            <ClinicDetailList details=page.details/>
        </section>

        <aside class="sidebar">
            <ClinicSearch/>
        </aside>

        <SiteFooter links=page.footer site_name=text.site_name copyright=text.copyright/>
    }
}
