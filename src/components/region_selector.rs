//! 地域セレクターとサイドバー検索

use leptos::*;

use crate::models::Region;
use crate::SiteContext;

/// 地域テーブルの一覧（全国を先頭に）
fn region_options(ctx: &SiteContext) -> Vec<Region> {
    ctx.binder.with_value(|binder| {
        let Some(binder) = binder else {
            return Vec::new();
        };
        let mut regions = binder.data().regions.clone();
        if !regions.iter().any(Region::is_nationwide) {
            regions.insert(0, Region::nationwide());
        }
        regions
    })
}

#[component]
pub fn RegionSelector() -> impl IntoView {
    let ctx = use_context::<SiteContext>().expect("SiteContext not found");
    let regions = region_options(&ctx);
    let current = move || {
        ctx.page
            .with(|page| page.as_ref().map(|p| p.region.id.to_string()))
            .unwrap_or_default()
    };

    view! {
        <select
            class="region-select"
            prop:value=current
            on:change=move |ev| ctx.change_region(&event_target_value(&ev))
        >
            {regions.into_iter().map(|region| {
                let id = region.id.to_string();
                view! { <option value=id.clone() selected=move || current() == id>{region.name}</option> }
            }).collect_view()}
        </select>
    }
}

/// 表示中のクリニックを名前と地域で絞り込む
#[component]
pub fn ClinicSearch() -> impl IntoView {
    let ctx = use_context::<SiteContext>().expect("SiteContext not found");
    let (term, set_term) = create_signal(String::new());
    let (region_filter, set_region_filter) = create_signal(String::new());
    let regions = region_options(&ctx);

    let results = move || {
        let term = term.get();
        let region_filter = region_filter.get();
        let names: Vec<String> = ctx.page.with(|page| {
            page.as_ref()
                .map(|p| p.ranking.iter().map(|c| c.clinic_name.clone()).collect())
                .unwrap_or_default()
        });
        ctx.binder.with_value(|binder| {
            binder
                .as_ref()
                .map(|b| {
                    names
                        .into_iter()
                        .filter(|name| b.matches_search(name, &term, &region_filter))
                        .collect::<Vec<_>>()
                })
                .unwrap_or_default()
        })
    };

    view! {
        <div class="sidebar-search">
            <input
                type="text"
                class="search-input"
                placeholder="クリニック名で検索"
                prop:value=term
                on:input=move |ev| set_term.set(event_target_value(&ev))
            />
            <select class="search-region" on:change=move |ev| set_region_filter.set(event_target_value(&ev))>
                <option value="">"すべての地域"</option>
                {regions.into_iter().map(|region| view! {
                    <option value=region.id.to_string()>{region.name}</option>
                }).collect_view()}
            </select>
            <ul class="search-results">
                {move || {
                    let found = results();
                    if found.is_empty() {
                        return view! { <li class="no-results">"該当するクリニックがありません"</li> }.into_view();
                    }
                    found.into_iter().map(|name| view! { <li>{name}</li> }).collect_view()
                }}
            </ul>
        </div>
    }
}
