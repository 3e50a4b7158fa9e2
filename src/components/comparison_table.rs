//! 比較表（タブ切り替え）

use leptos::*;

use crate::binder::{ComparisonCell, ComparisonTab, ComparisonTable};
use crate::components::{Stars, TrackedLink};

#[component]
pub fn ComparisonTables(tables: Vec<ComparisonTable>) -> impl IntoView {
    let (current_tab, set_current_tab) = create_signal(ComparisonTab::Overview);
    let tables = store_value(tables);

    view! {
        <div class="comparison-section">
            <div class="tab-menu">
                {ComparisonTab::ALL.iter().map(|&tab| view! {
                    <button
                        class=move || if current_tab.get() == tab { "tab-menu-item active" } else { "tab-menu-item" }
                        data-tab=tab.id()
                        on:click=move |_| set_current_tab.set(tab)
                    >
                        {tab.label()}
                    </button>
                }).collect_view()}
            </div>

            {move || {
                let tab = current_tab.get();
                tables.with_value(|tables| {
                    tables
                        .iter()
                        .find(|t| t.tab == tab)
                        .cloned()
                        .map(|table| view! { <ComparisonTableView table=table/> })
                })
            }}
        </div>
    }
}

#[component]
fn ComparisonTableView(table: ComparisonTable) -> impl IntoView {
    view! {
        <table class="comparison-table" id=table.tab.id()>
            <thead>
                <tr>
                    {table.headers.into_iter().map(|h| view! { <th>{h}</th> }).collect_view()}
                </tr>
            </thead>
            <tbody>
                {table.rows.into_iter().map(|row| view! {
                    <tr class=format!("rank-{}", row.rank)>
                        {row.cells.into_iter().map(|cell| view! { <td>{cell_view(cell)}</td> }).collect_view()}
                    </tr>
                }).collect_view()}
            </tbody>
        </table>
    }
}

fn cell_view(cell: ComparisonCell) -> View {
    match cell {
        ComparisonCell::Clinic { name, logo_src, link } => {
            let alt = name.clone();
            view! {
                <img class="clinic-logo" src=logo_src alt=alt/>
                <TrackedLink link=link class="clinic-link">{name}</TrackedLink>
            }
            .into_view()
        }
        ComparisonCell::Rating { score, stars } => view! {
            <span class="rating-score">{score}</span>
            <Stars stars=stars/>
        }
        .into_view(),
        ComparisonCell::OfficialSite { link, detail_anchor } => view! {
            <TrackedLink link=link class="link_btn">"公式サイト >"</TrackedLink>
            <a class="detail_btn" href=detail_anchor>"詳細をみる"</a>
        }
        .into_view(),
        ComparisonCell::Text { html } => view! { <span inner_html=html></span> }.into_view(),
    }
}
