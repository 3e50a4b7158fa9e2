//! UIコンポーネントモジュール
//!
//! 表示モデル（[`crate::binder`]）を受け取って描画するだけのコンポーネント群。

pub mod clinic_detail;
pub mod comparison_table;
pub mod first_choice;
pub mod ranking_list;
pub mod region_selector;
pub mod site_footer;
pub mod store_list;

pub use clinic_detail::ClinicDetailList;
pub use comparison_table::ComparisonTables;
pub use first_choice::{ComparisonDisclaimerList, FirstChoiceBox};
pub use ranking_list::RankingList;
pub use region_selector::{ClinicSearch, RegionSelector};
pub use site_footer::SiteFooter;
pub use store_list::StoreListView;

use leptos::*;

use crate::binder::{StarRating, TrackingLink};
use crate::utils::cache::save_redirect_params;

/// 計測リンク。クリック時にパラメータを localStorage に控える
#[component]
pub fn TrackedLink(
    link: TrackingLink,
    #[prop(optional, into)] class: String,
    children: Children,
) -> impl IntoView {
    let params = link.params.clone();
    view! {
        <a
            href=link.href
            class=class
            target="_blank"
            rel="noopener"
            on:click=move |_| save_redirect_params(&params)
        >
            {children()}
        </a>
    }
}

/// 5つ星表示
#[component]
pub fn Stars(stars: StarRating) -> impl IntoView {
    view! {
        <span class="stars">
            {(0..stars.full).map(|_| view! { <i class="star star-full"></i> }).collect_view()}
            {stars.partial.map(|percent| view! {
                <i class="star star-partial" style=format!("--fill: {}%;", percent)></i>
            })}
            {(0..stars.empty).map(|_| view! { <i class="star star-empty"></i> }).collect_view()}
        </span>
    }
}
