//! 店舗一覧

use leptos::*;

use crate::binder::{StoreEntry, StoreList};

#[component]
pub fn StoreListView(list: StoreList) -> impl IntoView {
    let (expanded, set_expanded) = create_signal(false);
    let more_label = list.more_label();
    let hidden = list.hidden;

    view! {
        <div class="shops">
            <h4 class="section-title-shop">{list.heading}</h4>
            {list.placeholder.map(|message| view! { <div class="no-stores">{message}</div> })}
            {list.visible.into_iter().map(|store| view! { <StoreItem store=store/> }).collect_view()}
            {(!hidden.is_empty()).then(|| view! {
                <div class="hidden-stores" style:display=move || if expanded.get() { "block" } else { "none" }>
                    {hidden.into_iter().map(|store| view! { <StoreItem store=store/> }).collect_view()}
                </div>
            })}
            {more_label.map(|label| view! {
                <button
                    class="shop-toggle"
                    style:display=move || if expanded.get() { "none" } else { "block" }
                    on:click=move |_| set_expanded.set(true)
                >
                    {label}
                </button>
            })}
        </div>
    }
}

#[component]
fn StoreItem(store: StoreEntry) -> impl IntoView {
    let (map_open, set_map_open) = create_signal(false);
    let map_url = store.map_url.clone();
    let alt = store.name.clone();

    view! {
        <div class="shop">
            <div class="shop-image">
                <img src=store.image_src alt=alt/>
            </div>
            <div class="shop-content">
                <div class="shop-name">{store.name}</div>
                <div class="shop-address">{store.address}</div>
                <div class="shop-access">{store.access}</div>
                <div class="shop-hours">{store.hours}</div>
                <button class="map-toggle-btn" on:click=move |_| set_map_open.update(|v| *v = !*v)>
                    "地図"
                </button>
            </div>
            {move || map_open.get().then(|| match map_url.clone() {
                Some(url) => view! {
                    <iframe class="map-embed" src=url width="100%" height="300" loading="lazy"></iframe>
                }
                .into_view(),
                None => view! { <p class="no-map">"住所情報がありません"</p> }.into_view(),
            })}
        </div>
    }
}
