//! ランキングカード

use leptos::*;

use crate::binder::RankingCard;
use crate::components::{Stars, TrackedLink};

#[component]
pub fn RankingList(cards: Vec<RankingCard>, empty_message: Option<&'static str>) -> impl IntoView {
    if cards.is_empty() {
        return view! {
            <div class="ranking-empty">{empty_message.unwrap_or_default()}</div>
        }
        .into_view();
    }

    view! {
        <div class="ranking-list">
            {cards.into_iter().map(|card| view! { <RankingCardView card=card/> }).collect_view()}
        </div>
    }
    .into_view()
}

#[component]
fn RankingCardView(card: RankingCard) -> impl IntoView {
    let medal_class = card.medal.map(|m| m.class()).unwrap_or("");

    view! {
        <div class=format!("ranking-item rank-{}", card.rank)>
            <div class=format!("rank-medal {}", medal_class)>
                <img
                    class="medal-image"
                    src=format!("../common_data/images/badges/rank-{}.svg", card.rank)
                    alt=format!("{}位", card.rank)
                />
            </div>
            <div class="clinic-logo-section">
                <img class="clinic-logo" src=card.logo_src alt=card.clinic_name.clone()/>
                <h3 class="clinic-name">{card.clinic_name.clone()}</h3>
            </div>
            <div class="rating-section">
                <Stars stars=card.stars/>
                <span class="rating-score">{format!("{:.1}", card.rating)}</span>
            </div>
            <div class="push-message" inner_html=card.push_message_html></div>
            <TrackedLink link=card.link class="link_btn">
                "公式サイト"
            </TrackedLink>
        </div>
    }
}
