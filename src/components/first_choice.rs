//! 1位クリニックのおすすめ枠と比較表の注意事項

use leptos::*;

use crate::binder::{ClinicDisclaimer, ComparisonDisclaimers, FirstChoice};
use crate::components::TrackedLink;

#[component]
pub fn FirstChoiceBox(choice: FirstChoice) -> impl IntoView {
    let name = choice.clinic_name;
    let banner_alt = name.clone();
    let logo_alt = name.clone();
    let official_link = choice.link.clone();

    view! {
        <section class="first-choice" data-rank=choice.rank>
            <h2 class="first-choice-title">{name}</h2>
            <img class="first-choice-banner" src=choice.banner_src alt=banner_alt/>
            <div class="first-choice-points">
                {choice.points.into_iter().enumerate().map(|(i, point)| view! {
                    <div class="ribbon_point">
                        <div class="point-title">{format!("POINT{} ", i + 1)}{point.title_html}</div>
                        <div class="point-description" inner_html=point.description_html></div>
                    </div>
                }).collect_view()}
            </div>
            <div class="first-choice-info">
                <img class="first-choice-logo" src=choice.logo_src alt=logo_alt/>
                <div class="first-choice-campaign" inner_html=choice.campaign_html></div>
                <p class="first-choice-achievement">{choice.achievement_text}</p>
            </div>
            <TrackedLink link=choice.link class="cta-button">{choice.cta_text}</TrackedLink>
            <p class="first-choice-official">
                <TrackedLink link=official_link>
                    <strong>{choice.official_url_text}</strong>
                </TrackedLink>
            </p>
            {choice.disclaimer_html.map(|html| view! {
                <details class="first-choice-disclaimer">
                    <summary>{choice.disclaimer_title}</summary>
                    <div class="disclaimer-text" inner_html=html></div>
                </details>
            })}
        </section>
    }
}

#[component]
pub fn ComparisonDisclaimerList(disclaimers: ComparisonDisclaimers) -> impl IntoView {
    view! {
        <div class="comparison-disclaimers">
            {disclaimers.placeholder.map(|message| view! { <p class="no-disclaimers">{message}</p> })}
            {disclaimers.items.into_iter().map(|item| view! { <DisclaimerItem item=item/> }).collect_view()}
        </div>
    }
}

#[component]
fn DisclaimerItem(item: ClinicDisclaimer) -> impl IntoView {
    let (open, set_open) = create_signal(false);

    view! {
        <div class="disclaimer-item" id=format!("comp-{}", item.slug)>
            <button class="disclaimer-header" on:click=move |_| set_open.update(|v| *v = !*v)>
                <span>{item.clinic_name}</span>
                <span class="disclaimer-arrow">{move || if open.get() { "▲" } else { "▼" }}</span>
            </button>
            <div class="disclaimer-content" style:display=move || if open.get() { "block" } else { "none" }>
                {item.lines.into_iter().map(|line| view! { <p>{line}</p> }).collect_view()}
            </div>
        </div>
    }
}
