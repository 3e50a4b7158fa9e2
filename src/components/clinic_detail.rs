//! クリニック詳細セクション

use leptos::*;

use crate::binder::{CampaignBox, ClinicDetail, ReviewTab};
use crate::components::{StoreListView, TrackedLink};

const MICROCOPY: &str = "いつでも変更/キャンセルは可能です";

#[component]
pub fn ClinicDetailList(details: Vec<ClinicDetail>) -> impl IntoView {
    view! {
        <div class="clinic-details-list">
            {details.into_iter().map(|detail| view! { <ClinicDetailCard detail=detail/> }).collect_view()}
        </div>
    }
}

fn badge_class(rank: u32) -> &'static str {
    match rank {
        2 => "silver",
        3 => "bronze",
        4 => "ranking4",
        5 => "ranking5",
        _ => "",
    }
}

#[component]
fn ClinicDetailCard(detail: ClinicDetail) -> impl IntoView {
    let rank = detail.rank;
    let clinic_name = detail.clinic_name;
    let banner_alt = format!("{}のバナー", clinic_name);
    let cta_label = format!("{}の公式サイト", clinic_name);

    view! {
        <div class="detail-item" id=detail.anchor_id data-rank=rank>
            <div class="ranking_badge_inner">
                <img
                    class=format!("ranking-badge {}", badge_class(rank))
                    src=format!("../common_data/images/rank_icon/rank{}.webp", rank)
                    alt=format!("{}位", rank)
                />
                <h3 class="clinic-name">{clinic_name}</h3>
            </div>
            <div class="detail-title">
                <h3 inner_html=detail.title_html></h3>
                <p inner_html=detail.subtitle_html></p>
            </div>
            <div class="detail-banner">
                <img src=detail.banner_src alt=banner_alt/>
            </div>
            <div class="detail-features">
                {detail.features.into_iter().map(|tag| view! {
                    <span class="feature-tag">{format!("# {}", tag)}</span>
                }).collect_view()}
            </div>

            <table class="info-table">
                <tbody>
                    {detail.price_rows.into_iter().map(|row| view! {
                        <tr>
                            <td>{row.label}</td>
                            <td inner_html=row.value_html></td>
                        </tr>
                    }).collect_view()}
                </tbody>
            </table>

            <div class="clinic-points-section">
                {detail.points.into_iter().enumerate().map(|(i, point)| view! {
                    <div class="clinic-point-item">
                        <div class="point-number">{format!("POINT{}", i + 1)}</div>
                        <div class="point-title" inner_html=point.title_html></div>
                        <div class="point-description" inner_html=point.description_html></div>
                    </div>
                }).collect_view()}
            </div>

            <ReviewTabs tabs=detail.review_tabs/>
            <StoreListView list=detail.stores/>
            <CampaignSection campaign=detail.campaign/>

            <div class="direct-cta">
                <a class="cta-button direct-cta-button" href=detail.direct_form_url target="_blank" rel="noopener">
                    "無料相談の空き状況をチェック"
                </a>
                <p class="cta-microcopy">{MICROCOPY}</p>
            </div>

            <div class="detail-cta">
                <TrackedLink link=detail.official_link class="link_btn">
                    {cta_label}
                </TrackedLink>
            </div>

            {(!detail.disclaimers.is_empty()).then(|| view! {
                <div class="disclaimer-accordion">
                    <details>
                        <summary>"確認事項"</summary>
                        <ul>
                            {detail.disclaimers.into_iter().map(|d| view! { <li>{d}</li> }).collect_view()}
                        </ul>
                    </details>
                </div>
            })}
        </div>
    }
}

#[component]
fn ReviewTabs(tabs: Vec<ReviewTab>) -> impl IntoView {
    let (selected, set_selected) = create_signal(0usize);
    let labels: Vec<String> = tabs.iter().map(|t| t.label.clone()).collect();
    let tabs = store_value(tabs);

    view! {
        <div class="review_tab_box">
            <ul class="review-tabs">
                {labels.into_iter().enumerate().map(|(i, label)| view! {
                    <li
                        class=move || if selected.get() == i { "select" } else { "" }
                        on:click=move |_| set_selected.set(i)
                    >
                        {label}
                    </li>
                }).collect_view()}
            </ul>
            {move || {
                let reviews = tabs.with_value(|tabs| {
                    tabs.get(selected.get()).map(|t| t.reviews.clone()).unwrap_or_default()
                });
                if reviews.is_empty() {
                    return view! { <p class="no-reviews">"口コミはまだありません"</p> }.into_view();
                }
                reviews
                    .into_iter()
                    .map(|review| view! {
                        <div class="review_tab_box_r">
                            <p class="review-title">{review.title}</p>
                            <p class="review-content">{review.content}</p>
                        </div>
                    })
                    .collect_view()
            }}
        </div>
    }
}

#[component]
fn CampaignSection(campaign: CampaignBox) -> impl IntoView {
    view! {
        <div class="campaign-container">
            <div class="campaign-header">{campaign.header}</div>
            <div class="campaign-content">
                <div class="camp_header3">
                    <img class="camp_img" src=campaign.logo_src alt=campaign.logo_alt/>
                    <div class="camp_txt" inner_html=campaign.description_html></div>
                </div>
                <div class="cv_box_img" inner_html=campaign.microcopy_html></div>
                <a class="btn btn_second_primary" href=campaign.cta_href target="_blank" rel="noopener">
                    {campaign.cta_text}
                </a>
                {(!campaign.footer_html.is_empty()).then(|| view! {
                    <div class="campaign-footer" inner_html=campaign.footer_html></div>
                })}
            </div>
        </div>
    }
}
