//! リダイレクトページ（redirect.html）
//!
//! クエリ → ハッシュ → localStorage の順でパラメータを探し、
//! クリニックの遷移先URLへ2秒後に移動する。

use leptos::*;

use crate::binder::ViewBinder;
use crate::data::DataLoader;
use crate::utils::cache::{clear_redirect_params, load_redirect_params};
use crate::utils::log_trace::{log_info, log_warn};
use crate::utils::url_params::{current_hash, current_query, navigate_to, RedirectParams};

const COUNTDOWN_SECONDS: u32 = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Destination {
    clinic_name: String,
    logo_src: Option<String>,
    url: String,
}

#[component]
pub fn RedirectPage() -> impl IntoView {
    let (destination, set_destination) = create_signal(None::<Destination>);
    let (remaining, set_remaining) = create_signal(COUNTDOWN_SECONDS);

    let params = RedirectParams::from_location(&current_query(), &current_hash())
        .or_else(load_redirect_params);
    clear_redirect_params();

    spawn_local(async move {
        let config = DataLoader::load_config().await;
        let fallback = config.fallback_clinic_url.clone();
        let loader = DataLoader::new(config);

        let resolved = match (params, loader.init().await) {
            (Some(params), Ok(data)) => {
                let binder = ViewBinder::new(data, Vec::new());
                let clinic = binder.data().clinic_by_id(&params.clinic_id).cloned();
                Destination {
                    clinic_name: clinic.as_ref().map(|c| c.name.clone()).unwrap_or_default(),
                    logo_src: clinic.map(|c| format!("../common_data/images/clinics/{0}/{0}-logo.webp", c.code)),
                    url: binder.destination_url(&params),
                }
            }
            (Some(params), Err(e)) => {
                log_warn("redirect", &format!("データを読めないため既定の遷移先を使います: {}", e));
                Destination {
                    clinic_name: String::new(),
                    logo_src: None,
                    url: params.fill_placeholders(&fallback),
                }
            }
            (None, _) => {
                log_warn("redirect", "リダイレクトパラメータがありません");
                Destination {
                    clinic_name: String::new(),
                    logo_src: None,
                    url: RedirectParams::default().fill_placeholders(&fallback),
                }
            }
        };

        log_info("redirect", &format!("遷移先: {}", resolved.url));
        let url = resolved.url.clone();
        set_destination.set(Some(resolved));

        for left in (0..COUNTDOWN_SECONDS).rev() {
            gloo::timers::future::TimeoutFuture::new(1000).await;
            set_remaining.set(left);
        }
        navigate_to(&url);
    });

    view! {
        <div class="redirect-page">
            {move || match destination.get() {
                None => view! { <p class="redirect-loading">"読み込み中..."</p> }.into_view(),
                Some(dest) => view! {
                    <div class="redirect-box">
                        {dest.logo_src.map(|src| view! { <img class="clinic-logo" src=src alt=dest.clinic_name.clone()/> })}
                        <p class="redirect-message">
                            {if dest.clinic_name.is_empty() {
                                "公式サイトへ移動します".to_string()
                            } else {
                                format!("{}の公式サイトへ移動します", dest.clinic_name)
                            }}
                        </p>
                        <p class="redirect-countdown">{move || format!("{}秒後に自動で移動します", remaining.get())}</p>
                        <a class="redirect-link" href=dest.url>"移動しない場合はこちら"</a>
                    </div>
                }
                .into_view(),
            }}
        </div>
    }
}
