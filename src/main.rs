use leptos::*;

mod binder;
mod components;
mod config;
mod data;
mod error;
mod models;
mod utils;
mod views;

use binder::{PageModel, ViewBinder};
use models::{PageEvent, PageState};
use utils::log_trace::{log_error, log_info};
use utils::url_params::{current_pathname, replace_region_param};
use views::{RankingPage, RedirectPage};

pub const LOAD_FAILED_MESSAGE: &str = "データの読み込みに失敗しました。ページを再読み込みしてください。";
pub const RENDER_FAILED_MESSAGE: &str = "データの表示に問題が発生しました。";
const ERROR_DISPLAY_MS: u32 = 5000;

// ============================================
// サイト全体の状態
// ============================================

/// 画面間で共有する状態
#[derive(Clone, Copy)]
pub struct SiteContext {
    pub binder: StoredValue<Option<ViewBinder>>,
    pub page: RwSignal<Option<PageModel>>,
    pub state: RwSignal<PageState>,
    pub error: RwSignal<Option<String>>,
}

impl SiteContext {
    pub fn new() -> Self {
        Self {
            binder: store_value(None),
            page: create_rw_signal(None),
            state: create_rw_signal(PageState::Uninitialized),
            error: create_rw_signal(None),
        }
    }

    /// 読み込み完了後の初回描画。地域指定が無ければURLの region_id を使う
    pub fn start(&self, binder: ViewBinder, region: Option<&str>) {
        let initial = binder.initial_region();
        self.binder.set_value(Some(binder));
        match region {
            Some(raw) => self.change_region(raw),
            None => {
                self.render_region(&initial);
            }
        }
    }

    /// 地域を切り替え、URLの region_id も書き換える
    pub fn change_region(&self, raw: &str) {
        if self.render_region(raw) {
            replace_region_param(raw.trim());
        }
    }

    pub fn advance(&self, event: PageEvent) {
        self.state.update(|state| *state = state.next(event));
    }

    fn render_region(&self, raw: &str) -> bool {
        self.advance(PageEvent::RenderStarted);
        let page = self
            .binder
            .try_update_value(|binder| binder.as_mut().map(|b| b.select_region(raw)))
            .flatten();
        match page {
            Some(page) => {
                log_info("page", &format!("地域 {} を表示", page.mapped_region));
                self.page.set(Some(page));
                self.advance(PageEvent::Rendered);
                true
            }
            None => {
                log_error("page", "データ未読み込みのため地域を切り替えられません");
                self.advance(PageEvent::RenderFailed(RENDER_FAILED_MESSAGE.to_string()));
                self.show_error(RENDER_FAILED_MESSAGE);
                false
            }
        }
    }

    /// 共通テキストの上書きを反映して描き直す
    pub fn apply_common_override(&self, entries: Vec<(String, String)>) {
        self.advance(PageEvent::RenderStarted);
        let page = self
            .binder
            .try_update_value(|binder| {
                binder.as_mut().map(|b| {
                    b.apply_common_override(entries);
                    b.render_page()
                })
            })
            .flatten();
        if let Some(page) = page {
            self.page.set(Some(page));
        }
        self.advance(PageEvent::Rendered);
    }

    /// エラーメッセージを表示し、5秒後に消す
    pub fn show_error(&self, message: &str) {
        let error = self.error;
        let message = message.to_string();
        error.set(Some(message.clone()));
        spawn_local(async move {
            gloo::timers::future::TimeoutFuture::new(ERROR_DISPLAY_MS).await;
            if error.get_untracked().as_deref() == Some(message.as_str()) {
                error.set(None);
            }
        });
    }
}

// ============================================
// App
// ============================================

#[component]
fn App() -> impl IntoView {
    provide_context(SiteContext::new());

    // redirect.html とランキングページで同じバンドルを使う
    if current_pathname().ends_with("redirect.html") {
        view! { <RedirectPage/> }.into_view()
    } else {
        view! { <RankingPage/> }.into_view()
    }
}

fn main() {
    console_error_panic_hook::set_once();
    mount_to_body(App);
}
