//! フッター

use leptos::*;

use crate::binder::FooterLink;
use crate::components::TrackedLink;

#[component]
pub fn SiteFooter(links: Vec<FooterLink>, site_name: String, copyright: String) -> impl IntoView {
    view! {
        <footer class="site-footer">
            <div class="footer-site-name">{site_name}</div>
            <div class="footer-clinics">
                <h5>"人気クリニック"</h5>
                <ul>
                    {links.into_iter().map(|item| view! {
                        <li>
                            <TrackedLink link=item.link>{item.clinic_name}</TrackedLink>
                        </li>
                    }).collect_view()}
                </ul>
            </div>
            <small class="copyright">{copyright}</small>
        </footer>
    }
}
