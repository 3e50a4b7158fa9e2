//! ビューモジュール

pub mod ranking_page;
pub mod redirect_page;

pub use ranking_page::RankingPage;
pub use redirect_page::RedirectPage;
