//! データ読み込みと参照

pub mod csv;
pub mod loader;
pub mod store;

pub use loader::DataLoader;
pub use store::SiteData;
