pub mod charts;
pub mod layout;
pub mod loader;
pub mod memo;
pub mod normalizer;
pub mod playback;
pub mod providers;
pub mod recommendations;

pub use providers::{CatalogApi, HttpCatalogApi};
