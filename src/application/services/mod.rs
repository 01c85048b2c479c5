//! Application services shared by use cases.

mod image_fetch_service;

pub use image_fetch_service::{ImageFetchService, select_urls};
