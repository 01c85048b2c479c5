//! Application layer with use cases, services and DTOs.

/// Data transfer objects.
pub mod dto;
/// Application services shared by use cases.
pub mod services;
/// Use case implementations.
pub mod use_cases;

pub use dto::{PurgeReport, PurgeRequest, SearchReply, SearchRequest};
pub use services::ImageFetchService;
pub use use_cases::{PurgeMessagesUseCase, SearchImagesUseCase};
