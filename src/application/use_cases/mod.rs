//! Use case implementations.

mod purge_messages_use_case;
mod search_images_use_case;

pub use purge_messages_use_case::PurgeMessagesUseCase;
pub use search_images_use_case::{MAX_IMAGE_COUNT, SearchImagesUseCase};
