//! Data transfer objects for the application layer.

mod purge_dto;
mod search_dto;

pub use purge_dto::{PurgeReport, PurgeRequest};
pub use search_dto::{FetchOutcome, SearchReply, SearchRequest};
