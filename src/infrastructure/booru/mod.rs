//! Image-board adapters.

mod client;
mod dto;
mod providers;

pub use client::{
    BooruClient, BooruSettings, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT, Rule34Credentials,
};
pub use providers::{ProviderSpec, ResponseShape};
