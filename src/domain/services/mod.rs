//! Pure domain services.

mod sampler;

pub use sampler::sample;
