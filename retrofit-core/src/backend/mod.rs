pub mod client;
pub mod factory;

pub use client::{BackendError, RetrofitBackend};
pub use factory::{BackendConfig, BackendFactory, BackendRegistry};
