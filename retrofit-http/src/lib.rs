pub mod client;
pub mod factory;

pub use client::HttpBackend;
pub use factory::HttpBackendFactory;
