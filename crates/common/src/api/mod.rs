pub mod client;
pub mod v1;

pub use client::{ApiClient, ApiError, ApiRequest, LoginRedirect};

/// Path prefix every backend route lives under.
pub const API_PREFIX: &str = "/api/v1";
