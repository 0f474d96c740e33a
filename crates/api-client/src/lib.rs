pub mod client;
pub mod retry;

pub use client::{ApiClient, ApiStatusError, status_of};
pub use retry::RetryConfig;
pub use shifttrack_api;
