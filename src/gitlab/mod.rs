pub mod client;
pub mod error;
pub mod query;
pub mod rate_limiter;

pub use client::{ConnectionReport, ConnectionStatus, DEFAULT_MAX_PAGES, GitLabClient};
pub use error::GitLabError;
pub use query::QueryParams;
pub use rate_limiter::RateLimiter;
