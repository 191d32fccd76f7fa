//! HTTP fetching for listing pages, article pages, and PDF bodies.
//!
//! # Features
//!
//! - One shared connection pool, a caller-chosen User-Agent per request
//! - Any non-2xx status surfaces as [`FetchError::HttpStatus`]
//! - Bodies can be read whole or streamed chunk by chunk
//! - Optional caller-side retry with exponential backoff ([`with_retry`])
//!
//! # Example
//!
//! ```no_run
//! use crawler_core::http::HttpClient;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpClient::new();
//! let html = client
//!     .fetch_text("https://www.biorxiv.org/collection/neuroscience?page=1", "Mozilla/5.0")
//!     .await?;
//! println!("{} bytes", html.len());
//! # Ok(())
//! # }
//! ```

mod client;
mod constants;
mod error;
mod retry;

pub use client::HttpClient;
pub use constants::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};
pub use error::FetchError;
pub use retry::{
    DEFAULT_MAX_ATTEMPTS, FailureType, RetryDecision, RetryPolicy, classify_error, with_retry,
};
