//! Constants for the HTTP layer (timeouts).

/// Default HTTP connect timeout (30 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default overall request timeout (5 minutes, sized for large PDFs).
pub const READ_TIMEOUT_SECS: u64 = 300;
