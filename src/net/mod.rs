//! Networking: transport seam, session-renewal retry layer, typed helpers,
//! and the order push feed.

pub mod client;
pub mod feed;
pub mod interceptor;
pub mod transport;
pub mod types;

pub use client::ApiClient;
pub use interceptor::{AuthRetry, Disposition, RetryPolicy, SessionRenewal};
pub use transport::{HttpTransport, Transport};
pub use types::{ApiRequest, ApiResponse};
