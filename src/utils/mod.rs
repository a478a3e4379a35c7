pub mod req_manager;
pub use req_manager::{ConnectionClosed, HttpClientConfig, HttpSessionManager, RequestMetrics};
