use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use reqwest::Client;
use tracing::{debug, info};

use crate::core::tts::{TTSError, TTSResult};

/// Performance metrics for monitoring request behavior
#[derive(Debug, Default)]
pub struct RequestMetrics {
    /// Total number of requests made
    pub total_requests: AtomicU64,
    /// Number of successful requests
    pub successful_requests: AtomicU64,
    /// Number of failed requests
    pub failed_requests: AtomicU64,
    /// Number of currently active requests
    pub active_requests: AtomicUsize,
    /// Peak concurrent requests observed
    pub peak_concurrent: AtomicUsize,
}

impl RequestMetrics {
    /// Start tracking one request. The request counts as failed unless
    /// [`RequestTracker::complete`] is called before the tracker is dropped.
    pub fn track(self: &Arc<Self>) -> RequestTracker {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        let active = self.active_requests.fetch_add(1, Ordering::Relaxed) + 1;
        self.peak_concurrent.fetch_max(active, Ordering::Relaxed);

        RequestTracker {
            metrics: Arc::clone(self),
            completed: false,
        }
    }

    /// Get a formatted summary of metrics
    pub fn summary(&self) -> String {
        let total = self.total_requests.load(Ordering::Relaxed);
        let success = self.successful_requests.load(Ordering::Relaxed);
        let failed = self.failed_requests.load(Ordering::Relaxed);
        let active = self.active_requests.load(Ordering::Relaxed);
        let peak = self.peak_concurrent.load(Ordering::Relaxed);

        format!(
            "Requests - Total: {}, Success: {}, Failed: {}, Active: {}, Peak: {}",
            total, success, failed, active, peak
        )
    }
}

/// Guard counting one in-flight request
pub struct RequestTracker {
    metrics: Arc<RequestMetrics>,
    completed: bool,
}

impl RequestTracker {
    pub fn complete(mut self) {
        self.completed = true;
    }
}

impl Drop for RequestTracker {
    fn drop(&mut self) {
        let counter = if self.completed {
            &self.metrics.successful_requests
        } else {
            &self.metrics.failed_requests
        };
        counter.fetch_add(1, Ordering::Relaxed);
        self.metrics.active_requests.fetch_sub(1, Ordering::Relaxed);
    }
}

/// Configuration for the privately owned HTTP client
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Maximum idle connections kept per host
    pub pool_max_idle_per_host: usize,
    /// How long an idle pooled connection is kept
    pub pool_idle_timeout: Option<Duration>,
    /// TCP keep-alive duration
    pub tcp_keepalive: Duration,
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            pool_max_idle_per_host: 32,
            pool_idle_timeout: Some(Duration::from_secs(90)),
            tcp_keepalive: Duration::from_secs(30),
            user_agent: concat!("hamsa-tts/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Error reported when a session asks for a connection after shutdown
#[derive(Debug, thiserror::Error)]
#[error("HTTP session manager is closed")]
pub struct ConnectionClosed;

/// Supplies one shared HTTP client to every synthesis session of a synthesizer.
///
/// An injected client is caller-owned and is handed out as-is with its own
/// connect settings; it is never released here. Without one, a private client
/// is built on first use for each distinct connect timeout and released by
/// [`HttpSessionManager::close`].
///
/// `reqwest::Client` is reference counted, so sessions that already hold a
/// handle keep the connection pool alive until they finish even after `close`.
///
/// # Example
/// ```rust,no_run
/// use std::time::Duration;
/// use hamsa_tts::utils::req_manager::{HttpClientConfig, HttpSessionManager};
///
/// let manager = HttpSessionManager::new(None, HttpClientConfig::default());
/// let client = manager.ensure_session(Duration::from_secs(10)).unwrap();
/// assert!(manager.is_owned());
/// assert!(manager.close());
/// # drop(client);
/// ```
pub struct HttpSessionManager {
    /// Caller-supplied client
    provided: Option<Client>,

    /// Lazily created clients owned by this manager, keyed by connect timeout
    owned: Mutex<HashMap<Duration, Client>>,

    closed: AtomicBool,

    config: HttpClientConfig,

    metrics: Arc<RequestMetrics>,
}

impl HttpSessionManager {
    pub fn new(provided: Option<Client>, config: HttpClientConfig) -> Self {
        Self {
            provided,
            owned: Mutex::new(HashMap::new()),
            closed: AtomicBool::new(false),
            config,
            metrics: Arc::new(RequestMetrics::default()),
        }
    }

    /// Return the shared client, creating a private one bounded by
    /// `connect_timeout` on first call.
    ///
    /// Only connection establishment is time-limited; waiting for the response
    /// and reading its body are not. An injected client ignores
    /// `connect_timeout`.
    pub fn ensure_session(&self, connect_timeout: Duration) -> TTSResult<Client> {
        if let Some(client) = &self.provided {
            if self.is_closed() {
                return Err(TTSError::Connection(Box::new(ConnectionClosed)));
            }
            return Ok(client.clone());
        }

        let mut owned = self.owned.lock();
        if self.is_closed() {
            return Err(TTSError::Connection(Box::new(ConnectionClosed)));
        }
        if let Some(client) = owned.get(&connect_timeout) {
            return Ok(client.clone());
        }

        let client = Self::create_client(&self.config, connect_timeout)
            .map_err(|e| TTSError::Connection(Box::new(e)))?;
        debug!(
            pool_max_idle_per_host = self.config.pool_max_idle_per_host,
            connect_timeout_ms = connect_timeout.as_millis() as u64,
            "Created private HTTP client"
        );
        owned.insert(connect_timeout, client.clone());
        Ok(client)
    }

    fn create_client(
        config: &HttpClientConfig,
        connect_timeout: Duration,
    ) -> Result<Client, reqwest::Error> {
        let mut builder = Client::builder()
            .connect_timeout(connect_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .tcp_keepalive(config.tcp_keepalive)
            .tcp_nodelay(true)
            .user_agent(config.user_agent.as_str());

        if let Some(idle) = config.pool_idle_timeout {
            builder = builder.pool_idle_timeout(idle);
        }

        builder.build()
    }

    /// Release the owned clients. Returns `true` only on the call that actually
    /// released something; later calls and injected clients are no-ops.
    pub fn close(&self) -> bool {
        let mut owned = self.owned.lock();
        if self.closed.swap(true, Ordering::AcqRel) {
            return false;
        }

        let released = owned.len();
        owned.clear();
        if released == 0 {
            return false;
        }

        info!(
            clients = released,
            "Released private HTTP clients. {}",
            self.metrics.summary()
        );
        true
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Whether the client in use (or to be created) belongs to this manager
    pub fn is_owned(&self) -> bool {
        self.provided.is_none()
    }

    pub fn metrics(&self) -> &Arc<RequestMetrics> {
        &self.metrics
    }
}
