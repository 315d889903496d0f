use std::time::Duration;

/// Default values for [`TransportSettings`].
///
/// Dial and pool behavior match common platform HTTP client defaults.
pub mod defaults {
    use std::time::Duration;

    /// Maximum time to establish a TCP connection.
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Interval of TCP keep-alive probes on open connections.
    pub const TCP_KEEPALIVE: Duration = Duration::from_secs(30);

    /// How long an idle pooled connection is kept.
    pub const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);

    /// Maximum idle connections kept per host.
    pub const POOL_MAX_IDLE_PER_HOST: usize = 32;

    /// Delay before racing the next address family when dialing.
    pub const HAPPY_EYEBALLS_TIMEOUT: Duration = Duration::from_millis(300);
}

/// Dial and pooling settings of a transport.
///
/// TLS is configured separately from the certificate material; these
/// settings apply to customized and uncustomized transports alike.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use ca_transport::TransportSettings;
///
/// let settings = TransportSettings::new()
///     .connect_timeout(Duration::from_secs(5))
///     .pool_max_idle_per_host(4);
/// assert_eq!(settings.get_pool_max_idle_per_host(), 4);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransportSettings {
    connect_timeout: Option<Duration>,
    tcp_keepalive: Option<Duration>,
    pool_idle_timeout: Option<Duration>,
    pool_max_idle_per_host: usize,
    happy_eyeballs_timeout: Option<Duration>,
    http2_only: bool,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self::new()
    }
}

impl TransportSettings {
    /// Settings with every value taken from [`defaults`].
    pub fn new() -> Self {
        Self {
            connect_timeout: Some(defaults::CONNECT_TIMEOUT),
            tcp_keepalive: Some(defaults::TCP_KEEPALIVE),
            pool_idle_timeout: Some(defaults::POOL_IDLE_TIMEOUT),
            pool_max_idle_per_host: defaults::POOL_MAX_IDLE_PER_HOST,
            happy_eyeballs_timeout: Some(defaults::HAPPY_EYEBALLS_TIMEOUT),
            http2_only: false,
        }
    }

    /// Set the TCP connect timeout.
    ///
    /// Default: 30 seconds.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Set the TCP keep-alive interval. `None` disables keep-alive probes.
    ///
    /// Default: 30 seconds.
    pub fn tcp_keepalive(mut self, interval: Option<Duration>) -> Self {
        self.tcp_keepalive = interval;
        self
    }

    /// Set the connection pool idle timeout.
    ///
    /// Default: 90 seconds.
    pub fn pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.pool_idle_timeout = Some(timeout);
        self
    }

    /// Disable connection pool idle timeout.
    ///
    /// Connections will not be closed due to inactivity.
    pub fn pool_idle_timeout_none(mut self) -> Self {
        self.pool_idle_timeout = None;
        self
    }

    /// Set the maximum number of idle connections per host.
    ///
    /// Default: 32.
    pub fn pool_max_idle_per_host(mut self, max: usize) -> Self {
        self.pool_max_idle_per_host = max;
        self
    }

    /// Set the happy eyeballs fallback delay. `None` dials addresses strictly in order.
    ///
    /// Default: 300 milliseconds.
    pub fn happy_eyeballs_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.happy_eyeballs_timeout = timeout;
        self
    }

    /// Use HTTP/2 without protocol negotiation.
    pub fn http2_only(mut self, enabled: bool) -> Self {
        self.http2_only = enabled;
        self
    }

    pub fn get_connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout
    }

    pub fn get_tcp_keepalive(&self) -> Option<Duration> {
        self.tcp_keepalive
    }

    pub fn get_pool_idle_timeout(&self) -> Option<Duration> {
        self.pool_idle_timeout
    }

    pub fn get_pool_max_idle_per_host(&self) -> usize {
        self.pool_max_idle_per_host
    }

    pub fn get_happy_eyeballs_timeout(&self) -> Option<Duration> {
        self.happy_eyeballs_timeout
    }

    pub fn is_http2_only(&self) -> bool {
        self.http2_only
    }
}
