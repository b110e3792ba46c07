use std::time::Duration;

/// Configuration for a [`crate::connector::SimpleConnector`] or
/// [`crate::connector::ClusterConnector`].
///
/// ```rs
/// let mut opts = ConnectorOptions::default();
/// opts.username = "canal".into();
/// opts.retry_times = 5;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectorOptions {
    /// Credentials for the SHA1 challenge at handshake.
    pub username: String,
    pub password: String,

    /// Per-I/O deadline for socket read/write.
    pub so_timeout: Duration,

    /// Server-side net read/write timeout advertised at auth.
    pub idle_timeout: Duration,

    /// Issue `rollback(batchId=0)` right after a successful connect.
    pub rollback_on_connect: bool,

    /// Issue `rollback(batchId=0)` before closing the transport.
    pub rollback_on_disconnect: bool,

    /// Defer decoding inner entries; callers hold the raw bytes instead.
    pub lazy_parse_entry: bool,

    /// Auto-resubscribe value used after a reconnect.
    pub filter: String,

    /// Max retries per supervised call.
    pub retry_times: u32,

    /// Sleep between retry attempts.
    pub retry_interval: Duration,
}

impl Default for ConnectorOptions {
    fn default() -> Self {
        Self {
            username: String::new(),
            password: String::new(),
            so_timeout: Duration::from_secs(60),
            idle_timeout: Duration::from_secs(3600),
            rollback_on_connect: true,
            rollback_on_disconnect: false,
            lazy_parse_entry: false,
            filter: String::new(),
            retry_times: 3,
            retry_interval: Duration::from_secs(5),
        }
    }
}

impl ConnectorOptions {
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = password.into();
        self
    }

    pub fn with_so_timeout(mut self, so_timeout: Duration) -> Self {
        self.so_timeout = so_timeout;
        self
    }

    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    pub fn with_retry_times(mut self, retry_times: u32) -> Self {
        self.retry_times = retry_times;
        self
    }

    pub fn with_retry_interval(mut self, retry_interval: Duration) -> Self {
        self.retry_interval = retry_interval;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let opts = ConnectorOptions::default();
        assert_eq!(opts.so_timeout, Duration::from_secs(60));
        assert_eq!(opts.idle_timeout, Duration::from_secs(3600));
        assert!(opts.rollback_on_connect);
        assert!(!opts.rollback_on_disconnect);
        assert!(!opts.lazy_parse_entry);
        assert_eq!(opts.retry_times, 3);
        assert_eq!(opts.retry_interval, Duration::from_secs(5));
    }

    #[test]
    fn builders_chain() {
        let opts = ConnectorOptions::default()
            .with_username("canal")
            .with_password("canal")
            .with_retry_times(5);
        assert_eq!(opts.username, "canal");
        assert_eq!(opts.password, "canal");
        assert_eq!(opts.retry_times, 5);
    }
}
