use std::time::Duration;

use serde::Deserialize;

/// Configured `(connect, read)` timeout pair, in milliseconds.
///
/// Deserializes from either a two-element array (`[5000, 0]`) or an object
/// (`{"connect_ms": 5000, "read_ms": 0}`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct TimeoutConfig {
    /// Connection timeout in milliseconds; zero or negative means no limit.
    pub connect_ms: i64,
    /// Read timeout in milliseconds; zero or negative means no limit.
    pub read_ms: i64,
}

impl TimeoutConfig {
    /// Creates a timeout pair from milliseconds.
    pub fn new(connect_ms: i64, read_ms: i64) -> Self {
        Self {
            connect_ms,
            read_ms,
        }
    }

    /// Converts to the effective timeout handed to the transport.
    ///
    /// A zero or negative component becomes `None`, which transports read as "no limit".
    pub fn resolve(self) -> Timeout {
        Timeout {
            connect: normalize(self.connect_ms),
            read: normalize(self.read_ms),
        }
    }
}

impl From<(i64, i64)> for TimeoutConfig {
    fn from((connect_ms, read_ms): (i64, i64)) -> Self {
        Self::new(connect_ms, read_ms)
    }
}

fn normalize(millis: i64) -> Option<Duration> {
    u64::try_from(millis)
        .ok()
        .filter(|millis| *millis > 0)
        .map(Duration::from_millis)
}

/// Effective timeouts of an assembled request. `None` means unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Timeout {
    /// Limit on establishing the connection.
    pub connect: Option<Duration>,
    /// Limit on waiting for the response.
    pub read: Option<Duration>,
}
