//! Protocol-wide constants mirrored from the server's wire contract.

/// The only protocol version this client speaks.
pub const CANAL_VERSION: i32 = 1;

/// Default `fetchSize` for `GET` when the caller passes a non-positive batch size.
pub const BATCH_SIZE_DEFAULT: i32 = 1000;

/// Default `clientId` used by a freshly constructed `ClientIdentity`.
pub const CLIENT_ID_DEFAULT: i64 = 1001;

/// `GetWithoutAck(timeout < 0)` is mapped to this sentinel: return immediately, never block.
pub const TIMEOUT_DEFAULT: i64 = -1;

/// Blocks indefinitely until data is available (bounded only by `soTimeout`).
pub const TIMEOUT_NEVER: i64 = 0;

/// Time unit sent alongside `GET.timeout`; the core always sends `Milliseconds`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum TimeUnit {
    Nanoseconds = 0,
    Microseconds = 1,
    Milliseconds = 2,
    Seconds = 3,
    Minutes = 4,
    Hours = 5,
    Days = 6,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canal_version_is_one() {
        assert_eq!(CANAL_VERSION, 1);
    }

    #[test]
    fn time_unit_milliseconds_is_two() {
        assert_eq!(TimeUnit::Milliseconds as i32, 2);
    }
}
