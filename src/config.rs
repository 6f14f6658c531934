//! Timeouts for the transport-driving state machines.

/// Default store/delete timeout: a short bound, since both are
/// single-command modem round trips.
pub const DEFAULT_STORAGE_TIMEOUT_SECS: u32 = 10;

/// Default send timeout: comfortably under the three-minute ceiling most
/// network stacks use before giving up on a submit.
pub const DEFAULT_SEND_TIMEOUT_SECS: u32 = 175;

/// Timeouts used by store/send/delete. Construct with `Default` for the
/// stock values, or override per deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub store_timeout_secs: u32,
    pub send_timeout_secs: u32,
    pub delete_timeout_secs: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            store_timeout_secs: DEFAULT_STORAGE_TIMEOUT_SECS,
            send_timeout_secs: DEFAULT_SEND_TIMEOUT_SECS,
            delete_timeout_secs: DEFAULT_STORAGE_TIMEOUT_SECS,
        }
    }
}
