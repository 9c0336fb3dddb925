//! Constants for the retrieve module (attempt counts, timeouts).

use std::time::Duration;

/// Default number of fetch attempts before giving up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default backoff unit; the sleep before attempt `n + 1` is `n` times this.
pub const DEFAULT_BACKOFF_UNIT: Duration = Duration::from_secs(5);

/// Default per-attempt request timeout (5 minutes; big files might take some time).
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Default HTTP connect timeout (30 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 30;
