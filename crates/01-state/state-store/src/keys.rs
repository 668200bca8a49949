/// Prefix applied to every cookie the overlay owns.
pub const COOKIE_PREFIX: &str = "AmberLoader_";

/// Epoch seconds of the most recent completed probe.
pub const LAST_POLL: &str = "AmberLoader_lastPoll";
/// Whether the visitor collapsed the popup for the current alert.
pub const COLLAPSED: &str = "AmberLoader_collapsed";
/// Whether the last probe observed an active alert.
pub const ACTIVE_ALERT: &str = "AmberLoader_activeAlert";

/// Lifetime of every persisted field.
pub const STATE_TTL_SECONDS: u64 = 3600;
