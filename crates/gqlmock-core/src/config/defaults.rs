/// Delay applied to mocks that do not set their own (milliseconds)
pub const DEFAULT_DELAY_MS: u64 = 0;

/// Kind reported for an authored error that names none
pub const DEFAULT_FAILURE_KIND: &str = "NETWORK_ERROR";
