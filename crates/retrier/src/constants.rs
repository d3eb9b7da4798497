// Constants for the retrier crate

/// Growth factor applied per attempt by exponential backoff
pub const BACKOFF_MULTIPLIER: u32 = 2;

/// Largest exponent that still fits a `u32` multiplier; anything beyond
/// saturates
pub const MAX_BACKOFF_EXPONENT: u32 = 31;

/// Operation name used when the caller does not provide one
pub const UNNAMED_OPERATION: &str = "unnamed";

/// Tracing target for diagnostic messages forwarded by `LogTracer`
pub const TRACE_TARGET: &str = "retrier::trace";

/// Smallest accepted retry count
pub const MIN_RETRY_COUNT: u32 = 1;
