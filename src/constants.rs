//! Default values shared across the crate.

/// Default number of alternating vote/coefficient updates per start point.
pub const DEFAULT_MAX_ITER: usize = 20;

/// Default number of boosting rounds for [`AdaBoostMH`](crate::AdaBoostMH).
pub const DEFAULT_ROUNDS: usize = 100;

/// Default edge tolerance for [`AdaBoostMH`](crate::AdaBoostMH).
pub const DEFAULT_TOLERANCE: f64 = 1e-9;

/// Minimum improvement of the edge that keeps the alternating
/// optimization going.
pub const EDGE_TOLERANCE: f64 = 1e-12;

/// Version written into the `<version>` tag of a saved ensemble.
pub const SCHEMA_VERSION: u32 = 1;

/// Initial capacity of a feature column.
pub const BUFFER_SIZE: usize = 256;
