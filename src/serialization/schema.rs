//! Tag names and payload layouts of the tagged text format.
//!
//! A learner payload is an ordered list of [`Field`]s.
//! `save` and `load` both walk the same list,
//! so the two sides can only change together.

/// Outer tag of a saved ensemble.
pub const ENSEMBLE: &str = "ensemble";
/// Format version of a saved ensemble.
pub const VERSION: &str = "version";
/// Number of classes of a saved ensemble.
pub const CLASSES: &str = "classes";
/// One weak hypothesis.
pub const WEAK_HYPOTHESIS: &str = "weakhyp";
/// Registry name of the weak learner.
pub const NAME: &str = "name";
/// Weight of the weak hypothesis in the ensemble.
pub const ALPHA: &str = "alpha";


/// A field of a learner payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// Selected feature index.
    Column,
    /// Per-class coefficient vector.
    U,
    /// Bucket vote table.
    Buckets,
    /// Stump threshold.
    Threshold,
}


impl Field {
    /// The tag this field is written under.
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Column    => "column",
            Self::U         => "u",
            Self::Buckets   => "buckets",
            Self::Threshold => "threshold",
        }
    }
}


/// One `(value, vote)` entry inside [`Field::Buckets`].
pub const BUCKET: &str = "bucket";
