//! The combined hypothesis produced by boosting.

pub(crate) mod ensemble;


pub use ensemble::Ensemble;
