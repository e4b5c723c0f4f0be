//! Struct `Sample` represents a batch of labeled examples.

pub mod feature;
pub mod sample_struct;
pub mod reader;


pub use reader::SampleReader;
pub use sample_struct::Sample;
pub use feature::Feature;
