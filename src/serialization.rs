//! Tagged, tab-indented text format used to persist weak learners and
//! ensembles.

pub mod schema;
pub mod tokenizer;
pub mod writer;


pub use schema::Field;
pub use tokenizer::{StreamTokenizer, Token};
pub use writer::TagWriter;
