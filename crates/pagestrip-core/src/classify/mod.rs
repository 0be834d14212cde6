pub mod engine;
pub mod outcome;

pub use engine::{classify, count_classes};
pub use outcome::{ClassCounts, LineClass, Provenance};
