pub mod json;
pub mod summary;
