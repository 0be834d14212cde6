pub mod convert;
pub mod patterns;
