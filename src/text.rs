pub mod face;
pub mod wrap;
