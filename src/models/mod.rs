// models/mod.rs
pub mod intersection;
