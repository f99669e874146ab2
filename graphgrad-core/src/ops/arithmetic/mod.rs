// src/ops/arithmetic/mod.rs

pub mod add;
pub mod mul;

pub use add::Add;
pub use mul::Multiply;
