// src/ops/view/mod.rs

//! Operations whose forward output is a non-owning view of an input.

pub mod repeat;
pub mod transpose;

pub use repeat::Repeat;
pub use transpose::Transpose;

#[cfg(test)]
#[path = "view_test.rs"]
mod tests;
