//! Request handlers

mod ai;
mod expenses;

pub use ai::*;
pub use expenses::*;
